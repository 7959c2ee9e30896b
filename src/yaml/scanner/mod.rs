//! Incremental YAML scanner
//!
//! Classifies decoded input into tokens. The scanner is restartable:
//! [`Scanner::next_token`] returns `Ok(None)` when the current lookahead
//! cannot be resolved yet, committing no state, and the caller feeds more
//! bytes and retries. Once [`Scanner::finish`] has been called, anything
//! that still cannot resolve is an error instead.

mod scalars;
mod tokens;

pub use tokens::{ScalarStyle, Token, TokenType};

use crate::yaml::encoding::{Encoding, StreamDecoder};
use crate::{Error, ErrorContext, Limits, Position, ResourceTracker, Result};
use scalars::{
    assemble_block_scalar, can_start_plain, decode_escape, Chomping, EscapeOutcome,
};

/// Maximum nesting of flow collections tracked by the scanner
const FLOW_DEPTH_MAX: usize = 32;

/// Buffer prefix dropped once this many bytes have been consumed
const COMPACT_THRESHOLD: usize = 8192;

enum Skip {
    TokenStart,
    NeedMore,
    EndOfStream,
}

/// Streaming scanner turning decoded bytes into [`Token`]s
#[derive(Debug)]
pub struct Scanner {
    decoder: StreamDecoder,
    buffer: String,
    cursor: usize,
    position: Position,
    /// Only whitespace seen so far on the current line
    indent_ws: bool,
    finished: bool,
    ended: bool,
    sync_mode: bool,
    /// Open flow collection brackets (`[` / `{`)
    flow: Vec<char>,
    limits: Limits,
    tracker: ResourceTracker,
    error: Option<Error>,
}

impl Scanner {
    /// Create a scanner with default limits
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create a scanner with custom limits
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            decoder: StreamDecoder::new(),
            buffer: String::new(),
            cursor: 0,
            position: Position::new(),
            indent_ws: true,
            finished: false,
            ended: false,
            sync_mode: false,
            flow: Vec::new(),
            limits,
            tracker: ResourceTracker::new(),
            error: None,
        }
    }

    /// Current position in the decoded input
    pub const fn position(&self) -> Position {
        self.position
    }

    /// The input encoding, once detected
    pub fn encoding(&self) -> Option<Encoding> {
        self.decoder.encoding()
    }

    /// Whether `finish` has been called
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Whether the stream-end token has been emitted
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Treat every feed as if followed by `finish` for lookahead purposes
    pub fn set_sync_mode(&mut self, sync: bool) {
        self.sync_mode = sync;
    }

    /// Feed raw input bytes
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.finished {
            return Err(Error::state("feed called after finish"));
        }
        let result = self
            .tracker
            .add_bytes(&self.limits, bytes.len())
            .and_then(|()| self.decoder.feed(bytes, &mut self.buffer));
        if let Err(err) = result {
            self.error = Some(err.clone());
            return Err(err);
        }
        Ok(())
    }

    /// Signal end of input
    pub fn finish(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.finished {
            return Ok(());
        }
        if let Err(err) = self.decoder.finish(&mut self.buffer) {
            self.error = Some(err.clone());
            return Err(err);
        }
        self.finished = true;
        Ok(())
    }

    /// Produce the next token, or `Ok(None)` when more input is needed
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.scan_next() {
            Ok(token) => Ok(token),
            Err(err) => {
                let err = self.attach_context(err);
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Enrich a scan error with the offending line and a caret column
    fn attach_context(&self, err: Error) -> Error {
        match err {
            Error::Scan {
                position,
                message,
                context: None,
            } => {
                let line_start = self.buffer[..self.cursor]
                    .rfind('\n')
                    .map_or(0, |idx| idx + 1);
                let line_end = self.buffer[self.cursor..]
                    .find('\n')
                    .map_or(self.buffer.len(), |idx| self.cursor + idx);
                let snippet = ErrorContext::new(
                    self.buffer[line_start..line_end].to_string(),
                    position.column,
                );
                Error::Scan {
                    position,
                    message,
                    context: Some(snippet),
                }
            }
            other => other,
        }
    }

    fn scan_next(&mut self) -> Result<Option<Token>> {
        if self.ended {
            return Ok(None);
        }
        match self.skip_to_token()? {
            Skip::NeedMore => Ok(None),
            Skip::EndOfStream => {
                if !self.flow.is_empty() {
                    return Err(Error::scan(
                        self.position,
                        "unclosed flow collection at end of input",
                    ));
                }
                self.ended = true;
                Ok(Some(Token::simple(TokenType::StreamEnd, self.position)))
            }
            Skip::TokenStart => {
                let start = self.position;
                let ch = self.peek(0).expect("token start has a character");
                match ch {
                    '-' => self.scan_dash(start),
                    '.' => self.scan_dot(start),
                    '%' => self.scan_directive(start),
                    '[' | '{' => self.scan_flow_open(start, ch),
                    ']' | '}' => self.scan_flow_close(start, ch),
                    ',' => {
                        self.advance_one();
                        Ok(Some(Token::simple(TokenType::Indicator(','), start)))
                    }
                    ':' | '?' => self.scan_maybe_indicator(start, ch),
                    '&' => self.scan_name(start, false),
                    '*' => self.scan_name(start, true),
                    '!' => self.scan_tag(start),
                    '|' => self.scan_block_scalar(start, false),
                    '>' => self.scan_block_scalar(start, true),
                    '\'' => self.scan_single_quoted(start),
                    '"' => self.scan_double_quoted(start),
                    _ if can_start_plain(ch) => self.scan_plain(start),
                    _ => Err(Error::scan(
                        start,
                        format!("character '{}' cannot start a token", ch),
                    )),
                }
            }
        }
    }

    /// Skip whitespace, newlines, and comments to the next token start
    fn skip_to_token(&mut self) -> Result<Skip> {
        loop {
            let Some(ch) = self.peek(0) else {
                if self.finished {
                    return Ok(Skip::EndOfStream);
                }
                return Ok(Skip::NeedMore);
            };
            match ch {
                ' ' | '\n' => self.advance_one(),
                '\t' => {
                    if self.indent_ws && self.flow.is_empty() {
                        return Err(Error::scan(self.position, "tab used for indentation"));
                    }
                    self.advance_one();
                }
                '#' => {
                    let rest = self.rest();
                    match rest.find('\n') {
                        Some(idx) => self.commit_bytes(idx),
                        None => {
                            if self.effective_end() {
                                let len = rest.len();
                                self.commit_bytes(len);
                            } else {
                                return Ok(Skip::NeedMore);
                            }
                        }
                    }
                }
                _ => return Ok(Skip::TokenStart),
            }
        }
    }

    fn scan_dash(&mut self, start: Position) -> Result<Option<Token>> {
        if self.position.column == 1 && self.rest().starts_with("---") {
            match self.peek(3) {
                None if !self.effective_end() => return Ok(None),
                None => {
                    self.commit_bytes(3);
                    return Ok(Some(Token::new(TokenType::DocumentStart, start, self.position)));
                }
                Some(c) if c == ' ' || c == '\t' || c == '\n' => {
                    self.commit_bytes(3);
                    return Ok(Some(Token::new(TokenType::DocumentStart, start, self.position)));
                }
                Some(_) => {}
            }
        }
        match self.peek(1) {
            None if !self.effective_end() => Ok(None),
            None => {
                self.advance_one();
                Ok(Some(Token::simple(TokenType::Indicator('-'), start)))
            }
            Some(c) if c == ' ' || c == '\t' || c == '\n' => {
                self.advance_one();
                Ok(Some(Token::simple(TokenType::Indicator('-'), start)))
            }
            Some(_) => self.scan_plain(start),
        }
    }

    fn scan_dot(&mut self, start: Position) -> Result<Option<Token>> {
        if self.position.column == 1 && self.rest().starts_with("...") {
            match self.peek(3) {
                None if !self.effective_end() => return Ok(None),
                None => {
                    self.commit_bytes(3);
                    return Ok(Some(Token::new(TokenType::DocumentEnd, start, self.position)));
                }
                Some(c) if c == ' ' || c == '\t' || c == '\n' => {
                    self.commit_bytes(3);
                    return Ok(Some(Token::new(TokenType::DocumentEnd, start, self.position)));
                }
                Some(_) => {}
            }
        }
        self.scan_plain(start)
    }

    fn scan_directive(&mut self, start: Position) -> Result<Option<Token>> {
        if self.position.column != 1 {
            return Err(Error::scan(start, "directive must start at column 1"));
        }
        let rest = self.rest();
        let line_end = match rest.find('\n') {
            Some(idx) => idx,
            None => {
                if !self.effective_end() {
                    return Ok(None);
                }
                rest.len()
            }
        };
        let line = &rest[1..line_end];
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(Error::scan(start, "directive name expected after '%'"));
        };
        if name.starts_with('#') {
            return Err(Error::scan(start, "directive name expected after '%'"));
        }
        let name = name.to_string();
        let mut args = Vec::new();
        for word in words {
            if word.starts_with('#') {
                break;
            }
            args.push(word.to_string());
        }
        self.commit_bytes(line_end);
        Ok(Some(Token::new(
            TokenType::Directive(name, args),
            start,
            self.position,
        )))
    }

    fn scan_flow_open(&mut self, start: Position, ch: char) -> Result<Option<Token>> {
        if self.flow.len() >= FLOW_DEPTH_MAX {
            return Err(Error::limit_exceeded(format!(
                "flow collections nested deeper than {}",
                FLOW_DEPTH_MAX
            )));
        }
        self.flow.push(ch);
        self.advance_one();
        Ok(Some(Token::simple(TokenType::Indicator(ch), start)))
    }

    fn scan_flow_close(&mut self, start: Position, ch: char) -> Result<Option<Token>> {
        let expected = if ch == ']' { '[' } else { '{' };
        match self.flow.pop() {
            Some(open) if open == expected => {
                self.advance_one();
                Ok(Some(Token::simple(TokenType::Indicator(ch), start)))
            }
            Some(_) | None => Err(Error::scan(
                start,
                format!("unmatched flow collection close '{}'", ch),
            )),
        }
    }

    fn scan_maybe_indicator(&mut self, start: Position, ch: char) -> Result<Option<Token>> {
        if !self.flow.is_empty() {
            // flow context: the indicator always stands alone
            self.advance_one();
            return Ok(Some(Token::simple(TokenType::Indicator(ch), start)));
        }
        match self.peek(1) {
            None if !self.effective_end() => Ok(None),
            None => {
                self.advance_one();
                Ok(Some(Token::simple(TokenType::Indicator(ch), start)))
            }
            Some(c) if c == ' ' || c == '\t' || c == '\n' => {
                self.advance_one();
                Ok(Some(Token::simple(TokenType::Indicator(ch), start)))
            }
            Some(_) => self.scan_plain(start),
        }
    }

    /// Scan an anchor (`&name`) or alias (`*name`)
    fn scan_name(&mut self, start: Position, alias: bool) -> Result<Option<Token>> {
        let rest = self.rest();
        let body = &rest[1..];
        let mut end = None;
        for (idx, ch) in body.char_indices() {
            if ch.is_whitespace() || matches!(ch, ',' | '[' | ']' | '{' | '}') {
                end = Some(idx);
                break;
            }
        }
        let end = match end {
            Some(idx) => idx,
            None => {
                if !self.effective_end() {
                    return Ok(None);
                }
                body.len()
            }
        };
        if end == 0 {
            return Err(Error::scan(
                start,
                if alias {
                    "alias name expected after '*'"
                } else {
                    "anchor name expected after '&'"
                },
            ));
        }
        let name = body[..end].to_string();
        self.commit_bytes(1 + end);
        let token_type = if alias {
            TokenType::Alias(name)
        } else {
            TokenType::Anchor(name)
        };
        Ok(Some(Token::new(token_type, start, self.position)))
    }

    /// Scan a tag token (`!`, `!suffix`, `!!suffix`, `!h!suffix`, `!<verbatim>`)
    fn scan_tag(&mut self, start: Position) -> Result<Option<Token>> {
        let rest = self.rest();
        if rest[1..].starts_with('<') {
            let Some(close) = rest.find('>') else {
                if !self.effective_end() {
                    return Ok(None);
                }
                return Err(Error::scan(start, "unterminated verbatim tag"));
            };
            let text = rest[..=close].to_string();
            self.commit_bytes(close + 1);
            return Ok(Some(Token::new(TokenType::Tag(text), start, self.position)));
        }

        let mut end = None;
        for (idx, ch) in rest.char_indices().skip(1) {
            if ch.is_whitespace() || matches!(ch, ',' | '[' | ']' | '{' | '}') {
                end = Some(idx);
                break;
            }
        }
        let end = match end {
            Some(idx) => idx,
            None => {
                if !self.effective_end() {
                    return Ok(None);
                }
                rest.len()
            }
        };
        let text = rest[..end].to_string();
        self.commit_bytes(end);
        Ok(Some(Token::new(TokenType::Tag(text), start, self.position)))
    }

    fn scan_single_quoted(&mut self, start: Position) -> Result<Option<Token>> {
        let rest = self.rest();
        let body = &rest[1..];
        let bytes = body.as_bytes();
        let mut value = String::new();
        let mut i = 0;
        let close = loop {
            if i >= body.len() {
                if self.effective_end() {
                    return Err(Error::scan(start, "unterminated single-quoted scalar"));
                }
                return Ok(None);
            }
            if bytes[i] == b'\'' {
                // a quote at the end of the buffer could still be the
                // first half of a `''` escape
                if i + 1 >= body.len() && !self.effective_end() {
                    return Ok(None);
                }
                if bytes.get(i + 1) == Some(&b'\'') {
                    value.push('\'');
                    i += 2;
                    continue;
                }
                break i;
            }
            let ch = body[i..].chars().next().expect("in-bounds char");
            value.push(ch);
            i += ch.len_utf8();
        };
        self.tracker.check_string_length(&self.limits, value.len())?;
        self.commit_bytes(1 + close + 1);
        Ok(Some(Token::new(
            TokenType::Scalar(value, ScalarStyle::SingleQuoted),
            start,
            self.position,
        )))
    }

    fn scan_double_quoted(&mut self, start: Position) -> Result<Option<Token>> {
        let rest = self.rest();
        let body = &rest[1..];
        let bytes = body.as_bytes();
        let mut value = String::new();
        let mut i = 0;
        let close = loop {
            if i >= body.len() {
                if self.effective_end() {
                    return Err(Error::scan(start, "unterminated double-quoted scalar"));
                }
                return Ok(None);
            }
            match bytes[i] {
                b'"' => break i,
                b'\\' => match decode_escape(&body[i + 1..], self.position)? {
                    EscapeOutcome::Incomplete => {
                        if self.effective_end() {
                            return Err(Error::scan(start, "truncated escape sequence"));
                        }
                        return Ok(None);
                    }
                    EscapeOutcome::Decoded(ch, consumed) => {
                        value.push(ch);
                        i += 1 + consumed;
                    }
                },
                _ => {
                    let ch = body[i..].chars().next().expect("in-bounds char");
                    value.push(ch);
                    i += ch.len_utf8();
                }
            }
        };
        self.tracker.check_string_length(&self.limits, value.len())?;
        self.commit_bytes(1 + close + 1);
        Ok(Some(Token::new(
            TokenType::Scalar(value, ScalarStyle::DoubleQuoted),
            start,
            self.position,
        )))
    }

    fn scan_block_scalar(&mut self, start: Position, folded: bool) -> Result<Option<Token>> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let mut i = 1;
        let mut chomping = Chomping::Clip;
        let mut explicit = None;

        // Header: chomping indicator and explicit indent digit in either order.
        while i < bytes.len() {
            match bytes[i] {
                b'+' => chomping = Chomping::Keep,
                b'-' => chomping = Chomping::Strip,
                b'1'..=b'9' => explicit = Some((bytes[i] - b'0') as usize),
                _ => break,
            }
            i += 1;
        }

        // Rest of the header line: spaces and an optional comment only.
        let header_nl = match rest[i..].find('\n') {
            Some(idx) => i + idx,
            None => {
                if !self.effective_end() {
                    return Ok(None);
                }
                rest.len()
            }
        };
        let trailer = rest[i..header_nl].trim_start_matches([' ', '\t']);
        if !trailer.is_empty() && !trailer.starts_with('#') {
            return Err(Error::scan(
                start,
                "unexpected characters after block scalar header",
            ));
        }

        // Collect indented content lines until a line that steps outside.
        let min_indent = explicit.unwrap_or(1);
        let mut lines: Vec<&str> = Vec::new();
        let mut pos = (header_nl + 1).min(rest.len());
        let mut consumed = header_nl.min(rest.len());
        loop {
            if pos >= rest.len() {
                if !self.effective_end() {
                    return Ok(None);
                }
                consumed = rest.len();
                break;
            }
            let (line, next, complete) = match rest[pos..].find('\n') {
                Some(idx) => (&rest[pos..pos + idx], pos + idx + 1, true),
                None => (&rest[pos..], rest.len(), false),
            };
            if !complete && !self.effective_end() {
                // cannot yet judge whether this line belongs
                return Ok(None);
            }
            let blank = line.trim().is_empty();
            let indent = line.len() - line.trim_start_matches(' ').len();
            if !blank && indent < min_indent {
                break;
            }
            lines.push(line);
            consumed = if complete { next - 1 } else { next };
            pos = next;
            if !complete {
                break;
            }
        }

        let value = assemble_block_scalar(&lines, folded, chomping, explicit);
        self.tracker.check_string_length(&self.limits, value.len())?;
        self.commit_bytes(consumed);
        let style = if folded {
            ScalarStyle::Folded
        } else {
            ScalarStyle::Literal
        };
        Ok(Some(Token::new(
            TokenType::Scalar(value, style),
            start,
            self.position,
        )))
    }

    fn scan_plain(&mut self, start: Position) -> Result<Option<Token>> {
        let rest = self.rest();
        let in_flow = !self.flow.is_empty();
        let mut end = None;
        let mut prev = '\0';
        let mut iter = rest.char_indices().peekable();

        while let Some((idx, ch)) = iter.next() {
            if ch == '\n' {
                end = Some(idx);
                break;
            }
            if in_flow {
                if ch.is_whitespace() || matches!(ch, ',' | '[' | ']' | '{' | '}' | ':') {
                    end = Some(idx);
                    break;
                }
            } else {
                if ch == ':' {
                    match iter.peek() {
                        None => {
                            if !self.effective_end() {
                                return Ok(None);
                            }
                            end = Some(idx);
                            break;
                        }
                        Some((_, next)) if *next == ' ' || *next == '\t' || *next == '\n' => {
                            end = Some(idx);
                            break;
                        }
                        Some(_) => {}
                    }
                }
                if ch == '#' && (prev == ' ' || prev == '\t') {
                    end = Some(idx);
                    break;
                }
            }
            prev = ch;
        }

        let end = match end {
            Some(idx) => idx,
            None => {
                if !self.effective_end() {
                    return Ok(None);
                }
                rest.len()
            }
        };
        let raw = &rest[..end];
        let value = raw.trim_end_matches([' ', '\t']);
        self.tracker.check_string_length(&self.limits, value.len())?;
        let consumed = value.len();
        let value = value.to_string();
        self.commit_bytes(consumed);
        Ok(Some(Token::new(
            TokenType::Scalar(value, ScalarStyle::Plain),
            start,
            self.position,
        )))
    }

    fn effective_end(&self) -> bool {
        self.finished || self.sync_mode
    }

    fn rest(&self) -> &str {
        &self.buffer[self.cursor..]
    }

    fn peek(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn advance_one(&mut self) {
        if let Some(ch) = self.peek(0) {
            self.commit_bytes(ch.len_utf8());
        }
    }

    /// Consume `n` bytes, updating position and line-start tracking
    fn commit_bytes(&mut self, n: usize) {
        let end = self.cursor + n;
        for ch in self.buffer[self.cursor..end].chars() {
            self.position = self.position.advance(ch);
            if ch == '\n' {
                self.indent_ws = true;
            } else if ch != ' ' {
                self.indent_ws = false;
            }
        }
        self.cursor = end;
        if self.cursor > COMPACT_THRESHOLD {
            self.buffer.drain(..self.cursor);
            self.cursor = 0;
        }
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new()
    }
}
