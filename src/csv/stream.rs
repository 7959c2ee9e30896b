//! Incremental CSV tokenizer
//!
//! A byte-level state machine that accepts arbitrarily sized chunks and
//! delivers record/field events to a callback. Field content is kept as a
//! zero-copy window into the caller's chunk while possible and promoted to
//! an owned buffer whenever a field spans chunks or its decoded content
//! diverges from the raw bytes.

use crate::csv::field::FieldBuffer;
use crate::csv::{CsvOptions, EscapeMode};
use crate::{Error, Position, Result};

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Structural events delivered by a [`CsvStream`]
///
/// The bytes carried by a `Field` event borrow from the current chunk or
/// from the stream's internal buffer; the borrow ends when the callback
/// returns. Callers that need the bytes later must copy them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvEvent<'a> {
    /// A new record has started
    RecordBegin,
    /// A complete field, with its unescaped content
    Field(&'a [u8]),
    /// The current record has ended
    RecordEnd,
}

/// Parser states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    StartOfRecord,
    StartOfField,
    UnquotedField,
    QuotedField,
    QuoteInQuoted,
    EscapeInQuoted,
    Comment,
    End,
}

/// Byte-order-mark recognition progress at the start of the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BomState {
    /// Still within the first three bytes; payload = matched prefix length
    Pending(u8),
    /// Resolved (consumed or not present)
    Done,
}

/// A dialect-configurable streaming CSV tokenizer
///
/// Events are delivered in strict input order. Once an error occurs the
/// stream is stuck: every later call returns the same error without
/// emitting further events.
pub struct CsvStream<F>
where
    F: FnMut(CsvEvent<'_>) -> Result<()>,
{
    options: CsvOptions,
    callback: F,
    state: State,
    field: FieldBuffer,
    field_count: usize,
    row_count: usize,
    position: Position,
    total_bytes: usize,
    record_bytes: usize,
    /// A CR was consumed at a chunk boundary; a leading LF belongs to it
    skip_lf: bool,
    /// The pending CR must be completed by an LF (strict newline mode)
    strict_lf: bool,
    bom: BomState,
    error: Option<Error>,
    finished: bool,
}

impl<F> CsvStream<F>
where
    F: FnMut(CsvEvent<'_>) -> Result<()>,
{
    /// Create a new stream with the given options and event callback
    pub fn new(options: CsvOptions, callback: F) -> Self {
        let bom = if options.dialect.allow_bom {
            BomState::Pending(0)
        } else {
            BomState::Done
        };
        Self {
            options,
            callback,
            state: State::StartOfRecord,
            field: FieldBuffer::new(),
            field_count: 0,
            row_count: 0,
            position: Position::new(),
            total_bytes: 0,
            record_bytes: 0,
            skip_lf: false,
            strict_lf: false,
            bom,
            error: None,
            finished: false,
        }
    }

    /// Current position in the input
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Number of completed records (comment lines included)
    pub const fn row_count(&self) -> usize {
        self.row_count
    }

    /// Total bytes consumed so far
    pub const fn total_bytes(&self) -> usize {
        self.total_bytes
    }

    /// Feed one chunk of input
    pub fn process_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.finished {
            return Err(Error::state("process_chunk called after finish"));
        }
        match self.run_chunk(chunk) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Signal end of input, flushing any in-flight field and record
    pub fn finish(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        if self.finished {
            return Ok(());
        }
        match self.run_finish() {
            Ok(()) => {
                self.state = State::End;
                self.finished = true;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn run_chunk(&mut self, chunk: &[u8]) -> Result<()> {
        match self.bom {
            BomState::Done => self.scan(chunk),
            BomState::Pending(matched) => {
                let mut k = matched as usize;
                let mut i = 0;
                while k < 3 && i < chunk.len() && chunk[i] == UTF8_BOM[k] {
                    k += 1;
                    i += 1;
                }
                if k == 3 {
                    self.bom = BomState::Done;
                    self.count_total(3)?;
                    self.position.index += 3;
                    self.scan(&chunk[i..])
                } else if i == chunk.len() {
                    // the whole chunk is still a possible BOM prefix
                    self.bom = BomState::Pending(k as u8);
                    Ok(())
                } else {
                    // mismatch: the matched prefix was ordinary data
                    self.bom = BomState::Done;
                    self.scan(&UTF8_BOM[..k])?;
                    self.scan(&chunk[i..])
                }
            }
        }
    }

    fn scan(&mut self, chunk: &[u8]) -> Result<()> {
        let mut i = 0;

        if self.skip_lf {
            if chunk.is_empty() {
                return Ok(());
            }
            if chunk[0] == b'\n' {
                self.count_total(1)?;
                self.position.index = checked_add(self.position.index, 1)?;
                if self.state == State::QuotedField {
                    self.check_field_growth(1)?;
                    self.count_record(1)?;
                    self.field.push_byte(chunk, b'\n');
                }
                i = 1;
            } else if self.strict_lf {
                return Err(Error::parse(
                    self.position,
                    "carriage return not followed by line feed",
                ));
            }
            self.skip_lf = false;
            self.strict_lf = false;
        }

        while i < chunk.len() {
            match self.state {
                State::StartOfRecord => self.on_start_of_record(chunk, &mut i)?,
                State::StartOfField => self.on_start_of_field(chunk, &mut i)?,
                State::UnquotedField => self.on_unquoted_field(chunk, &mut i)?,
                State::QuotedField => self.on_quoted_field(chunk, &mut i)?,
                State::QuoteInQuoted => self.on_quote_in_quoted(chunk, &mut i)?,
                State::EscapeInQuoted => self.on_escape_in_quoted(chunk, &mut i)?,
                State::Comment => self.on_comment(chunk, &mut i)?,
                State::End => {
                    return Err(Error::state("input after end of stream"));
                }
            }
        }

        // The decisive byte has not arrived; the chunk backing any window
        // is about to go away.
        if matches!(
            self.state,
            State::UnquotedField
                | State::QuotedField
                | State::QuoteInQuoted
                | State::EscapeInQuoted
        ) {
            self.field.promote(chunk);
        }

        Ok(())
    }

    fn run_finish(&mut self) -> Result<()> {
        // a partial BOM match at end of input was ordinary data
        if let BomState::Pending(matched) = self.bom {
            self.bom = BomState::Done;
            if matched > 0 {
                self.scan(&UTF8_BOM[..matched as usize])?;
            }
        }
        if self.skip_lf && self.strict_lf {
            return Err(Error::parse(
                self.position,
                "carriage return not followed by line feed",
            ));
        }
        match self.state {
            State::StartOfRecord | State::End => Ok(()),
            State::Comment => {
                self.row_count += 1;
                Ok(())
            }
            State::StartOfField => {
                self.field.clear();
                self.emit_field(&[])?;
                self.end_record()
            }
            State::UnquotedField | State::QuoteInQuoted => {
                self.emit_field(&[])?;
                self.end_record()
            }
            State::QuotedField => Err(Error::parse(
                self.position,
                "unterminated quoted field at end of input",
            )),
            State::EscapeInQuoted => Err(Error::invalid_escape(
                self.position,
                "end of input after escape character",
            )),
        }
    }

    fn on_start_of_record(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let b = chunk[*i];
        if b == b'\r' || b == b'\n' {
            // empty line
            return self.consume_newline(chunk, i);
        }
        if self.options.dialect.allow_comments && b == self.options.dialect.comment_prefix {
            self.count_total(1)?;
            self.advance_col(1)?;
            *i += 1;
            self.state = State::Comment;
            return Ok(());
        }
        (self.callback)(CsvEvent::RecordBegin)?;
        self.field_count = 0;
        self.record_bytes = 0;
        self.state = State::StartOfField;
        Ok(())
    }

    fn on_start_of_field(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let b = chunk[*i];
        let dialect = self.options.dialect.clone();
        self.field.clear();
        if b == dialect.quote {
            self.count_total(1)?;
            self.count_record(1)?;
            self.advance_col(1)?;
            *i += 1;
            self.field.begin_window(*i);
            self.state = State::QuotedField;
        } else if b == dialect.delimiter {
            self.emit_field(chunk)?;
            self.count_total(1)?;
            self.count_record(1)?;
            self.advance_col(1)?;
            *i += 1;
        } else if b == b'\r' || b == b'\n' {
            self.emit_field(chunk)?;
            self.end_record()?;
            self.state = State::StartOfRecord;
            self.consume_newline(chunk, i)?;
        } else {
            self.field.begin_window(*i);
            self.state = State::UnquotedField;
        }
        Ok(())
    }

    fn on_unquoted_field(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let delimiter = self.options.dialect.delimiter;
        let quote = self.options.dialect.quote;

        // Bulk path: swallow the longest run without structural bytes.
        let rest = &chunk[*i..];
        let stop = rest
            .iter()
            .position(|&b| b == delimiter || b == quote || b == b'\r' || b == b'\n');
        let run = stop.unwrap_or(rest.len());
        if run > 0 {
            self.check_field_growth(run)?;
            self.count_total(run)?;
            self.count_record(run)?;
            self.field.extend(chunk, *i, run);
            self.advance_col(run)?;
            *i += run;
        }
        if stop.is_none() {
            return Ok(());
        }

        let b = chunk[*i];
        if b == delimiter {
            self.emit_field(chunk)?;
            self.count_total(1)?;
            self.count_record(1)?;
            self.advance_col(1)?;
            *i += 1;
            self.state = State::StartOfField;
        } else if b == quote {
            if self.options.dialect.allow_unquoted_quotes {
                self.check_field_growth(1)?;
                self.count_total(1)?;
                self.count_record(1)?;
                self.field.extend(chunk, *i, 1);
                self.advance_col(1)?;
                *i += 1;
            } else {
                return Err(Error::unexpected_quote(self.position));
            }
        } else {
            self.emit_field(chunk)?;
            self.end_record()?;
            self.state = State::StartOfRecord;
            self.consume_newline(chunk, i)?;
        }
        Ok(())
    }

    fn on_quoted_field(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let quote = self.options.dialect.quote;
        let backslash_mode = self.options.dialect.escape_mode == EscapeMode::Backslash;

        let rest = &chunk[*i..];
        let stop = rest.iter().position(|&b| {
            b == quote || (backslash_mode && b == b'\\') || b == b'\r' || b == b'\n'
        });
        let run = stop.unwrap_or(rest.len());
        if run > 0 {
            self.check_field_growth(run)?;
            self.count_total(run)?;
            self.count_record(run)?;
            self.field.extend(chunk, *i, run);
            self.advance_col(run)?;
            *i += run;
        }
        if stop.is_none() {
            return Ok(());
        }

        let b = chunk[*i];
        if b == quote {
            self.count_total(1)?;
            self.count_record(1)?;
            self.advance_col(1)?;
            *i += 1;
            self.state = State::QuoteInQuoted;
        } else if backslash_mode && b == b'\\' {
            self.count_total(1)?;
            self.count_record(1)?;
            self.advance_col(1)?;
            *i += 1;
            self.state = State::EscapeInQuoted;
        } else {
            // Newline bytes are field content inside quotes; only the
            // line accounting is normalized.
            self.check_field_growth(1)?;
            self.count_total(1)?;
            self.count_record(1)?;
            self.field.extend(chunk, *i, 1);
            self.advance_line()?;
            if b == b'\r' {
                *i += 1;
                if *i < chunk.len() {
                    if chunk[*i] == b'\n' {
                        self.check_field_growth(1)?;
                        self.count_total(1)?;
                        self.count_record(1)?;
                        self.field.extend(chunk, *i, 1);
                        self.position.index = checked_add(self.position.index, 1)?;
                        *i += 1;
                    }
                } else {
                    self.skip_lf = true;
                }
            } else {
                *i += 1;
            }
        }
        Ok(())
    }

    fn on_quote_in_quoted(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let b = chunk[*i];
        let quote = self.options.dialect.quote;
        if b == quote {
            // doubled quote: one literal quote byte
            self.check_field_growth(1)?;
            self.count_total(1)?;
            self.count_record(1)?;
            self.field.push_byte(chunk, quote);
            self.advance_col(1)?;
            *i += 1;
            self.state = State::QuotedField;
        } else if b == self.options.dialect.delimiter {
            self.emit_field(chunk)?;
            self.count_total(1)?;
            self.count_record(1)?;
            self.advance_col(1)?;
            *i += 1;
            self.state = State::StartOfField;
        } else if b == b'\r' || b == b'\n' {
            self.emit_field(chunk)?;
            self.end_record()?;
            self.state = State::StartOfRecord;
            self.consume_newline(chunk, i)?;
        } else {
            return Err(Error::parse(
                self.position,
                "quote must be followed by quote, delimiter, or newline",
            ));
        }
        Ok(())
    }

    fn on_escape_in_quoted(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let b = chunk[*i];
        let decoded = match b {
            b'n' => b'\n',
            b'r' => b'\r',
            b't' => b'\t',
            b'\\' => b'\\',
            b'"' => b'"',
            _ => {
                return Err(Error::invalid_escape(
                    self.position,
                    format!("\\{}", b as char),
                ));
            }
        };
        self.check_field_growth(1)?;
        self.count_total(1)?;
        self.count_record(1)?;
        self.field.push_byte(chunk, decoded);
        self.advance_col(1)?;
        *i += 1;
        self.state = State::QuotedField;
        Ok(())
    }

    fn on_comment(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let rest = &chunk[*i..];
        let stop = rest.iter().position(|&b| b == b'\r' || b == b'\n');
        let run = stop.unwrap_or(rest.len());
        if run > 0 {
            self.count_total(run)?;
            self.advance_col(run)?;
            *i += run;
        }
        if stop.is_some() {
            self.row_count += 1;
            self.state = State::StartOfRecord;
            self.consume_newline(chunk, i)?;
        }
        Ok(())
    }

    /// Consume a record/line terminator at `chunk[i]` (CR, LF, or CRLF)
    ///
    /// CRLF counts as a single line advance. A lone CR is accepted as a
    /// terminator only when the dialect allows lax newlines.
    fn consume_newline(&mut self, chunk: &[u8], i: &mut usize) -> Result<()> {
        let b = chunk[*i];
        self.count_total(1)?;
        self.advance_line()?;
        *i += 1;
        if b == b'\r' {
            if *i < chunk.len() {
                if chunk[*i] == b'\n' {
                    self.count_total(1)?;
                    self.position.index = checked_add(self.position.index, 1)?;
                    *i += 1;
                } else if !self.options.dialect.allow_unquoted_newlines {
                    return Err(Error::parse(
                        self.position,
                        "carriage return not followed by line feed",
                    ));
                }
            } else {
                self.skip_lf = true;
                self.strict_lf = !self.options.dialect.allow_unquoted_newlines;
            }
        }
        Ok(())
    }

    fn emit_field(&mut self, chunk: &[u8]) -> Result<()> {
        self.field_count += 1;
        if self.field_count > self.options.max_cols {
            return Err(Error::too_many_columns(self.position, self.options.max_cols));
        }
        (self.callback)(CsvEvent::Field(self.field.bytes(chunk)))?;
        self.field.clear();
        Ok(())
    }

    fn end_record(&mut self) -> Result<()> {
        (self.callback)(CsvEvent::RecordEnd)?;
        self.row_count += 1;
        Ok(())
    }

    fn check_field_growth(&self, add: usize) -> Result<()> {
        let max = self.options.max_field_bytes;
        if self.field.len().saturating_add(add) > max {
            return Err(Error::limit_exceeded(format!(
                "field exceeds maximum of {} bytes",
                max
            )));
        }
        Ok(())
    }

    fn count_total(&mut self, n: usize) -> Result<()> {
        self.total_bytes = checked_add(self.total_bytes, n)?;
        if self.total_bytes > self.options.max_total_bytes {
            return Err(Error::limit_exceeded(format!(
                "input exceeds maximum of {} bytes",
                self.options.max_total_bytes
            )));
        }
        Ok(())
    }

    fn count_record(&mut self, n: usize) -> Result<()> {
        self.record_bytes = checked_add(self.record_bytes, n)?;
        if self.record_bytes > self.options.max_record_bytes {
            return Err(Error::limit_exceeded(format!(
                "record exceeds maximum of {} bytes",
                self.options.max_record_bytes
            )));
        }
        Ok(())
    }

    fn advance_col(&mut self, n: usize) -> Result<()> {
        self.position.column = checked_add(self.position.column, n)?;
        self.position.index = checked_add(self.position.index, n)?;
        Ok(())
    }

    fn advance_line(&mut self) -> Result<()> {
        self.position.line = checked_add(self.position.line, 1)?;
        self.position.column = 1;
        self.position.index = checked_add(self.position.index, 1)?;
        Ok(())
    }
}

fn checked_add(value: usize, add: usize) -> Result<usize> {
    value
        .checked_add(add)
        .ok_or_else(|| Error::limit_exceeded("position counter overflow"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv::Dialect;

    /// Collect all events as owned data for easy assertions
    fn run(options: CsvOptions, chunks: &[&[u8]]) -> Result<Vec<String>> {
        let mut events = Vec::new();
        let mut stream = CsvStream::new(options, |event| {
            events.push(match event {
                CsvEvent::RecordBegin => "BEGIN".to_string(),
                CsvEvent::Field(bytes) => {
                    format!("FIELD({})", String::from_utf8_lossy(bytes))
                }
                CsvEvent::RecordEnd => "END".to_string(),
            });
            Ok(())
        });
        for chunk in chunks {
            stream.process_chunk(chunk)?;
        }
        stream.finish()?;
        drop(stream);
        Ok(events)
    }

    #[test]
    fn test_simple_record() {
        let events = run(CsvOptions::default(), &[b"a,b,c\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(a)", "FIELD(b)", "FIELD(c)", "END"]
        );
    }

    #[test]
    fn test_crlf_and_empty_field() {
        let events = run(CsvOptions::default(), &[b"a,,b\r\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(a)", "FIELD()", "FIELD(b)", "END"]
        );
    }

    #[test]
    fn test_quoted_field_with_delimiter() {
        let events = run(CsvOptions::default(), &[b"\"a,b\",c\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a,b)", "FIELD(c)", "END"]);
    }

    #[test]
    fn test_doubled_quote() {
        let events = run(CsvOptions::default(), &[b"\"he\"\"llo\",world\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(he\"llo)", "FIELD(world)", "END"]
        );
    }

    #[test]
    fn test_doubled_quote_across_chunks() {
        let events = run(CsvOptions::default(), &[b"\"he\"", b"\"llo\",world\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(he\"llo)", "FIELD(world)", "END"]
        );
    }

    #[test]
    fn test_closing_quote_at_chunk_end() {
        let events = run(CsvOptions::default(), &[b"\"ab\"", b",c\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(ab)", "FIELD(c)", "END"]);
    }

    #[test]
    fn test_unquoted_field_across_chunks() {
        let events = run(CsvOptions::default(), &[b"hel", b"lo,x\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(hello)", "FIELD(x)", "END"]);
    }

    #[test]
    fn test_crlf_across_chunks() {
        let events = run(CsvOptions::default(), &[b"a\r", b"\nb\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(a)", "END", "BEGIN", "FIELD(b)", "END"]
        );
    }

    #[test]
    fn test_final_record_without_newline() {
        let events = run(CsvOptions::default(), &[b"a,b"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a)", "FIELD(b)", "END"]);
    }

    #[test]
    fn test_trailing_delimiter_yields_empty_field() {
        let events = run(CsvOptions::default(), &[b"a,\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a)", "FIELD()", "END"]);
    }

    #[test]
    fn test_empty_lines_skipped() {
        let events = run(CsvOptions::default(), &[b"a\n\n\nb\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(a)", "END", "BEGIN", "FIELD(b)", "END"]
        );
    }

    #[test]
    fn test_comments() {
        let mut options = CsvOptions::default();
        options.dialect.allow_comments = true;
        let events = run(options, &[b"# note\na\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a)", "END"]);
    }

    #[test]
    fn test_comment_prefix_mid_record_is_data() {
        let mut options = CsvOptions::default();
        options.dialect.allow_comments = true;
        let events = run(options, &[b"a,# not a comment\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(a)", "FIELD(# not a comment)", "END"]
        );
    }

    #[test]
    fn test_unexpected_quote() {
        let err = run(CsvOptions::default(), &[b"ab\"c\n"]).unwrap_err();
        assert!(matches!(err, Error::UnexpectedQuote { .. }));
    }

    #[test]
    fn test_allow_unquoted_quotes() {
        let mut options = CsvOptions::default();
        options.dialect.allow_unquoted_quotes = true;
        let events = run(options, &[b"ab\"c\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(ab\"c)", "END"]);
    }

    #[test]
    fn test_backslash_escapes() {
        let mut options = CsvOptions::default();
        options.dialect.escape_mode = EscapeMode::Backslash;
        let events = run(options, &[b"\"a\\nb\\\\c\\\"d\"\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a\nb\\c\"d)", "END"]);
    }

    #[test]
    fn test_invalid_backslash_escape() {
        let mut options = CsvOptions::default();
        options.dialect.escape_mode = EscapeMode::Backslash;
        let err = run(options, &[b"\"a\\qb\"\n"]).unwrap_err();
        assert!(matches!(err, Error::InvalidEscape { .. }));
    }

    #[test]
    fn test_max_field_bytes() {
        let mut options = CsvOptions::default();
        options.max_field_bytes = 4;

        // exactly at the cap: fine
        let events = run(options.clone(), &[b"abcd\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(abcd)", "END"]);

        // one over: limit error, no field event
        let mut fields = 0usize;
        let mut stream = CsvStream::new(options, |event| {
            if matches!(event, CsvEvent::Field(_)) {
                fields += 1;
            }
            Ok(())
        });
        let err = stream.process_chunk(b"abcde,").unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { .. }));
        drop(stream);
        assert_eq!(fields, 0);
    }

    #[test]
    fn test_max_cols() {
        let mut options = CsvOptions::default();
        options.max_cols = 2;
        let err = run(options, &[b"a,b,c\n"]).unwrap_err();
        assert!(matches!(err, Error::TooManyColumns { limit: 2, .. }));
    }

    #[test]
    fn test_max_total_bytes() {
        let mut options = CsvOptions::default();
        options.max_total_bytes = 4;
        let err = run(options, &[b"abcdef\n"]).unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { .. }));
    }

    #[test]
    fn test_sticky_error() {
        let mut options = CsvOptions::default();
        options.max_cols = 1;
        let mut stream = CsvStream::new(options, |_| Ok(()));
        let err = stream.process_chunk(b"a,b\n").unwrap_err();
        let again = stream.process_chunk(b"c\n").unwrap_err();
        assert_eq!(err, again);
        let finish = stream.finish().unwrap_err();
        assert_eq!(err, finish);
    }

    #[test]
    fn test_callback_error_aborts() {
        let mut stream = CsvStream::new(CsvOptions::default(), |event| {
            if matches!(event, CsvEvent::Field(_)) {
                Err(Error::config("stop"))
            } else {
                Ok(())
            }
        });
        assert!(stream.process_chunk(b"a,b\n").is_err());
        assert!(stream.process_chunk(b"c\n").is_err());
    }

    #[test]
    fn test_unterminated_quote() {
        let err = run(CsvOptions::default(), &[b"\"abc"]).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_quote_then_eof_closes_record() {
        let events = run(CsvOptions::default(), &[b"\"abc\""]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(abc)", "END"]);
    }

    #[test]
    fn test_newline_inside_quoted_field() {
        let events = run(CsvOptions::default(), &[b"\"a\r\nb\",c\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a\r\nb)", "FIELD(c)", "END"]);
    }

    #[test]
    fn test_bare_cr_rejected_by_default() {
        let err = run(CsvOptions::default(), &[b"a\rb\n"]).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_bare_cr_as_lax_terminator() {
        let mut options = CsvOptions::default();
        options.dialect.allow_unquoted_newlines = true;
        let events = run(options, &[b"a\rb\n"]).unwrap();
        assert_eq!(
            events,
            vec!["BEGIN", "FIELD(a)", "END", "BEGIN", "FIELD(b)", "END"]
        );
    }

    #[test]
    fn test_bom_skipped() {
        let events = run(CsvOptions::default(), &[b"\xEF\xBB\xBFa,b\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a)", "FIELD(b)", "END"]);
    }

    #[test]
    fn test_bom_split_across_chunks() {
        let events =
            run(CsvOptions::default(), &[b"\xEF", b"\xBB", b"\xBF", b"a\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a)", "END"]);
    }

    #[test]
    fn test_bom_prefix_mismatch_is_data() {
        let events = run(CsvOptions::default(), &[b"\xEF", b"a\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(\u{fffd}a)", "END"]);
    }

    #[test]
    fn test_partial_bom_flushed_at_finish() {
        let events = run(CsvOptions::default(), &[b"\xEF\xBB"]).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], "BEGIN");
        assert_eq!(events[2], "END");
    }

    #[test]
    fn test_zero_copy_window_points_into_chunk() {
        let chunk: &[u8] = b"hello,world\n";
        let range = chunk.as_ptr_range();
        let mut in_situ = 0usize;
        let mut stream = CsvStream::new(CsvOptions::default(), |event| {
            if let CsvEvent::Field(bytes) = event {
                if range.contains(&bytes.as_ptr()) {
                    in_situ += 1;
                }
            }
            Ok(())
        });
        stream.process_chunk(chunk).unwrap();
        stream.finish().unwrap();
        drop(stream);
        assert_eq!(in_situ, 2);
    }

    #[test]
    fn test_row_count() {
        let mut stream = CsvStream::new(CsvOptions::default(), |_| Ok(()));
        stream.process_chunk(b"a\nb\nc").unwrap();
        stream.finish().unwrap();
        assert_eq!(stream.row_count(), 3);
    }

    #[test]
    fn test_custom_dialect() {
        let mut options = CsvOptions::default();
        options.dialect = Dialect::with_delimiter(b';');
        let events = run(options, &[b"a;b\n"]).unwrap();
        assert_eq!(events, vec!["BEGIN", "FIELD(a)", "FIELD(b)", "END"]);
    }
}
