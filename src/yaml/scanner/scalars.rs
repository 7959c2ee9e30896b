//! Scalar scanning helpers: escapes, block scalar folding and chomping

use crate::{Error, Position, Result};

/// Chomping behavior selected by a block scalar header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Chomping {
    /// Single trailing newline (the default)
    Clip,
    /// No trailing newlines (`-`)
    Strip,
    /// All trailing newlines (`+`)
    Keep,
}

/// Outcome of decoding one escape sequence after a backslash
pub(super) enum EscapeOutcome {
    /// Decoded character plus the number of input bytes consumed
    Decoded(char, usize),
    /// Not enough input to finish the sequence
    Incomplete,
}

/// Decode the escape sequence starting right after a backslash
///
/// `input` begins at the escape character. Multi-digit forms (`\xHH`,
/// `\uNNNN`, `\UNNNNNNNN`) may report [`EscapeOutcome::Incomplete`] when
/// the digits have not all arrived yet.
pub(super) fn decode_escape(input: &str, position: Position) -> Result<EscapeOutcome> {
    let mut chars = input.chars();
    let Some(ch) = chars.next() else {
        return Ok(EscapeOutcome::Incomplete);
    };

    let simple = match ch {
        '0' => Some('\0'),
        'a' => Some('\x07'),
        'b' => Some('\x08'),
        't' | '\t' => Some('\t'),
        'n' => Some('\n'),
        'v' => Some('\x0B'),
        'f' => Some('\x0C'),
        'r' => Some('\r'),
        'e' => Some('\x1B'),
        ' ' => Some(' '),
        '"' => Some('"'),
        '/' => Some('/'),
        '\\' => Some('\\'),
        'N' => Some('\u{85}'),
        '_' => Some('\u{A0}'),
        'L' => Some('\u{2028}'),
        'P' => Some('\u{2029}'),
        _ => None,
    };
    if let Some(decoded) = simple {
        return Ok(EscapeOutcome::Decoded(decoded, ch.len_utf8()));
    }

    let digits = match ch {
        'x' => 2,
        'u' => 4,
        'U' => 8,
        _ => {
            return Err(Error::scan(
                position,
                format!("invalid escape sequence: \\{}", ch),
            ));
        }
    };

    // Validate before slicing: the body is arbitrary decoded text, so a
    // multibyte char could straddle the `digits` byte boundary.
    let hex = &input[1..];
    let mut seen = 0;
    for digit in hex.chars().take(digits) {
        if !digit.is_ascii_hexdigit() {
            return Err(Error::scan(
                position,
                format!("invalid \\{} escape: expected {} hex digits", ch, digits),
            ));
        }
        seen += 1;
    }
    if seen < digits {
        // every char so far is a hex digit; the rest may still arrive
        return Ok(EscapeOutcome::Incomplete);
    }

    let hex = &hex[..digits];
    let value = u32::from_str_radix(hex, 16).expect("validated hex digits");
    let decoded = char::from_u32(value).ok_or_else(|| {
        Error::scan(position, format!("escape \\{}{} is not a valid character", ch, hex))
    })?;
    Ok(EscapeOutcome::Decoded(decoded, 1 + digits))
}

/// Check whether a character may start a plain scalar
pub(super) fn can_start_plain(ch: char) -> bool {
    !matches!(
        ch,
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
            | '@' | '`'
    )
}

/// Assemble block scalar content from its collected lines
///
/// `lines` are the raw content lines without their trailing newlines,
/// including blank lines. The minimum indentation across non-blank lines
/// (or the explicit indent, when given) is stripped; folded scalars join
/// single line breaks with spaces while keeping blank-line separators.
pub(super) fn assemble_block_scalar(
    lines: &[&str],
    folded: bool,
    chomping: Chomping,
    explicit_indent: Option<usize>,
) -> String {
    let indent = explicit_indent.unwrap_or_else(|| {
        lines
            .iter()
            .filter(|line| !line.trim().is_empty())
            .map(|line| line.len() - line.trim_start_matches(' ').len())
            .min()
            .unwrap_or(0)
    });

    let stripped: Vec<&str> = lines
        .iter()
        .map(|line| {
            if line.len() >= indent {
                &line[indent..]
            } else {
                line.trim_start_matches(' ')
            }
        })
        .collect();

    let mut body = String::new();
    if folded {
        let mut pending_blanks = 0usize;
        let mut first = true;
        for line in &stripped {
            if line.trim().is_empty() {
                pending_blanks += 1;
                continue;
            }
            if first {
                first = false;
            } else if pending_blanks > 0 {
                for _ in 0..pending_blanks {
                    body.push('\n');
                }
            } else {
                body.push(' ');
            }
            pending_blanks = 0;
            body.push_str(line);
        }
        // trailing blank lines participate in chomping, not folding
        for _ in 0..pending_blanks {
            body.push('\n');
        }
    } else {
        body = stripped.join("\n");
    }

    match chomping {
        Chomping::Strip => {
            while body.ends_with('\n') {
                body.pop();
            }
        }
        Chomping::Clip => {
            while body.ends_with('\n') {
                body.pop();
            }
            if !body.is_empty() {
                body.push('\n');
            }
        }
        Chomping::Keep => {
            if !folded {
                body.push('\n');
            } else if !body.ends_with('\n') {
                body.push('\n');
            }
        }
    }
    body
}
