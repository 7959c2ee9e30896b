//! CSV dialect configuration

/// How quote characters are escaped inside quoted fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeMode {
    /// A literal quote is written as two adjacent quotes (`""`)
    DoubledQuote,
    /// Backslash escapes (`\n`, `\r`, `\t`, `\\`, `\"`)
    Backslash,
}

/// Parameter bag describing one CSV flavor
///
/// A dialect is immutable for the lifetime of a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialect {
    /// Field separator byte
    pub delimiter: u8,
    /// Quote byte
    pub quote: u8,
    /// Escape handling inside quoted fields
    pub escape_mode: EscapeMode,
    /// Byte that starts a comment line
    pub comment_prefix: u8,
    /// Whether comment lines are recognized at the start of a record
    pub allow_comments: bool,
    /// Whether a quote byte may appear inside an unquoted field
    pub allow_unquoted_quotes: bool,
    /// Whether newline bytes may appear inside an unquoted field
    pub allow_unquoted_newlines: bool,
    /// Whether a UTF-8 byte order mark is skipped at the start of input
    pub allow_bom: bool,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            delimiter: b',',
            quote: b'"',
            escape_mode: EscapeMode::DoubledQuote,
            comment_prefix: b'#',
            allow_comments: false,
            allow_unquoted_quotes: false,
            allow_unquoted_newlines: false,
            allow_bom: true,
        }
    }
}

impl Dialect {
    /// Create the default comma/double-quote dialect
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a dialect with a custom delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self {
            delimiter,
            ..Self::default()
        }
    }

    /// Check whether a byte is structural for this dialect
    pub fn is_structural(&self, byte: u8) -> bool {
        byte == self.delimiter || byte == self.quote || byte == b'\r' || byte == b'\n'
    }
}

/// Options for a CSV stream: dialect plus enforceable caps
///
/// All caps default to `usize::MAX`, meaning unlimited.
#[derive(Debug, Clone)]
pub struct CsvOptions {
    /// The dialect to parse with
    pub dialect: Dialect,
    /// Maximum bytes in a single field
    pub max_field_bytes: usize,
    /// Maximum bytes in a single record
    pub max_record_bytes: usize,
    /// Maximum number of columns in a record
    pub max_cols: usize,
    /// Maximum total bytes consumed by the stream
    pub max_total_bytes: usize,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            max_field_bytes: usize::MAX,
            max_record_bytes: usize::MAX,
            max_cols: usize::MAX,
            max_total_bytes: usize::MAX,
        }
    }
}

impl CsvOptions {
    /// Create options with the default dialect and no caps
    pub fn new() -> Self {
        Self::default()
    }

    /// Create options with the given dialect and no caps
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }
}
