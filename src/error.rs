//! Error types shared by the CSV and YAML pipelines

use crate::Position;
use std::fmt;

/// Result type alias for parsing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Context information for error reporting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// The problematic line content
    pub line_content: String,
    /// Position within the line where the error occurred
    pub column_position: usize,
    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

impl ErrorContext {
    /// Create a new error context
    pub const fn new(line_content: String, column_position: usize) -> Self {
        Self {
            line_content,
            column_position,
            suggestion: None,
        }
    }

    /// Add a suggestion for fixing the error
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    /// Create error context from input text and position
    pub fn from_input(input: &str, position: &Position) -> Self {
        let line_content = input
            .lines()
            .nth(position.line.saturating_sub(1))
            .map_or_else(|| "<EOF>".to_string(), ToString::to_string);

        Self {
            line_content,
            column_position: position.column,
            suggestion: None,
        }
    }
}

/// Comprehensive error type for CSV and YAML processing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Parsing errors with position information
    Parse {
        /// Position where error occurred
        position: Position,
        /// Error message
        message: String,
        /// Additional context for better error reporting
        context: Option<ErrorContext>,
    },

    /// Scanning errors during tokenization
    Scan {
        /// Position where error occurred
        position: Position,
        /// Error message
        message: String,
        /// Additional context for better error reporting
        context: Option<ErrorContext>,
    },

    /// Construction errors when building documents
    Construction {
        /// Position where error occurred
        position: Position,
        /// Error message
        message: String,
        /// Additional context for better error reporting
        context: Option<ErrorContext>,
    },

    /// A quote character appeared where the dialect forbids it
    UnexpectedQuote {
        /// Position where the quote was found
        position: Position,
    },

    /// An invalid escape sequence was found
    InvalidEscape {
        /// Position where the escape started
        position: Position,
        /// Error message
        message: String,
    },

    /// A record contained more columns than the configured cap
    TooManyColumns {
        /// Position of the offending field
        position: Position,
        /// The configured column cap
        limit: usize,
    },

    /// A mapping contained two equal keys under the error policy
    DuplicateKey {
        /// Position of the mapping
        position: Position,
        /// Rendering of the duplicated key
        key: String,
    },

    /// Resource limit exceeded
    LimitExceeded {
        /// Error message describing which limit was exceeded
        message: String,
    },

    /// Operation attempted in the wrong lifecycle phase
    State {
        /// Error message
        message: String,
    },

    /// Input could not be decoded from its detected encoding
    Encoding {
        /// Error message
        message: String,
    },

    /// UTF-8 encoding errors
    Utf8 {
        /// Error message
        message: String,
    },

    /// IO errors (simplified for clonability)
    Io {
        /// Error kind
        kind: std::io::ErrorKind,
        /// Error message
        message: String,
    },

    /// Configuration errors
    Config {
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a new parse error
    pub fn parse(position: Position, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
            context: None,
        }
    }

    /// Create a new parse error with context
    pub fn parse_with_context(
        position: Position,
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::Parse {
            position,
            message: message.into(),
            context: Some(context),
        }
    }

    /// Create a new scan error
    pub fn scan(position: Position, message: impl Into<String>) -> Self {
        Self::Scan {
            position,
            message: message.into(),
            context: None,
        }
    }

    /// Create a new scan error with context
    pub fn scan_with_context(
        position: Position,
        message: impl Into<String>,
        context: ErrorContext,
    ) -> Self {
        Self::Scan {
            position,
            message: message.into(),
            context: Some(context),
        }
    }

    /// Create a new construction error
    pub fn construction(position: Position, message: impl Into<String>) -> Self {
        Self::Construction {
            position,
            message: message.into(),
            context: None,
        }
    }

    /// Create a new unexpected-quote error
    pub const fn unexpected_quote(position: Position) -> Self {
        Self::UnexpectedQuote { position }
    }

    /// Create a new invalid-escape error
    pub fn invalid_escape(position: Position, message: impl Into<String>) -> Self {
        Self::InvalidEscape {
            position,
            message: message.into(),
        }
    }

    /// Create a new too-many-columns error
    pub const fn too_many_columns(position: Position, limit: usize) -> Self {
        Self::TooManyColumns { position, limit }
    }

    /// Create a new duplicate-key error
    pub fn duplicate_key(position: Position, key: impl Into<String>) -> Self {
        Self::DuplicateKey {
            position,
            key: key.into(),
        }
    }

    /// Create a new limit exceeded error
    pub fn limit_exceeded(message: impl Into<String>) -> Self {
        Self::LimitExceeded {
            message: message.into(),
        }
    }

    /// Create a new lifecycle-state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create a new encoding error
    pub fn encoding(message: impl Into<String>) -> Self {
        Self::Encoding {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Get the position associated with this error, if any
    pub const fn position(&self) -> Option<&Position> {
        match self {
            Self::Parse { position, .. }
            | Self::Scan { position, .. }
            | Self::Construction { position, .. }
            | Self::UnexpectedQuote { position }
            | Self::InvalidEscape { position, .. }
            | Self::TooManyColumns { position, .. }
            | Self::DuplicateKey { position, .. } => Some(position),
            Self::LimitExceeded { .. }
            | Self::State { .. }
            | Self::Encoding { .. }
            | Self::Utf8 { .. }
            | Self::Io { .. }
            | Self::Config { .. } => None,
        }
    }

    /// Get the context associated with this error, if any
    pub const fn context(&self) -> Option<&ErrorContext> {
        match self {
            Self::Parse { context, .. }
            | Self::Scan { context, .. }
            | Self::Construction { context, .. } => context.as_ref(),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<std::str::Utf8Error> for Error {
    fn from(err: std::str::Utf8Error) -> Self {
        Self::Utf8 {
            message: err.to_string(),
        }
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::Utf8 {
            message: err.to_string(),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Format error with enhanced context display
    fn format_with_context(
        &self,
        f: &mut fmt::Formatter<'_>,
        position: &Position,
        message: &str,
        context: Option<&ErrorContext>,
    ) -> fmt::Result {
        write!(
            f,
            "Error at line {}, column {}: {}",
            position.line, position.column, message
        )?;

        if let Some(ctx) = context {
            writeln!(f)?;
            writeln!(f, "{:4} | {}", position.line, ctx.line_content)?;
            write!(f, "     | ")?;
            for _ in 0..ctx.column_position.saturating_sub(1) {
                write!(f, " ")?;
            }
            write!(f, "^ here")?;

            if let Some(suggestion) = &ctx.suggestion {
                writeln!(f)?;
                write!(f, "Suggestion: {}", suggestion)?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse {
                position,
                message,
                context,
            } => self.format_with_context(f, position, message, context.as_ref()),
            Self::Scan {
                position,
                message,
                context,
            } => self.format_with_context(
                f,
                position,
                &format!("Scan error: {}", message),
                context.as_ref(),
            ),
            Self::Construction {
                position,
                message,
                context,
            } => self.format_with_context(
                f,
                position,
                &format!("Construction error: {}", message),
                context.as_ref(),
            ),
            Self::UnexpectedQuote { position } => self.format_with_context(
                f,
                position,
                "unexpected quote in unquoted field",
                None,
            ),
            Self::InvalidEscape { position, message } => self.format_with_context(
                f,
                position,
                &format!("Invalid escape: {}", message),
                None,
            ),
            Self::TooManyColumns { position, limit } => self.format_with_context(
                f,
                position,
                &format!("record exceeds maximum of {} columns", limit),
                None,
            ),
            Self::DuplicateKey { position, key } => self.format_with_context(
                f,
                position,
                &format!("duplicate mapping key '{}'", key),
                None,
            ),
            Self::LimitExceeded { message } => {
                write!(f, "Resource limit exceeded: {}", message)
            }
            Self::State { message } => {
                write!(f, "State error: {}", message)
            }
            Self::Encoding { message } => {
                write!(f, "Encoding error: {}", message)
            }
            Self::Utf8 { message } => {
                write!(f, "UTF-8 error: {}", message)
            }
            Self::Io { kind, message } => {
                write!(f, "IO error ({:?}): {}", kind, message)
            }
            Self::Config { message } => {
                write!(f, "Configuration error: {}", message)
            }
        }
    }
}
