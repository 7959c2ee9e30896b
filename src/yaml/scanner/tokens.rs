//! YAML token definitions

use crate::Position;
use std::fmt;

/// Presentation style of a scalar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    /// No quotes (plain scalar)
    Plain,
    /// Single quotes ('string')
    SingleQuoted,
    /// Double quotes ("string")
    DoubleQuoted,
    /// Literal block scalar (|)
    Literal,
    /// Folded block scalar (>)
    Folded,
}

/// Represents a YAML token with position information
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The type of token
    pub token_type: TokenType,
    /// Start position of the token
    pub start_position: Position,
    /// End position of the token
    pub end_position: Position,
}

/// Types of YAML tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenType {
    /// A single structural character (`-`, `?`, `:`, `,`, `[`, `]`, `{`, `}`)
    Indicator(char),
    /// Scalar value with its presentation style
    Scalar(String, ScalarStyle),
    /// Anchor declaration (&name)
    Anchor(String),
    /// Alias reference (*name)
    Alias(String),
    /// Tag annotation (!tag, !!tag, !h!tag or !<verbatim>)
    Tag(String),
    /// Directive line (%NAME ARG1 ARG2)
    Directive(String, Vec<String>),
    /// Document start marker (---)
    DocumentStart,
    /// Document end marker (...)
    DocumentEnd,
    /// End of stream
    StreamEnd,
}

impl Token {
    /// Create a new token
    pub const fn new(
        token_type: TokenType,
        start_position: Position,
        end_position: Position,
    ) -> Self {
        Self {
            token_type,
            start_position,
            end_position,
        }
    }

    /// Create a token spanning a single position
    pub const fn simple(token_type: TokenType, position: Position) -> Self {
        Self::new(token_type, position, position)
    }

    /// Get the token type
    pub const fn token_type(&self) -> &TokenType {
        &self.token_type
    }

    /// Get the start position
    pub const fn start_position(&self) -> Position {
        self.start_position
    }

    /// Get the end position
    pub const fn end_position(&self) -> Position {
        self.end_position
    }

    /// Check if this is a scalar token
    pub const fn is_scalar(&self) -> bool {
        matches!(self.token_type, TokenType::Scalar(_, _))
    }

    /// Get scalar value if this is a scalar token
    pub fn as_scalar(&self) -> Option<&str> {
        match &self.token_type {
            TokenType::Scalar(s, _) => Some(s),
            _ => None,
        }
    }

    /// Check if this is a document boundary token
    pub const fn is_document_boundary(&self) -> bool {
        matches!(
            self.token_type,
            TokenType::DocumentStart | TokenType::DocumentEnd
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.token_type {
            TokenType::Indicator(c) => write!(f, "INDICATOR({})", c),
            TokenType::Scalar(s, style) => write!(f, "SCALAR({}, {:?})", s, style),
            TokenType::Anchor(name) => write!(f, "ANCHOR({})", name),
            TokenType::Alias(name) => write!(f, "ALIAS({})", name),
            TokenType::Tag(tag) => write!(f, "TAG({})", tag),
            TokenType::Directive(name, args) => {
                write!(f, "DIRECTIVE({}, {})", name, args.join(" "))
            }
            TokenType::DocumentStart => write!(f, "DOCUMENT-START"),
            TokenType::DocumentEnd => write!(f, "DOCUMENT-END"),
            TokenType::StreamEnd => write!(f, "STREAM-END"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_creation() {
        let pos1 = Position::at(1, 1, 0);
        let pos2 = Position::at(1, 5, 4);

        let token = Token::new(
            TokenType::Scalar("hello".to_string(), ScalarStyle::Plain),
            pos1,
            pos2,
        );

        assert_eq!(token.start_position(), pos1);
        assert_eq!(token.end_position(), pos2);
        assert!(token.is_scalar());
        assert_eq!(token.as_scalar(), Some("hello"));
    }

    #[test]
    fn test_token_type_checks() {
        let doc_start = Token::simple(TokenType::DocumentStart, Position::start());
        assert!(doc_start.is_document_boundary());
        assert!(!doc_start.is_scalar());

        let indicator = Token::simple(TokenType::Indicator('['), Position::start());
        assert!(!indicator.is_document_boundary());
    }

    #[test]
    fn test_token_display() {
        let scalar = Token::simple(
            TokenType::Scalar("hello".to_string(), ScalarStyle::Plain),
            Position::start(),
        );
        assert_eq!(format!("{}", scalar), "SCALAR(hello, Plain)");

        let anchor = Token::simple(TokenType::Anchor("x".to_string()), Position::start());
        assert_eq!(format!("{}", anchor), "ANCHOR(x)");
    }
}
