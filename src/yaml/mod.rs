//! Streaming YAML parser and document model
//!
//! The YAML pipeline is a three-layer stack: a restartable scanner
//! classifies decoded bytes into tokens, a parser turns tokens into
//! events (attaching anchors and tags, opening and closing documents),
//! and a composer materializes documents into a node arena, resolving
//! aliases, tag handles, and implicit types per the selected schema.
//!
//! Whole-buffer parsing goes through [`parse`] / [`parse_all`]:
//!
//! ```
//! use textstream::yaml::{parse, ParseOptions};
//!
//! let doc = parse(b"name: demo\nports: [80, 443]\n", &ParseOptions::default()).unwrap();
//! let root = doc.root().unwrap();
//! assert_eq!(doc.as_str(doc.mapping_get(root, "name").unwrap()), Some("demo"));
//! let ports = doc.mapping_get(root, "ports").unwrap();
//! assert_eq!(doc.as_int(doc.sequence_get(ports, 0).unwrap()), Some(80));
//! ```
//!
//! Incremental consumers use [`YamlStream`] (push callbacks) or
//! [`EventReader`] (pull).

mod composer;
mod document;
mod encoding;
mod json;
pub mod parser;
mod reader;
mod schema;
pub mod scanner;
mod tag;

pub use document::{
    Document, MappingKind, Node, NodeId, ScalarKind, ScalarNode, SequenceKind,
};
pub use encoding::Encoding;
pub use parser::{Event, EventType, Parser};
pub use reader::EventReader;
pub use scanner::{ScalarStyle, Scanner, Token, TokenType};
pub use schema::Schema;
pub use tag::TagResolver;

use crate::{Error, Limits, Position, Result};
use composer::Composer;

/// What to do when a mapping contains two equal keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeyPolicy {
    /// Reject the document
    #[default]
    Error,
    /// Keep the first pair, drop later ones
    FirstWins,
    /// Keep the last pair, drop earlier ones
    LastWins,
}

/// Options for document parsing
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Implicit typing schema for untagged scalars
    pub schema: Schema,
    /// Duplicate mapping key policy
    pub duplicate_keys: DuplicateKeyPolicy,
    /// Resource limits
    pub limits: Limits,
    /// Accept `<<` as an ordinary mapping key (no merging is performed)
    pub allow_merge_keys: bool,
    /// Route syntactically-JSON input through the JSON fast path
    pub json_fast_path: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            schema: Schema::Core,
            duplicate_keys: DuplicateKeyPolicy::Error,
            limits: Limits::default(),
            allow_merge_keys: false,
            json_fast_path: true,
        }
    }
}

/// Parse a single document from a complete input buffer
///
/// Empty input yields a document with a null root. More than one
/// document in the input is an error; use [`parse_all`] for
/// multi-document streams.
pub fn parse(input: &[u8], options: &ParseOptions) -> Result<Document> {
    if options.json_fast_path {
        if let Some(result) = json::try_fast_path(input, options) {
            return result;
        }
    }

    let mut composer = Composer::new(options.clone());
    composer.set_sync_mode(true);
    composer.feed(input)?;
    composer.finish()?;

    let Some(doc) = composer.compose_document()? else {
        let mut doc = Document::new();
        let root = doc.new_null();
        doc.set_root(root);
        return Ok(doc);
    };
    if composer.compose_document()?.is_some() {
        return Err(Error::parse(
            Position::new(),
            "expected a single document, found several",
        ));
    }
    Ok(doc)
}

/// Parse every document from a complete input buffer
pub fn parse_all(input: &[u8], options: &ParseOptions) -> Result<Vec<Document>> {
    let mut composer = Composer::new(options.clone());
    composer.set_sync_mode(true);
    composer.feed(input)?;
    composer.finish()?;

    let mut documents = Vec::new();
    while let Some(doc) = composer.compose_document()? {
        documents.push(doc);
    }
    Ok(documents)
}

/// Push-mode streaming parser delivering events to a callback
///
/// Events are delivered in strict input order. A callback error, like
/// any parse error, leaves the stream stuck: every later call returns
/// the same error without delivering further events.
pub struct YamlStream<F>
where
    F: FnMut(&Event) -> Result<()>,
{
    parser: Parser,
    callback: F,
    error: Option<Error>,
}

impl<F> YamlStream<F>
where
    F: FnMut(&Event) -> Result<()>,
{
    /// Create a stream with default limits
    pub fn new(callback: F) -> Self {
        Self::with_limits(Limits::default(), callback)
    }

    /// Create a stream with custom limits
    pub fn with_limits(limits: Limits, callback: F) -> Self {
        Self {
            parser: Parser::with_limits(limits),
            callback,
            error: None,
        }
    }

    /// Resolve lookahead eagerly on every feed
    pub fn set_sync_mode(&mut self, sync: bool) {
        self.parser.set_sync_mode(sync);
    }

    /// Current position in the input
    pub fn position(&self) -> Position {
        self.parser.position()
    }

    /// Feed a chunk of input, delivering every event it completes
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.parser.feed(bytes).and_then(|()| self.drain()) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Signal end of input, delivering all remaining events
    pub fn finish(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.parser.finish().and_then(|()| self.drain()) {
            Ok(()) => Ok(()),
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn drain(&mut self) -> Result<()> {
        while let Some(event) = self.parser.next_event()? {
            (self.callback)(&event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scalar() {
        let doc = parse(b"42\n", &ParseOptions::default()).unwrap();
        assert_eq!(doc.as_int(doc.root().unwrap()), Some(42));
    }

    #[test]
    fn test_parse_empty_input() {
        let doc = parse(b"", &ParseOptions::default()).unwrap();
        assert!(doc.is_null(doc.root().unwrap()));
    }

    #[test]
    fn test_parse_rejects_multiple_documents() {
        let err = parse(b"---\na\n---\nb\n", &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_parse_all_multiple_documents() {
        let docs = parse_all(b"---\nfoo\n...\n---\nbar\n", &ParseOptions::default()).unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].as_str(docs[0].root().unwrap()), Some("foo"));
        assert_eq!(docs[1].as_str(docs[1].root().unwrap()), Some("bar"));
    }

    #[test]
    fn test_stream_collects_events() {
        let mut kinds = Vec::new();
        let mut stream = YamlStream::new(|event: &Event| {
            kinds.push(format!("{}", event));
            Ok(())
        });
        stream.feed(b"a: 1\n").unwrap();
        stream.finish().unwrap();
        drop(stream);
        assert!(kinds.iter().any(|k| k.contains("SCALAR(a")));
        assert!(kinds.iter().any(|k| k.contains("STREAM-END")));
    }

    #[test]
    fn test_stream_sticky_callback_error() {
        let mut stream = YamlStream::new(|event: &Event| {
            if matches!(event.event_type, EventType::Scalar { .. }) {
                Err(Error::config("stop"))
            } else {
                Ok(())
            }
        });
        let err = stream.feed(b"a: 1\n").unwrap_err();
        let again = stream.feed(b"b: 2\n").unwrap_err();
        assert_eq!(err, again);
    }

    #[test]
    fn test_json_fast_path_equivalence() {
        let input = br#"{"a":[1,2],"b":true}"#;
        let fast = parse(input, &ParseOptions::default()).unwrap();
        let mut options = ParseOptions::default();
        options.json_fast_path = false;
        let slow = parse(input, &options).unwrap();

        for doc in [&fast, &slow] {
            let root = doc.root().unwrap();
            assert_eq!(doc.mapping_len(root), Some(2));
            let a = doc.mapping_get(root, "a").unwrap();
            assert_eq!(doc.sequence_len(a), Some(2));
            assert_eq!(doc.as_int(doc.sequence_get(a, 0).unwrap()), Some(1));
            assert_eq!(doc.as_int(doc.sequence_get(a, 1).unwrap()), Some(2));
            assert_eq!(doc.as_bool(doc.mapping_get(root, "b").unwrap()), Some(true));
            let keys: Vec<_> = doc
                .mapping_iter(root)
                .map(|(k, _)| doc.as_str(k).unwrap().to_string())
                .collect();
            assert_eq!(keys, vec!["a", "b"]);
        }
    }
}
