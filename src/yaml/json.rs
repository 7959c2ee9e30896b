//! JSON fast path into the document model
//!
//! Inputs whose first significant byte opens a JSON collection are handed
//! to serde_json and mapped straight into a [`Document`], skipping the
//! scanner and composer. Any JSON failure falls back to the full YAML
//! pipeline, so the fast path is indistinguishable from the slow path for
//! inputs it accepts. Duplicate object keys go through the same policy as
//! the composer.

use crate::yaml::composer::apply_duplicate_key_policy;
use crate::yaml::document::{Document, MappingKind, Node, NodeId, ScalarKind, ScalarNode, SequenceKind};
use crate::yaml::scanner::ScalarStyle;
use crate::yaml::ParseOptions;
use crate::{Position, Result};
use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use std::fmt;

/// Attempt the fast path; `None` means "use the full pipeline"
pub(crate) fn try_fast_path(input: &[u8], options: &ParseOptions) -> Option<Result<Document>> {
    let text = std::str::from_utf8(input).ok()?;
    let trimmed = text.trim_start_matches([' ', '\t', '\r', '\n']);
    if !(trimmed.starts_with('{') || trimmed.starts_with('[')) {
        return None;
    }

    let mut doc = Document::new();
    let mut deserializer = serde_json::Deserializer::from_str(text);
    let seed = JsonNode {
        doc: &mut doc,
        options,
    };
    let root = seed.deserialize(&mut deserializer).ok()?;
    deserializer.end().ok()?;
    doc.set_root(root);
    Some(Ok(doc))
}

/// Builds one node (and its subtree) into the target document
struct JsonNode<'a> {
    doc: &'a mut Document,
    options: &'a ParseOptions,
}

impl<'a> JsonNode<'a> {
    fn reborrow(&mut self) -> JsonNode<'_> {
        JsonNode {
            doc: &mut *self.doc,
            options: self.options,
        }
    }

    fn scalar(&mut self, value: String, style: ScalarStyle, kind: ScalarKind) -> NodeId {
        self.doc.push(Node::Scalar(ScalarNode {
            value,
            style,
            tag: None,
            anchor: None,
            kind,
        }))
    }
}

impl<'de, 'a> DeserializeSeed<'de> for JsonNode<'a> {
    type Value = NodeId;

    fn deserialize<D>(self, deserializer: D) -> std::result::Result<NodeId, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de, 'a> Visitor<'de> for JsonNode<'a> {
    type Value = NodeId;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a JSON value")
    }

    fn visit_bool<E>(mut self, value: bool) -> std::result::Result<NodeId, E>
    where
        E: de::Error,
    {
        Ok(self.scalar(
            value.to_string(),
            ScalarStyle::Plain,
            ScalarKind::Bool(value),
        ))
    }

    fn visit_i64<E>(mut self, value: i64) -> std::result::Result<NodeId, E>
    where
        E: de::Error,
    {
        Ok(self.scalar(value.to_string(), ScalarStyle::Plain, ScalarKind::Int(value)))
    }

    fn visit_u64<E>(mut self, value: u64) -> std::result::Result<NodeId, E>
    where
        E: de::Error,
    {
        let kind = i64::try_from(value)
            .map(ScalarKind::Int)
            .unwrap_or(ScalarKind::Float(value as f64));
        Ok(self.scalar(value.to_string(), ScalarStyle::Plain, kind))
    }

    fn visit_f64<E>(mut self, value: f64) -> std::result::Result<NodeId, E>
    where
        E: de::Error,
    {
        Ok(self.scalar(
            value.to_string(),
            ScalarStyle::Plain,
            ScalarKind::Float(value),
        ))
    }

    fn visit_str<E>(mut self, value: &str) -> std::result::Result<NodeId, E>
    where
        E: de::Error,
    {
        Ok(self.scalar(
            value.to_string(),
            ScalarStyle::DoubleQuoted,
            ScalarKind::Str,
        ))
    }

    fn visit_unit<E>(mut self) -> std::result::Result<NodeId, E>
    where
        E: de::Error,
    {
        Ok(self.scalar("null".to_string(), ScalarStyle::Plain, ScalarKind::Null))
    }

    fn visit_seq<A>(mut self, mut access: A) -> std::result::Result<NodeId, A::Error>
    where
        A: SeqAccess<'de>,
    {
        let mut items = Vec::new();
        while let Some(item) = access.next_element_seed(self.reborrow())? {
            items.push(item);
        }
        Ok(self.doc.push(Node::Sequence {
            items,
            tag: None,
            anchor: None,
            kind: SequenceKind::Sequence,
        }))
    }

    fn visit_map<A>(mut self, mut access: A) -> std::result::Result<NodeId, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut pairs = Vec::new();
        while let Some(key) = access.next_key_seed(self.reborrow())? {
            let value = access.next_value_seed(self.reborrow())?;
            pairs.push((key, value));
        }
        let pairs = apply_duplicate_key_policy(
            self.doc,
            pairs,
            self.options.duplicate_keys,
            Position::new(),
        )
        .map_err(|err| <A::Error as de::Error>::custom(err.to_string()))?;
        Ok(self.doc.push(Node::Mapping {
            pairs,
            tag: None,
            anchor: None,
            kind: MappingKind::Mapping,
        }))
    }
}
