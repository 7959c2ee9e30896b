//! YAML document model
//!
//! A document owns every node in a typed index arena: nodes refer to each
//! other by [`NodeId`], alias targets are filled in by the resolution
//! pass, and dropping the document frees the whole tree at once. Ids are
//! only meaningful for the document that created them.

use crate::yaml::scanner::ScalarStyle;
use crate::{Error, Result};
use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;

/// Handle to a node inside its owning [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// Runtime type of a scalar node
#[derive(Debug, Clone, PartialEq)]
pub enum ScalarKind {
    /// String (the default before resolution)
    Str,
    /// Null
    Null,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Float(f64),
    /// Timestamp (`!!timestamp`)
    Timestamp(DateTime<FixedOffset>),
    /// Binary blob (`!!binary`)
    Binary(Vec<u8>),
}

/// A scalar node's content and metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarNode {
    /// The scalar text as written (after escape processing)
    pub value: String,
    /// Presentation style in the source
    pub style: ScalarStyle,
    /// Resolved tag URI, when tagged
    pub tag: Option<String>,
    /// Anchor name, when anchored
    pub anchor: Option<String>,
    /// Resolved runtime type
    pub kind: ScalarKind,
}

/// Distinct sequence flavors sharing the same storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceKind {
    /// Plain sequence
    Sequence,
    /// Ordered mapping (`!!omap`)
    Omap,
    /// Key-value pair list (`!!pairs`)
    Pairs,
}

/// Distinct mapping flavors sharing the same storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    /// Plain mapping
    Mapping,
    /// Unordered set (`!!set`)
    Set,
}

/// A node in the document tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Scalar leaf
    Scalar(ScalarNode),
    /// Sequence of child nodes
    Sequence {
        /// Child nodes in order
        items: Vec<NodeId>,
        /// Resolved tag URI, when tagged
        tag: Option<String>,
        /// Anchor name, when anchored
        anchor: Option<String>,
        /// Sequence flavor
        kind: SequenceKind,
    },
    /// Mapping of key-value pairs in document order
    Mapping {
        /// Key-value pairs in order
        pairs: Vec<(NodeId, NodeId)>,
        /// Resolved tag URI, when tagged
        tag: Option<String>,
        /// Anchor name, when anchored
        anchor: Option<String>,
        /// Mapping flavor
        kind: MappingKind,
    },
    /// Reference to an anchored node
    Alias {
        /// The referenced anchor name
        name: String,
        /// The referenced node, filled by the resolution pass
        target: Option<NodeId>,
    },
}

/// A parsed YAML document owning its node arena
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    root: Option<NodeId>,
    anchors: IndexMap<String, NodeId>,
}

impl Document {
    /// Create an empty document
    pub fn new() -> Self {
        Self::default()
    }

    /// The root node, if the document has content
    pub const fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub(crate) fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    /// Number of nodes in the arena
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the document holds no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Append a node to the arena
    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Borrow a node
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Register an anchor; a second registration of the same name fails
    pub(crate) fn register_anchor(&mut self, name: String, id: NodeId) -> Result<()> {
        if self.anchors.contains_key(&name) {
            return Err(Error::construction(
                crate::Position::new(),
                format!("anchor '{}' is already defined", name),
            ));
        }
        self.anchors.insert(name, id);
        Ok(())
    }

    /// Look up an anchor by name
    pub fn anchor(&self, name: &str) -> Option<NodeId> {
        self.anchors.get(name).copied()
    }

    /// Iterate over registered anchors in definition order
    pub fn anchors(&self) -> impl Iterator<Item = (&str, NodeId)> {
        self.anchors.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Follow alias links to the underlying node
    ///
    /// Returns the input id unchanged for non-alias nodes; unresolved or
    /// cyclic aliases resolve to the last reachable node.
    pub fn resolve(&self, id: NodeId) -> NodeId {
        let mut current = id;
        for _ in 0..self.nodes.len() {
            match self.node(current) {
                Node::Alias {
                    target: Some(target),
                    ..
                } => current = *target,
                _ => return current,
            }
        }
        current
    }

    // --- scalar accessors -------------------------------------------------

    fn scalar(&self, id: NodeId) -> Option<&ScalarNode> {
        match self.node(self.resolve(id)) {
            Node::Scalar(scalar) => Some(scalar),
            _ => None,
        }
    }

    /// The scalar text, for scalar nodes
    pub fn as_str(&self, id: NodeId) -> Option<&str> {
        self.scalar(id).map(|s| s.value.as_str())
    }

    /// The boolean value, for `!!bool`-typed scalars
    pub fn as_bool(&self, id: NodeId) -> Option<bool> {
        match self.scalar(id)?.kind {
            ScalarKind::Bool(b) => Some(b),
            _ => None,
        }
    }

    /// The integer value, for `!!int`-typed scalars
    pub fn as_int(&self, id: NodeId) -> Option<i64> {
        match self.scalar(id)?.kind {
            ScalarKind::Int(i) => Some(i),
            _ => None,
        }
    }

    /// The float value, for `!!float`-typed scalars
    pub fn as_float(&self, id: NodeId) -> Option<f64> {
        match self.scalar(id)?.kind {
            ScalarKind::Float(f) => Some(f),
            ScalarKind::Int(i) => Some(i as f64),
            _ => None,
        }
    }

    /// The timestamp value, for `!!timestamp`-typed scalars
    pub fn as_timestamp(&self, id: NodeId) -> Option<DateTime<FixedOffset>> {
        match self.scalar(id)?.kind {
            ScalarKind::Timestamp(ts) => Some(ts),
            _ => None,
        }
    }

    /// The decoded bytes, for `!!binary`-typed scalars
    pub fn as_binary(&self, id: NodeId) -> Option<&[u8]> {
        match &self.scalar(id)?.kind {
            ScalarKind::Binary(bytes) => Some(bytes.as_slice()),
            _ => None,
        }
    }

    /// Whether the node is a null scalar
    pub fn is_null(&self, id: NodeId) -> bool {
        matches!(
            self.scalar(id),
            Some(ScalarNode {
                kind: ScalarKind::Null,
                ..
            })
        )
    }

    // --- sequence accessors -----------------------------------------------

    /// Number of items, for sequence nodes
    pub fn sequence_len(&self, id: NodeId) -> Option<usize> {
        match self.node(self.resolve(id)) {
            Node::Sequence { items, .. } => Some(items.len()),
            _ => None,
        }
    }

    /// Child at `index`, for sequence nodes
    pub fn sequence_get(&self, id: NodeId, index: usize) -> Option<NodeId> {
        match self.node(self.resolve(id)) {
            Node::Sequence { items, .. } => items.get(index).copied(),
            _ => None,
        }
    }

    /// Iterate a sequence's children
    pub fn sequence_iter(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let items: &[NodeId] = match self.node(self.resolve(id)) {
            Node::Sequence { items, .. } => items,
            _ => &[],
        };
        items.iter().copied()
    }

    // --- mapping accessors ------------------------------------------------

    /// Number of pairs, for mapping nodes
    pub fn mapping_len(&self, id: NodeId) -> Option<usize> {
        match self.node(self.resolve(id)) {
            Node::Mapping { pairs, .. } => Some(pairs.len()),
            _ => None,
        }
    }

    /// Value for a scalar key, for mapping nodes
    pub fn mapping_get(&self, id: NodeId, key: &str) -> Option<NodeId> {
        match self.node(self.resolve(id)) {
            Node::Mapping { pairs, .. } => pairs
                .iter()
                .find(|(k, _)| self.as_str(*k) == Some(key))
                .map(|(_, v)| *v),
            _ => None,
        }
    }

    /// Key-value pair at `index`, for mapping nodes
    pub fn mapping_get_at(&self, id: NodeId, index: usize) -> Option<(NodeId, NodeId)> {
        match self.node(self.resolve(id)) {
            Node::Mapping { pairs, .. } => pairs.get(index).copied(),
            _ => None,
        }
    }

    /// Iterate a mapping's pairs in document order
    pub fn mapping_iter(&self, id: NodeId) -> impl Iterator<Item = (NodeId, NodeId)> + '_ {
        let pairs: &[(NodeId, NodeId)] = match self.node(self.resolve(id)) {
            Node::Mapping { pairs, .. } => pairs,
            _ => &[],
        };
        pairs.iter().copied()
    }

    /// Whether the mapping contains a scalar key
    pub fn mapping_contains_key(&self, id: NodeId, key: &str) -> bool {
        self.mapping_get(id, key).is_some()
    }

    // --- construction and manipulation -------------------------------------

    /// Create a new string scalar node
    pub fn new_scalar(&mut self, value: impl Into<String>) -> NodeId {
        let value = value.into();
        self.push(Node::Scalar(ScalarNode {
            value,
            style: ScalarStyle::Plain,
            tag: None,
            anchor: None,
            kind: ScalarKind::Str,
        }))
    }

    /// Create a new null scalar node
    pub fn new_null(&mut self) -> NodeId {
        self.push(Node::Scalar(ScalarNode {
            value: String::new(),
            style: ScalarStyle::Plain,
            tag: None,
            anchor: None,
            kind: ScalarKind::Null,
        }))
    }

    /// Create a new boolean scalar node
    pub fn new_bool(&mut self, value: bool) -> NodeId {
        self.push(Node::Scalar(ScalarNode {
            value: value.to_string(),
            style: ScalarStyle::Plain,
            tag: None,
            anchor: None,
            kind: ScalarKind::Bool(value),
        }))
    }

    /// Create a new integer scalar node
    pub fn new_int(&mut self, value: i64) -> NodeId {
        self.push(Node::Scalar(ScalarNode {
            value: value.to_string(),
            style: ScalarStyle::Plain,
            tag: None,
            anchor: None,
            kind: ScalarKind::Int(value),
        }))
    }

    /// Create a new float scalar node
    pub fn new_float(&mut self, value: f64) -> NodeId {
        self.push(Node::Scalar(ScalarNode {
            value: value.to_string(),
            style: ScalarStyle::Plain,
            tag: None,
            anchor: None,
            kind: ScalarKind::Float(value),
        }))
    }

    /// Create a new empty sequence node
    pub fn new_sequence(&mut self) -> NodeId {
        self.push(Node::Sequence {
            items: Vec::new(),
            tag: None,
            anchor: None,
            kind: SequenceKind::Sequence,
        })
    }

    /// Create a new empty mapping node
    pub fn new_mapping(&mut self) -> NodeId {
        self.push(Node::Mapping {
            pairs: Vec::new(),
            tag: None,
            anchor: None,
            kind: MappingKind::Mapping,
        })
    }

    /// Create a new empty set node (mapping storage, `!!set` kind)
    pub fn new_set(&mut self) -> NodeId {
        self.push(Node::Mapping {
            pairs: Vec::new(),
            tag: Some(crate::yaml::tag::core::SET.to_string()),
            anchor: None,
            kind: MappingKind::Set,
        })
    }

    /// Create a new empty ordered-mapping node (sequence storage, `!!omap` kind)
    pub fn new_omap(&mut self) -> NodeId {
        self.push(Node::Sequence {
            items: Vec::new(),
            tag: Some(crate::yaml::tag::core::OMAP.to_string()),
            anchor: None,
            kind: SequenceKind::Omap,
        })
    }

    /// Create a new empty pair-list node (sequence storage, `!!pairs` kind)
    pub fn new_pairs(&mut self) -> NodeId {
        self.push(Node::Sequence {
            items: Vec::new(),
            tag: Some(crate::yaml::tag::core::PAIRS.to_string()),
            anchor: None,
            kind: SequenceKind::Pairs,
        })
    }

    /// Append an item to a sequence
    pub fn sequence_push(&mut self, seq: NodeId, item: NodeId) -> Result<()> {
        let seq = self.resolve(seq);
        match self.node_mut(seq) {
            Node::Sequence { items, .. } => {
                items.push(item);
                Ok(())
            }
            _ => Err(Error::state("node is not a sequence")),
        }
    }

    /// Insert an item into a sequence at `index`
    pub fn sequence_insert(&mut self, seq: NodeId, index: usize, item: NodeId) -> Result<()> {
        let seq = self.resolve(seq);
        match self.node_mut(seq) {
            Node::Sequence { items, .. } => {
                if index > items.len() {
                    return Err(Error::state("sequence index out of bounds"));
                }
                items.insert(index, item);
                Ok(())
            }
            _ => Err(Error::state("node is not a sequence")),
        }
    }

    /// Remove and return the item at `index` from a sequence
    pub fn sequence_remove(&mut self, seq: NodeId, index: usize) -> Result<NodeId> {
        let seq = self.resolve(seq);
        match self.node_mut(seq) {
            Node::Sequence { items, .. } => {
                if index >= items.len() {
                    return Err(Error::state("sequence index out of bounds"));
                }
                Ok(items.remove(index))
            }
            _ => Err(Error::state("node is not a sequence")),
        }
    }

    /// Set a key-value pair, replacing the value of a deep-equal key
    pub fn mapping_set(&mut self, map: NodeId, key: NodeId, value: NodeId) -> Result<()> {
        let map = self.resolve(map);
        let existing = match self.node(map) {
            Node::Mapping { pairs, .. } => pairs
                .iter()
                .position(|(k, _)| self.deep_equal(*k, key)),
            _ => return Err(Error::state("node is not a mapping")),
        };
        match self.node_mut(map) {
            Node::Mapping { pairs, .. } => {
                if let Some(index) = existing {
                    pairs[index].1 = value;
                } else {
                    pairs.push((key, value));
                }
                Ok(())
            }
            _ => unreachable!("checked above"),
        }
    }

    /// Remove a scalar key; returns whether a pair was removed
    pub fn mapping_remove(&mut self, map: NodeId, key: &str) -> Result<bool> {
        let map = self.resolve(map);
        let index = match self.node(map) {
            Node::Mapping { pairs, .. } => pairs
                .iter()
                .position(|(k, _)| self.as_str(*k) == Some(key)),
            _ => return Err(Error::state("node is not a mapping")),
        };
        match self.node_mut(map) {
            Node::Mapping { pairs, .. } => Ok(match index {
                Some(i) => {
                    pairs.remove(i);
                    true
                }
                None => false,
            }),
            _ => unreachable!("checked above"),
        }
    }

    /// Deep-copy a subtree, returning the new root's id
    pub fn clone_node(&mut self, id: NodeId) -> NodeId {
        match self.node(id).clone() {
            Node::Scalar(scalar) => self.push(Node::Scalar(ScalarNode {
                anchor: None,
                ..scalar
            })),
            Node::Sequence {
                items, tag, kind, ..
            } => {
                let items = items.iter().map(|item| self.clone_node(*item)).collect();
                self.push(Node::Sequence {
                    items,
                    tag,
                    anchor: None,
                    kind,
                })
            }
            Node::Mapping {
                pairs, tag, kind, ..
            } => {
                let pairs = pairs
                    .iter()
                    .map(|(k, v)| (self.clone_node(*k), self.clone_node(*v)))
                    .collect();
                self.push(Node::Mapping {
                    pairs,
                    tag,
                    anchor: None,
                    kind,
                })
            }
            Node::Alias { name, target } => self.push(Node::Alias { name, target }),
        }
    }

    /// Structural equality with aliases dereferenced
    pub fn deep_equal(&self, a: NodeId, b: NodeId) -> bool {
        let a = self.deref_for_compare(a);
        let b = self.deref_for_compare(b);
        if a == b {
            return true;
        }
        match (self.node(a), self.node(b)) {
            (Node::Scalar(left), Node::Scalar(right)) => left.value == right.value,
            (
                Node::Sequence { items: left, .. },
                Node::Sequence { items: right, .. },
            ) => {
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right.iter())
                        .all(|(l, r)| self.deep_equal(*l, *r))
            }
            (
                Node::Mapping { pairs: left, .. },
                Node::Mapping { pairs: right, .. },
            ) => {
                left.len() == right.len()
                    && left.iter().zip(right.iter()).all(|((lk, lv), (rk, rv))| {
                        self.deep_equal(*lk, *rk) && self.deep_equal(*lv, *rv)
                    })
            }
            (
                Node::Alias { name: left, .. },
                Node::Alias { name: right, .. },
            ) => left == right,
            _ => false,
        }
    }

    /// Follow an alias through its target or the anchor registry
    fn deref_for_compare(&self, id: NodeId) -> NodeId {
        let mut current = id;
        for _ in 0..self.nodes.len() {
            match self.node(current) {
                Node::Alias {
                    target: Some(target),
                    ..
                } => current = *target,
                Node::Alias { name, target: None } => match self.anchors.get(name) {
                    Some(registered) => current = *registered,
                    None => return current,
                },
                _ => return current,
            }
        }
        current
    }

    /// Number of nodes in the subtree rooted at `id` (aliases count as one)
    pub(crate) fn subtree_size(&self, id: NodeId) -> usize {
        match self.node(id) {
            Node::Scalar(_) | Node::Alias { .. } => 1,
            Node::Sequence { items, .. } => {
                1 + items
                    .iter()
                    .map(|item| self.subtree_size(*item))
                    .sum::<usize>()
            }
            Node::Mapping { pairs, .. } => {
                1 + pairs
                    .iter()
                    .map(|(k, v)| self.subtree_size(*k) + self.subtree_size(*v))
                    .sum::<usize>()
            }
        }
    }

    /// Render a node briefly for error messages
    pub(crate) fn render_brief(&self, id: NodeId) -> String {
        match self.node(self.resolve(id)) {
            Node::Scalar(scalar) => scalar.value.clone(),
            Node::Sequence { .. } => "<sequence>".to_string(),
            Node::Mapping { .. } => "<mapping>".to_string(),
            Node::Alias { name, .. } => format!("*{}", name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_access() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let one = doc.new_int(1);
        let two = doc.new_int(2);
        doc.sequence_push(seq, one).unwrap();
        doc.sequence_push(seq, two).unwrap();
        doc.set_root(seq);

        assert_eq!(doc.sequence_len(seq), Some(2));
        assert_eq!(doc.as_int(doc.sequence_get(seq, 0).unwrap()), Some(1));
        assert_eq!(doc.as_int(doc.sequence_get(seq, 1).unwrap()), Some(2));
    }

    #[test]
    fn test_mapping_operations() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        let key = doc.new_scalar("name");
        let value = doc.new_scalar("alice");
        doc.mapping_set(map, key, value).unwrap();

        assert_eq!(doc.mapping_len(map), Some(1));
        assert!(doc.mapping_contains_key(map, "name"));
        let got = doc.mapping_get(map, "name").unwrap();
        assert_eq!(doc.as_str(got), Some("alice"));

        // setting an equal key replaces the value
        let key2 = doc.new_scalar("name");
        let value2 = doc.new_scalar("bob");
        doc.mapping_set(map, key2, value2).unwrap();
        assert_eq!(doc.mapping_len(map), Some(1));
        assert_eq!(doc.as_str(doc.mapping_get(map, "name").unwrap()), Some("bob"));

        assert!(doc.mapping_remove(map, "name").unwrap());
        assert_eq!(doc.mapping_len(map), Some(0));
    }

    #[test]
    fn test_sequence_insert_remove() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        let a = doc.new_scalar("a");
        let c = doc.new_scalar("c");
        doc.sequence_push(seq, a).unwrap();
        doc.sequence_push(seq, c).unwrap();
        let b = doc.new_scalar("b");
        doc.sequence_insert(seq, 1, b).unwrap();

        let values: Vec<_> = doc
            .sequence_iter(seq)
            .map(|id| doc.as_str(id).unwrap().to_string())
            .collect();
        assert_eq!(values, vec!["a", "b", "c"]);

        doc.sequence_remove(seq, 0).unwrap();
        assert_eq!(doc.sequence_len(seq), Some(2));
        assert!(doc.sequence_remove(seq, 5).is_err());
    }

    #[test]
    fn test_alias_resolution() {
        let mut doc = Document::new();
        let target = doc.new_scalar("shared");
        doc.register_anchor("x".to_string(), target).unwrap();
        let alias = doc.push(Node::Alias {
            name: "x".to_string(),
            target: Some(target),
        });

        assert_eq!(doc.resolve(alias), target);
        assert_eq!(doc.as_str(alias), Some("shared"));
    }

    #[test]
    fn test_duplicate_anchor_rejected() {
        let mut doc = Document::new();
        let a = doc.new_scalar("a");
        let b = doc.new_scalar("b");
        doc.register_anchor("x".to_string(), a).unwrap();
        assert!(doc.register_anchor("x".to_string(), b).is_err());
    }

    #[test]
    fn test_deep_equal() {
        let mut doc = Document::new();
        let seq1 = doc.new_sequence();
        let seq2 = doc.new_sequence();
        for seq in [seq1, seq2] {
            let x = doc.new_scalar("x");
            doc.sequence_push(seq, x).unwrap();
        }
        assert!(doc.deep_equal(seq1, seq2));

        let extra = doc.new_scalar("y");
        doc.sequence_push(seq2, extra).unwrap();
        assert!(!doc.deep_equal(seq1, seq2));
    }

    #[test]
    fn test_deep_equal_through_alias() {
        let mut doc = Document::new();
        let target = doc.new_scalar("v");
        doc.register_anchor("a".to_string(), target).unwrap();
        let alias = doc.push(Node::Alias {
            name: "a".to_string(),
            target: None,
        });
        let plain = doc.new_scalar("v");
        assert!(doc.deep_equal(alias, plain));
    }

    #[test]
    fn test_clone_node_is_deep() {
        let mut doc = Document::new();
        let map = doc.new_mapping();
        let key = doc.new_scalar("k");
        let value = doc.new_scalar("v");
        doc.mapping_set(map, key, value).unwrap();

        let copy = doc.clone_node(map);
        assert!(doc.deep_equal(map, copy));

        // mutating the copy leaves the original untouched
        let key2 = doc.new_scalar("k2");
        let value2 = doc.new_scalar("v2");
        doc.mapping_set(copy, key2, value2).unwrap();
        assert_eq!(doc.mapping_len(map), Some(1));
        assert_eq!(doc.mapping_len(copy), Some(2));
    }

    #[test]
    fn test_typed_collection_constructors() {
        let mut doc = Document::new();
        let set = doc.new_set();
        let omap = doc.new_omap();
        let pairs = doc.new_pairs();

        assert!(matches!(
            doc.node(set),
            Node::Mapping {
                kind: MappingKind::Set,
                ..
            }
        ));
        assert!(matches!(
            doc.node(omap),
            Node::Sequence {
                kind: SequenceKind::Omap,
                ..
            }
        ));
        assert!(matches!(
            doc.node(pairs),
            Node::Sequence {
                kind: SequenceKind::Pairs,
                ..
            }
        ));

        // set and omap reuse the mapping/sequence accessor surface
        let member = doc.new_scalar("m");
        let null = doc.new_null();
        doc.mapping_set(set, member, null).unwrap();
        assert!(doc.mapping_contains_key(set, "m"));
        let entry = doc.new_mapping();
        doc.sequence_push(omap, entry).unwrap();
        assert_eq!(doc.sequence_len(omap), Some(1));
    }

    #[test]
    fn test_subtree_size() {
        let mut doc = Document::new();
        let seq = doc.new_sequence();
        for i in 0..3 {
            let item = doc.new_int(i);
            doc.sequence_push(seq, item).unwrap();
        }
        assert_eq!(doc.subtree_size(seq), 4);
    }
}
