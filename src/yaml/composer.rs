//! Event-to-document composer
//!
//! Builds a [`Document`] from parser events. Flow collections arrive with
//! explicit start/end events; block collections are inferred from the
//! columns of `:` and `-` indicators: a `:` whose key column matches the
//! open block mapping continues it, otherwise it opens a new mapping with
//! the just-seen scalar detached as the key, and frames are finalized
//! when a later indicator's column retreats past their indent.

use crate::yaml::document::{
    Document, MappingKind, Node, NodeId, ScalarKind, ScalarNode, SequenceKind,
};
use crate::yaml::parser::{Event, EventType, Parser};
use crate::yaml::scanner::ScalarStyle;
use crate::yaml::schema::{apply_scalar_tag, Schema};
use crate::yaml::tag::{core, TagResolver};
use crate::yaml::{DuplicateKeyPolicy, ParseOptions};
use crate::{Error, Position, ResourceTracker, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Sequence,
    Mapping,
}

/// One in-progress collection
#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    flow: bool,
    /// Children; mappings alternate key, value
    items: Vec<NodeId>,
    anchor: Option<String>,
    tag: Option<String>,
    /// Column of the first key or `-` for block frames
    indent: usize,
    /// A `:` has been seen for the current key
    awaiting_value: bool,
    /// Flow mappings: a key has been pushed without its value yet
    key_open: bool,
    /// Block sequences: a `-` entry is still waiting for its item
    entry_open: bool,
    start: Position,
}

/// Build state for one document
#[derive(Debug)]
struct DocBuilder {
    doc: Document,
    frames: Vec<Frame>,
    /// A finished scalar or alias that may still become a mapping key
    pending: Option<(NodeId, Position)>,
    aliases: Vec<(NodeId, Position)>,
    root: Option<NodeId>,
    directives: Vec<(String, Vec<String>)>,
}

/// Pulls events from a [`Parser`] and composes documents
#[derive(Debug)]
pub(crate) struct Composer {
    parser: Parser,
    options: ParseOptions,
    tracker: ResourceTracker,
    /// Directives seen since the last document boundary
    directives: Vec<(String, Vec<String>)>,
    builder: Option<DocBuilder>,
}

impl Composer {
    pub(crate) fn new(options: ParseOptions) -> Self {
        Self {
            parser: Parser::with_limits(options.limits.clone()),
            options,
            tracker: ResourceTracker::new(),
            directives: Vec::new(),
            builder: None,
        }
    }

    pub(crate) fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        self.parser.feed(bytes)
    }

    pub(crate) fn finish(&mut self) -> Result<()> {
        self.parser.finish()
    }

    pub(crate) fn set_sync_mode(&mut self, sync: bool) {
        self.parser.set_sync_mode(sync);
    }

    /// Compose the next document, or `Ok(None)` when the stream is done
    /// or more input is needed
    pub(crate) fn compose_document(&mut self) -> Result<Option<Document>> {
        loop {
            let Some(event) = self.parser.next_event()? else {
                return Ok(None);
            };
            match event.event_type {
                EventType::StreamStart => {}
                EventType::StreamEnd => return Ok(None),
                EventType::Directive { ref name, ref args } => {
                    self.handle_directive(event.position, name, args)?;
                }
                EventType::DocumentStart { .. } => {
                    self.builder = Some(DocBuilder::new(std::mem::take(&mut self.directives)));
                }
                EventType::DocumentEnd { .. } => {
                    if let Some(builder) = self.builder.take() {
                        let doc = self.finalize_document(builder, event.position)?;
                        return Ok(Some(doc));
                    }
                }
                _ => {
                    let Some(builder) = self.builder.as_mut() else {
                        return Err(Error::parse(
                            event.position,
                            "content outside of a document",
                        ));
                    };
                    builder.handle_event(event, &self.options, &mut self.tracker)?;
                }
            }
        }
    }

    fn handle_directive(
        &mut self,
        position: Position,
        name: &str,
        args: &[String],
    ) -> Result<()> {
        if name == "YAML" {
            let supported = args
                .first()
                .is_some_and(|version| version.starts_with("1."));
            if !supported {
                return Err(Error::construction(
                    position,
                    format!("unsupported YAML version {}", args.join(" ")),
                ));
            }
        }
        self.directives.push((name.to_string(), args.to_vec()));
        Ok(())
    }

    fn finalize_document(
        &mut self,
        mut builder: DocBuilder,
        position: Position,
    ) -> Result<Document> {
        builder.commit_pending(&self.options, &mut self.tracker)?;
        while !builder.frames.is_empty() {
            if builder.frames.last().is_some_and(|frame| frame.flow) {
                return Err(Error::parse(position, "unclosed flow collection"));
            }
            builder.finalize_top(&self.options, &mut self.tracker)?;
        }

        let mut doc = builder.doc;
        let root = builder.root.unwrap_or_else(|| doc.new_null());
        doc.set_root(root);

        // Deferred alias resolution, with the expanded-size product bound.
        for (alias_id, alias_pos) in builder.aliases {
            let name = match doc.node(alias_id) {
                Node::Alias { name, .. } => name.clone(),
                _ => continue,
            };
            let Some(target) = doc.anchor(&name) else {
                return Err(Error::construction(
                    alias_pos,
                    format!("unknown anchor '{}'", name),
                ));
            };
            self.tracker
                .add_complexity(&self.options.limits, doc.subtree_size(target))?;
            if let Node::Alias { target: slot, .. } = doc.node_mut(alias_id) {
                *slot = Some(target);
            }
        }

        let mut resolver = TagResolver::new();
        for (name, args) in &builder.directives {
            if name == "TAG" && args.len() == 2 {
                resolver.add_directive(args[0].clone(), args[1].clone());
            }
        }
        resolve_types(&mut doc, &resolver, self.options.schema)?;

        Ok(doc)
    }
}

impl DocBuilder {
    fn new(directives: Vec<(String, Vec<String>)>) -> Self {
        Self {
            doc: Document::new(),
            frames: Vec::new(),
            pending: None,
            aliases: Vec::new(),
            root: None,
            directives,
        }
    }

    fn handle_event(
        &mut self,
        event: Event,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        let position = event.position;
        match event.event_type {
            EventType::Scalar {
                anchor,
                tag,
                value,
                style,
            } => {
                self.commit_pending(opts, tracker)?;
                let id = self.doc.push(Node::Scalar(ScalarNode {
                    value,
                    style,
                    tag,
                    anchor: anchor.clone(),
                    kind: ScalarKind::Str,
                }));
                if let Some(name) = anchor {
                    self.register_anchor(name, id, position)?;
                }
                self.pending = Some((id, position));
                Ok(())
            }
            EventType::Alias { anchor } => {
                self.commit_pending(opts, tracker)?;
                let id = self.doc.push(Node::Alias {
                    name: anchor,
                    target: None,
                });
                self.aliases.push((id, position));
                self.pending = Some((id, position));
                Ok(())
            }
            EventType::SequenceStart { anchor, tag, flow } => {
                self.commit_pending(opts, tracker)?;
                self.push_frame(
                    Frame {
                        kind: FrameKind::Sequence,
                        flow,
                        items: Vec::new(),
                        anchor,
                        tag,
                        indent: position.column,
                        awaiting_value: false,
                        key_open: false,
                        entry_open: false,
                        start: position,
                    },
                    opts,
                    tracker,
                )
            }
            EventType::MappingStart { anchor, tag, flow } => {
                self.commit_pending(opts, tracker)?;
                self.push_frame(
                    Frame {
                        kind: FrameKind::Mapping,
                        flow,
                        items: Vec::new(),
                        anchor,
                        tag,
                        indent: position.column,
                        awaiting_value: false,
                        key_open: false,
                        entry_open: false,
                        start: position,
                    },
                    opts,
                    tracker,
                )
            }
            EventType::SequenceEnd => {
                self.commit_pending(opts, tracker)?;
                self.close_flow(FrameKind::Sequence, position, opts, tracker)
            }
            EventType::MappingEnd => {
                self.commit_pending(opts, tracker)?;
                self.close_flow(FrameKind::Mapping, position, opts, tracker)
            }
            EventType::Indicator { indicator: ':' } => {
                self.handle_colon(position, opts, tracker)
            }
            EventType::Indicator { indicator: '-' } => {
                self.handle_dash(position, opts, tracker)
            }
            EventType::Indicator { indicator: ',' } => self.commit_pending(opts, tracker),
            EventType::Indicator { indicator: '?' } => Ok(()),
            EventType::Indicator { indicator } => Err(Error::parse(
                position,
                format!("unexpected indicator '{}'", indicator),
            )),
            _ => Ok(()),
        }
    }

    fn handle_colon(
        &mut self,
        position: Position,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        if let Some((id, key_pos)) = self.pending.take() {
            if let Node::Scalar(scalar) = self.doc.node(id) {
                if scalar.value == "<<"
                    && scalar.style == ScalarStyle::Plain
                    && !opts.allow_merge_keys
                {
                    return Err(Error::parse(key_pos, "merge keys are not enabled"));
                }
            }
            if self.frames.last().is_some_and(|frame| frame.flow) {
                let frame = self.frames.last_mut().expect("checked above");
                return match frame.kind {
                    FrameKind::Mapping => {
                        tracker.add_collection_item(&opts.limits)?;
                        frame.items.push(id);
                        frame.awaiting_value = true;
                        frame.key_open = true;
                        Ok(())
                    }
                    FrameKind::Sequence => {
                        Err(Error::parse(position, "unexpected ':' in flow sequence"))
                    }
                };
            }

            // block context
            let col = key_pos.column;
            self.unwind_block(col, true, opts, tracker)?;
            let continues = matches!(
                self.frames.last(),
                Some(frame)
                    if !frame.flow && frame.kind == FrameKind::Mapping && frame.indent == col
            );
            if continues {
                if self.frames.last().expect("checked above").awaiting_value {
                    // previous key had no value
                    let null = self.doc.new_null();
                    self.frames.last_mut().expect("checked above").items.push(null);
                }
                tracker.add_collection_item(&opts.limits)?;
                let frame = self.frames.last_mut().expect("checked above");
                frame.items.push(id);
                frame.awaiting_value = true;
            } else {
                self.push_frame(
                    Frame {
                        kind: FrameKind::Mapping,
                        flow: false,
                        items: vec![id],
                        anchor: None,
                        tag: None,
                        indent: col,
                        awaiting_value: true,
                        key_open: false,
                        entry_open: false,
                        start: key_pos,
                    },
                    opts,
                    tracker,
                )?;
            }
            return Ok(());
        }

        // No pending node: the key was a finished collection in flow context.
        match self.frames.last_mut() {
            Some(frame) if frame.flow && frame.kind == FrameKind::Mapping => {
                frame.awaiting_value = true;
                Ok(())
            }
            _ => Err(Error::parse(position, "unexpected ':'")),
        }
    }

    fn handle_dash(
        &mut self,
        position: Position,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        self.commit_pending(opts, tracker)?;
        if self.frames.last().is_some_and(|frame| frame.flow) {
            return Err(Error::parse(position, "unexpected '-' in flow context"));
        }
        let col = position.column;
        self.unwind_block(col, false, opts, tracker)?;
        let continues = matches!(
            self.frames.last(),
            Some(frame)
                if !frame.flow && frame.kind == FrameKind::Sequence && frame.indent == col
        );
        if continues {
            // a `-` entry that never got an item is a null
            if self.frames.last().expect("checked above").entry_open {
                let null = self.doc.new_null();
                let frame = self.frames.last_mut().expect("checked above");
                frame.items.push(null);
            }
            self.frames.last_mut().expect("checked above").entry_open = true;
        } else {
            self.push_frame(
                Frame {
                    kind: FrameKind::Sequence,
                    flow: false,
                    items: Vec::new(),
                    anchor: None,
                    tag: None,
                    indent: col,
                    awaiting_value: false,
                    key_open: false,
                    entry_open: true,
                    start: position,
                },
                opts,
                tracker,
            )?;
        }
        Ok(())
    }

    /// Finalize block frames the new column steps outside of
    ///
    /// A key at column `col` also closes a block sequence at exactly that
    /// column; a `-` at the sequence's own column continues it instead.
    fn unwind_block(
        &mut self,
        col: usize,
        for_key: bool,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        loop {
            let Some(top) = self.frames.last() else {
                return Ok(());
            };
            if top.flow {
                return Ok(());
            }
            let close = top.indent > col
                || (for_key && top.indent == col && top.kind == FrameKind::Sequence);
            if !close {
                return Ok(());
            }
            self.finalize_top(opts, tracker)?;
        }
    }

    fn push_frame(
        &mut self,
        frame: Frame,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        tracker.check_depth(&opts.limits, self.frames.len() + 1)?;
        self.frames.push(frame);
        Ok(())
    }

    fn close_flow(
        &mut self,
        kind: FrameKind,
        position: Position,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        let matched = matches!(
            self.frames.last(),
            Some(frame) if frame.flow && frame.kind == kind
        );
        if !matched {
            return Err(Error::parse(position, "mismatched flow collection end"));
        }
        self.finalize_top(opts, tracker)
    }

    /// Pop the top frame, build its node, and hand it to the parent
    fn finalize_top(
        &mut self,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        let mut frame = self.frames.pop().expect("finalize with no open frame");
        if frame.kind == FrameKind::Mapping && frame.items.len() % 2 == 1 {
            let null = self.doc.new_null();
            frame.items.push(null);
        }
        if frame.kind == FrameKind::Sequence && frame.entry_open {
            let null = self.doc.new_null();
            frame.items.push(null);
        }

        let anchor = frame.anchor.clone();
        let node_id = match frame.kind {
            FrameKind::Sequence => self.doc.push(Node::Sequence {
                items: frame.items,
                tag: frame.tag,
                anchor: frame.anchor,
                kind: SequenceKind::Sequence,
            }),
            FrameKind::Mapping => {
                let pairs: Vec<(NodeId, NodeId)> = frame
                    .items
                    .chunks(2)
                    .map(|pair| (pair[0], pair[1]))
                    .collect();
                let pairs =
                    apply_duplicate_key_policy(&self.doc, pairs, opts.duplicate_keys, frame.start)?;
                self.doc.push(Node::Mapping {
                    pairs,
                    tag: frame.tag,
                    anchor: frame.anchor,
                    kind: MappingKind::Mapping,
                })
            }
        };
        if let Some(name) = anchor {
            self.register_anchor(name, node_id, frame.start)?;
        }
        self.deliver(node_id, frame.start, opts, tracker)
    }

    fn commit_pending(
        &mut self,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        if let Some((id, position)) = self.pending.take() {
            self.deliver(id, position, opts, tracker)?;
        }
        Ok(())
    }

    /// Append a finished node to the innermost open collection, or make
    /// it the document root
    fn deliver(
        &mut self,
        id: NodeId,
        position: Position,
        opts: &ParseOptions,
        tracker: &mut ResourceTracker,
    ) -> Result<()> {
        let Some(index) = self.frames.len().checked_sub(1) else {
            if self.root.is_some() {
                return Err(Error::parse(
                    position,
                    "unexpected content after document root",
                ));
            }
            self.root = Some(id);
            return Ok(());
        };

        tracker.add_collection_item(&opts.limits)?;
        let (kind, flow, awaiting, key_open) = {
            let frame = &self.frames[index];
            (frame.kind, frame.flow, frame.awaiting_value, frame.key_open)
        };
        match kind {
            FrameKind::Sequence => {
                let frame = &mut self.frames[index];
                frame.items.push(id);
                frame.entry_open = false;
            }
            FrameKind::Mapping if awaiting => {
                let frame = &mut self.frames[index];
                frame.items.push(id);
                frame.awaiting_value = false;
                frame.key_open = false;
            }
            FrameKind::Mapping if flow => {
                if key_open {
                    // previous key never got a value
                    let null = self.doc.new_null();
                    let frame = &mut self.frames[index];
                    frame.items.push(null);
                    frame.items.push(id);
                } else {
                    self.frames[index].items.push(id);
                }
                self.frames[index].key_open = true;
            }
            FrameKind::Mapping => {
                return Err(Error::parse(position, "expected ':' after mapping key"));
            }
        }
        Ok(())
    }

    fn register_anchor(
        &mut self,
        name: String,
        id: NodeId,
        position: Position,
    ) -> Result<()> {
        if self.doc.anchor(&name).is_some() {
            return Err(Error::construction(
                position,
                format!("anchor '{}' is already defined", name),
            ));
        }
        self.doc.register_anchor(name, id)
    }
}

/// Drop or reject duplicate mapping keys according to policy
pub(crate) fn apply_duplicate_key_policy(
    doc: &Document,
    pairs: Vec<(NodeId, NodeId)>,
    policy: DuplicateKeyPolicy,
    position: Position,
) -> Result<Vec<(NodeId, NodeId)>> {
    let mut kept: Vec<(NodeId, NodeId)> = Vec::with_capacity(pairs.len());
    for (key, value) in pairs {
        match kept
            .iter()
            .position(|(existing, _)| doc.deep_equal(*existing, key))
        {
            None => kept.push((key, value)),
            Some(index) => match policy {
                DuplicateKeyPolicy::Error => {
                    return Err(Error::duplicate_key(position, doc.render_brief(key)));
                }
                DuplicateKeyPolicy::FirstWins => {}
                DuplicateKeyPolicy::LastWins => kept[index] = (key, value),
            },
        }
    }
    Ok(kept)
}

/// Resolve tag handles and assign runtime types across the whole tree
fn resolve_types(doc: &mut Document, resolver: &TagResolver, schema: Schema) -> Result<()> {
    for index in 0..doc.len() {
        let id = NodeId(index);
        let raw_tag = match doc.node(id) {
            Node::Scalar(scalar) => scalar.tag.clone(),
            Node::Sequence { tag, .. } | Node::Mapping { tag, .. } => tag.clone(),
            Node::Alias { .. } => None,
        };
        let resolved = raw_tag.map(|tag| resolver.resolve(&tag));

        match doc.node_mut(id) {
            Node::Scalar(scalar) => {
                scalar.tag = resolved;
            }
            Node::Sequence { tag, kind, .. } => {
                *kind = match resolved.as_deref() {
                    Some(core::OMAP) => SequenceKind::Omap,
                    Some(core::PAIRS) => SequenceKind::Pairs,
                    _ => SequenceKind::Sequence,
                };
                *tag = resolved;
                continue;
            }
            Node::Mapping { tag, kind, .. } => {
                *kind = if resolved.as_deref() == Some(core::SET) {
                    MappingKind::Set
                } else {
                    MappingKind::Mapping
                };
                *tag = resolved;
                continue;
            }
            Node::Alias { .. } => continue,
        }

        // scalar typing: explicit tag first, then the schema
        let (value, style, tag) = match doc.node(id) {
            Node::Scalar(scalar) => (
                scalar.value.clone(),
                scalar.style,
                scalar.tag.clone(),
            ),
            _ => continue,
        };
        let kind = match &tag {
            Some(uri) => apply_scalar_tag(uri, &value, Position::new())?,
            None => None,
        };
        if let Node::Scalar(scalar) = doc.node_mut(id) {
            match kind {
                Some(kind) => scalar.kind = kind,
                None => {
                    // only untagged plain scalars are implicitly typed
                    if tag.is_none()
                        && scalar.kind == ScalarKind::Str
                        && style == ScalarStyle::Plain
                    {
                        scalar.kind = schema.resolve_implicit(&scalar.value);
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compose(input: &str) -> Result<Document> {
        let mut composer = Composer::new(ParseOptions::default());
        composer.set_sync_mode(true);
        composer.feed(input.as_bytes())?;
        composer.finish()?;
        composer
            .compose_document()?
            .ok_or_else(|| Error::state("no document composed"))
    }

    #[test]
    fn test_scalar_document() {
        let doc = compose("42\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.as_int(root), Some(42));
    }

    #[test]
    fn test_flow_sequence() {
        let doc = compose("[1, 2, 3]\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.sequence_len(root), Some(3));
        assert_eq!(doc.as_int(doc.sequence_get(root, 2).unwrap()), Some(3));
    }

    #[test]
    fn test_flow_mapping() {
        let doc = compose("{a: 1, b: 2}\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.mapping_len(root), Some(2));
        assert_eq!(doc.as_int(doc.mapping_get(root, "a").unwrap()), Some(1));
        assert_eq!(doc.as_int(doc.mapping_get(root, "b").unwrap()), Some(2));
    }

    #[test]
    fn test_block_mapping() {
        let doc = compose("a: 1\nb: 2\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.mapping_len(root), Some(2));
        assert_eq!(doc.as_int(doc.mapping_get(root, "a").unwrap()), Some(1));
    }

    #[test]
    fn test_block_sequence() {
        let doc = compose("- a\n- b\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.sequence_len(root), Some(2));
        assert_eq!(doc.as_str(doc.sequence_get(root, 0).unwrap()), Some("a"));
    }

    #[test]
    fn test_nested_block_mapping() {
        let doc = compose("outer:\n  inner: 1\n  other: 2\ntop: 3\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.mapping_len(root), Some(2));
        let outer = doc.mapping_get(root, "outer").unwrap();
        assert_eq!(doc.mapping_len(outer), Some(2));
        assert_eq!(doc.as_int(doc.mapping_get(outer, "inner").unwrap()), Some(1));
        assert_eq!(doc.as_int(doc.mapping_get(root, "top").unwrap()), Some(3));
    }

    #[test]
    fn test_sequence_under_mapping() {
        let doc = compose("items:\n- 1\n- 2\nnext: 3\n").unwrap();
        let root = doc.root().unwrap();
        let items = doc.mapping_get(root, "items").unwrap();
        assert_eq!(doc.sequence_len(items), Some(2));
        assert_eq!(doc.as_int(doc.mapping_get(root, "next").unwrap()), Some(3));
    }

    #[test]
    fn test_mapping_items_in_sequence() {
        let doc = compose("- a: 1\n- b: 2\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.sequence_len(root), Some(2));
        let first = doc.sequence_get(root, 0).unwrap();
        assert_eq!(doc.as_int(doc.mapping_get(first, "a").unwrap()), Some(1));
    }

    #[test]
    fn test_missing_value_is_null() {
        let doc = compose("a:\nb: 1\n").unwrap();
        let root = doc.root().unwrap();
        assert!(doc.is_null(doc.mapping_get(root, "a").unwrap()));
        assert_eq!(doc.as_int(doc.mapping_get(root, "b").unwrap()), Some(1));
    }

    #[test]
    fn test_anchor_alias_pointer_identity() {
        let doc = compose("a: &x [1, 2]\nb: *x\n").unwrap();
        let root = doc.root().unwrap();
        let a = doc.mapping_get(root, "a").unwrap();
        let b = doc.mapping_get(root, "b").unwrap();
        assert!(matches!(doc.node(b), Node::Alias { target: Some(_), .. }));
        assert_eq!(doc.resolve(b), doc.resolve(a));
        assert_eq!(doc.sequence_len(b), Some(2));
    }

    #[test]
    fn test_unknown_anchor() {
        let err = compose("a: *nope\n").unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));
    }

    #[test]
    fn test_duplicate_anchor() {
        let err = compose("a: &x 1\nb: &x 2\n").unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));
    }

    #[test]
    fn test_duplicate_key_error() {
        let err = compose("a: 1\na: 2\n").unwrap_err();
        assert!(matches!(err, Error::DuplicateKey { .. }));
    }

    #[test]
    fn test_duplicate_key_first_wins() {
        let mut options = ParseOptions::default();
        options.duplicate_keys = DuplicateKeyPolicy::FirstWins;
        let mut composer = Composer::new(options);
        composer.set_sync_mode(true);
        composer.feed(b"a: 1\na: 2\n").unwrap();
        composer.finish().unwrap();
        let doc = composer.compose_document().unwrap().unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.mapping_len(root), Some(1));
        assert_eq!(doc.as_int(doc.mapping_get(root, "a").unwrap()), Some(1));
    }

    #[test]
    fn test_duplicate_key_last_wins() {
        let mut options = ParseOptions::default();
        options.duplicate_keys = DuplicateKeyPolicy::LastWins;
        let mut composer = Composer::new(options);
        composer.set_sync_mode(true);
        composer.feed(b"a: 1\na: 2\n").unwrap();
        composer.finish().unwrap();
        let doc = composer.compose_document().unwrap().unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.as_int(doc.mapping_get(root, "a").unwrap()), Some(2));
    }

    #[test]
    fn test_merge_key_rejected_by_default() {
        let err = compose("a: 1\n<<: {b: 2}\n").unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn test_merge_key_allowed_as_plain_key() {
        let mut options = ParseOptions::default();
        options.allow_merge_keys = true;
        let mut composer = Composer::new(options);
        composer.set_sync_mode(true);
        composer.feed(b"<<: {b: 2}\nc: 3\n").unwrap();
        composer.finish().unwrap();
        let doc = composer.compose_document().unwrap().unwrap();
        let root = doc.root().unwrap();
        // `<<` stays an ordinary key; no merging is performed
        assert!(doc.mapping_contains_key(root, "<<"));
        assert_eq!(doc.as_int(doc.mapping_get(root, "c").unwrap()), Some(3));
    }

    #[test]
    fn test_tagged_scalar_types() {
        let doc = compose("a: !!str 42\nb: !!int 0x10\nc: !!bool True\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.as_str(doc.mapping_get(root, "a").unwrap()), Some("42"));
        assert_eq!(doc.as_int(doc.mapping_get(root, "a").unwrap()), None);
        assert_eq!(doc.as_int(doc.mapping_get(root, "b").unwrap()), Some(16));
        assert_eq!(doc.as_bool(doc.mapping_get(root, "c").unwrap()), Some(true));
    }

    #[test]
    fn test_invalid_tagged_scalar() {
        let err = compose("a: !!int nope\n").unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));
    }

    #[test]
    fn test_tag_directive_substitution() {
        let doc = compose("%TAG !e! tag:example.com,2024:\n---\na: !e!widget x\n").unwrap();
        let root = doc.root().unwrap();
        let a = doc.mapping_get(root, "a").unwrap();
        match doc.node(a) {
            Node::Scalar(scalar) => {
                assert_eq!(scalar.tag.as_deref(), Some("tag:example.com,2024:widget"));
            }
            _ => panic!("expected scalar"),
        }
    }

    #[test]
    fn test_set_collection_kind() {
        let doc = compose("!!set\n{a: ~, b: ~}\n").unwrap();
        let root = doc.root().unwrap();
        // the tag decorates the flow mapping
        match doc.node(doc.resolve(root)) {
            Node::Mapping { kind, .. } => assert_eq!(*kind, MappingKind::Set),
            other => panic!("expected mapping, got {:?}", other),
        }
    }

    #[test]
    fn test_quoted_scalars_stay_strings() {
        let doc = compose("a: '42'\nb: \"true\"\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(doc.as_int(doc.mapping_get(root, "a").unwrap()), None);
        assert_eq!(doc.as_str(doc.mapping_get(root, "a").unwrap()), Some("42"));
        assert_eq!(doc.as_bool(doc.mapping_get(root, "b").unwrap()), None);
    }

    #[test]
    fn test_block_scalar_value() {
        let doc = compose("text: |\n  line one\n  line two\nnext: 1\n").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(
            doc.as_str(doc.mapping_get(root, "text").unwrap()),
            Some("line one\nline two\n")
        );
        assert_eq!(doc.as_int(doc.mapping_get(root, "next").unwrap()), Some(1));
    }

    #[test]
    fn test_depth_limit() {
        let mut options = ParseOptions::default();
        options.limits.max_depth = 3;
        let mut composer = Composer::new(options);
        composer.set_sync_mode(true);
        composer.feed(b"[[[[1]]]]\n").unwrap();
        composer.finish().unwrap();
        let err = composer.compose_document().unwrap_err();
        assert!(matches!(err, Error::LimitExceeded { .. }));
    }
}
