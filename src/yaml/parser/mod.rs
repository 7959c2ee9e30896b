//! Token-to-event layer
//!
//! The parser pulls tokens from the scanner and produces high-level
//! events: documents open and close implicitly around content, flow
//! collection brackets become start/end events, and pending anchors and
//! tags decorate the next node event exactly once. Block structure
//! indicators pass through for the composer's indentation inference.

mod events;

pub use events::{Event, EventType};

use crate::yaml::scanner::{Scanner, TokenType};
use crate::{Error, Limits, Position, ResourceTracker, Result};

/// Incremental event producer over a [`Scanner`]
#[derive(Debug)]
pub struct Parser {
    scanner: Scanner,
    limits: Limits,
    tracker: ResourceTracker,
    pending_anchor: Option<String>,
    pending_tag: Option<String>,
    /// One event held back when a token expands to two events
    queued: Option<Event>,
    stream_started: bool,
    stream_ended: bool,
    doc_open: bool,
    flow_depth: usize,
    error: Option<Error>,
}

impl Parser {
    /// Create a parser with default limits
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create a parser with custom limits
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            scanner: Scanner::with_limits(limits.clone()),
            limits,
            tracker: ResourceTracker::new(),
            pending_anchor: None,
            pending_tag: None,
            queued: None,
            stream_started: false,
            stream_ended: false,
            doc_open: false,
            flow_depth: 0,
            error: None,
        }
    }

    /// Feed raw input bytes
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.scanner.feed(bytes)
    }

    /// Signal end of input
    pub fn finish(&mut self) -> Result<()> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        self.scanner.finish()
    }

    /// Treat every feed as if followed by `finish` for lookahead purposes
    pub fn set_sync_mode(&mut self, sync: bool) {
        self.scanner.set_sync_mode(sync);
    }

    /// Current position in the input
    pub const fn position(&self) -> Position {
        self.scanner.position()
    }

    /// Whether the stream-end event has been delivered
    pub const fn is_ended(&self) -> bool {
        self.stream_ended
    }

    /// Whether `finish` has been called on the underlying scanner
    pub const fn is_finished(&self) -> bool {
        self.scanner.is_finished()
    }

    /// Produce the next event, or `Ok(None)` when more input is needed
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if let Some(err) = &self.error {
            return Err(err.clone());
        }
        match self.produce_event() {
            Ok(event) => Ok(event),
            Err(err) => {
                self.error = Some(err.clone());
                Err(err)
            }
        }
    }

    fn produce_event(&mut self) -> Result<Option<Event>> {
        if let Some(event) = self.queued.take() {
            return Ok(Some(event));
        }
        if self.stream_ended {
            return Ok(None);
        }
        if !self.stream_started {
            self.stream_started = true;
            return Ok(Some(Event::stream_start(self.scanner.position())));
        }

        loop {
            let Some(token) = self.scanner.next_token()? else {
                return Ok(None);
            };
            let position = token.start_position;

            match token.token_type {
                TokenType::Indicator('[') => {
                    self.check_depth()?;
                    self.flow_depth += 1;
                    let event = Event::sequence_start(
                        position,
                        self.pending_anchor.take(),
                        self.pending_tag.take(),
                        true,
                    );
                    return Ok(Some(self.within_document(event)));
                }
                TokenType::Indicator('{') => {
                    self.check_depth()?;
                    self.flow_depth += 1;
                    let event = Event::mapping_start(
                        position,
                        self.pending_anchor.take(),
                        self.pending_tag.take(),
                        true,
                    );
                    return Ok(Some(self.within_document(event)));
                }
                TokenType::Indicator(']') => {
                    self.flow_depth = self.flow_depth.saturating_sub(1);
                    return Ok(Some(Event::sequence_end(position)));
                }
                TokenType::Indicator('}') => {
                    self.flow_depth = self.flow_depth.saturating_sub(1);
                    return Ok(Some(Event::mapping_end(position)));
                }
                TokenType::Indicator(c) => {
                    let event = Event::indicator(position, c);
                    return Ok(Some(self.within_document(event)));
                }
                TokenType::Scalar(value, style) => {
                    let event = Event::scalar(
                        position,
                        self.pending_anchor.take(),
                        self.pending_tag.take(),
                        value,
                        style,
                    );
                    return Ok(Some(self.within_document(event)));
                }
                TokenType::Anchor(name) => {
                    // A second pending anchor silently replaces the first.
                    self.tracker.add_anchor(&self.limits)?;
                    self.pending_anchor = Some(name);
                }
                TokenType::Alias(name) => {
                    self.tracker.add_alias_expansion(&self.limits)?;
                    let event = Event::alias(position, name);
                    return Ok(Some(self.within_document(event)));
                }
                TokenType::Tag(tag) => {
                    self.pending_tag = Some(tag);
                }
                TokenType::Directive(name, args) => {
                    return Ok(Some(Event::directive(position, name, args)));
                }
                TokenType::DocumentStart => {
                    if self.doc_open {
                        // `---` closes the current document first
                        self.queued = Some(Event::document_start(position, false));
                        return Ok(Some(Event::document_end(position, true)));
                    }
                    self.doc_open = true;
                    return Ok(Some(Event::document_start(position, false)));
                }
                TokenType::DocumentEnd => {
                    if self.doc_open {
                        self.doc_open = false;
                        return Ok(Some(Event::document_end(position, false)));
                    }
                    // stray `...` with no open document
                }
                TokenType::StreamEnd => {
                    self.stream_ended = true;
                    if self.doc_open {
                        self.doc_open = false;
                        self.queued = Some(Event::stream_end(position));
                        return Ok(Some(Event::document_end(position, true)));
                    }
                    return Ok(Some(Event::stream_end(position)));
                }
            }
        }
    }

    /// Open a document implicitly before the first content event
    fn within_document(&mut self, event: Event) -> Event {
        if self.doc_open {
            return event;
        }
        self.doc_open = true;
        let start = Event::document_start(event.position, true);
        self.queued = Some(event);
        start
    }

    fn check_depth(&mut self) -> Result<()> {
        let next = self.flow_depth + 1;
        self.tracker.check_depth(&self.limits, next)
    }
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}
