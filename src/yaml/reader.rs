//! Pull-mode event reader
//!
//! Turns the push-oriented feed protocol into a pull loop: feed chunks,
//! then call [`EventReader::next`] until it returns `Ok(None)`, meaning
//! more input is needed. The parser already yields one owned event per
//! call, so no intermediate queue or event copying is involved.

use crate::yaml::parser::{Event, Parser};
use crate::{Limits, Result};

/// Incremental event reader over chunked input
///
/// ```
/// use textstream::yaml::{EventReader, EventType};
///
/// let mut reader = EventReader::new();
/// reader.feed(b"a: 1\n").unwrap();
/// reader.feed(b"").unwrap(); // empty feed signals end of input
///
/// let mut scalars = Vec::new();
/// while let Some(event) = reader.next().unwrap() {
///     if let EventType::Scalar { value, .. } = event.event_type {
///         scalars.push(value);
///     }
/// }
/// assert_eq!(scalars, vec!["a", "1"]);
/// assert!(reader.is_done());
/// ```
#[derive(Debug)]
pub struct EventReader {
    parser: Parser,
}

impl EventReader {
    /// Create a reader with default limits
    pub fn new() -> Self {
        Self::with_limits(Limits::default())
    }

    /// Create a reader with custom limits
    pub fn with_limits(limits: Limits) -> Self {
        Self {
            parser: Parser::with_limits(limits),
        }
    }

    /// Feed a chunk of input; an empty chunk signals end of input
    pub fn feed(&mut self, bytes: &[u8]) -> Result<()> {
        if bytes.is_empty() {
            self.parser.finish()
        } else {
            self.parser.feed(bytes)
        }
    }

    /// Signal end of input
    pub fn finish(&mut self) -> Result<()> {
        self.parser.finish()
    }

    /// Pop the next event
    ///
    /// Returns `Ok(None)` when no event can be produced yet; feed more
    /// input (or finish) and call again. After the stream-end event has
    /// been delivered, every call returns `Ok(None)` and
    /// [`EventReader::is_done`] reports true.
    pub fn next(&mut self) -> Result<Option<Event>> {
        self.parser.next_event()
    }

    /// Whether the stream-end event has been delivered
    pub fn is_done(&self) -> bool {
        self.parser.is_ended()
    }
}

impl Default for EventReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::yaml::parser::EventType;
    use crate::Error;

    #[test]
    fn test_pull_across_chunks() {
        let mut reader = EventReader::new();
        reader.feed(b"a: ").unwrap();

        let mut events = Vec::new();
        while let Some(event) = reader.next().unwrap() {
            events.push(event);
        }
        assert!(!reader.is_done());

        reader.feed(b"1\n").unwrap();
        reader.finish().unwrap();
        while let Some(event) = reader.next().unwrap() {
            events.push(event);
        }
        assert!(reader.is_done());

        let scalars: Vec<_> = events
            .iter()
            .filter_map(|event| match &event.event_type {
                EventType::Scalar { value, .. } => Some(value.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(scalars, vec!["a", "1"]);
    }

    #[test]
    fn test_empty_feed_finishes() {
        let mut reader = EventReader::new();
        reader.feed(b"x\n").unwrap();
        reader.feed(b"").unwrap();
        while reader.next().unwrap().is_some() {}
        assert!(reader.is_done());
    }

    #[test]
    fn test_feed_after_finish_is_state_error() {
        let mut reader = EventReader::new();
        reader.feed(b"x\n").unwrap();
        reader.finish().unwrap();
        let err = reader.feed(b"more\n").unwrap_err();
        assert!(matches!(err, Error::State { .. }));
    }

    #[test]
    fn test_events_in_input_order() {
        let mut reader = EventReader::new();
        reader.feed(b"[1, 2, 3]\n").unwrap();
        reader.finish().unwrap();
        let mut offsets = Vec::new();
        while let Some(event) = reader.next().unwrap() {
            offsets.push(event.position.index);
        }
        let mut sorted = offsets.clone();
        sorted.sort_unstable();
        assert_eq!(offsets, sorted);
    }
}
