//! Streaming CSV tokenizer
//!
//! The CSV pipeline is a dialect-configurable, byte-level state machine
//! that consumes input as arbitrarily sized chunks and emits
//! record/field events without buffering the whole document:
//!
//! ```
//! use textstream::csv::{CsvEvent, CsvOptions, CsvStream};
//!
//! let mut rows: Vec<Vec<String>> = Vec::new();
//! let mut stream = CsvStream::new(CsvOptions::default(), |event| {
//!     match event {
//!         CsvEvent::RecordBegin => rows.push(Vec::new()),
//!         CsvEvent::Field(bytes) => rows
//!             .last_mut()
//!             .unwrap()
//!             .push(String::from_utf8_lossy(bytes).into_owned()),
//!         CsvEvent::RecordEnd => {}
//!     }
//!     Ok(())
//! });
//!
//! stream.process_chunk(b"a,b\n1,").unwrap();
//! stream.process_chunk(b"2\n").unwrap();
//! stream.finish().unwrap();
//! drop(stream);
//!
//! assert_eq!(rows, vec![vec!["a", "b"], vec!["1", "2"]]);
//! ```

mod dialect;
mod field;
mod stream;

pub use dialect::{CsvOptions, Dialect, EscapeMode};
pub use stream::{CsvEvent, CsvStream};
