//! File parser: drives the tokenizer over a DBC stream, classifies each
//! logical line, and resolves Signal→Frame links in file order.
//!
//! One linear forward pass. The only cross-line state is the most recently
//! seen frame (for signal linking) and the continuation flag that drops the
//! tab-indented block after an `NS_:` or `BS_:` marker line.

use crate::error::DbcError;
use crate::record::Record;
use crate::tokenizer::LineTokenizer;
use std::io::{Cursor, Read, Seek};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Normal,
    /// Dropping whitespace-led lines after an `NS_:`/`BS_:` marker, until
    /// the first line with no leading whitespace.
    IgnoringTabbedContinuation,
}

/// DBC file parser.
///
/// Non-strict by default: a non-blank line no statement grammar recognizes
/// is silently dropped. In strict mode it aborts the parse. Malformed field
/// literals inside a recognized line are fatal in both modes.
#[derive(Debug, Clone, Copy, Default)]
pub struct DbcParser {
    strict: bool,
}

impl DbcParser {
    pub fn new() -> Self {
        DbcParser { strict: false }
    }

    pub fn strict() -> Self {
        DbcParser { strict: true }
    }

    /// Parse a stream positioned at the start of the DBC payload into the
    /// ordered record list. Frames precede their signals in the output, and
    /// a set signal link always names a frame that appeared earlier.
    pub fn parse<S: Read + Seek>(&self, stream: S) -> Result<Vec<Record>, DbcError> {
        // Each parse owns fresh state; nothing is shared between instances
        // or between calls.
        let mut tokenizer = LineTokenizer::new(stream);
        let mut records: Vec<Record> = Vec::new();
        let mut state = State::Normal;
        let mut current_frame: Option<u32> = None;

        while let Some(line) = tokenizer.next_line()? {
            let stripped = line.trim_end();
            if stripped.is_empty() {
                continue;
            }
            if state == State::IgnoringTabbedContinuation {
                if line.starts_with([' ', '\t']) {
                    continue;
                }
                state = State::Normal;
            }

            let mut record = match Record::from_line(stripped)? {
                Some(record) => record,
                None => {
                    if self.strict {
                        return Err(DbcError::UnrecognizedLine(stripped.to_string()));
                    }
                    continue;
                }
            };

            match &mut record {
                Record::Frame(frame) => current_frame = Some(frame.address),
                // Late-bound link to the most recently seen frame. A signal
                // ahead of any frame stays unlinked.
                Record::Signal(signal) => signal.frame_address = current_frame,
                Record::NewSymbols | Record::BitTiming => {
                    state = State::IgnoringTabbedContinuation;
                }
                _ => {}
            }
            records.push(record);
        }
        Ok(records)
    }

    pub fn parse_str(&self, source: &str) -> Result<Vec<Record>, DbcError> {
        self.parse(Cursor::new(source))
    }
}
