//! Split a seekable stream into logical DBC lines.
//!
//! A logical line ends at a `\n` that is *outside* a quoted string, so one
//! logical line may span several physical lines (multi-line `CM_` comments).
//! Strings in a well-formed DBC file never contain `"` characters, so there
//! is no escape handling.
//!
//! The stream is read in fixed-size chunks. When a terminating newline lands
//! mid-chunk the stream is seeked back by the unconsumed byte count, leaving
//! the cursor exactly after the newline. A caller may therefore stop
//! iterating at any point and the stream position stays well-defined: just
//! after the last fully yielded line.

use crate::error::DbcError;
use std::collections::VecDeque;
use std::io::{Read, Seek, SeekFrom};

/// Default read granularity in bytes.
///
/// Chunk size is a performance trade-off only: smaller chunks waste less on
/// the seek-back after each line but cost more read calls. Output is
/// identical for any size >= 1.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Lazy logical-line reader over a seekable stream.
///
/// The tokenizer owns the stream exclusively for the duration of iteration.
/// Lines handed back via [`unread`](LineTokenizer::unread) are replayed in
/// FIFO order before any further stream reads, giving callers one level of
/// lookahead without consuming the stream.
pub struct LineTokenizer<S> {
    stream: S,
    chunk_size: usize,
    pushed: VecDeque<String>,
}

impl<S: Read + Seek> LineTokenizer<S> {
    pub fn new(stream: S) -> Self {
        Self::with_chunk_size(stream, DEFAULT_CHUNK_SIZE)
    }

    pub fn with_chunk_size(stream: S, chunk_size: usize) -> Self {
        LineTokenizer {
            stream,
            chunk_size: chunk_size.max(1),
            pushed: VecDeque::new(),
        }
    }

    /// Hand a line back to the tokenizer; it is yielded again before any new
    /// stream reads.
    pub fn unread(&mut self, line: String) {
        self.pushed.push_back(line);
    }

    /// Produce the next logical line, newline stripped, or `None` at end of
    /// stream. Newlines inside quoted strings are preserved verbatim.
    pub fn next_line(&mut self) -> Result<Option<String>, DbcError> {
        if let Some(line) = self.pushed.pop_front() {
            return Ok(Some(line));
        }

        let mut line: Vec<u8> = Vec::new();
        let mut in_string = false;
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let n = self.stream.read(&mut chunk)?;
            if n == 0 {
                break; // EOF
            }
            let chunk = &chunk[..n];

            for (i, &byte) in chunk.iter().enumerate() {
                match byte {
                    b'"' => in_string = !in_string,
                    // Only a newline outside a string terminates the line.
                    b'\n' if !in_string => {
                        let excess = (n - (i + 1)) as i64;
                        self.stream.seek(SeekFrom::Current(-excess))?;
                        line.extend_from_slice(&chunk[..i]);
                        return into_line(line).map(Some);
                    }
                    _ => {}
                }
            }
            line.extend_from_slice(chunk);
        }

        if line.is_empty() {
            return Ok(None);
        }
        if in_string {
            return Err(DbcError::UnterminatedString);
        }
        // Last line of the stream has no trailing newline; EOF terminates it.
        into_line(line).map(Some)
    }

    /// Iterator adapter over [`next_line`](LineTokenizer::next_line).
    pub fn lines(&mut self) -> Lines<'_, S> {
        Lines { tokenizer: self }
    }

    /// Give the stream back, e.g. to rewind it for a second parse.
    pub fn into_inner(self) -> S {
        self.stream
    }
}

// Scanning is done per byte: `"` and `\n` never occur inside a UTF-8
// continuation sequence, so byte positions are exact. Validity of the whole
// line is checked once here, where chunk boundaries can no longer split a
// multi-byte character.
fn into_line(bytes: Vec<u8>) -> Result<String, DbcError> {
    String::from_utf8(bytes).map_err(|_| DbcError::Utf8)
}

pub struct Lines<'a, S> {
    tokenizer: &'a mut LineTokenizer<S>,
}

impl<S: Read + Seek> Iterator for Lines<'_, S> {
    type Item = Result<String, DbcError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.tokenizer.next_line().transpose()
    }
}
