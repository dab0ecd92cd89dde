//! Error type shared by the tokenizer, the record builders, and the file parser.

/// Errors raised while tokenizing or parsing a DBC stream.
///
/// There is no recovery path: the file parser propagates every error
/// immediately and aborts the parse. The only tolerance knob is strict vs
/// non-strict mode, which decides whether an unrecognized line is an
/// [`UnrecognizedLine`](DbcError::UnrecognizedLine) error or silently dropped.
#[derive(Debug, thiserror::Error)]
pub enum DbcError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid UTF-8 in DBC stream")]
    Utf8,
    #[error("string was not closed before end of DBC line")]
    UnterminatedString,
    #[error("unrecognized line: {0:?}")]
    UnrecognizedLine(String),
    #[error("malformed {field} literal: {literal:?}")]
    Field {
        field: &'static str,
        literal: String,
    },
    #[error("unknown attribute definition type: {0}")]
    UnknownDefineType(String),
}
