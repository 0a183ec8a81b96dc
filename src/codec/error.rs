//! Codec error types.

use thiserror::Error;

/// Errors raised while encoding or decoding FastRPC messages.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("invalid magic bytes: expected 0xCA11, got {0:02x?}")]
    InvalidMagic(Vec<u8>),

    #[error("unsupported protocol version: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("truncated message: need {needed} more bytes at offset {offset}")]
    Truncated { offset: usize, needed: usize },

    #[error("unknown type tag {tag} at offset {offset}")]
    UnknownType { tag: u8, offset: usize },

    #[error("invalid UTF-8 in string at offset {0}")]
    InvalidUtf8(usize),

    #[error("integer does not fit in 64 bits at offset {0}")]
    IntegerOverflow(usize),

    #[error("name of {0} bytes exceeds the 255 byte limit")]
    NameTooLong(usize),

    #[error("invalid datetime at offset {0}")]
    InvalidDateTime(usize),

    #[error("year {0} is outside the encodable range 1600..=3647")]
    DateOutOfRange(i32),

    #[error("nesting deeper than {0} levels")]
    TooDeep(usize),

    #[error("{0} trailing bytes after message")]
    TrailingBytes(usize),

    #[error("expected {expected}, found type tag {tag}")]
    UnexpectedMessage { expected: &'static str, tag: u8 },

    #[error("malformed fault response")]
    InvalidFault,

    #[error("fault {code}: {message}")]
    Fault { code: i64, message: String },
}
