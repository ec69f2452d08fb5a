use std::fmt;

use cbor_exact_buffers::BufferError;
use cbor_exact_numbers::NumericError;
use thiserror::Error;

/// Broad classification of a [`CborError`], for callers that only recover
/// from some failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed binary or JSON input.
    Decode,
    /// An accessor or mutator was used on a kind that does not support it.
    InvalidState,
    /// A numeric conversion or trapped tower operation failed.
    Arithmetic,
    /// A bad or missing argument, including a cyclic value on encode.
    Argument,
    /// The output sink failed.
    Io,
}

/// Why a decode (binary or JSON) failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeReason {
    TruncatedInput,
    ReservedInitialByte(u8),
    UnexpectedBreak,
    NestingTooDeep,
    InvalidChunk,
    InvalidUtf8,
    InvalidSimpleValue(u8),
    InvalidTagPayload(u64),
    RejectedByHandler { tag: u64, message: String },
    BadReference,
    TooManyReferences,
    DuplicateKey,
    TrailingBytes,
    Json(&'static str),
    Io(String),
}

impl fmt::Display for DecodeReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TruncatedInput => f.write_str("unexpected end of input"),
            Self::ReservedInitialByte(byte) => write!(f, "reserved initial byte 0x{byte:02x}"),
            Self::UnexpectedBreak => f.write_str("break outside an indefinite-length item"),
            Self::NestingTooDeep => f.write_str("nesting too deep"),
            Self::InvalidChunk => f.write_str("invalid indefinite-length string chunk"),
            Self::InvalidUtf8 => f.write_str("invalid UTF-8 in text string"),
            Self::InvalidSimpleValue(value) => write!(f, "invalid one-byte simple value {value}"),
            Self::InvalidTagPayload(tag) => write!(f, "invalid payload for tag {tag}"),
            Self::RejectedByHandler { tag, message } => {
                write!(f, "tag {tag} handler rejected item: {message}")
            }
            Self::BadReference => f.write_str("reference to an undefined slot"),
            Self::TooManyReferences => f.write_str("reference table limit exceeded"),
            Self::DuplicateKey => f.write_str("duplicate map key"),
            Self::TrailingBytes => f.write_str("trailing bytes after a complete item"),
            Self::Json(message) => write!(f, "invalid JSON: {message}"),
            Self::Io(message) => write!(f, "read failed: {message}"),
        }
    }
}

/// Error type for the value model, codecs and registries.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CborError {
    #[error("decode error at offset {offset}: {reason}")]
    Decode { offset: usize, reason: DecodeReason },
    #[error("invalid state: {0}")]
    InvalidState(String),
    #[error("arithmetic error: {0}")]
    Arithmetic(String),
    #[error(transparent)]
    Numeric(#[from] NumericError),
    #[error("invalid argument: {0}")]
    Argument(String),
    #[error("missing argument: {0}")]
    NullArgument(&'static str),
    #[error("write failed: {0}")]
    Io(String),
}

impl CborError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decode { .. } => ErrorKind::Decode,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Arithmetic(_) | Self::Numeric(_) => ErrorKind::Arithmetic,
            Self::Argument(_) | Self::NullArgument(_) => ErrorKind::Argument,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    pub(crate) fn decode(offset: usize, reason: DecodeReason) -> Self {
        Self::Decode { offset, reason }
    }

    pub(crate) fn state(message: impl Into<String>) -> Self {
        Self::InvalidState(message.into())
    }

    pub(crate) fn arithmetic(message: impl Into<String>) -> Self {
        Self::Arithmetic(message.into())
    }

    pub(crate) fn argument(message: impl Into<String>) -> Self {
        Self::Argument(message.into())
    }

    /// Decode reason, if this is a decode error.
    pub fn decode_reason(&self) -> Option<&DecodeReason> {
        match self {
            Self::Decode { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

impl From<BufferError> for CborError {
    fn from(err: BufferError) -> Self {
        match err {
            BufferError::UnexpectedEof { offset, .. } => {
                Self::decode(offset, DecodeReason::TruncatedInput)
            }
            BufferError::Io { offset, message } => Self::decode(offset, DecodeReason::Io(message)),
        }
    }
}

impl From<std::io::Error> for CborError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
