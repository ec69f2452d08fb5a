//! Binary buffer primitives used by the cbor-exact codec.
//!
//! - [`Reader`]: bounds-checked big-endian reader over a byte slice.
//! - [`Writer`]: growable big-endian writer.
//! - [`ByteSource`]: the decoder's view of its input, implemented for
//!   [`Reader`] and for any [`std::io::Read`] through [`StreamSource`].

mod reader;
mod source;
mod writer;

pub use reader::Reader;
pub use source::{ByteSource, StreamSource};
pub use writer::Writer;

use thiserror::Error;

/// Error type for buffer reads.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// Fewer bytes were available than the read required.
    #[error("unexpected end of input at offset {offset} ({needed} more bytes needed)")]
    UnexpectedEof { offset: usize, needed: usize },
    /// The underlying stream failed.
    #[error("i/o error at offset {offset}: {message}")]
    Io { offset: usize, message: String },
}

impl BufferError {
    /// Byte offset at which the error occurred.
    pub fn offset(&self) -> usize {
        match self {
            BufferError::UnexpectedEof { offset, .. } | BufferError::Io { offset, .. } => *offset,
        }
    }
}
