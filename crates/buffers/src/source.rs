//! Input abstraction shared by slice and stream decoding.

use std::io::{ErrorKind, Read};

use crate::{BufferError, Reader};

/// Largest single allocation made while reading a declared length from a
/// stream; longer payloads grow in chunks of this size.
const STREAM_CHUNK: usize = 64 * 1024;

/// A forward-only byte source.
pub trait ByteSource {
    /// Number of bytes consumed so far.
    fn position(&self) -> usize;

    /// Reads one byte.
    fn read_u8(&mut self) -> Result<u8, BufferError>;

    /// Reads exactly `len` bytes.
    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, BufferError>;

    /// Returns `true` once no further bytes are available.
    fn at_end(&mut self) -> Result<bool, BufferError>;

    fn read_u16(&mut self) -> Result<u16, BufferError> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn read_u32(&mut self) -> Result<u32, BufferError> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn read_u64(&mut self) -> Result<u64, BufferError> {
        let b = self.read_bytes(8)?;
        Ok(u64::from_be_bytes([
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        ]))
    }
}

impl ByteSource for Reader<'_> {
    fn position(&self) -> usize {
        self.offset()
    }

    fn read_u8(&mut self) -> Result<u8, BufferError> {
        self.u8()
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        self.take(len).map(<[u8]>::to_vec)
    }

    fn at_end(&mut self) -> Result<bool, BufferError> {
        Ok(self.remaining() == 0)
    }

    fn read_u16(&mut self) -> Result<u16, BufferError> {
        self.u16()
    }

    fn read_u32(&mut self) -> Result<u32, BufferError> {
        self.u32()
    }

    fn read_u64(&mut self) -> Result<u64, BufferError> {
        self.u64()
    }
}

/// Adapts an [`std::io::Read`] into a [`ByteSource`], consuming only the
/// bytes actually requested.
pub struct StreamSource<R: Read> {
    inner: R,
    position: usize,
    peeked: Option<u8>,
}

impl<R: Read> StreamSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            position: 0,
            peeked: None,
        }
    }

    /// Returns the wrapped reader. A byte buffered by [`ByteSource::at_end`]
    /// is lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn io_error(&self, err: std::io::Error) -> BufferError {
        BufferError::Io {
            offset: self.position,
            message: err.to_string(),
        }
    }

    fn fill(&mut self, out: &mut [u8]) -> Result<usize, BufferError> {
        let mut filled = 0;
        while filled < out.len() {
            match self.inner.read(&mut out[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(self.io_error(err)),
            }
        }
        Ok(filled)
    }
}

impl<R: Read> ByteSource for StreamSource<R> {
    fn position(&self) -> usize {
        self.position
    }

    fn read_u8(&mut self) -> Result<u8, BufferError> {
        if let Some(byte) = self.peeked.take() {
            self.position += 1;
            return Ok(byte);
        }
        let mut one = [0u8; 1];
        if self.fill(&mut one)? == 0 {
            return Err(BufferError::UnexpectedEof {
                offset: self.position,
                needed: 1,
            });
        }
        self.position += 1;
        Ok(one[0])
    }

    fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, BufferError> {
        let mut out = Vec::with_capacity(len.min(STREAM_CHUNK));
        if len > 0 {
            if let Some(byte) = self.peeked.take() {
                out.push(byte);
            }
        }
        while out.len() < len {
            let start = out.len();
            let step = (len - start).min(STREAM_CHUNK);
            out.resize(start + step, 0);
            let got = self.fill(&mut out[start..])?;
            if got < step {
                let have = start + got;
                self.position += have;
                return Err(BufferError::UnexpectedEof {
                    offset: self.position,
                    needed: len - have,
                });
            }
        }
        self.position += len;
        Ok(out)
    }

    fn at_end(&mut self) -> Result<bool, BufferError> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut one = [0u8; 1];
        if self.fill(&mut one)? == 0 {
            return Ok(true);
        }
        self.peeked = Some(one[0]);
        Ok(false)
    }
}
