//! Bounds-checked cursor over an in-memory byte slice.

use crate::BufferError;

/// Big-endian reader over a borrowed slice.
///
/// A read that would run past the end fails with
/// [`BufferError::UnexpectedEof`] and leaves the cursor where it was.
///
/// ```
/// use cbor_exact_buffers::Reader;
///
/// let mut reader = Reader::new(&[0x19, 0x03, 0xe8]);
/// assert_eq!(reader.u8().unwrap(), 0x19);
/// assert_eq!(reader.u16().unwrap(), 1000);
/// assert!(reader.u8().is_err());
/// assert_eq!(reader.offset(), 3);
/// ```
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the number of bytes not yet read.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    /// Returns the next byte without advancing, or `None` at the end.
    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.offset).copied()
    }

    /// Borrows the next `len` bytes and moves past them.
    pub fn take(&mut self, len: usize) -> Result<&'a [u8], BufferError> {
        let remaining = self.remaining();
        if len > remaining {
            return Err(BufferError::UnexpectedEof {
                offset: self.data.len(),
                needed: len - remaining,
            });
        }
        let start = self.offset;
        self.offset += len;
        Ok(&self.data[start..self.offset])
    }

    /// Advances the cursor by `len` bytes.
    pub fn skip(&mut self, len: usize) -> Result<(), BufferError> {
        self.take(len).map(|_| ())
    }

    /// Next `N` bytes as a fixed-size array.
    pub fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Reads one byte.
    #[inline]
    pub fn u8(&mut self) -> Result<u8, BufferError> {
        self.array::<1>().map(|[byte]| byte)
    }

    /// Reads a big-endian `u16`.
    #[inline]
    pub fn u16(&mut self) -> Result<u16, BufferError> {
        self.array().map(u16::from_be_bytes)
    }

    /// Reads a big-endian `u32`.
    #[inline]
    pub fn u32(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_be_bytes)
    }

    /// Reads a big-endian `u64`.
    #[inline]
    pub fn u64(&mut self) -> Result<u64, BufferError> {
        self.array().map(u64::from_be_bytes)
    }
}
