//! Append-only big-endian byte sink for the encoders.

/// Growable output buffer. Bytes appended since the last [`Writer::flush`]
/// form the pending output; `flush` hands them out and starts a new
/// segment while keeping the allocation.
///
/// ```
/// use cbor_exact_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8u16(0x19, 0x03e8);
/// assert_eq!(writer.flush(), [0x19, 0x03, 0xe8]);
/// writer.utf8("ok");
/// assert_eq!(writer.flush(), b"ok");
/// ```
#[derive(Debug, Clone)]
pub struct Writer {
    bytes: Vec<u8>,
    /// Start of the pending segment.
    mark: usize,
    chunk: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a writer that grows in 1 KiB steps.
    pub fn new() -> Self {
        Self::with_alloc_size(1024)
    }

    /// Creates a writer whose minimum growth step is `chunk`, at least 16
    /// bytes.
    pub fn with_alloc_size(chunk: usize) -> Self {
        let chunk = chunk.max(16);
        Self {
            bytes: Vec::with_capacity(chunk),
            mark: 0,
            chunk,
        }
    }

    /// Makes room for `additional` more bytes without reallocating midway.
    pub fn ensure_capacity(&mut self, additional: usize) {
        let spare = self.bytes.capacity() - self.bytes.len();
        if spare >= additional {
            return;
        }
        if self.mark > 0 && self.mark == self.bytes.len() {
            self.bytes.clear();
            self.mark = 0;
        }
        self.bytes.reserve(additional.max(self.chunk));
    }

    /// Pending byte count.
    pub fn len(&self) -> usize {
        self.bytes.len() - self.mark
    }

    /// Returns `true` when nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Discards the pending segment.
    pub fn reset(&mut self) {
        self.bytes.truncate(self.mark);
    }

    /// Takes the pending segment.
    pub fn flush(&mut self) -> Vec<u8> {
        let out = self.bytes[self.mark..].to_vec();
        self.mark = self.bytes.len();
        out
    }

    /// Appends one byte.
    #[inline]
    pub fn u8(&mut self, value: u8) {
        self.ensure_capacity(1);
        self.bytes.push(value);
    }

    /// Appends a big-endian `u16`.
    #[inline]
    pub fn u16(&mut self, value: u16) {
        self.buf(&value.to_be_bytes());
    }

    /// Appends a big-endian `u32`.
    #[inline]
    pub fn u32(&mut self, value: u32) {
        self.buf(&value.to_be_bytes());
    }

    /// Appends a big-endian `u64`.
    #[inline]
    pub fn u64(&mut self, value: u64) {
        self.buf(&value.to_be_bytes());
    }

    /// Initial byte plus a 2-byte argument, as in a CBOR header.
    pub fn u8u16(&mut self, head: u8, value: u16) {
        self.ensure_capacity(3);
        self.bytes.push(head);
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Initial byte plus a 4-byte argument.
    pub fn u8u32(&mut self, head: u8, value: u32) {
        self.ensure_capacity(5);
        self.bytes.push(head);
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Initial byte plus an 8-byte argument.
    pub fn u8u64(&mut self, head: u8, value: u64) {
        self.ensure_capacity(9);
        self.bytes.push(head);
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Appends raw bytes.
    pub fn buf(&mut self, data: &[u8]) {
        self.ensure_capacity(data.len());
        self.bytes.extend_from_slice(data);
    }

    /// Appends the UTF-8 bytes of `text`, returning how many were written.
    pub fn utf8(&mut self, text: &str) -> usize {
        self.buf(text.as_bytes());
        text.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_forms_are_big_endian() {
        let mut writer = Writer::new();
        writer.u8u16(0x19, 0x0102);
        writer.u8u32(0x1a, 0x0304_0506);
        writer.u8u64(0x1b, 7);
        assert_eq!(
            writer.flush(),
            [0x19, 1, 2, 0x1a, 3, 4, 5, 6, 0x1b, 0, 0, 0, 0, 0, 0, 0, 7]
        );
    }

    #[test]
    fn flush_returns_only_the_pending_segment() {
        let mut writer = Writer::new();
        writer.u16(0xf5f6);
        assert_eq!(writer.flush(), [0xf5, 0xf6]);
        assert!(writer.is_empty());
        writer.u32(0x6e75_6c6c);
        assert_eq!(writer.flush(), b"null");
    }

    #[test]
    fn reset_keeps_flushed_output_intact() {
        let mut writer = Writer::new();
        writer.utf8("keep");
        let kept = writer.flush();
        writer.u64(u64::MAX);
        assert_eq!(writer.len(), 8);
        writer.reset();
        assert!(writer.is_empty());
        writer.u8(0x80);
        assert_eq!(writer.flush(), [0x80]);
        assert_eq!(kept, b"keep");
    }

    #[test]
    fn large_writes_grow_past_the_chunk() {
        let mut writer = Writer::with_alloc_size(4);
        writer.buf(&[0xaa; 3000]);
        writer.u8(0x01);
        let out = writer.flush();
        assert_eq!(out.len(), 3001);
        assert!(out[..3000].iter().all(|&b| b == 0xaa));
        assert_eq!(out[3000], 0x01);
    }

    #[test]
    fn utf8_counts_bytes_not_chars() {
        let mut writer = Writer::new();
        assert_eq!(writer.utf8("naïve"), 6);
        assert_eq!(writer.flush(), "naïve".as_bytes());
    }
}
