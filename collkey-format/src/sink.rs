//! Byte sinks for sort key output
//!
//! Writers only append; they never read back what they wrote. A sink that
//! runs out of room keeps counting so that the caller learns the full key
//! length and can retry with a larger buffer.

/// Append-only destination for sort key bytes.
pub trait SortKeyByteSink {
    /// Append a run of bytes.
    fn append_bytes(&mut self, bytes: &[u8]);

    /// Append one byte.
    fn append_byte(&mut self, b: u8) {
        self.append_bytes(&[b]);
    }

    /// Number of bytes appended so far, including any that did not fit.
    fn number_of_bytes_appended(&self) -> usize;

    /// Bytes that still fit without overflowing.
    fn remaining_capacity(&self) -> usize;

    /// Whether more bytes were appended than the sink could hold.
    fn overflowed(&self) -> bool;
}

/// Growable sink backed by a `Vec<u8>`. Never overflows.
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    bytes: Vec<u8>,
}

impl VecSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty sink with preallocated room.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(capacity),
        }
    }

    /// Bytes written so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Consume the sink and return its bytes
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

impl SortKeyByteSink for VecSink {
    fn append_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    fn append_byte(&mut self, b: u8) {
        self.bytes.push(b);
    }

    fn number_of_bytes_appended(&self) -> usize {
        self.bytes.len()
    }

    fn remaining_capacity(&self) -> usize {
        usize::MAX - self.bytes.len()
    }

    fn overflowed(&self) -> bool {
        false
    }
}

/// Sink over a caller-provided buffer.
///
/// Bytes past the end of the buffer are dropped but still counted.
#[derive(Debug)]
pub struct FixedSink<'a> {
    buffer: &'a mut [u8],
    appended: usize,
}

impl<'a> FixedSink<'a> {
    /// Wrap a destination buffer
    pub fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            appended: 0,
        }
    }

    /// The bytes that fit into the buffer.
    pub fn written(&self) -> &[u8] {
        &self.buffer[..self.appended.min(self.buffer.len())]
    }
}

impl SortKeyByteSink for FixedSink<'_> {
    fn append_bytes(&mut self, bytes: &[u8]) {
        let start = self.appended;
        self.appended += bytes.len();
        if start < self.buffer.len() {
            let n = bytes.len().min(self.buffer.len() - start);
            self.buffer[start..start + n].copy_from_slice(&bytes[..n]);
        }
    }

    fn append_byte(&mut self, b: u8) {
        if let Some(slot) = self.buffer.get_mut(self.appended) {
            *slot = b;
        }
        self.appended += 1;
    }

    fn number_of_bytes_appended(&self) -> usize {
        self.appended
    }

    fn remaining_capacity(&self) -> usize {
        self.buffer.len().saturating_sub(self.appended)
    }

    fn overflowed(&self) -> bool {
        self.appended > self.buffer.len()
    }
}
