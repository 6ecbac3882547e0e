//! Variable-length integers (ULEB128) and a bounds-checked byte reader for
//! data images

use crate::error::{CollError, Result};
use smallvec::SmallVec;

/// Encode a u64 as ULEB128
pub fn encode_uleb128(val: u64) -> SmallVec<[u8; 10]> {
    let mut result = SmallVec::new();
    let mut x = val;

    while x >= 0x80 {
        result.push((x & 0x7F) as u8 | 0x80);
        x >>= 7;
    }
    result.push(x as u8);

    result
}

/// Append a ULEB128 value to `out`
pub fn put_uleb128(out: &mut Vec<u8>, val: u64) {
    out.extend_from_slice(&encode_uleb128(val));
}

/// Decode ULEB128 from the front of `bytes`, returning the value and its length
pub fn decode_uleb128(bytes: &[u8]) -> Result<(u64, usize)> {
    let mut result = 0u64;
    let mut shift = 0;

    for (i, &byte) in bytes.iter().enumerate() {
        if i >= 10 {
            return Err(CollError::LimitExceeded("ULEB128 too long".to_string()));
        }

        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok((result, i + 1));
        }

        shift += 7;
    }

    Err(CollError::UnexpectedEof)
}

/// Cursor over a data image section
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    /// Read one byte
    pub fn read_u8(&mut self) -> Result<u8> {
        let b = *self.bytes.get(self.pos).ok_or(CollError::UnexpectedEof)?;
        self.pos += 1;
        Ok(b)
    }

    /// Read a little-endian u32
    pub fn read_u32_le(&mut self) -> Result<u32> {
        let s = self.read_slice(4)?;
        Ok(u32::from_le_bytes([s[0], s[1], s[2], s[3]]))
    }

    /// Read a ULEB128 value
    pub fn read_uleb128(&mut self) -> Result<u64> {
        let (val, len) = decode_uleb128(&self.bytes[self.pos..])?;
        self.pos += len;
        Ok(val)
    }

    /// Read a ULEB128 count and check it against `limit`
    pub fn read_count(&mut self, limit: usize, what: &str) -> Result<usize> {
        let n = self.read_uleb128()?;
        if n > limit as u64 {
            return Err(CollError::LimitExceeded(format!(
                "{} count {} exceeds limit {}",
                what, n, limit
            )));
        }
        Ok(n as usize)
    }

    /// Read `len` raw bytes
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(CollError::UnexpectedEof);
        }
        let s = &self.bytes[self.pos..self.pos + len];
        self.pos += len;
        Ok(s)
    }
}
