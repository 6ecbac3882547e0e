//! CRC32C checksums for data images

use crate::error::{CollError, Result};

/// Compute CRC32C for data
pub fn compute_crc32c(data: &[u8]) -> u32 {
    crc32c::crc32c(data)
}

/// Split off the trailing little-endian CRC32C and verify it covers the rest.
///
/// Returns the covered bytes.
pub fn verify_trailing_crc32c(image: &[u8]) -> Result<&[u8]> {
    if image.len() < 4 {
        return Err(CollError::UnexpectedEof);
    }
    let (body, tail) = image.split_at(image.len() - 4);
    let expected = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
    if compute_crc32c(body) == expected {
        Ok(body)
    } else {
        Err(CollError::ChecksumMismatch)
    }
}
