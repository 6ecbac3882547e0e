//! Error types for collkey

use thiserror::Error;

/// collkey error types
#[derive(Debug, Error)]
pub enum CollError {
    /// Data image does not start with the expected magic bytes.
    #[error("Invalid magic bytes")]
    InvalidMagic,
    /// Data image version is not supported by this decoder.
    #[error("Unsupported version: {0}")]
    UnsupportedVersion(u8),
    /// CRC32C verification failed for a data image.
    #[error("Checksum mismatch")]
    ChecksumMismatch,
    /// Encountered unexpected end of input.
    #[error("Unexpected end of input")]
    UnexpectedEof,
    /// A configured decode limit was exceeded.
    #[error("Limit exceeded: {0}")]
    LimitExceeded(String),
    /// Value is not a Unicode code point (0..=0x10FFFF).
    #[error("Code point out of range: 0x{0:X}")]
    CodePointOutOfRange(u32),
    /// Byte sequence is not a valid BOCSU run.
    #[error("Invalid BOCSU bytes at offset {0}")]
    InvalidBocsu(usize),
    /// A collation setting value is unknown or out of range.
    #[error("Invalid setting: {0}")]
    InvalidSetting(String),
    /// Script reordering request is malformed (duplicate, aliased, or mixed with `default`).
    #[error("Invalid reorder request: {0}")]
    InvalidReorder(String),
    /// The permuted script ranges need more primary lead bytes than exist.
    #[error("Reordering too many partial-primary-lead-byte scripts")]
    ReorderOverflow,
    /// A CE32 carries a tag that cannot be resolved in this context.
    #[error("Unsupported CE32 tag {0} for 0x{1:08X}")]
    UnsupportedTag(u8, u32),
    /// Collation data is internally inconsistent (cyclic or dangling indirection).
    #[error("Malformed collation data: {0}")]
    MalformedData(String),
    /// I/O operation failed while reading or writing data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CollError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn read_image(missing: &std::path::Path) -> Result<Vec<u8>> {
        Ok(std::fs::read(missing)?)
    }

    #[test]
    fn test_io_errors_convert() {
        let err = read_image(std::path::Path::new("/nonexistent/collkey.ckd")).unwrap_err();
        assert!(matches!(err, CollError::Io(_)));
        assert!(err.to_string().starts_with("I/O error"));
    }
}
