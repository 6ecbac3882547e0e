//! Data image header

use crate::constants::DATA_MAGIC;
use crate::error::{CollError, Result};
use crate::varint::{encode_uleb128, ByteReader};

/// Image carries a Jamo CE32 table for Hangul syllables.
pub const FLAG_HAS_JAMO: u32 = 1 << 0;

/// Header at the start of a collation data image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataHeader {
    /// Image flags
    pub flags: u32,
    /// Primary weight of numeric collation digits (lead byte only)
    pub numeric_primary: u32,
    /// Free-form description (UTF-8), e.g. the data's source and version
    pub description: String,
}

impl DataHeader {
    /// Encode header to bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut result = Vec::new();

        result.extend_from_slice(&DATA_MAGIC);
        result.extend_from_slice(&self.flags.to_le_bytes());
        result.extend_from_slice(&self.numeric_primary.to_le_bytes());

        let description = self.description.as_bytes();
        result.extend_from_slice(&encode_uleb128(description.len() as u64));
        result.extend_from_slice(description);

        result
    }

    /// Decode header from the front of `reader`
    pub fn decode(reader: &mut ByteReader<'_>) -> Result<Self> {
        let magic = reader.read_slice(4)?;
        if magic[..3] != DATA_MAGIC[..3] {
            return Err(CollError::InvalidMagic);
        }
        let version = magic[3];
        if version != DATA_MAGIC[3] {
            return Err(CollError::UnsupportedVersion(version));
        }

        let flags = reader.read_u32_le()?;
        let numeric_primary = reader.read_u32_le()?;

        let description_len = reader.read_count(4096, "description")?;
        let description = std::str::from_utf8(reader.read_slice(description_len)?)
            .map_err(|_| CollError::MalformedData("description is not UTF-8".to_string()))?
            .to_string();

        Ok(Self {
            flags,
            numeric_primary,
            description,
        })
    }

    /// Check if the Jamo table flag is set
    pub fn has_jamo(&self) -> bool {
        self.flags & FLAG_HAS_JAMO != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_header_roundtrip() {
        let header = DataHeader {
            flags: FLAG_HAS_JAMO,
            numeric_primary: 0x1000_0000,
            description: "sample root".to_string(),
        };
        let encoded = header.encode();
        let mut reader = ByteReader::new(&encoded);
        let decoded = DataHeader::decode(&mut reader).unwrap();
        assert_eq!(decoded, header);
        assert!(decoded.has_jamo());
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_data_header_invalid_magic() {
        let mut encoded = DataHeader {
            flags: 0,
            numeric_primary: 0,
            description: String::new(),
        }
        .encode();
        encoded[0] = b'X';
        let err = DataHeader::decode(&mut ByteReader::new(&encoded)).unwrap_err();
        assert!(matches!(err, CollError::InvalidMagic));
    }

    #[test]
    fn test_data_header_unsupported_version() {
        let mut encoded = DataHeader {
            flags: 0,
            numeric_primary: 0,
            description: String::new(),
        }
        .encode();
        encoded[3] = 9;
        let err = DataHeader::decode(&mut ByteReader::new(&encoded)).unwrap_err();
        assert!(matches!(err, CollError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_data_header_truncated() {
        let encoded = DataHeader {
            flags: 0,
            numeric_primary: 0,
            description: "abc".to_string(),
        }
        .encode();
        let err = DataHeader::decode(&mut ByteReader::new(&encoded[..encoded.len() - 1]))
            .unwrap_err();
        assert!(matches!(err, CollError::UnexpectedEof));
    }
}
