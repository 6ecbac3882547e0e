//! Binary collation data images
//!
//! Layout: [`DataHeader`], then the sections below as ULEB128 counts and
//! values, then a little-endian CRC32C over everything before it.
//!
//! ```text
//! trie:        error_value, index[], data[]
//! ce32s[]  ces[]  contexts[]
//! jamo[67]     (only with FLAG_HAS_JAMO)
//! compressible 32 raw bytes, bit i of byte j = lead byte 8j+i
//! scripts:     num_scripts, scripts_index[], script_starts[]
//! unsafe:      (start, end)[]
//! ```
//!
//! Images hold root data only; tailorings refer to their base at runtime.

use crate::data::{CollationData, LeadByteSet, JAMO_CE32S_LENGTH};
use crate::trie::{CodePointTrie, INDEX_LEN};
use collkey_format::checksum::{compute_crc32c, verify_trailing_crc32c};
use collkey_format::header::FLAG_HAS_JAMO;
use collkey_format::varint::{put_uleb128, ByteReader};
use collkey_format::{CollError, DataHeader, Limits, Result};
use tracing::debug;

fn put_values<T: Copy + Into<u64>>(out: &mut Vec<u8>, values: &[T]) {
    put_uleb128(out, values.len() as u64);
    for &v in values {
        put_uleb128(out, v.into());
    }
}

fn read_u16(reader: &mut ByteReader<'_>, what: &str) -> Result<u16> {
    let v = reader.read_uleb128()?;
    u16::try_from(v).map_err(|_| CollError::MalformedData(format!("{} value {} exceeds u16", what, v)))
}

fn read_u32(reader: &mut ByteReader<'_>, what: &str) -> Result<u32> {
    let v = reader.read_uleb128()?;
    u32::try_from(v).map_err(|_| CollError::MalformedData(format!("{} value {} exceeds u32", what, v)))
}

fn read_u32s(reader: &mut ByteReader<'_>, limit: usize, what: &str) -> Result<Vec<u32>> {
    let n = reader.read_count(limit, what)?;
    (0..n).map(|_| read_u32(reader, what)).collect()
}

fn read_u16s(reader: &mut ByteReader<'_>, limit: usize, what: &str) -> Result<Vec<u16>> {
    let n = reader.read_count(limit, what)?;
    (0..n).map(|_| read_u16(reader, what)).collect()
}

impl CollationData {
    /// Serialize this root data into an image.
    pub fn to_image(&self, description: &str) -> Result<Vec<u8>> {
        if self.base.is_some() {
            return Err(CollError::InvalidSetting(
                "only root data can be written as an image".to_string(),
            ));
        }
        let header = DataHeader {
            flags: if self.jamo_ce32s.is_empty() { 0 } else { FLAG_HAS_JAMO },
            numeric_primary: self.numeric_primary,
            description: description.to_string(),
        };
        let mut out = header.encode();

        put_uleb128(&mut out, self.trie.error_value() as u64);
        put_values(&mut out, self.trie.index());
        put_values(&mut out, self.trie.data());
        put_values(&mut out, &self.ce32s);
        put_values(&mut out, &self.ces);
        put_values(&mut out, &self.contexts);
        if header.has_jamo() {
            for &ce32 in &self.jamo_ce32s {
                put_uleb128(&mut out, ce32 as u64);
            }
        }

        let mut bits = [0u8; 32];
        for lead in self.compressible_bytes.iter_ones() {
            bits[lead / 8] |= 1 << (lead % 8);
        }
        out.extend_from_slice(&bits);

        put_uleb128(&mut out, self.num_scripts as u64);
        put_values(&mut out, &self.scripts_index);
        put_values(&mut out, &self.script_starts);

        put_uleb128(&mut out, self.unsafe_backward.len() as u64);
        for &(start, end) in &self.unsafe_backward {
            put_uleb128(&mut out, start as u64);
            put_uleb128(&mut out, end as u64);
        }

        let crc = compute_crc32c(&out);
        out.extend_from_slice(&crc.to_le_bytes());
        debug!(bytes = out.len(), ce32s = self.ce32s.len(), "wrote collation data image");
        Ok(out)
    }

    /// Decode and validate an image.
    pub fn from_image(bytes: &[u8], limits: &Limits) -> Result<Self> {
        let body = verify_trailing_crc32c(bytes)?;
        let mut reader = ByteReader::new(body);
        let header = DataHeader::decode(&mut reader)?;

        let error_value = read_u32(&mut reader, "trie error value")?;
        let index = read_u32s(&mut reader, limits.max_trie_index_len.min(INDEX_LEN), "trie index")?;
        let trie_data = read_u32s(&mut reader, limits.max_trie_data_len, "trie data")?;
        let trie = CodePointTrie::from_parts(index, trie_data, error_value, limits)?;

        let ce32s = read_u32s(&mut reader, limits.max_ce32s, "ce32s")?;
        let n = reader.read_count(limits.max_ces, "ces")?;
        let ces = (0..n)
            .map(|_| reader.read_uleb128())
            .collect::<Result<Vec<u64>>>()?;
        let contexts = read_u16s(&mut reader, limits.max_contexts, "contexts")?;
        let jamo_ce32s = if header.has_jamo() {
            (0..JAMO_CE32S_LENGTH)
                .map(|_| read_u32(&mut reader, "jamo"))
                .collect::<Result<Vec<u32>>>()?
        } else {
            Vec::new()
        };

        let bits = reader.read_slice(32)?;
        let mut compressible_bytes = LeadByteSet::ZERO;
        for lead in 0..256 {
            if bits[lead / 8] & (1 << (lead % 8)) != 0 {
                compressible_bytes.set(lead, true);
            }
        }

        let num_scripts = reader.read_count(limits.max_scripts, "scripts")?;
        let scripts_index = read_u16s(&mut reader, limits.max_scripts + 16, "scripts index")?;
        let script_starts = read_u16s(&mut reader, limits.max_script_starts, "script starts")?;

        let n = reader.read_count(limits.max_unsafe_ranges, "unsafe ranges")?;
        let unsafe_backward = (0..n)
            .map(|_| Ok((read_u32(&mut reader, "range")?, read_u32(&mut reader, "range")?)))
            .collect::<Result<Vec<(u32, u32)>>>()?;

        if reader.remaining() != 0 {
            return Err(CollError::MalformedData(format!(
                "{} trailing bytes after image sections",
                reader.remaining()
            )));
        }

        let data = CollationData {
            trie,
            ce32s,
            ces,
            contexts,
            base: None,
            jamo_ce32s,
            compressible_bytes,
            numeric_primary: header.numeric_primary,
            scripts_index,
            script_starts,
            num_scripts,
            unsafe_backward,
        };
        data.validate()?;
        debug!(
            description = %header.description,
            bytes = bytes.len(),
            scripts = data.num_scripts,
            "loaded collation data image"
        );
        Ok(data)
    }

    /// Header of an image, after checking its checksum
    pub fn read_image_header(bytes: &[u8]) -> Result<DataHeader> {
        let body = verify_trailing_crc32c(bytes)?;
        DataHeader::decode(&mut ByteReader::new(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_builder::CollationDataBuilder;
    use crate::sample::{build_sample_root, sample_root, SAMPLE_DESCRIPTION};
    use collkey_format::constants::*;

    #[test]
    fn test_image_preserves_lookups() {
        let data = build_sample_root().unwrap();
        let image = data.to_image(SAMPLE_DESCRIPTION).unwrap();
        let loaded = CollationData::from_image(&image, &Limits::default()).unwrap();

        for c in ['a', 'Z', '-', '7', '\u{3b1}', '\u{5d0}', '\u{fffe}'] {
            assert_eq!(
                loaded.get_single_ce(c as u32).unwrap(),
                data.get_single_ce(c as u32).unwrap()
            );
        }
        assert_eq!(loaded.jamo_ce32s(), data.jamo_ce32s());
        assert_eq!(loaded.compressible_bytes(), data.compressible_bytes());
        assert_eq!(
            loaded.make_reorder_ranges(&[SCRIPT_GREEK, SCRIPT_LATIN]).unwrap(),
            data.make_reorder_ranges(&[SCRIPT_GREEK, SCRIPT_LATIN]).unwrap()
        );
        assert!(loaded.is_unsafe_backward(0x301, false));
    }

    #[test]
    fn test_header_readable() {
        let image = build_sample_root().unwrap().to_image("abc").unwrap();
        let header = CollationData::read_image_header(&image).unwrap();
        assert_eq!(header.description, "abc");
        assert!(header.has_jamo());
    }

    #[test]
    fn test_corruption_detected() {
        let mut image = build_sample_root().unwrap().to_image("x").unwrap();
        let mid = image.len() / 2;
        image[mid] ^= 0x40;
        assert!(matches!(
            CollationData::from_image(&image, &Limits::default()),
            Err(CollError::ChecksumMismatch)
        ));
    }

    #[test]
    fn test_truncated_image() {
        assert!(matches!(
            CollationData::from_image(&[1, 2], &Limits::default()),
            Err(CollError::UnexpectedEof)
        ));
    }

    #[test]
    fn test_limits_enforced() {
        let image = build_sample_root().unwrap().to_image("x").unwrap();
        let limits = Limits {
            max_ce32s: 1,
            ..Limits::default()
        };
        assert!(matches!(
            CollationData::from_image(&image, &limits),
            Err(CollError::LimitExceeded(_))
        ));
    }

    #[test]
    fn test_tailoring_not_exported() {
        let tailoring = CollationDataBuilder::new_tailoring(sample_root().unwrap())
            .build()
            .unwrap();
        assert!(tailoring.to_image("t").is_err());
    }
}
