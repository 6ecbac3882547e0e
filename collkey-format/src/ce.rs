//! Collation elements (CE) and their compact table form (CE32)
//!
//! A CE is 64 bits: `pppppppp ssss cctt` with a 32-bit primary weight,
//! a 16-bit secondary weight, and 16 bits of case (2), tertiary and
//! quaternary bits.
//!
//! A CE32 is either a "simple" packing of a primary with one secondary and
//! one tertiary byte, or a special value whose low byte is at least
//! [`SPECIAL_CE32_LOW_BYTE`]. Special CE32s carry a 4-bit [`Tag`] in the low
//! nibble and a payload (index, length, digit value) in the upper bits.
//!
//! The raw bit helpers are kept for hot loops; [`Ce32`] decodes the same
//! bits into a closed enum for everything else.

use crate::constants::*;
use crate::error::CollError;

/// Special CE32 tags (low nibble of a special CE32).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    /// Defer to the base data. Also marks code points without tailoring data.
    Fallback = 0,
    /// Primary weight in the upper 24 bits, common secondary and tertiary.
    LongPrimary = 1,
    /// Secondary and tertiary weights in the upper 24 bits, primary 0.
    LongSecondary = 2,
    /// Unused, never present in finished data.
    Reserved3 = 3,
    /// Two CEs packed into one CE32 (Latin mini expansion).
    LatinExpansion = 4,
    /// Expansion into the CE32 array.
    Expansion32 = 5,
    /// Expansion into the 64-bit CE array.
    Expansion = 6,
    /// Builder-only placeholder, never present in finished data.
    BuilderData = 7,
    /// Prefix (pre-context) mappings; the default CE32 is stored in the contexts.
    Prefix = 8,
    /// Contraction mappings; the default CE32 is stored in the contexts.
    Contraction = 9,
    /// Decimal digit; the non-numeric CE32 sits in the CE32 array.
    Digit = 10,
    /// U+0000 which is also used as the string terminator.
    U0000 = 11,
    /// Hangul syllable, decomposed into Jamo at runtime.
    Hangul = 12,
    /// Lead surrogate placeholder.
    LeadSurrogate = 13,
    /// Primary computed from the code point offset within a range.
    Offset = 14,
    /// Implicit weights, computed from the code point.
    Implicit = 15,
}

impl Tag {
    /// Convert from the low nibble of a CE32
    pub fn from_u8(val: u8) -> Result<Self, CollError> {
        Ok(match val {
            0 => Tag::Fallback,
            1 => Tag::LongPrimary,
            2 => Tag::LongSecondary,
            3 => Tag::Reserved3,
            4 => Tag::LatinExpansion,
            5 => Tag::Expansion32,
            6 => Tag::Expansion,
            7 => Tag::BuilderData,
            8 => Tag::Prefix,
            9 => Tag::Contraction,
            10 => Tag::Digit,
            11 => Tag::U0000,
            12 => Tag::Hangul,
            13 => Tag::LeadSurrogate,
            14 => Tag::Offset,
            15 => Tag::Implicit,
            _ => {
                return Err(CollError::InvalidSetting(format!(
                    "Unknown CE32 tag: {}",
                    val
                )))
            }
        })
    }

    /// Tags that only exist while building data.
    pub fn is_builder_only(self) -> bool {
        matches!(self, Tag::Reserved3 | Tag::BuilderData)
    }
}

/// Pack a primary weight with common secondary and tertiary weights.
#[inline]
pub const fn make_ce(primary: u32) -> u64 {
    ((primary as u64) << 32) | COMMON_SEC_AND_TER_CE
}

/// Pack all four weights into a CE.
///
/// Fields must already fit their widths: secondary and tertiary 16 bits,
/// quaternary 2 bits.
#[inline]
pub const fn make_ce_with_weights(p: u32, s: u32, t: u32, q: u32) -> u64 {
    ((p as u64) << 32) | ((s as u64) << 16) | (t as u64) | ((q as u64) << 6)
}

/// Primary weight of a CE.
#[inline]
pub const fn primary_of(ce: u64) -> u32 {
    (ce >> 32) as u32
}

/// Secondary weight of a CE.
#[inline]
pub const fn secondary_of(ce: u64) -> u32 {
    (ce as u32) >> 16
}

/// Case bits and tertiary weight of a CE.
#[inline]
pub const fn case_and_tertiary_of(ce: u64) -> u32 {
    (ce as u32) & 0xffff
}

/// Whether the CE32 is special (carries a tag).
#[inline]
pub const fn is_special_ce32(ce32: u32) -> bool {
    (ce32 & 0xff) >= SPECIAL_CE32_LOW_BYTE
}

/// Tag bits of a special CE32. Meaningless for simple CE32s.
#[inline]
pub const fn tag_bits_from_ce32(ce32: u32) -> u8 {
    (ce32 & 0xf) as u8
}

/// Tag of a special CE32.
#[inline]
pub fn tag_from_ce32(ce32: u32) -> Tag {
    // Four bits always map onto one of the sixteen tags.
    match Tag::from_u8(tag_bits_from_ce32(ce32)) {
        Ok(tag) => tag,
        Err(_) => unreachable!("tag nibble out of range"),
    }
}

/// Whether the CE32 is special with the given tag.
#[inline]
pub fn has_ce32_tag(ce32: u32, tag: Tag) -> bool {
    is_special_ce32(ce32) && tag_bits_from_ce32(ce32) == tag as u8
}

/// Long-primary CE32?
#[inline]
pub fn is_long_primary_ce32(ce32: u32) -> bool {
    has_ce32_tag(ce32, Tag::LongPrimary)
}

/// A simple CE32 or a long primary/secondary one: expands to exactly one CE
/// without any data lookup.
#[inline]
pub fn is_simple_or_long_ce32(ce32: u32) -> bool {
    !is_special_ce32(ce32)
        || matches!(tag_from_ce32(ce32), Tag::LongPrimary | Tag::LongSecondary)
}

/// Expands to one or two CEs without any data lookup.
#[inline]
pub fn is_self_contained_ce32(ce32: u32) -> bool {
    !is_special_ce32(ce32)
        || matches!(
            tag_from_ce32(ce32),
            Tag::LongPrimary | Tag::LongSecondary | Tag::LatinExpansion
        )
}

/// Prefix or contraction CE32.
#[inline]
pub fn ce32_has_context(ce32: u32) -> bool {
    is_special_ce32(ce32) && matches!(tag_from_ce32(ce32), Tag::Prefix | Tag::Contraction)
}

/// Index payload of a special CE32 (upper 19 bits).
#[inline]
pub const fn index_from_ce32(ce32: u32) -> u32 {
    ce32 >> 13
}

/// Length payload of an expansion CE32 (5 bits).
#[inline]
pub const fn length_from_ce32(ce32: u32) -> u32 {
    (ce32 >> 8) & 31
}

/// Digit value of a digit CE32.
#[inline]
pub const fn digit_from_ce32(ce32: u32) -> u8 {
    ((ce32 >> 8) & 0xf) as u8
}

/// First CE of a Latin mini expansion.
#[inline]
pub const fn latin_ce0_from_ce32(ce32: u32) -> u64 {
    (((ce32 & 0xff00_0000) as u64) << 32) | COMMON_SECONDARY_CE | (((ce32 & 0xff_0000) >> 8) as u64)
}

/// Second CE of a Latin mini expansion.
#[inline]
pub const fn latin_ce1_from_ce32(ce32: u32) -> u64 {
    (((ce32 & 0xff00) as u64) << 16) | COMMON_TERTIARY_CE
}

/// Special CE32 from a tag and an index.
#[inline]
pub const fn make_ce32_from_tag_and_index(tag: Tag, index: u32) -> u32 {
    (index << 13) | SPECIAL_CE32_LOW_BYTE | tag as u32
}

/// Special CE32 from a tag, an index and a 5-bit length.
#[inline]
pub const fn make_ce32_from_tag_index_and_length(tag: Tag, index: u32, length: u32) -> u32 {
    (index << 13) | (length << 8) | SPECIAL_CE32_LOW_BYTE | tag as u32
}

/// Long-primary CE32 for a primary whose low byte is 0.
#[inline]
pub const fn make_long_primary_ce32(primary: u32) -> u32 {
    primary | LONG_PRIMARY_CE32_LOW_BYTE
}

/// Long-secondary CE32 for the lower 32 CE bits with a zero low byte.
#[inline]
pub const fn make_long_secondary_ce32(lower32: u32) -> u32 {
    lower32 | SPECIAL_CE32_LOW_BYTE | Tag::LongSecondary as u32
}

/// Expand a simple CE32.
#[inline]
pub const fn ce_from_simple_ce32(ce32: u32) -> u64 {
    (((ce32 & 0xffff_0000) as u64) << 32) | (((ce32 & 0xff00) as u64) << 16) | (((ce32 & 0xff) as u64) << 8)
}

/// Expand a simple or long-primary/long-secondary CE32 into its CE.
///
/// Any other tag indirects into the data and cannot be expanded here.
pub fn ce_from_ce32(ce32: u32) -> Result<u64, CollError> {
    let tertiary = ce32 & 0xff;
    if tertiary < SPECIAL_CE32_LOW_BYTE {
        return Ok(ce_from_simple_ce32(ce32));
    }
    let upper = ce32 - tertiary;
    match tag_from_ce32(ce32) {
        Tag::LongPrimary => Ok(((upper as u64) << 32) | COMMON_SEC_AND_TER_CE),
        Tag::LongSecondary => Ok(upper as u64),
        tag => Err(CollError::UnsupportedTag(tag as u8, ce32)),
    }
}

/// Primary weight for a code point without an explicit mapping.
///
/// Three mixed-radix digits (18, 254, 251) over lead byte 0xFE keep the
/// weights strictly increasing with the code point and above every
/// assigned primary.
pub const fn unassigned_primary_from_code_point(c: u32) -> u32 {
    // Leave room for a primary weight below the first implicit one.
    let mut c = c + 1;
    let mut primary = 2 + (c % 18) * 14;
    c /= 18;
    primary |= (2 + (c % 254)) << 8;
    c /= 254;
    primary |= (4 + (c % 251)) << 16;
    primary | (UNASSIGNED_IMPLICIT_BYTE << 24)
}

/// CE for a code point without an explicit mapping.
#[inline]
pub const fn unassigned_ce_from_code_point(c: u32) -> u64 {
    make_ce(unassigned_primary_from_code_point(c))
}

/// Add `offset` to a two-byte primary, carrying into the lead byte.
///
/// Compressible lead bytes use second bytes 04..FE, others 02..FF.
pub const fn inc_two_byte_primary_by_offset(base: u32, compressible: bool, offset: u32) -> u32 {
    let mut offset = offset;
    let primary;
    if compressible {
        offset += ((base >> 16) & 0xff) - 4;
        primary = ((offset % 251) + 4) << 16;
        offset /= 251;
    } else {
        offset += ((base >> 16) & 0xff) - 2;
        primary = ((offset % 254) + 2) << 16;
        offset /= 254;
    }
    primary | ((base & 0xff00_0000) + (offset << 24))
}

/// Add `offset` to a three-byte primary, carrying into the upper bytes.
pub const fn inc_three_byte_primary_by_offset(base: u32, compressible: bool, offset: u32) -> u32 {
    let mut offset = offset + ((base >> 8) & 0xff) - 2;
    let mut primary = ((offset % 254) + 2) << 8;
    offset /= 254;
    if compressible {
        offset += ((base >> 16) & 0xff) - 4;
        primary |= ((offset % 251) + 4) << 16;
        offset /= 251;
    } else {
        offset += ((base >> 16) & 0xff) - 2;
        primary |= ((offset % 254) + 2) << 16;
        offset /= 254;
    }
    primary | ((base & 0xff00_0000) + (offset << 24))
}

/// Primary for `c` from offset-range data.
///
/// `data_ce` holds the base primary in its upper half; the lower half holds
/// the range's first code point (bits 8..31), a compressible flag (0x80) and
/// the per-code-point step (0x7f).
pub fn three_byte_primary_for_offset_data(c: u32, data_ce: u64) -> u32 {
    let p = (data_ce >> 32) as u32;
    let lower32 = data_ce as u32;
    let offset = (c - (lower32 >> 8)) * (lower32 & 0x7f);
    let compressible = (lower32 & 0x80) != 0;
    inc_three_byte_primary_by_offset(p, compressible, offset)
}

/// A decoded CE32.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ce32 {
    /// Simple primary/secondary/tertiary packing.
    Simple(u32),
    /// Defer to the base data.
    Fallback,
    /// Primary weight with common secondary and tertiary.
    LongPrimary {
        /// Primary weight, low byte 0.
        primary: u32,
    },
    /// Secondary and tertiary weights, primary ignorable.
    LongSecondary {
        /// Lower 32 bits of the CE, low byte 0.
        lower32: u32,
    },
    /// Two CEs packed into the payload.
    LatinExpansion {
        /// Raw CE32, see [`latin_ce0_from_ce32`].
        raw: u32,
    },
    /// Run of CE32s in the CE32 array.
    Expansion32 {
        /// Start in the CE32 array.
        index: u32,
        /// Length, 0 means "stored at index-1" for long expansions.
        length: u32,
    },
    /// Run of CEs in the CE array.
    Expansion {
        /// Start in the CE array.
        index: u32,
        /// Length, see [`Ce32::Expansion32`].
        length: u32,
    },
    /// Prefix data in the contexts table.
    Prefix {
        /// Start in the contexts table.
        index: u32,
    },
    /// Contraction data in the contexts table.
    Contraction {
        /// Start in the contexts table.
        index: u32,
        /// Contraction flags (5 bits).
        flags: u8,
    },
    /// Decimal digit.
    Digit {
        /// Index of the non-numeric CE32 in the CE32 array.
        index: u32,
        /// Digit value 0..9.
        value: u8,
    },
    /// U+0000, resolves via CE32 array slot 0.
    U0000,
    /// Hangul syllable.
    Hangul {
        /// Bits above the tag nibble.
        bits: u32,
    },
    /// Lead surrogate placeholder.
    LeadSurrogate {
        /// Bits above the tag nibble.
        bits: u32,
    },
    /// Offset range.
    Offset {
        /// Index of the range data in the CE array.
        index: u32,
    },
    /// Computed implicit weight.
    Implicit {
        /// Bits above the tag nibble (all ones for unassigned).
        bits: u32,
    },
    /// Builder-only tags; never valid at runtime.
    BuilderOnly {
        /// Raw CE32.
        raw: u32,
    },
}

impl Ce32 {
    /// Decode a raw CE32.
    pub fn decode(ce32: u32) -> Self {
        if !is_special_ce32(ce32) {
            return Ce32::Simple(ce32);
        }
        let index = index_from_ce32(ce32);
        match tag_from_ce32(ce32) {
            Tag::Fallback => Ce32::Fallback,
            Tag::LongPrimary => Ce32::LongPrimary {
                primary: ce32 & 0xffff_ff00,
            },
            Tag::LongSecondary => Ce32::LongSecondary {
                lower32: ce32 & 0xffff_ff00,
            },
            Tag::LatinExpansion => Ce32::LatinExpansion { raw: ce32 },
            Tag::Expansion32 => Ce32::Expansion32 {
                index,
                length: length_from_ce32(ce32),
            },
            Tag::Expansion => Ce32::Expansion {
                index,
                length: length_from_ce32(ce32),
            },
            Tag::Prefix => Ce32::Prefix { index },
            Tag::Contraction => Ce32::Contraction {
                index,
                flags: length_from_ce32(ce32) as u8,
            },
            Tag::Digit => Ce32::Digit {
                index,
                value: digit_from_ce32(ce32),
            },
            Tag::U0000 => Ce32::U0000,
            Tag::Hangul => Ce32::Hangul { bits: ce32 >> 4 },
            Tag::LeadSurrogate => Ce32::LeadSurrogate { bits: ce32 >> 4 },
            Tag::Offset => Ce32::Offset { index },
            Tag::Implicit => Ce32::Implicit { bits: ce32 >> 4 },
            Tag::Reserved3 | Tag::BuilderData => Ce32::BuilderOnly { raw: ce32 },
        }
    }

    /// Encode back into the raw CE32 bits.
    pub fn encode(self) -> u32 {
        match self {
            Ce32::Simple(raw) => raw,
            Ce32::Fallback => FALLBACK_CE32,
            Ce32::LongPrimary { primary } => make_long_primary_ce32(primary),
            Ce32::LongSecondary { lower32 } => make_long_secondary_ce32(lower32),
            Ce32::LatinExpansion { raw } | Ce32::BuilderOnly { raw } => raw,
            Ce32::Expansion32 { index, length } => {
                make_ce32_from_tag_index_and_length(Tag::Expansion32, index, length)
            }
            Ce32::Expansion { index, length } => {
                make_ce32_from_tag_index_and_length(Tag::Expansion, index, length)
            }
            Ce32::Prefix { index } => make_ce32_from_tag_and_index(Tag::Prefix, index),
            Ce32::Contraction { index, flags } => {
                make_ce32_from_tag_index_and_length(Tag::Contraction, index, flags as u32)
            }
            Ce32::Digit { index, value } => {
                make_ce32_from_tag_index_and_length(Tag::Digit, index, value as u32)
            }
            Ce32::U0000 => make_ce32_from_tag_and_index(Tag::U0000, 0),
            Ce32::Hangul { bits } => (bits << 4) | Tag::Hangul as u32,
            Ce32::LeadSurrogate { bits } => (bits << 4) | Tag::LeadSurrogate as u32,
            Ce32::Offset { index } => make_ce32_from_tag_and_index(Tag::Offset, index),
            Ce32::Implicit { bits } => (bits << 4) | Tag::Implicit as u32,
        }
    }

    /// The tag, or `None` for a simple CE32.
    pub fn tag(self) -> Option<Tag> {
        let raw = self.encode();
        is_special_ce32(raw).then(|| tag_from_ce32(raw))
    }
}
