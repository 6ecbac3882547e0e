//! Constants and reserved byte values for collkey sort keys and data images
//!
//! Every byte value and compression boundary here is part of the sort key
//! wire format. Two writers that disagree on any of them produce keys that
//! do not compare against each other.

/// Data image magic: "CKD" + version 0x01
pub const DATA_MAGIC: [u8; 4] = [0x43, 0x4B, 0x44, 0x01]; // "CKD\x01"

/// Sort key terminator byte.
pub const TERMINATOR_BYTE: u8 = 0;
/// Separates the levels of a sort key.
pub const LEVEL_SEPARATOR_BYTE: u8 = 1;
/// Merge separator (U+FFFE) byte, at every level.
pub const MERGE_SEPARATOR_BYTE: u8 = 2;
/// Primary weight of the merge separator.
pub const MERGE_SEPARATOR_PRIMARY: u32 = 0x0200_0000;
/// CE32 of the merge separator.
pub const MERGE_SEPARATOR_CE32: u32 = 0x0200_0505;

/// Primary compression marker: the next primary is lower than the previous one.
pub const PRIMARY_COMPRESSION_LOW_BYTE: u8 = 3;
/// Primary compression marker: the next primary is higher than the previous one.
pub const PRIMARY_COMPRESSION_HIGH_BYTE: u8 = 0xff;

/// Default secondary/tertiary weight lead byte.
pub const COMMON_BYTE: u8 = 5;
/// 16-bit common secondary or tertiary weight.
pub const COMMON_WEIGHT16: u32 = 0x0500;
/// Middle 16 bits of a CE with a common secondary weight.
pub const COMMON_SECONDARY_CE: u64 = 0x0500_0000;
/// Lower 16 bits of a CE with a common tertiary weight.
pub const COMMON_TERTIARY_CE: u64 = 0x0500;
/// Lower 32 bits of a CE with common secondary and tertiary weights.
pub const COMMON_SEC_AND_TER_CE: u64 = 0x0500_0500;

/// Secondary weight field of the lower 32 CE bits.
pub const SECONDARY_MASK: u32 = 0xffff_0000;
/// Case bits of the lower 32 CE bits.
pub const CASE_MASK: u32 = 0xc000;
/// Tertiary weight bits without case and quaternary bits.
pub const ONLY_TERTIARY_MASK: u32 = 0x3f3f;
/// Case bits plus tertiary weight.
pub const CASE_AND_TERTIARY_MASK: u32 = CASE_MASK | ONLY_TERTIARY_MASK;
/// Quaternary bits carried in the spare tertiary byte.
pub const QUATERNARY_MASK: u32 = 0xc0;

/// Secondary and tertiary weights of the end-of-input CE.
pub const NO_CE_WEIGHT16: u32 = 0x0100;
/// Primary weight of the end-of-input CE.
pub const NO_CE_PRIMARY: u32 = 1;
/// End-of-input sentinel CE.
pub const NO_CE: u64 = 0x1_0100_0100;

/// Lead byte of implicit primaries for unassigned code points.
pub const UNASSIGNED_IMPLICIT_BYTE: u32 = 0xfe;
/// First primary weight used for unassigned code points.
pub const FIRST_UNASSIGNED_PRIMARY: u32 = 0xfe04_0000;
/// Lead byte of trailing weights.
pub const TRAIL_WEIGHT_BYTE: u32 = 0xff;
/// First primary of the trailing range.
pub const FIRST_TRAILING_PRIMARY: u32 = 0xff02_0200;
/// Highest primary weight.
pub const MAX_PRIMARY: u32 = 0xffff_0000;
/// Highest CE32 that is not special.
pub const MAX_REGULAR_CE32: u32 = 0xffff_0505;
/// Primary of U+FFFD.
pub const FFFD_PRIMARY: u32 = MAX_PRIMARY - 0x20000;
/// CE32 of U+FFFD.
pub const FFFD_CE32: u32 = MAX_REGULAR_CE32 - 0x20000;

/// A CE32 whose low byte is at least this value is special.
pub const SPECIAL_CE32_LOW_BYTE: u32 = 0xc0;
/// Low byte of a long-primary CE32.
pub const LONG_PRIMARY_CE32_LOW_BYTE: u32 = 0xc1;
/// Special CE32 for code points without explicit data.
pub const UNASSIGNED_CE32: u32 = 0xffff_ffff;
/// Special CE32 that defers to the base data.
pub const FALLBACK_CE32: u32 = SPECIAL_CE32_LOW_BYTE;

/// Reorder code for the space group.
pub const REORDER_CODE_SPACE: i32 = 0x1000;
/// First special reorder code.
pub const REORDER_CODE_FIRST: i32 = REORDER_CODE_SPACE;
/// Reorder code for the punctuation group.
pub const REORDER_CODE_PUNCTUATION: i32 = 0x1001;
/// Reorder code for the symbol group.
pub const REORDER_CODE_SYMBOL: i32 = 0x1002;
/// Reorder code for the currency symbol group.
pub const REORDER_CODE_CURRENCY: i32 = 0x1003;
/// Reorder code for the digit group.
pub const REORDER_CODE_DIGIT: i32 = 0x1004;
/// Limit of the public special reorder codes.
pub const REORDER_CODE_LIMIT: i32 = 0x1005;
/// Restores the default order of the tailoring; only valid alone.
pub const REORDER_CODE_DEFAULT: i32 = -1;
/// Script code Zzzz: "all other scripts", also resets reordering when alone.
pub const REORDER_CODE_OTHERS: i32 = SCRIPT_UNKNOWN;
/// Synonym for [`REORDER_CODE_OTHERS`] when it is the only code.
pub const REORDER_CODE_NONE: i32 = SCRIPT_UNKNOWN;
/// Number of special reorder code slots in the script index.
pub const MAX_NUM_SPECIAL_REORDER_CODES: i32 = 8;
/// Reserved primary range before Latin.
pub const REORDER_RESERVED_BEFORE_LATIN: i32 = REORDER_CODE_FIRST + 14;
/// Reserved primary range after Latin.
pub const REORDER_RESERVED_AFTER_LATIN: i32 = REORDER_CODE_FIRST + 15;

/// ISO 15924 numeric codes used by the reordering machinery.
pub const SCRIPT_COMMON: i32 = 0;
/// Cyrillic (Cyrl).
pub const SCRIPT_CYRILLIC: i32 = 8;
/// Greek (Grek).
pub const SCRIPT_GREEK: i32 = 14;
/// Han (Hani).
pub const SCRIPT_HAN: i32 = 17;
/// Hangul (Hang).
pub const SCRIPT_HANGUL: i32 = 18;
/// Hebrew (Hebr).
pub const SCRIPT_HEBREW: i32 = 19;
/// Latin (Latn).
pub const SCRIPT_LATIN: i32 = 25;
/// Korean (Kore), an alias of Hangul for reordering.
pub const SCRIPT_KOREAN: i32 = 119;
/// Unknown (Zzzz).
pub const SCRIPT_UNKNOWN: i32 = 103;

// Secondary level: up to 33 common weights as 05..25 or 25..45.
/// Low anchor of secondary common-weight compression.
pub const SEC_COMMON_LOW: u8 = COMMON_BYTE;
/// Middle anchor of secondary common-weight compression.
pub const SEC_COMMON_MIDDLE: u8 = SEC_COMMON_LOW + 0x20;
/// High anchor of secondary common-weight compression.
pub const SEC_COMMON_HIGH: u8 = SEC_COMMON_LOW + 0x40;
/// Common secondary weights per compression byte.
pub const SEC_COMMON_MAX_COUNT: u32 = 0x21;

// Case level, lowerFirst: up to 7 common weights as nibbles 1..7 or 7..13.
/// Low nibble of lowerFirst case compression.
pub const CASE_LOWER_FIRST_COMMON_LOW: u8 = 1;
/// Middle nibble of lowerFirst case compression.
pub const CASE_LOWER_FIRST_COMMON_MIDDLE: u8 = 7;
/// High nibble of lowerFirst case compression.
pub const CASE_LOWER_FIRST_COMMON_HIGH: u8 = 13;
/// Common case weights per lowerFirst nibble.
pub const CASE_LOWER_FIRST_COMMON_MAX_COUNT: u32 = 7;

// Case level, upperFirst: up to 13 common weights as nibbles 3..15.
/// Low nibble of upperFirst case compression.
pub const CASE_UPPER_FIRST_COMMON_LOW: u8 = 3;
/// High nibble of upperFirst case compression.
pub const CASE_UPPER_FIRST_COMMON_HIGH: u8 = 15;
/// Common case weights per upperFirst nibble.
pub const CASE_UPPER_FIRST_COMMON_MAX_COUNT: u32 = 13;

// Tertiary without case: up to 97 common weights as 05..65 or 65..C5.
/// Low anchor of tertiary-only compression.
pub const TER_ONLY_COMMON_LOW: u8 = COMMON_BYTE;
/// Middle anchor of tertiary-only compression.
pub const TER_ONLY_COMMON_MIDDLE: u8 = TER_ONLY_COMMON_LOW + 0x60;
/// High anchor of tertiary-only compression.
pub const TER_ONLY_COMMON_HIGH: u8 = TER_ONLY_COMMON_LOW + 0xc0;
/// Common tertiary weights per byte without case bits.
pub const TER_ONLY_COMMON_MAX_COUNT: u32 = 0x61;

// Tertiary with case, lowerFirst: up to 33 common weights as 05..25 or 25..45.
/// Low anchor of lowerFirst tertiary compression.
pub const TER_LOWER_FIRST_COMMON_LOW: u8 = COMMON_BYTE;
/// Middle anchor of lowerFirst tertiary compression.
pub const TER_LOWER_FIRST_COMMON_MIDDLE: u8 = TER_LOWER_FIRST_COMMON_LOW + 0x20;
/// High anchor of lowerFirst tertiary compression.
pub const TER_LOWER_FIRST_COMMON_HIGH: u8 = TER_LOWER_FIRST_COMMON_LOW + 0x40;
/// Common tertiary weights per byte with lowerFirst.
pub const TER_LOWER_FIRST_COMMON_MAX_COUNT: u32 = 0x21;

// Tertiary with case, upperFirst: up to 33 common weights as 85..A5 or A5..C5.
/// Low anchor of upperFirst tertiary compression.
pub const TER_UPPER_FIRST_COMMON_LOW: u8 = COMMON_BYTE + 0x80;
/// Middle anchor of upperFirst tertiary compression.
pub const TER_UPPER_FIRST_COMMON_MIDDLE: u8 = TER_UPPER_FIRST_COMMON_LOW + 0x20;
/// High anchor of upperFirst tertiary compression.
pub const TER_UPPER_FIRST_COMMON_HIGH: u8 = TER_UPPER_FIRST_COMMON_LOW + 0x40;
/// Common tertiary weights per byte with upperFirst.
pub const TER_UPPER_FIRST_COMMON_MAX_COUNT: u32 = 0x21;

// Quaternary: up to 113 common weights as 1C..8C or 8C..FC.
/// Low anchor of quaternary compression.
pub const QUAT_COMMON_LOW: u8 = 0x1c;
/// Middle anchor of quaternary compression.
pub const QUAT_COMMON_MIDDLE: u8 = QUAT_COMMON_LOW + 0x70;
/// High anchor of quaternary compression.
pub const QUAT_COMMON_HIGH: u8 = QUAT_COMMON_LOW + 0xe0;
/// Common quaternary weights per byte.
pub const QUAT_COMMON_MAX_COUNT: u32 = 0x71;
/// Shifted primaries with a lead byte at or above this get an escape byte.
pub const QUAT_SHIFTED_LIMIT_BYTE: u8 = QUAT_COMMON_LOW - 1;
