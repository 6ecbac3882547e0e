//! Built-in sample root data
//!
//! A small table in the shape of real root collation data: the special
//! groups (spaces, punctuation, symbols, currency, digits), Latin letters
//! with case and a handful of combining marks and precomposed letters,
//! Greek, Cyrillic and Hebrew through offset ranges, and Hangul through the
//! conjoining Jamo. Everything else gets implicit weights.

use crate::data::CollationData;
use crate::data_builder::{CollationDataBuilder, ContextKind};
use collkey_format::ce::{self, make_ce, make_ce_with_weights};
use collkey_format::constants::*;
use collkey_format::Result;
use std::sync::Arc;

/// Description stored with exported sample data
pub const SAMPLE_DESCRIPTION: &str = "collkey sample root";

const UPPER_TERTIARY: u32 = 0x8f00;

const SPACES: &[(char, u32)] = &[('\t', 0x0305), ('\n', 0x0307), ('\r', 0x0309), (' ', 0x030b)];

const PUNCTUATION: &[(char, u32)] = &[
    ('_', 0x0405),
    ('-', 0x0407),
    (',', 0x0409),
    (';', 0x040b),
    (':', 0x040d),
    ('!', 0x040f),
    ('?', 0x0411),
    ('.', 0x0413),
    ('\'', 0x0415),
    ('"', 0x0417),
    ('(', 0x0419),
    (')', 0x041b),
    ('[', 0x041d),
    (']', 0x041f),
    ('{', 0x0421),
    ('}', 0x0423),
    ('@', 0x0425),
    ('*', 0x0427),
    ('/', 0x0429),
    ('\\', 0x042b),
    ('&', 0x042d),
    ('#', 0x042f),
    ('%', 0x0431),
];

const SYMBOLS: &[(char, u32)] = &[
    ('`', 0x0505),
    ('^', 0x0507),
    ('+', 0x0509),
    ('<', 0x050b),
    ('=', 0x050d),
    ('>', 0x050f),
    ('|', 0x0511),
    ('~', 0x0513),
    ('\u{a9}', 0x0515),
];

const CURRENCY: &[(char, u32)] = &[
    ('$', 0x0605),
    ('\u{a3}', 0x0607),
    ('\u{a5}', 0x0609),
    ('\u{20ac}', 0x060b),
];

/// Combining marks and their secondary weights
const MARKS: &[(u32, u32)] = &[
    (0x0301, 0x88), // acute
    (0x0300, 0x8a), // grave
    (0x0302, 0x8c), // circumflex
    (0x0308, 0x8e), // diaeresis
    (0x030a, 0x90), // ring above
    (0x0327, 0x92), // cedilla
    (0x0303, 0x94), // tilde
    (0x030c, 0x96), // caron
    (0x0304, 0x98), // macron
];

/// Lowercase precomposed letters: (letter, base, mark)
const PRECOMPOSED: &[(u32, char, u32)] = &[
    (0xe0, 'a', 0x0300),
    (0xe1, 'a', 0x0301),
    (0xe2, 'a', 0x0302),
    (0xe3, 'a', 0x0303),
    (0xe4, 'a', 0x0308),
    (0xe5, 'a', 0x030a),
    (0xe7, 'c', 0x0327),
    (0xe8, 'e', 0x0300),
    (0xe9, 'e', 0x0301),
    (0xea, 'e', 0x0302),
    (0xeb, 'e', 0x0308),
    (0xec, 'i', 0x0300),
    (0xed, 'i', 0x0301),
    (0xee, 'i', 0x0302),
    (0xef, 'i', 0x0308),
    (0xf1, 'n', 0x0303),
    (0xf2, 'o', 0x0300),
    (0xf3, 'o', 0x0301),
    (0xf4, 'o', 0x0302),
    (0xf5, 'o', 0x0303),
    (0xf6, 'o', 0x0308),
    (0xf9, 'u', 0x0300),
    (0xfa, 'u', 0x0301),
    (0xfb, 'u', 0x0302),
    (0xfc, 'u', 0x0308),
    (0xfd, 'y', 0x0301),
];

const GREEK_PRIMARY: u32 = 0x0d10_0500;
const CYRILLIC_PRIMARY: u32 = 0x0e10_0500;
const HEBREW_PRIMARY: u32 = 0x1005_0500;
const OFFSET_STEP: u32 = 2;

const JAMO_L: (u32, u32) = (0x1100, 0x1112);
const JAMO_V: (u32, u32) = (0x1161, 0x1175);
const JAMO_T: (u32, u32) = (0x11a8, 0x11c2);

fn latin_primary(letter: char) -> u32 {
    let i = letter as u32 - 'a' as u32;
    0x0900_0000 | ((0x10 + 4 * i) << 16)
}

fn lower(p: u32) -> u64 {
    make_ce(p)
}

fn upper(p: u32) -> u64 {
    make_ce_with_weights(p, COMMON_WEIGHT16, UPPER_TERTIARY, 0)
}

fn mark_ce(mark: u32) -> u64 {
    let sec = MARKS
        .iter()
        .find(|&&(m, _)| m == mark)
        .map_or(COMMON_WEIGHT16, |&(_, s)| s << 8);
    make_ce_with_weights(0, sec, COMMON_WEIGHT16, 0)
}

fn map_group(builder: &mut CollationDataBuilder, table: &[(char, u32)]) -> Result<()> {
    for &(c, p16) in table {
        builder.map_ce(c as u32, make_ce(p16 << 16))?;
    }
    Ok(())
}

/// Primary of the `c`'s position in an offset range starting at `first`
fn offset_primary(first: u32, primary: u32, compressible: bool, c: u32) -> u32 {
    let flags = if compressible { 0x80 } else { 0 };
    let data_ce = ((primary as u64) << 32) | ((first as u64) << 8) | flags | OFFSET_STEP as u64;
    ce::three_byte_primary_for_offset_data(c, data_ce)
}

/// Build the sample root data.
pub fn build_sample_root() -> Result<CollationData> {
    let mut b = CollationDataBuilder::new_root();

    map_group(&mut b, SPACES)?;
    b.map_ce(
        0xa0,
        make_ce_with_weights(0x030b_0000, COMMON_WEIGHT16, 0x0700, 0),
    )?;
    map_group(&mut b, PUNCTUATION)?;
    map_group(&mut b, SYMBOLS)?;
    map_group(&mut b, CURRENCY)?;

    for d in 0..10u32 {
        let p = 0x0700_0000 | ((0x10 + 2 * d) << 16);
        b.map_digit('0' as u32 + d, d as u8, make_ce(p))?;
    }
    b.set_numeric_primary(0x0700_0000);

    for letter in 'a'..='z' {
        let p = latin_primary(letter);
        b.map_ce(letter as u32, lower(p))?;
        b.map_ce(letter.to_ascii_uppercase() as u32, upper(p))?;
    }
    for &(mark, _) in MARKS {
        b.map_ce(mark, mark_ce(mark))?;
    }
    for &(c, base, mark) in PRECOMPOSED {
        let p = latin_primary(base);
        b.map_ces(c, &[lower(p), mark_ce(mark)])?;
        b.map_ces(c - 0x20, &[upper(p), mark_ce(mark)])?;
    }
    b.map_ces(0xff, &[lower(latin_primary('y')), mark_ce(0x0308)])?;
    b.map_ces(
        0xe6,
        &[
            lower(latin_primary('a')),
            make_ce_with_weights(latin_primary('e'), COMMON_WEIGHT16, 0x0700, 0),
        ],
    )?;
    b.map_ces(
        0xc6,
        &[
            upper(latin_primary('a')),
            make_ce_with_weights(latin_primary('e'), COMMON_WEIGHT16, 0x9100, 0),
        ],
    )?;
    b.map_ces(
        0xdf,
        &[
            lower(latin_primary('s')),
            make_ce_with_weights(latin_primary('s'), COMMON_WEIGHT16, 0x0700, 0),
        ],
    )?;
    b.add_unsafe_backward_range(0x0300, 0x036f);

    // Context-sensitive characters keep only their default mapping here.
    b.map_with_context(0xb7, ContextKind::Contraction, &[make_ce(0x0433_0000)])?;
    b.map_with_context(0x02bc, ContextKind::Prefix, &[make_ce(0x0415_0000)])?;

    // Greek, Cyrillic: lowercase by offset range, uppercase explicit
    for (first, last, primary) in [
        (0x03b1, 0x03c9, GREEK_PRIMARY),
        (0x0430, 0x044f, CYRILLIC_PRIMARY),
    ] {
        b.map_offset_range(first, last, primary, OFFSET_STEP, true)?;
        for c in first..=last {
            if c == 0x03c2 {
                // final sigma has no uppercase of its own
                continue;
            }
            let p = offset_primary(first, primary, true, c);
            b.map_ce(c - 0x20, upper(p))?;
        }
    }
    b.map_offset_range(0x05d0, 0x05ea, HEBREW_PRIMARY, OFFSET_STEP, false)?;

    let mut jamo = Vec::new();
    for (first, last) in [JAMO_L, JAMO_V, JAMO_T] {
        for c in first..=last {
            let p = 0x1082_0000 + ((jamo.len() as u32) << 16);
            let ce32 = p | 0x0505;
            b.map_ce32(c, ce32)?;
            jamo.push(ce32);
        }
    }
    b.set_jamo_ce32s(&jamo)?;

    b.map_ce32(0xfffd, FFFD_CE32)?;
    b.map_ce32(0xfffe, MERGE_SEPARATOR_CE32)?;
    b.map_ce32(0xffff, ce::make_long_primary_ce32(MAX_PRIMARY))?;

    for lead in [0x09, 0x0a, 0x0b, 0x0d, 0x0e] {
        b.set_compressible_lead_byte(lead);
    }

    b.add_script_range(&[REORDER_CODE_SPACE], 0x0300)?;
    b.add_script_range(&[REORDER_CODE_PUNCTUATION], 0x0400)?;
    b.add_script_range(&[REORDER_CODE_SYMBOL], 0x0500)?;
    b.add_script_range(&[REORDER_CODE_CURRENCY], 0x0600)?;
    b.add_script_range(&[REORDER_CODE_DIGIT], 0x0700)?;
    b.add_script_range(&[REORDER_RESERVED_BEFORE_LATIN], 0x0800)?;
    b.add_script_range(&[SCRIPT_LATIN], 0x0900)?;
    b.add_script_range(&[REORDER_RESERVED_AFTER_LATIN], 0x0c00)?;
    b.add_script_range(&[SCRIPT_GREEK], 0x0d00)?;
    b.add_script_range(&[SCRIPT_CYRILLIC], 0x0e00)?;
    b.add_script_range(&[SCRIPT_HEBREW], 0x1000)?;
    b.add_script_range(&[SCRIPT_HANGUL, SCRIPT_KOREAN], 0x1080)?;
    b.add_script_range(&[SCRIPT_HAN], 0x1100)?;

    b.build()
}

/// Shared handle to freshly built sample root data
pub fn sample_root() -> Result<Arc<CollationData>> {
    build_sample_root().map(Arc::new)
}
