//! BOCSU: Binary Ordered Compression for Unicode
//!
//! Encodes a code point sequence as differences from a re-centered previous
//! code point. The byte sequences sort like the code point sequences, and
//! runs of text from one small script mostly cost one byte per code point.
//!
//! Bytes 0, 1 and 2 are never produced for a difference: they are the sort
//! key terminator, level separator and merge separator. A literal U+FFFE in
//! the input becomes a single merge separator byte and resets the state.

use crate::constants::MERGE_SEPARATOR_BYTE;
use crate::error::{CollError, Result};
use crate::sink::SortKeyByteSink;
use smallvec::SmallVec;

const SLOPE_MIN: i32 = 3;
const SLOPE_MAX: i32 = 0xff;
const SLOPE_MIDDLE: i32 = 0x81;

/// Number of trail byte values (3..=0xFF).
pub const SLOPE_TAIL_COUNT: i32 = SLOPE_MAX - SLOPE_MIN + 1;

/// Longest encoding of one difference.
pub const SLOPE_MAX_BYTES: usize = 4;

const SLOPE_SINGLE: i32 = 80;
const SLOPE_LEAD_2: i32 = 42;
const SLOPE_LEAD_3: i32 = 3;

// Ranges for 1..4-byte codes.
const SLOPE_REACH_POS_1: i32 = SLOPE_SINGLE;
const SLOPE_REACH_NEG_1: i32 = -SLOPE_SINGLE;

const SLOPE_REACH_POS_2: i32 = SLOPE_LEAD_2 * SLOPE_TAIL_COUNT + (SLOPE_LEAD_2 - 1);
const SLOPE_REACH_NEG_2: i32 = -SLOPE_REACH_POS_2 - 1;

const SLOPE_REACH_POS_3: i32 = SLOPE_LEAD_3 * SLOPE_TAIL_COUNT * SLOPE_TAIL_COUNT
    + (SLOPE_LEAD_3 - 1) * SLOPE_TAIL_COUNT
    + (SLOPE_TAIL_COUNT - 1);
const SLOPE_REACH_NEG_3: i32 = -SLOPE_REACH_POS_3 - 1;

// Lead byte start values.
const SLOPE_START_POS_2: i32 = SLOPE_MIDDLE + SLOPE_SINGLE + 1;
const SLOPE_START_POS_3: i32 = SLOPE_START_POS_2 + SLOPE_LEAD_2;

const SLOPE_START_NEG_2: i32 = SLOPE_MIDDLE + SLOPE_REACH_NEG_1;
const SLOPE_START_NEG_3: i32 = SLOPE_START_NEG_2 - SLOPE_LEAD_2;

/// Highest code point accepted by the encoder.
pub const MAX_CODE_POINT: u32 = 0x10ffff;

/// Encoded bytes of one difference.
pub type DiffBytes = SmallVec<[u8; SLOPE_MAX_BYTES]>;

/// Floor division and modulo; the quotient rounds toward negative infinity.
#[inline]
fn neg_div_mod(number: i32, factor: i32) -> (i32, i32) {
    (number.div_euclid(factor), number.rem_euclid(factor))
}

/// Encode one difference into 1..=4 bytes.
///
/// `diff` must be within ±0x10FFFF plus the re-centering slack; the
/// identical-level writer never produces anything wider.
pub fn encode_diff(diff: i32) -> DiffBytes {
    let mut out = DiffBytes::new();
    if diff >= SLOPE_REACH_NEG_1 {
        if diff <= SLOPE_REACH_POS_1 {
            out.push((SLOPE_MIDDLE + diff) as u8);
        } else if diff <= SLOPE_REACH_POS_2 {
            out.push((SLOPE_START_POS_2 + diff / SLOPE_TAIL_COUNT) as u8);
            out.push((SLOPE_MIN + diff % SLOPE_TAIL_COUNT) as u8);
        } else if diff <= SLOPE_REACH_POS_3 {
            let t2 = SLOPE_MIN + diff % SLOPE_TAIL_COUNT;
            let d = diff / SLOPE_TAIL_COUNT;
            let t1 = SLOPE_MIN + d % SLOPE_TAIL_COUNT;
            out.push((SLOPE_START_POS_3 + d / SLOPE_TAIL_COUNT) as u8);
            out.push(t1 as u8);
            out.push(t2 as u8);
        } else {
            let t3 = SLOPE_MIN + diff % SLOPE_TAIL_COUNT;
            let d = diff / SLOPE_TAIL_COUNT;
            let t2 = SLOPE_MIN + d % SLOPE_TAIL_COUNT;
            let d = d / SLOPE_TAIL_COUNT;
            let t1 = SLOPE_MIN + d % SLOPE_TAIL_COUNT;
            out.push(SLOPE_MAX as u8);
            out.push(t1 as u8);
            out.push(t2 as u8);
            out.push(t3 as u8);
        }
    } else {
        let (quotient, modulo) = neg_div_mod(diff, SLOPE_TAIL_COUNT);
        if diff >= SLOPE_REACH_NEG_2 {
            out.push((SLOPE_START_NEG_2 + quotient) as u8);
            out.push((SLOPE_MIN + modulo) as u8);
        } else if diff >= SLOPE_REACH_NEG_3 {
            let t2 = SLOPE_MIN + modulo;
            let (quotient, modulo) = neg_div_mod(quotient, SLOPE_TAIL_COUNT);
            out.push((SLOPE_START_NEG_3 + quotient) as u8);
            out.push((SLOPE_MIN + modulo) as u8);
            out.push(t2 as u8);
        } else {
            let t3 = SLOPE_MIN + modulo;
            let (quotient, modulo) = neg_div_mod(quotient, SLOPE_TAIL_COUNT);
            let t2 = SLOPE_MIN + modulo;
            let (_, modulo) = neg_div_mod(quotient, SLOPE_TAIL_COUNT);
            out.push(SLOPE_MIN as u8);
            out.push((SLOPE_MIN + modulo) as u8);
            out.push(t2 as u8);
            out.push(t3 as u8);
        }
    }
    out
}

/// Decode one difference from the front of `bytes`.
///
/// Returns the difference and the number of bytes consumed.
pub fn decode_diff(bytes: &[u8]) -> Result<(i32, usize)> {
    let lead = match bytes.first() {
        Some(&b) => b as i32,
        None => return Err(CollError::UnexpectedEof),
    };
    if lead < SLOPE_MIN {
        return Err(CollError::InvalidBocsu(0));
    }
    if (SLOPE_START_NEG_2..SLOPE_START_POS_2).contains(&lead) {
        return Ok((lead - SLOPE_MIDDLE, 1));
    }

    let trail = |i: usize| -> Result<i32> {
        let b = *bytes.get(i).ok_or(CollError::UnexpectedEof)? as i32;
        if b < SLOPE_MIN {
            return Err(CollError::InvalidBocsu(i));
        }
        Ok(b - SLOPE_MIN)
    };

    if lead >= SLOPE_START_POS_2 {
        // Lead bytes are shared between adjacent length classes; the decoded
        // value's range tells them apart.
        if lead <= SLOPE_START_POS_3 {
            let diff = (lead - SLOPE_START_POS_2) * SLOPE_TAIL_COUNT + trail(1)?;
            if diff <= SLOPE_REACH_POS_2 {
                return Ok((diff, 2));
            }
        }
        let diff = ((lead - SLOPE_START_POS_3) * SLOPE_TAIL_COUNT + trail(1)?) * SLOPE_TAIL_COUNT
            + trail(2)?;
        if diff <= SLOPE_REACH_POS_3 {
            return Ok((diff, 3));
        }
        if lead != SLOPE_MAX {
            return Err(CollError::InvalidBocsu(0));
        }
        let diff = (trail(1)? * SLOPE_TAIL_COUNT + trail(2)?) * SLOPE_TAIL_COUNT + trail(3)?;
        return Ok((diff, 4));
    }

    if lead >= SLOPE_START_NEG_3 - 1 {
        let diff = (lead - SLOPE_START_NEG_2) * SLOPE_TAIL_COUNT + trail(1)?;
        if diff >= SLOPE_REACH_NEG_2 {
            return Ok((diff, 2));
        }
    }
    let diff = ((lead - SLOPE_START_NEG_3) * SLOPE_TAIL_COUNT + trail(1)?) * SLOPE_TAIL_COUNT
        + trail(2)?;
    if diff >= SLOPE_REACH_NEG_3 {
        return Ok((diff, 3));
    }
    if lead != SLOPE_MIN {
        return Err(CollError::InvalidBocsu(0));
    }
    let diff = (((-SLOPE_TAIL_COUNT + trail(1)?) * SLOPE_TAIL_COUNT + trail(2)?) * SLOPE_TAIL_COUNT)
        + trail(3)?;
    Ok((diff, 4))
}

/// Move `prev` to the reference point of its block.
///
/// Unihan (U+4E00..U+9FFF) is approached from its upper end so that the
/// whole block stays within two-byte differences; every other code point is
/// moved into its 128-aligned block.
#[inline]
fn recenter(prev: i32) -> i32 {
    if !(0x4e00..0xa000).contains(&prev) {
        (prev & !0x7f) - SLOPE_REACH_NEG_1
    } else {
        0x9fff - SLOPE_REACH_POS_2
    }
}

/// Append the BOCSU encoding of `code_points` to `sink`.
///
/// `prev` is the state carried from a previous run (0 to start). Returns the
/// state after the run. Code points above U+10FFFF are rejected before any
/// byte is written.
pub fn write_identical_level_run(
    prev: i32,
    code_points: &[u32],
    sink: &mut dyn SortKeyByteSink,
) -> Result<i32> {
    if let Some(&bad) = code_points.iter().find(|&&c| c > MAX_CODE_POINT) {
        return Err(CollError::CodePointOutOfRange(bad));
    }
    let mut prev = prev;
    for &c in code_points {
        prev = recenter(prev);
        if c == 0xfffe {
            sink.append_byte(MERGE_SEPARATOR_BYTE);
            prev = 0;
        } else {
            let c = c as i32;
            sink.append_bytes(&encode_diff(c - prev));
            prev = c;
        }
    }
    Ok(prev)
}

/// Decode a complete BOCSU run back into code points.
pub fn decode_identical_level_run(bytes: &[u8]) -> Result<Vec<u32>> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut prev = 0i32;
    let mut pos = 0;
    while pos < bytes.len() {
        prev = recenter(prev);
        if bytes[pos] == MERGE_SEPARATOR_BYTE {
            out.push(0xfffe);
            prev = 0;
            pos += 1;
            continue;
        }
        let (diff, used) = decode_diff(&bytes[pos..]).map_err(|e| match e {
            CollError::InvalidBocsu(i) => CollError::InvalidBocsu(pos + i),
            other => other,
        })?;
        let c = prev + diff;
        if !(0..=MAX_CODE_POINT as i32).contains(&c) {
            return Err(CollError::InvalidBocsu(pos));
        }
        out.push(c as u32);
        prev = c;
        pos += used;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sink::VecSink;

    fn encode(cps: &[u32]) -> Vec<u8> {
        let mut sink = VecSink::new();
        write_identical_level_run(0, cps, &mut sink).unwrap();
        sink.into_bytes()
    }

    #[test]
    fn test_reach_constants() {
        assert_eq!(SLOPE_TAIL_COUNT, 253);
        assert_eq!(SLOPE_REACH_POS_2, 10667);
        assert_eq!(SLOPE_REACH_NEG_2, -10668);
        assert_eq!(SLOPE_REACH_POS_3, 192785);
        assert_eq!(SLOPE_REACH_NEG_3, -192786);
        assert_eq!(SLOPE_START_POS_2, 0xd2);
        assert_eq!(SLOPE_START_NEG_2, 0x31);
    }

    #[test]
    fn test_single_byte_range() {
        assert_eq!(encode_diff(0).as_slice(), &[0x81]);
        assert_eq!(encode_diff(80).as_slice(), &[0xd1]);
        assert_eq!(encode_diff(-80).as_slice(), &[0x31]);
    }

    #[test]
    fn test_length_classes() {
        assert_eq!(encode_diff(81).len(), 2);
        assert_eq!(encode_diff(-81).len(), 2);
        assert_eq!(encode_diff(SLOPE_REACH_POS_2).len(), 2);
        assert_eq!(encode_diff(SLOPE_REACH_POS_2 + 1).len(), 3);
        assert_eq!(encode_diff(SLOPE_REACH_NEG_2).len(), 2);
        assert_eq!(encode_diff(SLOPE_REACH_NEG_2 - 1).len(), 3);
        assert_eq!(encode_diff(SLOPE_REACH_POS_3 + 1).len(), 4);
        assert_eq!(encode_diff(SLOPE_REACH_NEG_3 - 1).len(), 4);
        assert_eq!(encode_diff(0x10ffff).len(), 4);
        assert_eq!(encode_diff(-0x10ffff).len(), 4);
    }

    #[test]
    fn test_negative_uses_floor_division() {
        // -81 = -1 * 253 + 172: lead one below the two-byte negative start.
        assert_eq!(encode_diff(-81).as_slice(), &[0x30, 3 + 172]);
        // -253 = -1 * 253 + 0
        assert_eq!(encode_diff(-253).as_slice(), &[0x30, 3]);
        // -254 = -2 * 253 + 252
        assert_eq!(encode_diff(-254).as_slice(), &[0x2f, 0xff]);
    }

    #[test]
    fn test_boundary_order() {
        let probes = [
            -0x10ffff,
            SLOPE_REACH_NEG_3 - 1,
            SLOPE_REACH_NEG_3,
            SLOPE_REACH_NEG_2 - 1,
            SLOPE_REACH_NEG_2,
            -81,
            -80,
            0,
            80,
            81,
            SLOPE_REACH_POS_2,
            SLOPE_REACH_POS_2 + 1,
            SLOPE_REACH_POS_3,
            SLOPE_REACH_POS_3 + 1,
            0x10ffff,
        ];
        for pair in probes.windows(2) {
            let a = encode_diff(pair[0]);
            let b = encode_diff(pair[1]);
            assert!(a < b, "{} vs {}: {:?} !< {:?}", pair[0], pair[1], a, b);
        }
    }

    #[test]
    fn test_decode_boundaries() {
        for diff in [
            -0x10ffff,
            SLOPE_REACH_NEG_3 - 1,
            SLOPE_REACH_NEG_3,
            SLOPE_REACH_NEG_2 - 1,
            SLOPE_REACH_NEG_2,
            -81,
            -80,
            0,
            80,
            81,
            10626,
            SLOPE_REACH_POS_2,
            SLOPE_REACH_POS_2 + 1,
            SLOPE_REACH_POS_3,
            SLOPE_REACH_POS_3 + 1,
            0x10ffff,
        ] {
            let bytes = encode_diff(diff);
            assert_eq!(decode_diff(&bytes).unwrap(), (diff, bytes.len()), "{diff}");
        }
    }

    #[test]
    fn test_reserved_bytes_never_produced() {
        for diff in (-0x10ffff..=0x10ffff).step_by(97) {
            for b in encode_diff(diff) {
                assert!(b >= 3, "diff {diff} produced byte {b}");
            }
        }
    }

    #[test]
    fn test_same_block_is_single_byte() {
        // "abc" after re-centering into the ASCII block
        assert_eq!(encode(&[0x61, 0x62, 0x63]).len(), 3);
        // Cyrillic run
        assert_eq!(encode(&[0x430, 0x431, 0x432]).len(), 4);
    }

    #[test]
    fn test_unihan_run_is_two_bytes() {
        let mut sink = VecSink::new();
        write_identical_level_run(0x4e00, &[0x9fa5, 0x4e00, 0x5000], &mut sink).unwrap();
        assert_eq!(sink.as_bytes().len(), 3 * 2);
    }

    #[test]
    fn test_merge_separator_resets_state() {
        let bytes = encode(&[0x61, 0xfffe, 0x61]);
        assert_eq!(bytes[1], MERGE_SEPARATOR_BYTE);
        assert_eq!(bytes[0], bytes[2]);
    }

    #[test]
    fn test_out_of_range_rejected() {
        let mut sink = VecSink::new();
        let err = write_identical_level_run(0, &[0x61, 0x110000], &mut sink).unwrap_err();
        assert!(matches!(err, CollError::CodePointOutOfRange(0x110000)));
        assert!(sink.as_bytes().is_empty());
    }

    #[test]
    fn test_decode_run() {
        let cps = vec![0x65, 0x301, 0x65, 0xfffe, 0x4e2d, 0x10400, 0x20];
        assert_eq!(decode_identical_level_run(&encode(&cps)).unwrap(), cps);
    }

    #[test]
    fn test_decode_rejects_truncated_and_reserved() {
        assert!(matches!(
            decode_identical_level_run(&[0xd5]),
            Err(CollError::UnexpectedEof)
        ));
        assert!(matches!(
            decode_identical_level_run(&[0x81, 0x01]),
            Err(CollError::InvalidBocsu(1))
        ));
    }
}
