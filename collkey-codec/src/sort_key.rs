//! Sort key writer
//!
//! Turns a CE stream into a byte string whose unsigned lexicographic order
//! matches the collation order at the configured strength. All levels are
//! produced in a single pass over the CEs: the primary level goes straight
//! to the sink, the weaker levels into per-level buffers that are appended
//! behind level separators at the end.
//!
//! Runs of the common weight on the secondary, case, tertiary and
//! quaternary levels are run-length compressed into single bytes placed
//! below or above a per-level anchor depending on the weight that follows.

use crate::data::LeadByteSet;
use crate::iter::CeSource;
use crate::settings::{CaseFirst, CollationSettings};
use collkey_format::constants::*;
use collkey_format::{Level, Result, SortKeyByteSink, Strength};
use smallvec::SmallVec;

/// Decides which levels are appended after the primary level.
///
/// Returning `false` stops the writer before that level's separator.
pub trait LevelCallback {
    /// Whether `level` should be written
    fn need_to_write(&mut self, _level: Level) -> bool {
        true
    }
}

/// Writes every level
#[derive(Debug, Clone, Copy, Default)]
pub struct AllLevels;

impl LevelCallback for AllLevels {}

/// Writes levels up to and including a given one
#[derive(Debug, Clone, Copy)]
pub struct UpToLevel(pub Level);

impl LevelCallback for UpToLevel {
    fn need_to_write(&mut self, level: Level) -> bool {
        level <= self.0
    }
}

/// Byte buffer for one sort key level
#[derive(Debug, Default)]
struct SortKeyLevel {
    buffer: SmallVec<[u8; 32]>,
}

impl SortKeyLevel {
    #[inline]
    fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[inline]
    fn len(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    fn append_byte(&mut self, b: u8) {
        self.buffer.push(b);
    }

    /// Append a 16-bit weight, one byte if the low byte is zero.
    fn append_weight16(&mut self, w: u32) {
        debug_assert!(w & 0xffff != 0);
        let b0 = (w >> 8) as u8;
        let b1 = w as u8;
        self.buffer.push(b0);
        if b1 != 0 {
            self.buffer.push(b1);
        }
    }

    /// Append the significant bytes of a 32-bit weight.
    fn append_weight32(&mut self, w: u32) {
        debug_assert!(w != 0);
        let bytes = w.to_be_bytes();
        let length = if bytes[1] == 0 {
            1
        } else if bytes[2] == 0 {
            2
        } else if bytes[3] == 0 {
            3
        } else {
            4
        };
        self.buffer.extend_from_slice(&bytes[..length]);
    }

    /// Append a 16-bit weight in reverse byte order; the segment is reversed again later.
    fn append_reverse_weight16(&mut self, w: u32) {
        debug_assert!(w & 0xffff != 0);
        let b0 = (w >> 8) as u8;
        let b1 = w as u8;
        if b1 != 0 {
            self.buffer.push(b1);
        }
        self.buffer.push(b0);
    }

    /// Reverse the bytes from `start` to the end.
    fn reverse_from(&mut self, start: usize) {
        if start < self.buffer.len() {
            self.buffer[start..].reverse();
        }
    }

    /// Append everything except the trailing end-of-input byte.
    fn append_to(&self, sink: &mut dyn SortKeyByteSink) {
        debug_assert!(self.len() > 0 && self.buffer[self.len() - 1] == LEVEL_SEPARATOR_BYTE);
        sink.append_bytes(&self.buffer[..self.len() - 1]);
    }
}

/// Append `count` pending common weights as compressed bytes.
///
/// `before_lower` tells whether the weight that ends the run is below the
/// common weight: then the run counts up from `low`, otherwise down from
/// `high`. Runs longer than `max_count` spill over as `middle` bytes.
#[inline]
fn flush_common_run(
    level: &mut SortKeyLevel,
    count: &mut u32,
    before_lower: bool,
    low: u8,
    middle: u8,
    high: u8,
    max_count: u32,
) {
    if *count == 0 {
        return;
    }
    let mut n = *count - 1;
    while n >= max_count {
        level.append_byte(middle);
        n -= max_count;
    }
    let b = if before_lower {
        low as u32 + n
    } else {
        high as u32 - n
    };
    level.append_byte(b as u8);
    *count = 0;
}

/// Per-call state for the levels after the primary
#[derive(Debug, Default)]
struct LevelWriter {
    secondaries: SortKeyLevel,
    cases: SortKeyLevel,
    tertiaries: SortKeyLevel,
    quaternaries: SortKeyLevel,
    common_secondaries: u32,
    common_cases: u32,
    common_tertiaries: u32,
    common_quaternaries: u32,
    prev_secondary: u32,
    sec_segment_start: usize,
}

impl LevelWriter {
    fn add_secondary(&mut self, p: u32, lower32: u32, backward: bool) {
        let s = lower32 >> 16;
        if s == 0 {
            // secondary ignorable
        } else if s == COMMON_WEIGHT16 && (!backward || p != MERGE_SEPARATOR_PRIMARY) {
            self.common_secondaries += 1;
        } else if !backward {
            flush_common_run(
                &mut self.secondaries,
                &mut self.common_secondaries,
                s < COMMON_WEIGHT16,
                SEC_COMMON_LOW,
                SEC_COMMON_MIDDLE,
                SEC_COMMON_HIGH,
                SEC_COMMON_MAX_COUNT,
            );
            self.secondaries.append_weight16(s);
        } else {
            if self.common_secondaries != 0 {
                // Written reversed: the partial byte first, then full middle bytes.
                let mut n = self.common_secondaries - 1;
                let remainder = n % SEC_COMMON_MAX_COUNT;
                let b = if self.prev_secondary < COMMON_WEIGHT16 {
                    SEC_COMMON_LOW as u32 + remainder
                } else {
                    SEC_COMMON_HIGH as u32 - remainder
                };
                self.secondaries.append_byte(b as u8);
                n -= remainder;
                while n > 0 {
                    self.secondaries.append_byte(SEC_COMMON_MIDDLE);
                    n -= SEC_COMMON_MAX_COUNT;
                }
                self.common_secondaries = 0;
            }
            if 0 < p && p <= MERGE_SEPARATOR_PRIMARY {
                // Segment boundary: restore forward order of the finished segment.
                let last = self.secondaries.len().saturating_sub(1);
                if self.sec_segment_start < last {
                    self.secondaries.reverse_from(self.sec_segment_start);
                }
                self.secondaries.append_byte(if p == NO_CE_PRIMARY {
                    LEVEL_SEPARATOR_BYTE
                } else {
                    MERGE_SEPARATOR_BYTE
                });
                self.prev_secondary = 0;
                self.sec_segment_start = self.secondaries.len();
            } else {
                self.secondaries.append_reverse_weight16(s);
                self.prev_secondary = s;
            }
        }
    }

    fn add_case(&mut self, lower32: u32, case_first: CaseFirst) {
        let mut c = (lower32 >> 8) & 0xff;
        debug_assert!(c & 0xc0 != 0xc0);
        let separator = LEVEL_SEPARATOR_BYTE as u32;
        if c & 0xc0 == 0 && c > separator {
            self.common_cases += 1;
            return;
        }
        if case_first != CaseFirst::UpperFirst {
            // Nibbles 1..7..13 for common runs, 14 mixed, 15 upper. A level of
            // only common weights needs no bytes at all.
            if self.common_cases != 0 && (c > separator || !self.cases.is_empty()) {
                let mut n = self.common_cases - 1;
                while n >= CASE_LOWER_FIRST_COMMON_MAX_COUNT {
                    self.cases.append_byte(CASE_LOWER_FIRST_COMMON_MIDDLE << 4);
                    n -= CASE_LOWER_FIRST_COMMON_MAX_COUNT;
                }
                let b = if c <= separator {
                    CASE_LOWER_FIRST_COMMON_LOW as u32 + n
                } else {
                    CASE_LOWER_FIRST_COMMON_HIGH as u32 - n
                };
                self.cases.append_byte((b << 4) as u8);
                self.common_cases = 0;
            }
            if c > separator {
                c = (CASE_LOWER_FIRST_COMMON_HIGH as u32 + (c >> 6)) << 4;
            }
        } else {
            // Nibbles 3..15 for common runs, 2 mixed, 1 upper.
            if self.common_cases != 0 {
                let mut n = self.common_cases - 1;
                while n >= CASE_UPPER_FIRST_COMMON_MAX_COUNT {
                    self.cases.append_byte(CASE_UPPER_FIRST_COMMON_LOW << 4);
                    n -= CASE_UPPER_FIRST_COMMON_MAX_COUNT;
                }
                self.cases
                    .append_byte(((CASE_UPPER_FIRST_COMMON_LOW as u32 + n) << 4) as u8);
                self.common_cases = 0;
            }
            if c > separator {
                c = (CASE_UPPER_FIRST_COMMON_LOW as u32 - (c >> 6)) << 4;
            }
        }
        // Either the separator or a nibble in the high half.
        self.cases.append_byte(c as u8);
    }

    fn add_tertiary(&mut self, lower32: u32, tertiary_mask: u32, case_first: CaseFirst) {
        let mut t = lower32 & tertiary_mask;
        debug_assert!(lower32 & 0xc000 != 0xc000);
        if t == COMMON_WEIGHT16 {
            self.common_tertiaries += 1;
        } else if tertiary_mask & 0x8000 == 0 {
            // No case bits: lead bytes 06..3F move to C6..FF.
            flush_common_run(
                &mut self.tertiaries,
                &mut self.common_tertiaries,
                t < COMMON_WEIGHT16,
                TER_ONLY_COMMON_LOW,
                TER_ONLY_COMMON_MIDDLE,
                TER_ONLY_COMMON_HIGH,
                TER_ONLY_COMMON_MAX_COUNT,
            );
            if t > COMMON_WEIGHT16 {
                t += 0xc000;
            }
            self.tertiaries.append_weight16(t);
        } else if case_first != CaseFirst::UpperFirst {
            // Lower first: lead bytes 06..BF move to 46..FF.
            flush_common_run(
                &mut self.tertiaries,
                &mut self.common_tertiaries,
                t < COMMON_WEIGHT16,
                TER_LOWER_FIRST_COMMON_LOW,
                TER_LOWER_FIRST_COMMON_MIDDLE,
                TER_LOWER_FIRST_COMMON_HIGH,
                TER_LOWER_FIRST_COMMON_MAX_COUNT,
            );
            if t > COMMON_WEIGHT16 {
                t += 0x4000;
            }
            self.tertiaries.append_weight16(t);
        } else {
            // Upper first:
            //   separator 01 -> 01, lowercase 02..04 -> 82..84,
            //   common 05 -> 85..C5, lowercase 06..3F -> C6..FF,
            //   mixed 42..7F unchanged, uppercase 82..BF -> 02..3F,
            //   tertiary CEs 86..BF -> C6..FF
            if t <= NO_CE_WEIGHT16 {
                // separators stay
            } else if lower32 > 0xffff {
                t ^= 0xc000;
                if t < (TER_UPPER_FIRST_COMMON_HIGH as u32) << 8 {
                    t -= 0x4000;
                }
            } else {
                debug_assert!((0x8600..=0xbfff).contains(&t));
                t += 0x4000;
            }
            flush_common_run(
                &mut self.tertiaries,
                &mut self.common_tertiaries,
                t < (TER_UPPER_FIRST_COMMON_LOW as u32) << 8,
                TER_UPPER_FIRST_COMMON_LOW,
                TER_UPPER_FIRST_COMMON_MIDDLE,
                TER_UPPER_FIRST_COMMON_HIGH,
                TER_UPPER_FIRST_COMMON_MAX_COUNT,
            );
            self.tertiaries.append_weight16(t);
        }
    }

    fn add_quaternary(&mut self, lower32: u32, shifted: bool) {
        let q = lower32 & 0xffff;
        if q & QUATERNARY_MASK == 0 && q > NO_CE_WEIGHT16 {
            self.common_quaternaries += 1;
        } else if q == NO_CE_WEIGHT16 && !shifted && self.quaternaries.is_empty() {
            // Without shifted primaries a level of only common weights is
            // empty; the tertiary level already settled length differences.
            self.quaternaries.append_byte(LEVEL_SEPARATOR_BYTE);
        } else {
            let q = if q == NO_CE_WEIGHT16 {
                LEVEL_SEPARATOR_BYTE
            } else {
                0xfc + ((q >> 6) & 3) as u8
            };
            flush_common_run(
                &mut self.quaternaries,
                &mut self.common_quaternaries,
                q < QUAT_COMMON_LOW,
                QUAT_COMMON_LOW,
                QUAT_COMMON_MIDDLE,
                QUAT_COMMON_HIGH,
                QUAT_COMMON_MAX_COUNT,
            );
            self.quaternaries.append_byte(q);
        }
    }

    /// Flush pending common quaternaries before a run of shifted primaries,
    /// which are all below the common weight.
    fn flush_quaternaries_before_shifted(&mut self) {
        flush_common_run(
            &mut self.quaternaries,
            &mut self.common_quaternaries,
            true,
            QUAT_COMMON_LOW,
            QUAT_COMMON_MIDDLE,
            QUAT_COMMON_HIGH,
            QUAT_COMMON_MAX_COUNT,
        );
    }

    fn add_shifted_primary(&mut self, p: u32) {
        if (p >> 24) as u8 >= QUAT_SHIFTED_LIMIT_BYTE {
            // Keep shifted lead bytes below the common compression range.
            self.quaternaries.append_byte(QUAT_SHIFTED_LIMIT_BYTE);
        }
        self.quaternaries.append_weight32(p);
    }
}

/// Levels written for `settings` starting at `min_level`.
pub fn levels_for(settings: &CollationSettings, min_level: Level) -> u32 {
    let mut levels = settings.strength.level_mask();
    if settings.case_level {
        levels |= Level::Case.flag();
    }
    levels & !((1u32 << min_level as u32) - 1)
}

/// Write the primary through quaternary levels of a sort key.
///
/// Pulls CEs from `iter` until [`NO_CE`]. The primary level is appended to
/// `sink` as it is produced; the other levels follow, each behind a level
/// separator, as far as `callback` allows. No terminator is written.
///
/// Unless `preflight` is set, writing stops as soon as the primary level
/// overflows the sink; the remaining levels would only add to a key that
/// is already known to be too long.
pub fn write_sort_key_up_to_quaternary(
    iter: &mut dyn CeSource,
    compressible_bytes: &LeadByteSet,
    settings: &CollationSettings,
    sink: &mut dyn SortKeyByteSink,
    min_level: Level,
    callback: &mut dyn LevelCallback,
    preflight: bool,
) -> Result<()> {
    let levels = levels_for(settings, min_level);
    if levels == 0 {
        return Ok(());
    }
    let has_level = |level: Level| levels & level.flag() != 0;
    let primary_level = has_level(Level::Primary);
    let secondary_level = has_level(Level::Secondary);
    let case_level = has_level(Level::Case);
    let tertiary_level = has_level(Level::Tertiary);
    let quaternary_level = has_level(Level::Quaternary);

    // +1 so that "<" works and primary ignorables drop out early.
    let variable_top = if settings.is_shifted() {
        settings.variable_top() + 1
    } else {
        0
    };
    let tertiary_mask = if !settings.case_level && settings.case_first != CaseFirst::Off {
        CASE_AND_TERTIARY_MASK
    } else {
        ONLY_TERTIARY_MASK
    };
    let has_reordering = settings.has_reordering();

    let mut w = LevelWriter::default();
    let mut prev_reordered_primary: u32 = 0;

    loop {
        iter.clear_ces_if_none_remaining();
        let mut ce = iter.next_ce()?;
        let mut p = (ce >> 32) as u32;
        if p < variable_top && p > MERGE_SEPARATOR_PRIMARY {
            // Variable CE: shift it and every following primary ignorable
            // to the quaternary level.
            w.flush_quaternaries_before_shifted();
            loop {
                if quaternary_level {
                    if has_reordering {
                        p = settings.reorder(p);
                    }
                    w.add_shifted_primary(p);
                }
                loop {
                    ce = iter.next_ce()?;
                    p = (ce >> 32) as u32;
                    if p != 0 {
                        break;
                    }
                }
                if !(p < variable_top && p > MERGE_SEPARATOR_PRIMARY) {
                    break;
                }
            }
        }

        // Not variable: a regular primary, a primary ignorable, the merge
        // separator or NO_CE.
        if p > NO_CE_PRIMARY && primary_level {
            // Compressibility is a property of the un-reordered primary.
            let is_compressible = compressible_bytes[(p >> 24) as usize];
            if has_reordering {
                p = settings.reorder(p);
            }
            let p1 = (p >> 24) as u8;
            if !is_compressible || p1 != (prev_reordered_primary >> 24) as u8 {
                if prev_reordered_primary != 0 {
                    if p < prev_reordered_primary {
                        // No terminator at the end of the level or a merged segment.
                        if p1 > MERGE_SEPARATOR_BYTE {
                            sink.append_byte(PRIMARY_COMPRESSION_LOW_BYTE);
                        }
                    } else {
                        sink.append_byte(PRIMARY_COMPRESSION_HIGH_BYTE);
                    }
                }
                sink.append_byte(p1);
                prev_reordered_primary = if is_compressible { p } else { 0 };
            }
            let rest = p.to_be_bytes();
            if rest[1] != 0 {
                let length = if rest[2] == 0 {
                    1
                } else if rest[3] == 0 {
                    2
                } else {
                    3
                };
                sink.append_bytes(&rest[1..1 + length]);
            }
            if !preflight && sink.overflowed() {
                return Ok(());
            }
        }

        let lower32 = ce as u32;
        if lower32 == 0 {
            // completely ignorable
            continue;
        }

        if secondary_level {
            w.add_secondary(p, lower32, settings.backward_secondary);
        }

        if case_level {
            let ignorable = if settings.strength == Strength::Primary {
                p == 0
            } else {
                lower32 <= 0xffff
            };
            if !ignorable {
                w.add_case(lower32, settings.case_first);
            }
        }

        if tertiary_level {
            w.add_tertiary(lower32, tertiary_mask, settings.case_first);
        }

        if quaternary_level {
            w.add_quaternary(lower32, settings.is_shifted());
        }

        if lower32 >> 24 == LEVEL_SEPARATOR_BYTE as u32 {
            // NO_CE
            break;
        }
    }

    if secondary_level {
        if !callback.need_to_write(Level::Secondary) {
            return Ok(());
        }
        sink.append_byte(LEVEL_SEPARATOR_BYTE);
        w.secondaries.append_to(sink);
    }

    if case_level {
        if !callback.need_to_write(Level::Case) {
            return Ok(());
        }
        sink.append_byte(LEVEL_SEPARATOR_BYTE);
        // Two nibbles per byte; the trailing end-of-input byte is dropped.
        let length = w.cases.len() - 1;
        let mut b: u8 = 0;
        for &c in &w.cases.buffer[..length] {
            debug_assert!(c & 0xf == 0 && c != 0);
            if b == 0 {
                b = c;
            } else {
                sink.append_byte(b | (c >> 4));
                b = 0;
            }
        }
        if b != 0 {
            sink.append_byte(b);
        }
    }

    if tertiary_level {
        if !callback.need_to_write(Level::Tertiary) {
            return Ok(());
        }
        sink.append_byte(LEVEL_SEPARATOR_BYTE);
        w.tertiaries.append_to(sink);
    }

    if quaternary_level {
        if !callback.need_to_write(Level::Quaternary) {
            return Ok(());
        }
        sink.append_byte(LEVEL_SEPARATOR_BYTE);
        w.quaternaries.append_to(sink);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::CollationData;
    use crate::iter::CeSliceSource;
    use crate::sample::sample_root;
    use crate::settings::AlternateHandling;
    use collkey_format::ce::{make_ce, make_ce_with_weights};
    use collkey_format::VecSink;

    fn key_for(data: &CollationData, settings: &CollationSettings, ces: &[u64]) -> Vec<u8> {
        let mut sink = VecSink::new();
        let mut source = CeSliceSource::new(ces);
        write_sort_key_up_to_quaternary(
            &mut source,
            data.compressible_bytes(),
            settings,
            &mut sink,
            Level::Primary,
            &mut AllLevels,
            false,
        )
        .unwrap();
        sink.into_bytes()
    }

    /// Non-compressible lead byte 0x60, common weights only.
    fn plain(p: u32) -> u64 {
        make_ce(p)
    }

    #[test]
    fn test_level_buffer_weights() {
        let mut level = SortKeyLevel::default();
        level.append_weight16(0x0500);
        level.append_weight16(0x8a01);
        level.append_weight32(0x2d00_0000);
        level.append_weight32(0x2d04_0600);
        level.append_reverse_weight16(0x8a01);
        assert_eq!(
            level.buffer.as_slice(),
            &[0x05, 0x8a, 0x01, 0x2d, 0x2d, 0x04, 0x06, 0x01, 0x8a]
        );
    }

    #[test]
    fn test_level_buffer_spills_to_heap() {
        let mut level = SortKeyLevel::default();
        for i in 0..40u8 {
            level.append_byte(i + 2);
        }
        level.append_weight32(0x1234_5678);
        assert_eq!(level.len(), 44);
        assert_eq!(level.buffer[39], 41);
        assert_eq!(&level.buffer[40..], &[0x12, 0x34, 0x56, 0x78]);
    }

    #[test]
    fn test_empty_input_has_only_separators() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        assert_eq!(key_for(&data, &settings, &[]), vec![0x01, 0x01]);
    }

    #[test]
    fn test_common_secondaries_compress_to_one_byte() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        let key = key_for(&data, &settings, &[plain(0x6000_0000), plain(0x6100_0000)]);
        // a run of two commons before the end of input counts up from the low anchor
        assert_eq!(key, vec![0x60, 0x61, 0x01, 0x06, 0x01, 0x06]);
    }

    #[test]
    fn test_common_run_before_higher_weight() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        let accent = make_ce_with_weights(0, 0x8a00, 0x0500, 0);
        let key = key_for(
            &data,
            &settings,
            &[plain(0x6000_0000), plain(0x6100_0000), accent],
        );
        // two commons before a higher weight: SEC_COMMON_HIGH - 1
        assert_eq!(key, vec![0x60, 0x61, 0x01, 0x44, 0x8a, 0x01, 0x07]);
    }

    #[test]
    fn test_long_common_run_uses_middle_bytes() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        let mut ces = vec![plain(0x6000_0000); 40];
        ces.push(make_ce_with_weights(0, 0x8a00, 0x0500, 0));
        let key = key_for(&data, &settings, &ces);
        let sec_start = 40 + 1;
        // 40 commons: one full 0x21 run as a middle byte, then 7 counted down from high
        assert_eq!(
            &key[sec_start..sec_start + 3],
            &[SEC_COMMON_MIDDLE, SEC_COMMON_HIGH - 6, 0x8a]
        );
    }

    #[test]
    fn test_primary_compression_within_lead_byte() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        assert!(data.is_compressible_lead_byte(0x09));
        let key = key_for(
            &data,
            &settings,
            &[
                plain(0x0910_0000),
                plain(0x0914_0000),
                plain(0x0912_0000),
                plain(0x6000_0000),
            ],
        );
        // lead byte once, then second bytes; on leaving the lead byte upward, FF
        assert_eq!(&key[..5], &[0x09, 0x10, 0x14, 0x12, PRIMARY_COMPRESSION_HIGH_BYTE]);
        assert_eq!(key[5], 0x60);
    }

    #[test]
    fn test_primary_compression_terminator_going_down() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        let key = key_for(&data, &settings, &[plain(0x0910_0000), plain(0x0705_0000)]);
        assert_eq!(&key[..4], &[0x09, 0x10, PRIMARY_COMPRESSION_LOW_BYTE, 0x07]);
    }

    #[test]
    fn test_shifted_primary_goes_to_quaternary() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        settings.strength = Strength::Quaternary;
        settings.alternate = AlternateHandling::Shifted;
        let hyphen = plain(0x0405_0000);
        let key = key_for(&data, &settings, &[plain(0x6000_0000), hyphen, plain(0x6100_0000)]);
        // no trace of the hyphen on the primary level
        assert_eq!(&key[..2], &[0x60, 0x61]);
        let quaternary_start = key.iter().rposition(|&b| b == LEVEL_SEPARATOR_BYTE).unwrap() + 1;
        assert_eq!(
            &key[quaternary_start..],
            &[QUAT_COMMON_LOW, 0x04, 0x05, QUAT_COMMON_LOW]
        );
    }

    #[test]
    fn test_primary_strength_only_primary_level() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        settings.strength = Strength::Primary;
        let key = key_for(&data, &settings, &[plain(0x6000_0000)]);
        assert_eq!(key, vec![0x60]);
    }

    #[test]
    fn test_callback_stops_after_secondary() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        let mut sink = VecSink::new();
        let ces = [plain(0x6000_0000)];
        write_sort_key_up_to_quaternary(
            &mut CeSliceSource::new(&ces),
            data.compressible_bytes(),
            &settings,
            &mut sink,
            Level::Primary,
            &mut UpToLevel(Level::Secondary),
            false,
        )
        .unwrap();
        // one common secondary compresses to the low end of the common run
        assert_eq!(sink.into_bytes(), vec![0x60, 0x01, SEC_COMMON_LOW]);
    }

    #[test]
    fn test_min_level_skips_primary() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        let mut sink = VecSink::new();
        let ces = [plain(0x6000_0000), make_ce_with_weights(0, 0x8a00, 0x0500, 0)];
        write_sort_key_up_to_quaternary(
            &mut CeSliceSource::new(&ces),
            data.compressible_bytes(),
            &settings,
            &mut sink,
            Level::Secondary,
            &mut AllLevels,
            false,
        )
        .unwrap();
        assert_eq!(sink.into_bytes(), vec![0x01, 0x45, 0x8a, 0x01, 0x06]);
    }

    #[test]
    fn test_backward_secondary_reverses_segment() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        settings.backward_secondary = true;
        let acute = make_ce_with_weights(0, 0x8800, 0x0500, 0);
        let grave = make_ce_with_weights(0, 0x8a00, 0x0500, 0);
        let forward = key_for(
            &data,
            &settings,
            &[plain(0x6000_0000), acute, plain(0x6000_0000), grave],
        );
        let sec_start = 3;
        // the segment reads back to front: grave, common after acute, acute, leading common
        assert_eq!(&forward[..sec_start], &[0x60, 0x60, 0x01]);
        assert_eq!(
            &forward[sec_start..sec_start + 4],
            &[0x8a, SEC_COMMON_HIGH, 0x88, SEC_COMMON_LOW]
        );
    }

    #[test]
    fn test_case_level_nibbles() {
        let data = sample_root().unwrap();
        let mut settings = CollationSettings::new(&data);
        settings.strength = Strength::Primary;
        settings.case_level = true;
        let lower = make_ce_with_weights(0x6000_0000, 0x0500, 0x0500, 0);
        let upper = make_ce_with_weights(0x6000_0000, 0x0500, 0x8f00, 0);
        let key = key_for(&data, &settings, &[upper, lower]);
        // primary, separator, upper nibble 15 followed by a lone common
        // count of 1 from the low anchor at end of input: 0xf1
        assert_eq!(key, vec![0x60, 0x60, 0x01, 0xf1]);
    }

    #[test]
    fn test_fixed_sink_overflow_stops_early() {
        let data = sample_root().unwrap();
        let settings = CollationSettings::new(&data);
        let ces: Vec<u64> = (0..10).map(|i| plain(0x6000_0000 + (i << 24))).collect();
        let mut buffer = [0u8; 4];
        let mut sink = collkey_format::FixedSink::new(&mut buffer);
        write_sort_key_up_to_quaternary(
            &mut CeSliceSource::new(&ces),
            data.compressible_bytes(),
            &settings,
            &mut sink,
            Level::Primary,
            &mut AllLevels,
            false,
        )
        .unwrap();
        assert!(sink.overflowed());
        // stopped right after the first primary that did not fit
        assert_eq!(sink.number_of_bytes_appended(), 5);
    }
}
