//! Collation data store
//!
//! Immutable after construction. One instance can back any number of
//! collators on any number of threads; tailorings hold an `Arc` to their
//! base data.

use crate::trie::CodePointTrie;
use bitvec::prelude::*;
use collkey_format::ce::{self, Ce32, Tag};
use collkey_format::constants::*;
use collkey_format::{CollError, Result};
use std::sync::Arc;
use tracing::debug;

/// Set of primary lead bytes, one bit per byte value.
pub type LeadByteSet = BitArr!(for 256, in u32, Lsb0);

/// Jamo CE32 table length: 19 L + 21 V + 27 T.
pub const JAMO_CE32S_LENGTH: usize = 19 + 21 + 27;

/// Upper bound on CE32 indirections before the data is considered cyclic.
const MAX_RESOLUTION_STEPS: u32 = 16;

/// Code point → CE32 mapping plus derived script and compression facts
#[derive(Debug, Clone)]
pub struct CollationData {
    pub(crate) trie: CodePointTrie,
    pub(crate) ce32s: Vec<u32>,
    pub(crate) ces: Vec<u64>,
    pub(crate) contexts: Vec<u16>,
    pub(crate) base: Option<Arc<CollationData>>,
    pub(crate) jamo_ce32s: Vec<u32>,
    pub(crate) compressible_bytes: LeadByteSet,
    pub(crate) numeric_primary: u32,
    /// Per script code, then 16 special reorder code slots: index into `script_starts`.
    pub(crate) scripts_index: Vec<u16>,
    /// Range starts as 16-bit primary prefixes; last entry is the high sentinel.
    pub(crate) script_starts: Vec<u16>,
    pub(crate) num_scripts: usize,
    /// Sorted, non-overlapping inclusive ranges.
    pub(crate) unsafe_backward: Vec<(u32, u32)>,
}

impl CollationData {
    /// CE32 for `c` from the trie.
    ///
    /// Never fails; unmapped code points yield the trie's default
    /// ([`UNASSIGNED_CE32`] in root data, [`FALLBACK_CE32`] in tailorings).
    #[inline]
    pub fn get_ce32(&self, c: u32) -> u32 {
        self.trie.get(c)
    }

    /// Default CE32 stored at the start of a prefix or contraction table.
    pub fn get_ce32_from_contexts(&self, index: u32) -> Result<u32> {
        let i = index as usize;
        match (self.contexts.get(i), self.contexts.get(i + 1)) {
            (Some(&hi), Some(&lo)) => Ok(((hi as u32) << 16) | lo as u32),
            _ => Err(CollError::MalformedData(format!(
                "context index {} out of range",
                index
            ))),
        }
    }

    /// Resolve the alias-like tags: digit (non-numeric), U+0000 and lead surrogate.
    pub fn get_indirect_ce32(&self, ce32: u32) -> u32 {
        debug_assert!(ce::is_special_ce32(ce32));
        match Ce32::decode(ce32) {
            Ce32::Digit { index, .. } => self
                .ce32s
                .get(index as usize)
                .copied()
                .unwrap_or(UNASSIGNED_CE32),
            Ce32::LeadSurrogate { .. } => UNASSIGNED_CE32,
            Ce32::U0000 => self.ce32s.first().copied().unwrap_or(UNASSIGNED_CE32),
            _ => ce32,
        }
    }

    /// Resolve one level of alias indirection; other special CE32s are
    /// returned unchanged for the CE iterator to expand.
    pub fn get_final_ce32(&self, ce32: u32) -> u32 {
        if ce::is_special_ce32(ce32) {
            self.get_indirect_ce32(ce32)
        } else {
            ce32
        }
    }

    /// The single CE for `c`.
    ///
    /// Fails for mappings that expand to more than one CE or that need
    /// runtime context (Hangul). A chain of indirections longer than any
    /// well-formed data can produce is reported as malformed data.
    pub fn get_single_ce(&self, c: u32) -> Result<u64> {
        let mut data = self;
        let mut ce32 = data.get_ce32(c);
        for _ in 0..MAX_RESOLUTION_STEPS {
            match Ce32::decode(ce32) {
                Ce32::Simple(simple) => return Ok(ce::ce_from_simple_ce32(simple)),
                Ce32::Fallback => {
                    data = data.base.as_deref().ok_or_else(|| {
                        CollError::MalformedData(format!(
                            "fallback CE32 for U+{:04X} without base data",
                            c
                        ))
                    })?;
                    ce32 = data.get_ce32(c);
                }
                Ce32::LongPrimary { .. } | Ce32::LongSecondary { .. } => {
                    return ce::ce_from_ce32(ce32);
                }
                Ce32::Expansion32 { index, length } => {
                    if length != 1 {
                        return Err(CollError::UnsupportedTag(Tag::Expansion32 as u8, ce32));
                    }
                    ce32 = data.ce32_at(index)?;
                }
                Ce32::Expansion { index, length } => {
                    if length != 1 {
                        return Err(CollError::UnsupportedTag(Tag::Expansion as u8, ce32));
                    }
                    return data.ce_at(index);
                }
                Ce32::Prefix { index } | Ce32::Contraction { index, .. } => {
                    ce32 = data.get_ce32_from_contexts(index)?;
                }
                Ce32::Digit { index, .. } => {
                    ce32 = data.ce32_at(index)?;
                }
                Ce32::U0000 => {
                    ce32 = data.ce32_at(0)?;
                }
                Ce32::Offset { .. } => return data.get_ce_from_offset_ce32(c, ce32),
                Ce32::Implicit { .. } => return Ok(ce::unassigned_ce_from_code_point(c)),
                Ce32::LatinExpansion { .. }
                | Ce32::Hangul { .. }
                | Ce32::LeadSurrogate { .. }
                | Ce32::BuilderOnly { .. } => {
                    return Err(CollError::UnsupportedTag(ce::tag_bits_from_ce32(ce32), ce32));
                }
            }
        }
        Err(CollError::MalformedData(format!(
            "CE32 resolution for U+{:04X} did not terminate",
            c
        )))
    }

    /// CE for `c` from an offset-range CE32.
    pub fn get_ce_from_offset_ce32(&self, c: u32, ce32: u32) -> Result<u64> {
        let data_ce = self.ce_at(ce::index_from_ce32(ce32))?;
        Ok(ce::make_ce(ce::three_byte_primary_for_offset_data(c, data_ce)))
    }

    pub(crate) fn ce32_at(&self, index: u32) -> Result<u32> {
        self.ce32s.get(index as usize).copied().ok_or_else(|| {
            CollError::MalformedData(format!("CE32 index {} out of range", index))
        })
    }

    pub(crate) fn ce_at(&self, index: u32) -> Result<u64> {
        self.ces
            .get(index as usize)
            .copied()
            .ok_or_else(|| CollError::MalformedData(format!("CE index {} out of range", index)))
    }

    /// Base data this tailoring falls back to
    pub fn base(&self) -> Option<&Arc<CollationData>> {
        self.base.as_ref()
    }

    /// Jamo CE32s for Hangul syllable decomposition, empty if absent
    pub fn jamo_ce32s(&self) -> &[u32] {
        &self.jamo_ce32s
    }

    /// Lead byte of numeric collation primaries
    pub fn numeric_primary(&self) -> u32 {
        self.numeric_primary
    }

    /// Whether `c` is a decimal digit
    pub fn is_digit(&self, c: u32) -> bool {
        if c < 0x660 {
            (0x30..=0x39).contains(&c)
        } else {
            ce::has_ce32_tag(self.get_ce32(c), Tag::Digit)
        }
    }

    /// Whether backward iteration must not stop before `c`
    pub fn is_unsafe_backward(&self, c: u32, numeric: bool) -> bool {
        let i = self.unsafe_backward.partition_point(|&(_, end)| end < c);
        let in_set = self
            .unsafe_backward
            .get(i)
            .is_some_and(|&(start, _)| start <= c);
        in_set || (numeric && self.is_digit(c))
    }

    /// Whether primaries with this lead byte are compressible
    #[inline]
    pub fn is_compressible_lead_byte(&self, b: u8) -> bool {
        self.compressible_bytes[b as usize]
    }

    /// Whether the primary's lead byte is compressible
    #[inline]
    pub fn is_compressible_primary(&self, p: u32) -> bool {
        self.is_compressible_lead_byte((p >> 24) as u8)
    }

    /// The compressible lead byte table
    pub fn compressible_bytes(&self) -> &LeadByteSet {
        &self.compressible_bytes
    }

    /// Index of a script or special group in the range table, 0 if unknown.
    pub fn script_index(&self, script: i32) -> usize {
        if script < 0 {
            return 0;
        }
        if (script as usize) < self.num_scripts {
            return self.scripts_index[script as usize] as usize;
        }
        let special = script - REORDER_CODE_FIRST;
        if (0..MAX_NUM_SPECIAL_REORDER_CODES).contains(&special) {
            return self.scripts_index[self.num_scripts + special as usize] as usize;
        }
        0
    }

    /// All scripts sharing `script`'s primary range, `script` first.
    pub fn equivalent_scripts(&self, script: i32) -> Vec<i32> {
        let index = self.script_index(script);
        if index == 0 {
            return Vec::new();
        }
        if script >= REORDER_CODE_FIRST {
            return vec![script];
        }
        let mut dest = vec![script];
        for i in 0..self.num_scripts {
            if self.scripts_index[i] as usize == index && i as i32 != script {
                dest.push(i as i32);
            }
        }
        dest
    }

    /// First primary of a script or special group, 0 if unknown
    pub fn get_first_primary_for_group(&self, script: i32) -> u32 {
        match self.script_index(script) {
            0 => 0,
            index => (self.script_starts[index] as u32) << 16,
        }
    }

    /// Last primary of a script or special group, 0 if unknown
    pub fn get_last_primary_for_group(&self, script: i32) -> u32 {
        match self.script_index(script) {
            0 => 0,
            index => ((self.script_starts[index + 1] as u32) << 16) - 1,
        }
    }

    /// Script or special group owning a primary, `None` for the sentinel ranges.
    pub fn get_group_for_primary(&self, p: u32) -> Option<i32> {
        let p = (p >> 16) as u16;
        let last = *self.script_starts.last()?;
        if self.script_starts.len() < 2 || p < self.script_starts[1] || last <= p {
            return None;
        }
        let mut index = 1;
        while p >= self.script_starts[index + 1] {
            index += 1;
        }
        if let Some(i) = (0..self.num_scripts).find(|&i| self.scripts_index[i] as usize == index) {
            return Some(i as i32);
        }
        (0..MAX_NUM_SPECIAL_REORDER_CODES as usize)
            .find(|&i| self.scripts_index[self.num_scripts + i] as usize == index)
            .map(|i| REORDER_CODE_FIRST + i as i32)
    }

    /// Number of script codes covered by the script index
    pub fn num_scripts(&self) -> usize {
        self.num_scripts
    }

    /// Compute the lead-byte permutation for a script order.
    ///
    /// Each returned value packs a 16-bit primary limit (upper half) with a
    /// signed lead byte offset (lower half) that applies below that limit.
    /// An empty list means the order is a no-op.
    pub fn make_reorder_ranges(&self, reorder: &[i32]) -> Result<Vec<u32>> {
        self.make_reorder_ranges_impl(reorder, false)
    }

    fn make_reorder_ranges_impl(&self, reorder: &[i32], latin_must_move: bool) -> Result<Vec<u32>> {
        let mut ranges = Vec::new();
        let mut length = reorder.len();
        if length == 0 || (length == 1 && reorder[0] == SCRIPT_UNKNOWN) {
            return Ok(ranges);
        }
        if self.script_starts.len() < 3 {
            return Err(CollError::MalformedData(
                "no script ranges to reorder".to_string(),
            ));
        }

        let range_count = self.script_starts.len() - 1;
        // New lead byte per range; 0 = not yet placed, 0xff = don't care.
        let mut table = vec![0u16; range_count];
        for reserved in [REORDER_RESERVED_BEFORE_LATIN, REORDER_RESERVED_AFTER_LATIN] {
            let index =
                self.scripts_index[self.num_scripts + (reserved - REORDER_CODE_FIRST) as usize];
            if index != 0 {
                table[index as usize] = 0xff;
            }
        }

        // The lowest and highest ranges never move.
        let mut low_start = self.script_starts[1] as u32;
        debug_assert_eq!(low_start, ((MERGE_SEPARATOR_BYTE as u32) + 1) << 8);
        let mut high_limit = *self.script_starts.last().unwrap_or(&0) as u32;
        debug_assert_eq!(high_limit, TRAIL_WEIGHT_BYTE << 8);

        let mut specials = 0u32;
        for &code in reorder {
            let special = code - REORDER_CODE_FIRST;
            if (0..MAX_NUM_SPECIAL_REORDER_CODES).contains(&special) {
                specials |= 1 << special;
            }
        }

        // Special groups not named in the request keep their place at the bottom.
        for i in 0..MAX_NUM_SPECIAL_REORDER_CODES as usize {
            let index = self.scripts_index[self.num_scripts + i] as usize;
            if index != 0 && (specials & (1 << i)) == 0 {
                low_start = self.add_low_script_range(&mut table, index, low_start);
            }
        }

        // Leave Latin in place when it is requested first.
        let mut skipped_reserved = 0;
        if specials == 0 && reorder[0] == SCRIPT_LATIN && !latin_must_move {
            let index = self.script_index(SCRIPT_LATIN);
            if index != 0 && low_start <= self.script_starts[index] as u32 {
                let start = self.script_starts[index] as u32;
                skipped_reserved = start - low_start;
                low_start = start;
            }
        }

        let mut has_reorder_to_end = false;
        let mut i = 0;
        while i < length {
            let script = reorder[i];
            i += 1;
            if script == SCRIPT_UNKNOWN {
                // Everything after "others" goes to the top, last code highest.
                has_reorder_to_end = true;
                while i < length {
                    length -= 1;
                    let script = reorder[length];
                    if script == SCRIPT_UNKNOWN {
                        return Err(CollError::InvalidReorder(
                            "duplicate others (Zzzz)".to_string(),
                        ));
                    }
                    if script == REORDER_CODE_DEFAULT {
                        return Err(CollError::InvalidReorder(
                            "default together with other scripts".to_string(),
                        ));
                    }
                    let index = self.script_index(script);
                    if index == 0 {
                        continue;
                    }
                    if table[index] != 0 {
                        return Err(CollError::InvalidReorder(format!(
                            "duplicate or equivalent script {}",
                            script
                        )));
                    }
                    high_limit = self.add_high_script_range(&mut table, index, high_limit);
                }
                break;
            }
            if script == REORDER_CODE_DEFAULT {
                return Err(CollError::InvalidReorder(
                    "default together with other scripts".to_string(),
                ));
            }
            let index = self.script_index(script);
            if index == 0 {
                continue;
            }
            if table[index] != 0 {
                return Err(CollError::InvalidReorder(format!(
                    "duplicate or equivalent script {}",
                    script
                )));
            }
            low_start = self.add_low_script_range(&mut table, index, low_start);
        }

        // Remaining scripts fill the middle in their default order.
        for index in 1..range_count {
            if table[index] != 0 {
                continue;
            }
            let start = self.script_starts[index] as u32;
            if !has_reorder_to_end && start > low_start {
                low_start = start;
            }
            low_start = self.add_low_script_range(&mut table, index, low_start);
        }

        if low_start > high_limit {
            if low_start - (skipped_reserved & 0xff00) <= high_limit {
                debug!("reorder ranges overflow; retrying with Latin moved");
                return self.make_reorder_ranges_impl(reorder, true);
            }
            return Err(CollError::ReorderOverflow);
        }

        // Collapse per-range lead bytes into (limit, offset) pairs.
        let mut offset: i32 = 0;
        let mut index = 1;
        loop {
            let mut next_offset = offset;
            while index < range_count {
                let new_lead_byte = table[index];
                if new_lead_byte != 0xff {
                    next_offset = new_lead_byte as i32 - (self.script_starts[index] >> 8) as i32;
                    if next_offset != offset {
                        break;
                    }
                }
                index += 1;
            }
            if offset != 0 || index < range_count {
                ranges.push(((self.script_starts[index] as u32) << 16) | (offset as u32 & 0xffff));
            }
            if index == range_count {
                break;
            }
            offset = next_offset;
            index += 1;
        }

        debug!(
            codes = ?reorder,
            ranges = ranges.len(),
            latin_must_move,
            "computed reorder ranges"
        );
        Ok(ranges)
    }

    /// Check internal consistency of tables decoded or built elsewhere.
    ///
    /// Every special CE32 must point inside its table and no builder-only
    /// tag may survive into runtime data.
    pub(crate) fn validate(&self) -> Result<()> {
        for &ce32 in self.trie.data().iter().chain(&self.ce32s) {
            self.validate_ce32(ce32)?;
        }
        for &ce32 in &self.jamo_ce32s {
            if !ce::is_simple_or_long_ce32(ce32) {
                return Err(CollError::MalformedData(format!(
                    "Jamo CE32 {:#010x} is not self-contained",
                    ce32
                )));
            }
        }
        if !self.jamo_ce32s.is_empty() && self.jamo_ce32s.len() != JAMO_CE32S_LENGTH {
            return Err(CollError::MalformedData(format!(
                "Jamo table has {} entries, expected {}",
                self.jamo_ce32s.len(),
                JAMO_CE32S_LENGTH
            )));
        }
        if self.ce32s.is_empty() {
            return Err(CollError::MalformedData(
                "CE32 table lacks the U+0000 entry".to_string(),
            ));
        }

        if !self.script_starts.is_empty() {
            let n = self.script_starts.len();
            if n < 3
                || self.script_starts[0] != 0
                || self.script_starts[1] != ((MERGE_SEPARATOR_BYTE as u16) + 1) << 8
                || self.script_starts[n - 1] != (TRAIL_WEIGHT_BYTE as u16) << 8
                || self.script_starts.windows(2).any(|w| w[0] >= w[1])
            {
                return Err(CollError::MalformedData(
                    "script starts are not an ascending 0300..FF00 table".to_string(),
                ));
            }
        }
        if self.scripts_index.len() != self.num_scripts + 16 {
            return Err(CollError::MalformedData(format!(
                "script index has {} entries for {} scripts",
                self.scripts_index.len(),
                self.num_scripts
            )));
        }
        let range_count = self.script_starts.len().saturating_sub(1);
        if let Some(&bad) = self
            .scripts_index
            .iter()
            .find(|&&i| i != 0 && i as usize >= range_count)
        {
            return Err(CollError::MalformedData(format!(
                "script range index {} out of range",
                bad
            )));
        }
        if self
            .unsafe_backward
            .windows(2)
            .any(|w| w[0].1 >= w[1].0)
            || self.unsafe_backward.iter().any(|&(s, e)| s > e)
        {
            return Err(CollError::MalformedData(
                "unsafe-backward ranges are not sorted".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_ce32(&self, ce32: u32) -> Result<()> {
        let out_of_range = |what: &str| -> Result<()> {
            Err(CollError::MalformedData(format!(
                "CE32 {:#010x} points past the {} table",
                ce32, what
            )))
        };
        match Ce32::decode(ce32) {
            Ce32::BuilderOnly { .. } => {
                return Err(CollError::UnsupportedTag(ce::tag_bits_from_ce32(ce32), ce32));
            }
            Ce32::Fallback if self.base.is_none() => {
                return Err(CollError::MalformedData(
                    "fallback CE32 in data without a base".to_string(),
                ));
            }
            Ce32::Expansion32 { index, length } => {
                if length == 0 || (index + length) as usize > self.ce32s.len() {
                    return out_of_range("CE32");
                }
            }
            Ce32::Expansion { index, length } => {
                if length == 0 || (index + length) as usize > self.ces.len() {
                    return out_of_range("CE");
                }
            }
            Ce32::Digit { index, .. } => {
                if index as usize >= self.ce32s.len() {
                    return out_of_range("CE32");
                }
            }
            Ce32::Offset { index } => {
                if index as usize >= self.ces.len() {
                    return out_of_range("CE");
                }
            }
            Ce32::Prefix { index } | Ce32::Contraction { index, .. } => {
                if index as usize + 1 >= self.contexts.len() {
                    return out_of_range("context");
                }
            }
            Ce32::Hangul { .. } if self.jamo_ce32s.is_empty() => {
                return Err(CollError::MalformedData(
                    "Hangul CE32 without a Jamo table".to_string(),
                ));
            }
            _ => {}
        }
        Ok(())
    }

    fn add_low_script_range(&self, table: &mut [u16], index: usize, low_start: u32) -> u32 {
        let start = self.script_starts[index] as u32;
        let mut low_start = low_start;
        if (start & 0xff) < (low_start & 0xff) {
            low_start += 0x100;
        }
        table[index] = (low_start >> 8) as u16;
        let limit = self.script_starts[index + 1] as u32;
        ((low_start & 0xff00) + ((limit & 0xff00) - (start & 0xff00))) | (limit & 0xff)
    }

    fn add_high_script_range(&self, table: &mut [u16], index: usize, high_limit: u32) -> u32 {
        let limit = self.script_starts[index + 1] as u32;
        let mut high_limit = high_limit;
        if (limit & 0xff) > (high_limit & 0xff) {
            high_limit -= 0x100;
        }
        let start = self.script_starts[index] as u32;
        high_limit = ((high_limit & 0xff00) - ((limit & 0xff00) - (start & 0xff00))) | (start & 0xff);
        table[index] = (high_limit >> 8) as u16;
        high_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_builder::CollationDataBuilder;
    use crate::sample::sample_root;

    #[test]
    fn test_equivalent_scripts() {
        let data = sample_root().unwrap();
        assert_eq!(data.equivalent_scripts(SCRIPT_HANGUL), vec![SCRIPT_HANGUL, SCRIPT_KOREAN]);
        assert_eq!(data.equivalent_scripts(SCRIPT_KOREAN), vec![SCRIPT_KOREAN, SCRIPT_HANGUL]);
        assert_eq!(data.equivalent_scripts(REORDER_CODE_DIGIT), vec![REORDER_CODE_DIGIT]);
        assert!(data.equivalent_scripts(SCRIPT_UNKNOWN).is_empty());
    }

    #[test]
    fn test_current_order_needs_no_ranges() {
        let data = sample_root().unwrap();
        assert!(data.make_reorder_ranges(&[SCRIPT_LATIN]).unwrap().is_empty());
        assert!(data
            .make_reorder_ranges(&[
                REORDER_CODE_SPACE,
                REORDER_CODE_PUNCTUATION,
                REORDER_CODE_SYMBOL,
                REORDER_CODE_CURRENCY,
                REORDER_CODE_DIGIT,
            ])
            .unwrap()
            .is_empty());
        assert!(data.make_reorder_ranges(&[]).unwrap().is_empty());
        assert!(data.make_reorder_ranges(&[SCRIPT_UNKNOWN]).unwrap().is_empty());
    }

    #[test]
    fn test_greek_moves_below_latin() {
        let data = sample_root().unwrap();
        let ranges = data.make_reorder_ranges(&[SCRIPT_GREEK, SCRIPT_LATIN]).unwrap();
        assert_eq!(ranges, vec![0x0d00_0000, 0x0e00_fffb]);
    }

    #[test]
    fn test_invalid_requests() {
        let data = sample_root().unwrap();
        assert!(matches!(
            data.make_reorder_ranges(&[SCRIPT_HANGUL, SCRIPT_KOREAN]),
            Err(CollError::InvalidReorder(_))
        ));
        assert!(matches!(
            data.make_reorder_ranges(&[SCRIPT_GREEK, REORDER_CODE_DEFAULT]),
            Err(CollError::InvalidReorder(_))
        ));
        assert!(matches!(
            data.make_reorder_ranges(&[SCRIPT_UNKNOWN, SCRIPT_GREEK, SCRIPT_UNKNOWN]),
            Err(CollError::InvalidReorder(_))
        ));
    }

    #[test]
    fn test_reorder_overflow() {
        let mut b = CollationDataBuilder::new_root();
        b.add_script_range(&[REORDER_CODE_SPACE], 0x0300).unwrap();
        b.add_script_range(&[SCRIPT_LATIN], 0x0380).unwrap();
        b.add_script_range(&[SCRIPT_GREEK], 0x0400).unwrap();
        b.add_script_range(&[SCRIPT_HAN], 0x0480).unwrap();
        let data = b.build().unwrap();
        assert!(matches!(
            data.make_reorder_ranges(&[SCRIPT_GREEK, SCRIPT_LATIN]),
            Err(CollError::ReorderOverflow)
        ));
    }

    #[test]
    fn test_latin_first_without_any_scripts() {
        let mut b = CollationDataBuilder::new_root();
        b.add_script_range(&[REORDER_CODE_SPACE], 0x0300).unwrap();
        b.add_script_range(&[REORDER_CODE_DIGIT], 0x0400).unwrap();
        let data = b.build().unwrap();
        assert_eq!(data.script_index(SCRIPT_LATIN), 0);
        assert!(data.make_reorder_ranges(&[SCRIPT_LATIN]).unwrap().is_empty());
    }

    #[test]
    fn test_latin_first_without_latin_range() {
        let mut b = CollationDataBuilder::new_root();
        b.add_script_range(&[REORDER_CODE_SPACE], 0x0300).unwrap();
        b.add_script_range(&[SCRIPT_GREEK], 0x0400).unwrap();
        let data = b.build().unwrap();
        assert_eq!(data.script_index(SCRIPT_LATIN), 0);
        // Greek already follows the specials, so nothing moves.
        let ranges = data
            .make_reorder_ranges(&[SCRIPT_LATIN, SCRIPT_GREEK])
            .unwrap();
        assert!(ranges.is_empty());
    }

    #[test]
    fn test_unsafe_backward() {
        let data = sample_root().unwrap();
        assert!(data.is_unsafe_backward(0x0300, false));
        assert!(data.is_unsafe_backward(0x036f, false));
        assert!(!data.is_unsafe_backward(0x0370, false));
        assert!(!data.is_unsafe_backward('5' as u32, false));
        assert!(data.is_unsafe_backward('5' as u32, true));
    }

    #[test]
    fn test_cyclic_ce32_is_malformed() {
        let mut data = CollationDataBuilder::new_root().build().unwrap();
        data.ce32s[0] = Ce32::U0000.encode();
        assert!(matches!(
            data.get_single_ce(0),
            Err(CollError::MalformedData(_))
        ));
    }

    #[test]
    fn test_unmapped_code_point_is_implicit() {
        let data = sample_root().unwrap();
        assert_eq!(data.get_ce32(0x4e00), UNASSIGNED_CE32);
        assert_eq!(
            data.get_single_ce(0x4e00).unwrap(),
            ce::unassigned_ce_from_code_point(0x4e00)
        );
        assert_eq!(data.get_ce32(0x110000), data.trie.error_value());
    }
}
