//! Builder for collation data
//!
//! Mappings are added one code point (or range) at a time; `build` compacts
//! the trie and validates the result.

use crate::data::{CollationData, LeadByteSet, JAMO_CE32S_LENGTH};
use crate::trie::TrieBuilder;
use collkey_format::ce::{self, Ce32, Tag};
use collkey_format::constants::*;
use collkey_format::{CollError, Result};
use std::sync::Arc;
use tracing::debug;

/// Longest expansion a single CE32 can describe
pub const MAX_EXPANSION_LENGTH: usize = 31;

const HANGUL_FIRST: u32 = 0xac00;
const HANGUL_LAST: u32 = 0xd7a3;

/// Accumulates mappings for a [`CollationData`]
#[derive(Debug)]
pub struct CollationDataBuilder {
    trie: TrieBuilder,
    ce32s: Vec<u32>,
    ces: Vec<u64>,
    contexts: Vec<u16>,
    base: Option<Arc<CollationData>>,
    jamo_ce32s: Vec<u32>,
    compressible_bytes: LeadByteSet,
    numeric_primary: u32,
    script_ranges: Vec<(Vec<i32>, u16)>,
    unsafe_backward: Vec<(u32, u32)>,
}

/// Context kinds whose default mapping can be recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// Mapping depends on preceding text
    Prefix,
    /// Mapping depends on following text
    Contraction,
}

impl CollationDataBuilder {
    /// Builder for root data: unmapped code points get implicit weights.
    pub fn new_root() -> Self {
        let mut trie = TrieBuilder::new(UNASSIGNED_CE32, FFFD_CE32);
        // U+0000 is completely ignorable unless overridden.
        trie.set_range(0, 0, Ce32::U0000.encode()).ok();
        Self {
            trie,
            ce32s: vec![0],
            ces: Vec::new(),
            contexts: Vec::new(),
            base: None,
            jamo_ce32s: Vec::new(),
            compressible_bytes: LeadByteSet::ZERO,
            numeric_primary: 0x0f00_0000,
            script_ranges: Vec::new(),
            unsafe_backward: Vec::new(),
        }
    }

    /// Builder for a tailoring: unmapped code points fall back to `base`.
    ///
    /// Script ranges, compressible lead bytes and the numeric primary are
    /// inherited from the base.
    pub fn new_tailoring(base: Arc<CollationData>) -> Self {
        let trie = TrieBuilder::new(FALLBACK_CE32, FFFD_CE32);
        Self {
            trie,
            ce32s: vec![base.ce32s.first().copied().unwrap_or(0)],
            ces: Vec::new(),
            contexts: Vec::new(),
            jamo_ce32s: Vec::new(),
            compressible_bytes: base.compressible_bytes,
            numeric_primary: base.numeric_primary,
            script_ranges: Vec::new(),
            unsafe_backward: base.unsafe_backward.clone(),
            base: Some(base),
        }
    }

    /// Map `c` to a raw CE32.
    pub fn map_ce32(&mut self, c: u32, ce32: u32) -> Result<()> {
        if ce::is_special_ce32(ce32) && ce::tag_from_ce32(ce32).is_builder_only() {
            return Err(CollError::UnsupportedTag(ce::tag_bits_from_ce32(ce32), ce32));
        }
        self.trie.set(c, ce32)
    }

    /// Map `c` to one CE.
    pub fn map_ce(&mut self, c: u32, ce: u64) -> Result<()> {
        self.map_ces(c, &[ce])
    }

    /// Map `c` to a sequence of CEs; an empty sequence makes `c` completely ignorable.
    pub fn map_ces(&mut self, c: u32, ces: &[u64]) -> Result<()> {
        let ce32 = self.encode_ces(ces)?;
        self.trie.set(c, ce32)
    }

    /// Map `start..=end` to consecutive three-byte primaries from `primary`,
    /// `step` apart.
    pub fn map_offset_range(
        &mut self,
        start: u32,
        end: u32,
        primary: u32,
        step: u32,
        compressible: bool,
    ) -> Result<()> {
        if start > end || !(1..=0x7f).contains(&step) {
            return Err(CollError::MalformedData(format!(
                "bad offset range U+{:04X}..U+{:04X} step {}",
                start, end, step
            )));
        }
        let flags = if compressible { 0x80 } else { 0 };
        let data_ce = ((primary as u64) << 32) | ((start as u64) << 8) | flags | step as u64;
        let index = self.ces.len() as u32;
        self.ces.push(data_ce);
        self.trie
            .set_range(start, end, Ce32::Offset { index }.encode())
    }

    /// Map a decimal digit; `ce` is its weight when numeric collation is off.
    pub fn map_digit(&mut self, c: u32, value: u8, ce: u64) -> Result<()> {
        if value > 9 {
            return Err(CollError::MalformedData(format!("digit value {}", value)));
        }
        let ce32 = self.encode_ces(&[ce])?;
        let index = self.ce32s.len() as u32;
        self.ce32s.push(ce32);
        self.trie.set(c, Ce32::Digit { index, value }.encode())
    }

    /// Record the default mapping of a context-sensitive code point.
    ///
    /// Only the default (no matching context) is kept; context suffixes are
    /// matched by a full iterator, not by this data model.
    pub fn map_with_context(&mut self, c: u32, kind: ContextKind, default_ces: &[u64]) -> Result<()> {
        let default_ce32 = self.encode_ces(default_ces)?;
        let index = self.contexts.len() as u32;
        self.contexts.push((default_ce32 >> 16) as u16);
        self.contexts.push(default_ce32 as u16);
        let ce32 = match kind {
            ContextKind::Prefix => Ce32::Prefix { index },
            ContextKind::Contraction => Ce32::Contraction { index, flags: 0 },
        };
        self.trie.set(c, ce32.encode())
    }

    /// Override the mapping of U+0000.
    pub fn set_u0000_ces(&mut self, ces: &[u64]) -> Result<()> {
        self.ce32s[0] = self.encode_ces(ces)?;
        Ok(())
    }

    /// Install the conjoining Jamo table and map all Hangul syllables to it.
    ///
    /// Order: 19 leading consonants, 21 vowels, 27 trailing consonants.
    pub fn set_jamo_ce32s(&mut self, jamo: &[u32]) -> Result<()> {
        if jamo.len() != JAMO_CE32S_LENGTH {
            return Err(CollError::MalformedData(format!(
                "Jamo table needs {} CE32s, got {}",
                JAMO_CE32S_LENGTH,
                jamo.len()
            )));
        }
        if let Some(&bad) = jamo.iter().find(|&&ce32| !ce::is_simple_or_long_ce32(ce32)) {
            return Err(CollError::MalformedData(format!(
                "Jamo CE32 {:#010x} is not self-contained",
                bad
            )));
        }
        self.jamo_ce32s = jamo.to_vec();
        self.trie.set_range(
            HANGUL_FIRST,
            HANGUL_LAST,
            ce::make_ce32_from_tag_and_index(Tag::Hangul, 0),
        )
    }

    /// Mark a primary lead byte as compressible.
    pub fn set_compressible_lead_byte(&mut self, b: u8) {
        self.compressible_bytes.set(b as usize, true);
    }

    /// Lead byte used for numeric collation primaries.
    pub fn set_numeric_primary(&mut self, p: u32) {
        self.numeric_primary = p & 0xff00_0000;
    }

    /// Mark `start..=end` as unsafe for backward iteration.
    pub fn add_unsafe_backward_range(&mut self, start: u32, end: u32) {
        self.unsafe_backward.push((start, end));
    }

    /// Append a script range starting at the 16-bit primary prefix `start`.
    ///
    /// Ranges must be added in ascending order beginning at 0x0300. All codes
    /// given together share the range and are equivalent for reordering.
    pub fn add_script_range(&mut self, codes: &[i32], start: u16) -> Result<()> {
        if let Some((_, prev)) = self.script_ranges.last() {
            if start <= *prev {
                return Err(CollError::MalformedData(format!(
                    "script range start {:#06x} not above {:#06x}",
                    start, prev
                )));
            }
        } else if start != ((MERGE_SEPARATOR_BYTE as u16) + 1) << 8 {
            return Err(CollError::MalformedData(format!(
                "first script range must start at 0x0300, not {:#06x}",
                start
            )));
        }
        for &code in codes {
            let special = code - REORDER_CODE_FIRST;
            if code < 0 || (code >= REORDER_CODE_FIRST && !(0..16).contains(&special)) {
                return Err(CollError::InvalidReorder(format!("script code {}", code)));
            }
        }
        self.script_ranges.push((codes.to_vec(), start));
        Ok(())
    }

    /// Compact and validate
    pub fn build(self) -> Result<CollationData> {
        let trie = self.trie.build();

        let (scripts_index, script_starts, num_scripts) = if self.script_ranges.is_empty() {
            match &self.base {
                Some(base) => (
                    base.scripts_index.clone(),
                    base.script_starts.clone(),
                    base.num_scripts,
                ),
                None => (vec![0; 16], Vec::new(), 0),
            }
        } else {
            let num_scripts = self
                .script_ranges
                .iter()
                .flat_map(|(codes, _)| codes.iter())
                .filter(|&&code| code < REORDER_CODE_FIRST)
                .map(|&code| code as usize + 1)
                .max()
                .unwrap_or(0);
            let mut scripts_index = vec![0u16; num_scripts + 16];
            let mut script_starts = vec![0u16];
            for (i, (codes, start)) in self.script_ranges.iter().enumerate() {
                script_starts.push(*start);
                for &code in codes {
                    let slot = if code >= REORDER_CODE_FIRST {
                        num_scripts + (code - REORDER_CODE_FIRST) as usize
                    } else {
                        code as usize
                    };
                    scripts_index[slot] = (i + 1) as u16;
                }
            }
            script_starts.push((TRAIL_WEIGHT_BYTE as u16) << 8);
            (scripts_index, script_starts, num_scripts)
        };

        let mut unsafe_backward = self.unsafe_backward;
        unsafe_backward.sort_unstable();
        unsafe_backward.dedup();
        let mut merged: Vec<(u32, u32)> = Vec::with_capacity(unsafe_backward.len());
        for (start, end) in unsafe_backward {
            match merged.last_mut() {
                Some(last) if start <= last.1.saturating_add(1) => last.1 = last.1.max(end),
                _ => merged.push((start, end)),
            }
        }

        let data = CollationData {
            trie,
            ce32s: self.ce32s,
            ces: self.ces,
            contexts: self.contexts,
            base: self.base,
            jamo_ce32s: self.jamo_ce32s,
            compressible_bytes: self.compressible_bytes,
            numeric_primary: self.numeric_primary,
            scripts_index,
            script_starts,
            num_scripts,
            unsafe_backward: merged,
        };
        data.validate()?;
        debug!(
            ce32s = data.ce32s.len(),
            ces = data.ces.len(),
            trie_data = data.trie.data().len(),
            scripts = data.num_scripts,
            "built collation data"
        );
        Ok(data)
    }

    /// Encode CEs as one CE32, appending to the expansion tables if needed.
    fn encode_ces(&mut self, ces: &[u64]) -> Result<u32> {
        match ces {
            [] => return Ok(0),
            [single] => {
                if let Some(ce32) = encode_one_ce_as_ce32(*single) {
                    return Ok(ce32);
                }
            }
            _ => {}
        }
        if ces.len() > MAX_EXPANSION_LENGTH {
            return Err(CollError::LimitExceeded(format!(
                "expansion of {} CEs exceeds {}",
                ces.len(),
                MAX_EXPANSION_LENGTH
            )));
        }
        let length = ces.len() as u32;

        let as_ce32s: Option<Vec<u32>> = ces.iter().map(|&ce| encode_one_ce_as_ce32(ce)).collect();
        if let Some(ce32s) = as_ce32s {
            let index = find_or_append(&mut self.ce32s, &ce32s);
            return Ok(Ce32::Expansion32 { index, length }.encode());
        }
        let index = find_or_append(&mut self.ces, ces);
        Ok(Ce32::Expansion { index, length }.encode())
    }
}

/// CE32 form of a CE if one exists: simple, long-primary or long-secondary.
pub fn encode_one_ce_as_ce32(ce: u64) -> Option<u32> {
    let p = (ce >> 32) as u32;
    let lower32 = ce as u32;
    let t = lower32 & 0xffff;
    if ce & 0xffff_00ff_00ff == 0 {
        let ce32 = p | (lower32 >> 16) | (t >> 8);
        // A tertiary high byte in the special range would read as a tag.
        (!ce::is_special_ce32(ce32)).then_some(ce32)
    } else if ce & 0xff_ffff_ffff == COMMON_SEC_AND_TER_CE {
        Some(ce::make_long_primary_ce32(p))
    } else if p == 0 && (t & 0xff) == 0 {
        Some(ce::make_long_secondary_ce32(lower32))
    } else {
        None
    }
}

fn find_or_append<T: Copy + PartialEq>(table: &mut Vec<T>, seq: &[T]) -> u32 {
    if let Some(i) = table.windows(seq.len()).position(|w| w == seq) {
        return i as u32;
    }
    let index = table.len() as u32;
    table.extend_from_slice(seq);
    index
}
