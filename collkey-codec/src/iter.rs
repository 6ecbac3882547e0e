//! Collation element sources
//!
//! The sort key writer pulls CEs one at a time from a [`CeSource`]. Two
//! sources live here: [`CodePointCeIterator`], which maps each code point
//! on its own through the data store, and [`CeSliceSource`] for precomputed
//! CE sequences.

use crate::data::{CollationData, JAMO_CE32S_LENGTH};
use collkey_format::ce::{self, Ce32};
use collkey_format::constants::*;
use collkey_format::{CollError, Result};
use smallvec::SmallVec;

/// Upper bound on CE32 indirections for one code point.
const MAX_RESOLUTION_STEPS: u32 = 16;

const HANGUL_BASE: u32 = 0xac00;
const HANGUL_COUNT: u32 = 11172;
const JAMO_V_COUNT: u32 = 21;
const JAMO_T_COUNT: u32 = 28;
const JAMO_VT_COUNT: u32 = JAMO_V_COUNT * JAMO_T_COUNT;
const JAMO_L_LIMIT: usize = 19;
const JAMO_V_LIMIT: usize = JAMO_L_LIMIT + JAMO_V_COUNT as usize;

/// Pull-based stream of collation elements
pub trait CeSource {
    /// The next CE; [`NO_CE`] once input is exhausted, on every later call too.
    fn next_ce(&mut self) -> Result<u64>;

    /// Hint that buffered CEs may be released if all were consumed.
    fn clear_ces_if_none_remaining(&mut self) {}
}

/// CEs for a code point sequence, one code point at a time.
///
/// Contractions and prefixes are not matched: a context-sensitive code
/// point yields its default mapping. Input is expected in NFD.
#[derive(Debug)]
pub struct CodePointCeIterator<'a> {
    data: &'a CollationData,
    input: &'a [u32],
    pos: usize,
    ces: SmallVec<[u64; 8]>,
    ces_index: usize,
}

impl<'a> CodePointCeIterator<'a> {
    /// Iterate over the CEs of `input`
    pub fn new(data: &'a CollationData, input: &'a [u32]) -> Self {
        Self {
            data,
            input,
            pos: 0,
            ces: SmallVec::new(),
            ces_index: 0,
        }
    }

    /// Code points consumed so far
    pub fn position(&self) -> usize {
        self.pos
    }

    fn append_ces_for(&mut self, c: u32) -> Result<()> {
        let mut data = self.data;
        let mut ce32 = data.get_ce32(c);
        for _ in 0..MAX_RESOLUTION_STEPS {
            match Ce32::decode(ce32) {
                Ce32::Simple(simple) => {
                    self.ces.push(ce::ce_from_simple_ce32(simple));
                    return Ok(());
                }
                Ce32::Fallback => {
                    data = data.base().map(|b| &**b).ok_or_else(|| {
                        CollError::MalformedData(format!(
                            "fallback CE32 for U+{:04X} without base data",
                            c
                        ))
                    })?;
                    ce32 = data.get_ce32(c);
                }
                Ce32::LongPrimary { .. } | Ce32::LongSecondary { .. } => {
                    self.ces.push(ce::ce_from_ce32(ce32)?);
                    return Ok(());
                }
                Ce32::LatinExpansion { raw } => {
                    self.ces.push(ce::latin_ce0_from_ce32(raw));
                    self.ces.push(ce::latin_ce1_from_ce32(raw));
                    return Ok(());
                }
                Ce32::Expansion32 { index, length } => {
                    for i in index..index + length {
                        self.ces.push(ce::ce_from_ce32(data.ce32_at(i)?)?);
                    }
                    return Ok(());
                }
                Ce32::Expansion { index, length } => {
                    for i in index..index + length {
                        self.ces.push(data.ce_at(i)?);
                    }
                    return Ok(());
                }
                Ce32::Prefix { index } | Ce32::Contraction { index, .. } => {
                    ce32 = data.get_ce32_from_contexts(index)?;
                }
                Ce32::Digit { .. } | Ce32::U0000 | Ce32::LeadSurrogate { .. } => {
                    ce32 = data.get_indirect_ce32(ce32);
                }
                Ce32::Hangul { .. } => return self.append_hangul_ces(data, c),
                Ce32::Offset { .. } => {
                    self.ces.push(data.get_ce_from_offset_ce32(c, ce32)?);
                    return Ok(());
                }
                Ce32::Implicit { .. } => {
                    self.ces.push(ce::unassigned_ce_from_code_point(c));
                    return Ok(());
                }
                Ce32::BuilderOnly { raw } => {
                    return Err(CollError::UnsupportedTag(ce::tag_bits_from_ce32(raw), raw));
                }
            }
        }
        Err(CollError::MalformedData(format!(
            "CE32 resolution for U+{:04X} did not terminate",
            c
        )))
    }

    /// Decompose a syllable into L, V and optional T Jamo.
    fn append_hangul_ces(&mut self, data: &CollationData, c: u32) -> Result<()> {
        let jamo = data.jamo_ce32s();
        if jamo.len() != JAMO_CE32S_LENGTH || !(HANGUL_BASE..HANGUL_BASE + HANGUL_COUNT).contains(&c) {
            return Err(CollError::MalformedData(format!(
                "no Jamo mapping for U+{:04X}",
                c
            )));
        }
        let s = c - HANGUL_BASE;
        let t = (s % JAMO_T_COUNT) as usize;
        let v = ((s % JAMO_VT_COUNT) / JAMO_T_COUNT) as usize;
        let l = (s / JAMO_VT_COUNT) as usize;
        self.ces.push(ce::ce_from_ce32(jamo[l])?);
        self.ces.push(ce::ce_from_ce32(jamo[JAMO_L_LIMIT + v])?);
        if t != 0 {
            self.ces.push(ce::ce_from_ce32(jamo[JAMO_V_LIMIT + t - 1])?);
        }
        Ok(())
    }
}

impl CeSource for CodePointCeIterator<'_> {
    fn next_ce(&mut self) -> Result<u64> {
        while self.ces_index == self.ces.len() {
            let Some(&c) = self.input.get(self.pos) else {
                return Ok(NO_CE);
            };
            self.pos += 1;
            self.append_ces_for(c)?;
        }
        let ce = self.ces[self.ces_index];
        self.ces_index += 1;
        Ok(ce)
    }

    fn clear_ces_if_none_remaining(&mut self) {
        if self.ces_index == self.ces.len() {
            self.ces.clear();
            self.ces_index = 0;
        }
    }
}

/// CEs from a slice, followed by [`NO_CE`]
#[derive(Debug, Clone)]
pub struct CeSliceSource<'a> {
    ces: &'a [u64],
    pos: usize,
}

impl<'a> CeSliceSource<'a> {
    /// Stream the given CEs
    pub fn new(ces: &'a [u64]) -> Self {
        Self { ces, pos: 0 }
    }
}

impl CeSource for CeSliceSource<'_> {
    fn next_ce(&mut self) -> Result<u64> {
        match self.ces.get(self.pos) {
            Some(&ce) => {
                self.pos += 1;
                Ok(ce)
            }
            None => Ok(NO_CE),
        }
    }
}
