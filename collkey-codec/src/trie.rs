//! Code point trie mapping every code point to a 32-bit value
//!
//! Two stages: a fixed index with one entry per 64-code-point block, and a
//! data array in which identical blocks are stored once. Lookups are two
//! array reads and never fail.

use ahash::AHashMap;
use collkey_format::bocsu::MAX_CODE_POINT;
use collkey_format::{CollError, Limits, Result};

const BLOCK_SHIFT: u32 = 6;
const BLOCK_LEN: usize = 1 << BLOCK_SHIFT;
const BLOCK_MASK: u32 = (BLOCK_LEN as u32) - 1;

/// Number of index entries covering U+0000..U+10FFFF.
pub const INDEX_LEN: usize = ((MAX_CODE_POINT + 1) >> BLOCK_SHIFT) as usize;

/// Immutable compacted trie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodePointTrie {
    index: Vec<u32>,
    data: Vec<u32>,
    error_value: u32,
}

impl CodePointTrie {
    /// Value for `c`; code points above U+10FFFF get the error value.
    #[inline]
    pub fn get(&self, c: u32) -> u32 {
        if c > MAX_CODE_POINT {
            return self.error_value;
        }
        let block = self.index[(c >> BLOCK_SHIFT) as usize] as usize;
        self.data[block + (c & BLOCK_MASK) as usize]
    }

    /// Value returned for out-of-range code points
    pub fn error_value(&self) -> u32 {
        self.error_value
    }

    /// Block start offsets, one per 64 code points
    pub fn index(&self) -> &[u32] {
        &self.index
    }

    /// Deduplicated block data
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Rebuild a trie from serialized parts, validating every block offset.
    pub fn from_parts(index: Vec<u32>, data: Vec<u32>, error_value: u32, limits: &Limits) -> Result<Self> {
        if index.len() != INDEX_LEN {
            return Err(CollError::MalformedData(format!(
                "trie index has {} entries, expected {}",
                index.len(),
                INDEX_LEN
            )));
        }
        if data.len() > limits.max_trie_data_len {
            return Err(CollError::LimitExceeded(format!(
                "trie data length {} exceeds limit {}",
                data.len(),
                limits.max_trie_data_len
            )));
        }
        if let Some(bad) = index
            .iter()
            .find(|&&start| start as usize + BLOCK_LEN > data.len())
        {
            return Err(CollError::MalformedData(format!(
                "trie block offset {} out of range",
                bad
            )));
        }
        Ok(Self {
            index,
            data,
            error_value,
        })
    }
}

/// Mutable trie under construction
#[derive(Debug, Clone)]
pub struct TrieBuilder {
    initial_value: u32,
    error_value: u32,
    blocks: Vec<Option<Box<[u32; BLOCK_LEN]>>>,
}

impl TrieBuilder {
    /// Every code point starts out mapped to `initial_value`.
    pub fn new(initial_value: u32, error_value: u32) -> Self {
        Self {
            initial_value,
            error_value,
            blocks: vec![None; INDEX_LEN],
        }
    }

    /// Current value for `c`
    pub fn get(&self, c: u32) -> u32 {
        if c > MAX_CODE_POINT {
            return self.error_value;
        }
        match &self.blocks[(c >> BLOCK_SHIFT) as usize] {
            Some(block) => block[(c & BLOCK_MASK) as usize],
            None => self.initial_value,
        }
    }

    /// Map one code point
    pub fn set(&mut self, c: u32, value: u32) -> Result<()> {
        if c > MAX_CODE_POINT {
            return Err(CollError::CodePointOutOfRange(c));
        }
        let initial = self.initial_value;
        let block = self.blocks[(c >> BLOCK_SHIFT) as usize]
            .get_or_insert_with(|| Box::new([initial; BLOCK_LEN]));
        block[(c & BLOCK_MASK) as usize] = value;
        Ok(())
    }

    /// Map every code point in `start..=end`
    pub fn set_range(&mut self, start: u32, end: u32, value: u32) -> Result<()> {
        if end > MAX_CODE_POINT {
            return Err(CollError::CodePointOutOfRange(end));
        }
        for c in start..=end {
            self.set(c, value)?;
        }
        Ok(())
    }

    /// Compact into an immutable trie; identical blocks share storage.
    pub fn build(self) -> CodePointTrie {
        let mut data: Vec<u32> = Vec::new();
        let mut seen: AHashMap<[u32; BLOCK_LEN], u32> = AHashMap::new();
        let mut index = Vec::with_capacity(INDEX_LEN);

        let initial_block = [self.initial_value; BLOCK_LEN];
        for block in &self.blocks {
            let values: &[u32; BLOCK_LEN] = block.as_deref().unwrap_or(&initial_block);
            let start = *seen.entry(*values).or_insert_with(|| {
                let start = data.len() as u32;
                data.extend_from_slice(values);
                start
            });
            index.push(start);
        }

        CodePointTrie {
            index,
            data,
            error_value: self.error_value,
        }
    }
}
