//! Decode limits for data images

/// Upper bounds applied while decoding a data image
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum trie index entries (default: 0x4400, one per 64 code points)
    pub max_trie_index_len: usize,
    /// Maximum trie data entries (default: 1 Mi)
    pub max_trie_data_len: usize,
    /// Maximum CE32 array entries (default: 256 Ki)
    pub max_ce32s: usize,
    /// Maximum 64-bit CE array entries (default: 256 Ki)
    pub max_ces: usize,
    /// Maximum context table units (default: 1 Mi)
    pub max_contexts: usize,
    /// Maximum script index entries (default: 512)
    pub max_scripts: usize,
    /// Maximum script start boundaries (default: 256)
    pub max_script_starts: usize,
    /// Maximum ranges in the backward-unsafe set (default: 64 Ki)
    pub max_unsafe_ranges: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_trie_index_len: 0x4400,
            max_trie_data_len: 1024 * 1024,
            max_ce32s: 256 * 1024,
            max_ces: 256 * 1024,
            max_contexts: 1024 * 1024,
            max_scripts: 512,
            max_script_starts: 256,
            max_unsafe_ranges: 64 * 1024,
        }
    }
}
