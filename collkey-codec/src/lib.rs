//! collkey Codec - Collation data and sort key engines
//!
//! This crate turns strings into byte sort keys:
//!
//! - Code point trie and the collation data store, with a builder and a
//!   binary image format
//! - Collation settings, including script reordering
//! - CE sources feeding the sort key writer
//! - The sort key writer with per-level common weight compression
//! - A `Collator` facade and small built-in sample data

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod collator;
pub mod data;
pub mod data_builder;
pub mod image;
pub mod iter;
pub mod sample;
pub mod settings;
pub mod sort_key;
pub mod trie;

// Re-export commonly used types
pub use collkey_format::{
    CollError, FixedSink, Level, Limits, Result, SortKeyByteSink, Strength, VecSink,
};

// Re-export our own types
pub use collator::{write_identical_level, Collator};
pub use data::{CollationData, LeadByteSet};
pub use data_builder::{CollationDataBuilder, ContextKind};
pub use iter::{CeSliceSource, CeSource, CodePointCeIterator};
pub use sample::sample_root;
pub use settings::{
    parse_reorder_code, reorder_code_name, AlternateHandling, CaseFirst, CollationSettings,
    MaxVariable,
};
pub use sort_key::{write_sort_key_up_to_quaternary, AllLevels, LevelCallback, UpToLevel};
