//! collkey Format - Core primitives for collation sort keys
//!
//! This crate provides the I/O-free building blocks shared by the sort key
//! writer and the collation data store:
//!
//! - Reserved byte values and level compression anchors
//! - The 64-bit collation element and 32-bit CE32 weight model
//! - BOCSU, the order-preserving code point codec of the identical level
//! - Byte sinks for sort key output
//! - Comparison levels and strengths
//! - Data image header, ULEB128 varints, CRC32C and decode limits
//! - Error types

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod bocsu;
pub mod ce;
pub mod checksum;
pub mod constants;
pub mod error;
pub mod header;
pub mod limits;
pub mod sink;
pub mod types;
pub mod varint;

// Re-export commonly used types
pub use ce::{Ce32, Tag};
pub use error::{CollError, Result};
pub use header::DataHeader;
pub use limits::Limits;
pub use sink::{FixedSink, SortKeyByteSink, VecSink};
pub use types::{Level, Strength};
