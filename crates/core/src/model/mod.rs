//! Data model: input character streams and diff operations, output blocks.
//!
//! - `record` - per-character input records and the bbox run index
//! - `ops` - the EQUAL/INSERT/DELETE operation list consumed from the
//!   external diff algorithm
//! - `block` - the enriched diff block this crate produces

pub mod block;
pub mod ops;
pub mod record;

// Re-export main types for convenience
pub use block::{BlockType, CharCategory, DiffBlock, TextRange};
pub use ops::{DiffKind, DiffOperation};
pub use record::{BboxRun, CharRecord, CharStream, RunIndex};
