//! Tiger master-archive format
//!
//! The tiger file is the engine's master archive: a small header, a sorted
//! index of content records, and an opaque content region holding the
//! stored blobs. This module parses and rebuilds the index and splices
//! freshly composed DRM bundles into an archive without disturbing any
//! existing content offsets.

mod error;
mod index;
mod splice;

pub use error::{TigerError, TigerResult};
pub use index::{
    RECORD_COUNT_OFFSET, RECORD_SIZE, RECORD_TABLE_OFFSET, TigerIndex, TigerRecord,
};
pub use splice::{DRM_RECORD_HASH, splice};
