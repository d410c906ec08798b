//! DRM error types

use thiserror::Error;

use crate::cdrm::CdrmError;

/// DRM-specific error type
#[derive(Debug, Error)]
pub enum DrmError {
    /// Invalid format version in a parsed bundle
    #[error("unsupported DRM version: 0x{0:X} (expected 0x16)")]
    UnsupportedVersion(u32),

    /// Relocation-table size too large for its 24-bit metadata field
    #[error("section {id}: relocation table too large for metadata field: {size} bytes")]
    RelocTooLarge {
        /// Section id
        id: u32,
        /// Relocation-table size
        size: u32,
    },

    /// A computed placement offset does not fit the packed 32-bit field
    #[error("placement offset 0x{0:X} does not fit a packed 32-bit offset")]
    OffsetOverflow(u64),

    /// Section payload framing failed
    #[error(transparent)]
    Cdrm(#[from] CdrmError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for DRM operations
pub type DrmResult<T> = Result<T, DrmError>;
