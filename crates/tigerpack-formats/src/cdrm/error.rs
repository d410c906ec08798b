//! CDRM error types

use thiserror::Error;

/// CDRM-specific error type
#[derive(Debug, Error)]
pub enum CdrmError {
    /// Invalid CDRM magic bytes
    #[error("invalid CDRM magic: expected 0x4D524443, got 0x{0:08X}")]
    InvalidMagic(u32),

    /// Container declares a block count other than one
    #[error("unsupported block count: {0} (containers hold exactly one block)")]
    UnsupportedBlockCount(u32),

    /// Block is not in stored/uncompressed mode
    #[error("unsupported block type: {0} (only stored blocks are emitted)")]
    UnsupportedBlockType(u8),

    /// Payload too large for the 24-bit size field
    #[error("payload too large: {0} bytes (limit 0xFFFFFF)")]
    PayloadTooLarge(usize),

    /// Container data ends before the declared payload
    #[error("truncated container: declared {declared} payload bytes, {available} available")]
    Truncated {
        /// Payload size declared by the block header
        declared: usize,
        /// Bytes actually present after the block header
        available: usize,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for CDRM operations
pub type CdrmResult<T> = Result<T, CdrmError>;
