//! Tiger archive error types

use thiserror::Error;

/// Tiger-specific error type
#[derive(Debug, Error)]
pub enum TigerError {
    /// A stream cursor was not where the copy plan expected it
    #[error("{stream} cursor at 0x{actual:08X}, expected 0x{expected:08X}")]
    CursorMismatch {
        /// Which stream was misplaced ("source" or "destination")
        stream: &'static str,
        /// Offset the copy plan expected
        expected: u64,
        /// Offset the stream was actually at
        actual: u64,
    },

    /// A copy range is empty or inverted
    #[error("invalid copy range: start 0x{start:08X} >= end 0x{end:08X}")]
    EmptyRange {
        /// Range start
        start: u64,
        /// Range end
        end: u64,
    },

    /// Padding would have to move the write cursor backward
    #[error("cannot pad backward: at 0x{position:08X}, target 0x{target:08X}")]
    BackwardPad {
        /// Current write position
        position: u64,
        /// Requested pad target
        target: u64,
    },

    /// Two records share a content hash, which silently corrupts lookup
    #[error("duplicate record hash 0x{0:08X}")]
    DuplicateRecordHash(u32),

    /// A placement offset does not fit the record's 32-bit packed field
    #[error("offset 0x{0:X} does not fit a packed 32-bit record offset")]
    OffsetOverflow(u64),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for tiger archive operations
pub type TigerResult<T> = Result<T, TigerError>;
