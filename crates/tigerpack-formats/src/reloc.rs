//! Relocation-table header sizing
//!
//! Freshly built section payloads begin with a relocation table: pointer and
//! reference fixups the engine's loader applies at load time. Its size must
//! be subtracted from the payload length to get the section's logical data
//! size, and it is declared in the DRM section metadata so the loader knows
//! where the table ends.
//!
//! The table opens with a fixed 20-byte header of five little-endian u32
//! counts:
//!
//! ```text
//! offset  field
//! 0x00    internal reference count (8 bytes each)
//! 0x04    external reference count (8 bytes each)
//! 0x08    16-bit id count          (8 bytes each)
//! 0x0C    32-bit id count          (4 bytes each)
//! 0x10    pointer count            (4 bytes each)
//! ```

use thiserror::Error;

/// Size of the fixed relocation header itself
pub const RELOC_HEADER_SIZE: u32 = 0x14;

/// Relocation header parsing errors
#[derive(Debug, Error)]
pub enum RelocError {
    /// Payload shorter than the fixed header
    #[error("payload too short for relocation header: {0} bytes (need {RELOC_HEADER_SIZE})")]
    TooShort(usize),
}

/// The five fixup counts at the head of a section payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelocHeader {
    /// References into the section's own data
    pub internal_refs: u32,
    /// References into other sections
    pub external_refs: u32,
    /// 16-bit resource id fixups
    pub id16_fixups: u32,
    /// 32-bit resource id fixups
    pub id32_fixups: u32,
    /// Raw pointer fixups
    pub pointer_fixups: u32,
}

impl RelocHeader {
    /// Parse the relocation header from the first 20 bytes of a payload
    pub fn parse(payload: &[u8]) -> Result<Self, RelocError> {
        if payload.len() < RELOC_HEADER_SIZE as usize {
            return Err(RelocError::TooShort(payload.len()));
        }
        let read_u32 = |offset: usize| {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&payload[offset..offset + 4]);
            u32::from_le_bytes(bytes)
        };
        Ok(Self {
            internal_refs: read_u32(0x00),
            external_refs: read_u32(0x04),
            id16_fixups: read_u32(0x08),
            id32_fixups: read_u32(0x0C),
            pointer_fixups: read_u32(0x10),
        })
    }

    /// Total size of the relocation table, header included
    pub const fn table_size(&self) -> u32 {
        RELOC_HEADER_SIZE
            + self.internal_refs * 8
            + self.external_refs * 8
            + self.id16_fixups * 8
            + self.id32_fixups * 4
            + self.pointer_fixups * 4
    }
}
