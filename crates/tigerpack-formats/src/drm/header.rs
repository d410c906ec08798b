//! DRM header and section metadata records
//!
//! All records are little-endian and fixed width; the bundle is laid out as
//! the header, then `num_sections` [`SectionInfo`] records, then
//! `num_sections` [`SectionExtraInfo`] records.

use binrw::{BinRead, BinWrite};

/// DRM format version emitted and accepted by this crate
pub const DRM_VERSION: u32 = 0x16;

/// Wildcard spec mask matching every configuration
pub const SPEC_MASK_WILDCARD: u32 = 0xFFFF_FFFF;

/// Bit position of the type code within a section's unique id
pub const UNIQUE_ID_TYPE_SHIFT: u32 = 25;

/// Fixed bundle header
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct DrmHeader {
    /// Format version, always [`DRM_VERSION`]
    pub version: u32,
    /// Reserved include-list length, zero
    pub include_length: u32,
    /// Reserved dependency-list length, zero
    pub dep_length: u32,
    /// Reserved padding length, zero
    pub padding_length: u32,
    /// Reserved projected bundle size, zero
    pub projected_size: u32,
    /// Bundle flags, zero
    pub flags: u32,
    /// Number of sections in the bundle
    pub num_sections: u32,
    /// Index of the primary section
    pub primary_section: u32,
}

impl DrmHeader {
    /// Build the header for a bundle of `num_sections` sections
    pub const fn new(num_sections: u32, primary_section: u32) -> Self {
        Self {
            version: DRM_VERSION,
            include_length: 0,
            dep_length: 0,
            padding_length: 0,
            projected_size: 0,
            flags: 0,
            num_sections,
            primary_section,
        }
    }
}

/// Per-section type and sizing record
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct SectionInfo {
    /// Logical section size (payload minus relocation table)
    pub size: u32,
    /// Section type code
    pub type_code: u8,
    /// Reserved flag bytes
    pub reserved: [u8; 3],
    /// Relocation-table size in the upper 24 bits, resource subtype below
    pub packed: u32,
    /// Author-assigned section id
    pub id: u32,
    /// Spec mask, always [`SPEC_MASK_WILDCARD`]
    pub spec_mask: u32,
}

impl SectionInfo {
    /// Relocation-table size unpacked from the packed field
    pub const fn reloc_size(&self) -> u32 {
        self.packed >> 8
    }

    /// Resource subtype unpacked from the packed field
    pub const fn resource_subtype(&self) -> u32 {
        self.packed & 0xFF
    }
}

/// Per-section storage record
#[derive(BinRead, BinWrite, Debug, Clone, Copy, PartialEq, Eq)]
#[brw(little)]
pub struct SectionExtraInfo {
    /// Section id with the type code in the high bits
    pub unique_id: u32,
    /// Placement offset tagged with the patch/DLC index
    pub packed_offset: u32,
    /// Framed container length in the archive
    pub compressed_size: u32,
    /// Offset of the section within the bundle's decompressed image
    pub decompressed_offset: u32,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn header_is_32_bytes_of_mostly_zeroes() {
        let mut cursor = Cursor::new(Vec::new());
        DrmHeader::new(3, 1).write(&mut cursor).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[0..4], &0x16u32.to_le_bytes());
        assert_eq!(&bytes[4..24], &[0u8; 20]);
        assert_eq!(&bytes[24..28], &3u32.to_le_bytes());
        assert_eq!(&bytes[28..32], &1u32.to_le_bytes());
    }

    #[test]
    fn section_info_packs_reloc_and_subtype() {
        let info = SectionInfo {
            size: 0x100,
            type_code: 7,
            reserved: [0; 3],
            packed: 0x14 << 8 | 26,
            id: 42,
            spec_mask: SPEC_MASK_WILDCARD,
        };
        assert_eq!(info.reloc_size(), 0x14);
        assert_eq!(info.resource_subtype(), 26);

        let mut cursor = Cursor::new(Vec::new());
        info.write(&mut cursor).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(bytes.len(), 20);

        let mut cursor = Cursor::new(bytes);
        let parsed = SectionInfo::read(&mut cursor).unwrap();
        assert_eq!(parsed, info);
    }
}
