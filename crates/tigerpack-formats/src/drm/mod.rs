//! DRM resource-bundle format
//!
//! A DRM bundle is the engine's resource container: a fixed header, one
//! [`SectionInfo`] record per section, then one [`SectionExtraInfo`] record
//! per section. The section payloads themselves are not stored in the
//! bundle; each extra-info record points at a CDRM-framed container placed
//! elsewhere in the master archive.
//!
//! ```text
//! [DrmHeader]
//! [SectionInfo]      x num_sections
//! [SectionExtraInfo] x num_sections
//! ```

mod builder;
mod error;
mod header;

pub use builder::{ComposedDrm, DLC_INDEX_TAG, DrmBuilder, PlacedSection};
pub use error::{DrmError, DrmResult};
pub use header::{
    DRM_VERSION, DrmHeader, SPEC_MASK_WILDCARD, SectionExtraInfo, SectionInfo,
    UNIQUE_ID_TYPE_SHIFT,
};

use binrw::BinRead;
use binrw::io::{Read, Seek};

/// A parsed DRM bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmFile {
    /// Bundle header
    pub header: DrmHeader,
    /// Type and sizing records, in section order
    pub sections: Vec<SectionInfo>,
    /// Storage records, in section order
    pub extras: Vec<SectionExtraInfo>,
}

impl DrmFile {
    /// Parse a bundle's header and both metadata tables
    pub fn parse<R: Read + Seek>(reader: &mut R) -> DrmResult<Self> {
        let header = DrmHeader::read(reader)?;
        if header.version != DRM_VERSION {
            return Err(DrmError::UnsupportedVersion(header.version));
        }

        let count = header.num_sections as usize;
        let mut sections = Vec::with_capacity(count);
        for _ in 0..count {
            sections.push(SectionInfo::read(reader)?);
        }
        let mut extras = Vec::with_capacity(count);
        for _ in 0..count {
            extras.push(SectionExtraInfo::read(reader)?);
        }

        Ok(Self {
            header,
            sections,
            extras,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use binrw::BinWrite;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn rejects_unknown_version() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0x15u32.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 28]);
        let err = DrmFile::parse(&mut Cursor::new(bytes)).unwrap_err();
        assert!(matches!(err, DrmError::UnsupportedVersion(0x15)));
    }

    #[test]
    fn table_lengths_match_declared_count() {
        let mut bytes = Vec::new();
        DrmHeader::new(2, 0)
            .write(&mut Cursor::new(&mut bytes))
            .unwrap();
        for id in [1u32, 2] {
            let mut cursor = Cursor::new(Vec::new());
            SectionInfo {
                size: 16,
                type_code: 7,
                reserved: [0; 3],
                packed: 0,
                id,
                spec_mask: SPEC_MASK_WILDCARD,
            }
            .write(&mut cursor)
            .unwrap();
            bytes.extend_from_slice(&cursor.into_inner());
        }
        for id in [1u32, 2] {
            let mut cursor = Cursor::new(Vec::new());
            SectionExtraInfo {
                unique_id: id | 7 << 25,
                packed_offset: 0x800 | DLC_INDEX_TAG,
                compressed_size: 48,
                decompressed_offset: 0,
            }
            .write(&mut cursor)
            .unwrap();
            bytes.extend_from_slice(&cursor.into_inner());
        }

        let drm = DrmFile::parse(&mut Cursor::new(bytes)).unwrap();
        assert_eq!(drm.header.num_sections, 2);
        assert_eq!(drm.sections.len(), 2);
        assert_eq!(drm.extras.len(), 2);
        assert_eq!(drm.sections[1].id, 2);
    }
}
