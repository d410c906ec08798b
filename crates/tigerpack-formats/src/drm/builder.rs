//! DRM bundle composer
//!
//! Lays out a resolved section catalog into a DRM blob plus the framed
//! section containers destined for the master archive. Placement is
//! deterministic: given the same catalog and base offset, the composer
//! produces identical bytes.

use std::io::Cursor;

use binrw::BinWrite;
use tracing::debug;

use super::error::{DrmError, DrmResult};
use super::header::{
    DrmHeader, SPEC_MASK_WILDCARD, SectionExtraInfo, SectionInfo, UNIQUE_ID_TYPE_SHIFT,
};
use crate::cdrm::{CONTAINER_ALIGNMENT, CdrmContainer};
use crate::manifest::SectionCatalog;
use crate::section::SectionPayload;
use crate::util::align_up;

/// Tag OR'd into stored offsets to mark that they resolve relative to the
/// patch/DLC archive rather than the base archive
pub const DLC_INDEX_TAG: u32 = 69 << 4;

/// Alignment of each section within the bundle's decompressed image
const DECOMPRESSED_ALIGNMENT: u64 = 0x10;

/// One freshly framed section container with its archive placement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedSection {
    /// Absolute offset within the rewritten archive
    pub offset: u64,
    /// Framed container bytes
    pub data: Vec<u8>,
}

/// The output of a composition run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedDrm {
    /// Serialized DRM blob (header plus both metadata tables)
    pub drm: Vec<u8>,
    /// Freshly framed section containers, in placement order
    pub sections: Vec<PlacedSection>,
    /// Absolute offset of the DRM blob itself within the rewritten archive
    pub drm_offset: u64,
}

/// Composer for DRM bundles
///
/// Consumes a [`SectionCatalog`] and the length of the existing archive the
/// bundle will be spliced into; produces the DRM blob and the placed section
/// containers, all in memory.
#[derive(Debug)]
pub struct DrmBuilder {
    catalog: SectionCatalog,
    base_offset: u64,
}

impl DrmBuilder {
    /// Create a composer over a resolved catalog
    pub fn new(catalog: SectionCatalog) -> Self {
        Self {
            catalog,
            base_offset: 0,
        }
    }

    /// Set the end of the existing archive; fresh sections are placed from
    /// the next 0x800-aligned offset onward
    #[must_use]
    pub fn with_base_offset(mut self, base_offset: u64) -> Self {
        self.base_offset = base_offset;
        self
    }

    fn packed_offset(offset: u64) -> DrmResult<u32> {
        let tagged = offset | u64::from(DLC_INDEX_TAG);
        u32::try_from(tagged).map_err(|_| DrmError::OffsetOverflow(offset))
    }

    fn narrow_offset(offset: u64) -> DrmResult<u32> {
        u32::try_from(offset).map_err(|_| DrmError::OffsetOverflow(offset))
    }

    /// Compose the bundle
    pub fn build(self) -> DrmResult<ComposedDrm> {
        let section_count = self.catalog.len();
        let mut writer = Cursor::new(Vec::new());

        DrmHeader::new(section_count as u32, self.catalog.primary_index).write(&mut writer)?;

        // First table: type and sizing metadata, in catalog order
        for section in &self.catalog.sections {
            let reloc_size = section.reloc_size();
            if reloc_size > 0xFF_FFFF {
                return Err(DrmError::RelocTooLarge {
                    id: section.id,
                    size: reloc_size,
                });
            }
            SectionInfo {
                size: section.resolved_size(),
                type_code: section.section_type.type_code(),
                reserved: [0; 3],
                packed: reloc_size << 8 | section.resource_subtype,
                id: section.id,
                spec_mask: SPEC_MASK_WILDCARD,
            }
            .write(&mut writer)?;
        }

        // Second table: storage metadata, framing and placing fresh payloads
        // as it goes. Already-in-archive sections re-reference their recorded
        // placement and do not advance either counter.
        let mut placed = Vec::new();
        let mut cur_offset = align_up(self.base_offset, CONTAINER_ALIGNMENT);
        let mut decompressed_offset: u64 = 0;

        for (index, section) in self.catalog.sections.iter().enumerate() {
            let type_bits = u32::from(section.section_type.type_code()) << UNIQUE_ID_TYPE_SHIFT;
            let extra = match &section.payload {
                SectionPayload::InArchive {
                    offset,
                    compressed_size,
                    decompressed_offset,
                    ..
                } => SectionExtraInfo {
                    unique_id: section.id | type_bits,
                    packed_offset: *offset,
                    compressed_size: *compressed_size,
                    decompressed_offset: *decompressed_offset,
                },
                SectionPayload::Fresh { data, .. } => {
                    let last = index == section_count - 1;
                    let framed = CdrmContainer::encode(data, last)?;
                    debug!(
                        id = section.id,
                        offset = format_args!("{cur_offset:08x}"),
                        decompressed = format_args!("{decompressed_offset:08x}"),
                        len = framed.len(),
                        "placed section"
                    );
                    let extra = SectionExtraInfo {
                        unique_id: section.id | type_bits,
                        packed_offset: Self::packed_offset(cur_offset)?,
                        compressed_size: framed.len() as u32,
                        decompressed_offset: Self::narrow_offset(decompressed_offset)?,
                    };
                    let framed_len = framed.len() as u64;
                    placed.push(PlacedSection {
                        offset: cur_offset,
                        data: framed,
                    });
                    cur_offset = align_up(cur_offset + framed_len, CONTAINER_ALIGNMENT);
                    decompressed_offset += align_up(data.len() as u64, DECOMPRESSED_ALIGNMENT);
                    extra
                }
            };
            extra.write(&mut writer)?;
        }

        Ok(ComposedDrm {
            drm: writer.into_inner(),
            sections: placed,
            drm_offset: cur_offset,
        })
    }
}
