//! Master-archive splicing
//!
//! Rewrites an existing tiger archive to carry a freshly composed DRM
//! bundle: the record count grows by one, the re-sorted record table gains
//! an entry pointing at the new bundle, the original content region is
//! copied verbatim at identical absolute offsets (so every pre-existing
//! record's packed offset stays valid), and the new section containers plus
//! the DRM blob are appended at their precomputed placements.
//!
//! The original archive is never mutated in place; it is read once and a
//! complete new archive is written. Any cursor or offset inconsistency
//! aborts with a typed error, since it means the placement computation and
//! the write plan disagree and continuing would corrupt the archive.

use binrw::io::{Read, Seek, SeekFrom, Write};
use binrw::{BinWrite, BinWriterExt};
use tracing::{debug, info};

use super::error::{TigerError, TigerResult};
use super::index::{RECORD_COUNT_OFFSET, RECORD_SIZE, RECORD_TABLE_OFFSET, TigerIndex, TigerRecord};
use crate::drm::{ComposedDrm, DLC_INDEX_TAG, SPEC_MASK_WILDCARD};

/// Content hash under which a DLC's primary DRM container is recorded
///
/// A fixed well-known constant, not content-derived: the engine looks the
/// container up by this hash when loading the patch archive.
pub const DRM_RECORD_HASH: u32 = 0x5C66_8E56;

const COPY_CHUNK: usize = 64 * 1024;

fn copy_range<R: Read + Seek, W: Write + Seek>(
    src: &mut R,
    dest: &mut W,
    start: u64,
    end: u64,
) -> TigerResult<()> {
    let actual = src.stream_position()?;
    if actual != start {
        return Err(TigerError::CursorMismatch {
            stream: "source",
            expected: start,
            actual,
        });
    }
    let actual = dest.stream_position()?;
    if actual != start {
        return Err(TigerError::CursorMismatch {
            stream: "destination",
            expected: start,
            actual,
        });
    }
    if start >= end {
        return Err(TigerError::EmptyRange { start, end });
    }

    let mut remaining = end - start;
    let mut buffer = vec![0u8; COPY_CHUNK.min(remaining as usize)];
    while remaining > 0 {
        let len = buffer.len().min(remaining as usize);
        src.read_exact(&mut buffer[..len])?;
        dest.write_all(&buffer[..len])?;
        remaining -= len as u64;
    }
    Ok(())
}

fn pad_to<W: Write + Seek>(dest: &mut W, target: u64) -> TigerResult<()> {
    let position = dest.stream_position()?;
    if position > target {
        return Err(TigerError::BackwardPad { position, target });
    }

    let zeroes = [0u8; COPY_CHUNK];
    let mut remaining = target - position;
    while remaining > 0 {
        let len = zeroes.len().min(remaining as usize);
        dest.write_all(&zeroes[..len])?;
        remaining -= len as u64;
    }
    Ok(())
}

/// Splice a composed DRM bundle into an archive
///
/// Reads the original archive from `original`, writes the complete new
/// archive to `output`, and records the bundle under `record_hash` (normally
/// [`DRM_RECORD_HASH`]). The composition's base offset must match the
/// original archive's length, or the placement checks fail.
pub fn splice<R: Read + Seek, W: Write + Seek>(
    original: &mut R,
    output: &mut W,
    composed: &ComposedDrm,
    record_hash: u32,
) -> TigerResult<()> {
    let original_len = original.seek(SeekFrom::End(0))?;
    original.rewind()?;

    let mut index = TigerIndex::parse(original)?;
    let original_count = index.len() as u32;

    let tagged_offset = composed.drm_offset | u64::from(DLC_INDEX_TAG);
    let packed_offset = u32::try_from(tagged_offset)
        .map_err(|_| TigerError::OffsetOverflow(composed.drm_offset))?;
    index.insert(TigerRecord {
        hash: record_hash,
        spec_mask: SPEC_MASK_WILDCARD,
        size: composed.drm.len() as u32,
        packed_offset,
    })?;
    info!(
        records = index.len(),
        drm_offset = format_args!("{:08x}", composed.drm_offset),
        "rewriting archive index"
    );

    original.rewind()?;
    copy_range(original, output, 0, RECORD_COUNT_OFFSET)?;
    output.write_le(&(original_count + 1))?;
    original.seek(SeekFrom::Start(RECORD_COUNT_OFFSET + 4))?;
    copy_range(original, output, RECORD_COUNT_OFFSET + 4, RECORD_TABLE_OFFSET)?;
    for record in &index.records {
        record.write(output)?;
    }

    // Content stays at identical absolute offsets; the grown table eats the
    // 16 bytes of slack that followed the original one.
    let resume = RECORD_TABLE_OFFSET + u64::from(original_count + 1) * RECORD_SIZE;
    original.seek(SeekFrom::Start(resume))?;
    copy_range(original, output, resume, original_len)?;

    for section in &composed.sections {
        debug!(
            offset = format_args!("{:08x}", section.offset),
            len = section.data.len(),
            "writing section container"
        );
        pad_to(output, section.offset)?;
        output.write_all(&section.data)?;
    }
    pad_to(output, composed.drm_offset)?;
    output.write_all(&composed.drm)?;

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::drm::{DrmBuilder, PlacedSection};
    use crate::manifest::SectionCatalog;
    use crate::section::{SectionDescriptor, SectionPayload, SectionType};
    use crate::tiger::testutil::archive_bytes;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn record(hash: u32) -> TigerRecord {
        TigerRecord {
            hash,
            spec_mask: 0xFFFF_FFFF,
            size: 0x80,
            packed_offset: 0x1000,
        }
    }

    fn one_section_catalog(payload: Vec<u8>) -> SectionCatalog {
        SectionCatalog {
            sections: vec![SectionDescriptor {
                section_type: SectionType::Dtp,
                id: 100,
                payload: SectionPayload::Fresh {
                    data: payload,
                    reloc_size: 0,
                },
                is_primary: true,
                resource_subtype: 0,
            }],
            primary_index: 0,
        }
    }

    #[test]
    fn splice_inserts_one_record_and_places_blobs() {
        let original = archive_bytes(&[record(0x10), record(0xF000_0000)], 0x200);
        let original_len = original.len() as u64;

        let composed = DrmBuilder::new(one_section_catalog(vec![0xEEu8; 64]))
            .with_base_offset(original_len)
            .build()
            .unwrap();

        let mut output = Cursor::new(Vec::new());
        splice(
            &mut Cursor::new(&original),
            &mut output,
            &composed,
            DRM_RECORD_HASH,
        )
        .unwrap();
        let written = output.into_inner();

        // Index grew by exactly one and stayed sorted
        let index = TigerIndex::parse(&mut Cursor::new(&written)).unwrap();
        assert_eq!(index.len(), 3);
        assert!(index.records.is_sorted_by_key(|r| r.hash));
        let inserted = index.find(DRM_RECORD_HASH).unwrap();
        assert_eq!(inserted.size, composed.drm.len() as u32);
        assert_eq!(
            u64::from(inserted.packed_offset),
            composed.drm_offset | u64::from(DLC_INDEX_TAG)
        );

        // Opaque header regions copied verbatim
        assert_eq!(&written[..0x0C], &original[..0x0C]);
        assert_eq!(&written[0x10..0x34], &original[0x10..0x34]);

        // Original content preserved at identical absolute offsets
        let resume = (0x34 + 3 * 0x10) as usize;
        assert_eq!(
            &written[resume..original_len as usize],
            &original[resume..original_len as usize]
        );

        // Section container and DRM blob land at their computed placements
        let section = &composed.sections[0];
        let start = section.offset as usize;
        assert_eq!(&written[start..start + section.data.len()], &section.data[..]);
        let drm_start = composed.drm_offset as usize;
        assert_eq!(
            &written[drm_start..drm_start + composed.drm.len()],
            &composed.drm[..]
        );
        // The gap up to the placement is zero-filled
        assert!(written[original_len as usize..start].iter().all(|&b| b == 0));
    }

    #[test]
    fn duplicate_record_hash_aborts_the_splice() {
        let original = archive_bytes(&[record(DRM_RECORD_HASH)], 0x100);
        let composed = DrmBuilder::new(one_section_catalog(vec![0u8; 16]))
            .with_base_offset(original.len() as u64)
            .build()
            .unwrap();

        let err = splice(
            &mut Cursor::new(&original),
            &mut Cursor::new(Vec::new()),
            &composed,
            DRM_RECORD_HASH,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            TigerError::DuplicateRecordHash(DRM_RECORD_HASH)
        ));
    }

    #[test]
    fn archive_without_content_region_is_an_empty_range() {
        // Nothing past the record table, so the verbatim content copy has
        // start >= end
        let original = archive_bytes(&[], 0);
        let composed = DrmBuilder::new(one_section_catalog(vec![0u8; 16]))
            .with_base_offset(original.len() as u64)
            .build()
            .unwrap();

        let err = splice(
            &mut Cursor::new(&original),
            &mut Cursor::new(Vec::new()),
            &composed,
            DRM_RECORD_HASH,
        )
        .unwrap_err();
        assert!(matches!(err, TigerError::EmptyRange { .. }));
    }

    #[test]
    fn backward_placement_is_fatal() {
        let original = archive_bytes(&[record(0x10)], 0x100);
        // A placement behind the end of the copied archive must never be
        // silently tolerated
        let composed = crate::drm::ComposedDrm {
            drm: vec![0xAA; 8],
            sections: vec![PlacedSection {
                offset: 0x20,
                data: vec![0xBB; 8],
            }],
            drm_offset: 0x800,
        };

        let err = splice(
            &mut Cursor::new(&original),
            &mut Cursor::new(Vec::new()),
            &composed,
            DRM_RECORD_HASH,
        )
        .unwrap_err();
        assert!(matches!(err, TigerError::BackwardPad { .. }));
    }
}
