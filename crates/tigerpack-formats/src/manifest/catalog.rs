//! Section catalog resolution
//!
//! Resolves parsed manifest entries into [`SectionDescriptor`]s with their
//! byte sizes fixed: fresh payloads are fetched through a [`PayloadProvider`]
//! and their relocation-table size read from the payload head, while
//! already-in-archive sections take all placement data from manifest flags.

use tracing::debug;

use super::error::{ManifestError, ManifestResult};
use super::{ManifestEntry, SectionSource};
use crate::reloc::RelocHeader;
use crate::section::{SectionDescriptor, SectionPayload};

/// Source of payload bytes for fresh sections
///
/// The catalog never touches the filesystem itself; callers hand in a
/// provider, and tests substitute an in-memory map.
pub trait PayloadProvider {
    /// Fetch the raw payload bytes named by a manifest source token
    fn payload(&self, source: &str) -> std::io::Result<Vec<u8>>;
}

impl PayloadProvider for std::collections::HashMap<String, Vec<u8>> {
    fn payload(&self, source: &str) -> std::io::Result<Vec<u8>> {
        self.get(source).cloned().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, format!("no payload '{source}'"))
        })
    }
}

/// An ordered, fully resolved section catalog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionCatalog {
    /// Sections in manifest order
    pub sections: Vec<SectionDescriptor>,
    /// Index of the single primary section
    pub primary_index: u32,
}

impl SectionCatalog {
    /// Number of sections in the catalog
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Whether the catalog holds no sections
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

fn required(entry: &ManifestEntry, value: Option<u32>, flag: &'static str) -> ManifestResult<u32> {
    value.ok_or(ManifestError::MissingPlacementFlag { id: entry.id, flag })
}

fn resolve_entry(
    entry: &ManifestEntry,
    provider: &impl PayloadProvider,
) -> ManifestResult<SectionDescriptor> {
    let payload = match &entry.source {
        SectionSource::AlreadyInArchive => SectionPayload::InArchive {
            offset: required(entry, entry.offset, "offset")?,
            compressed_size: required(entry, entry.compressed_size, "compressed_size")?,
            decompressed_offset: required(entry, entry.decompressed_offset, "decompressed_offset")?,
            size: required(entry, entry.size, "size")?,
        },
        SectionSource::Path(path) => {
            let data = provider
                .payload(path)
                .map_err(|source| ManifestError::Payload {
                    source_path: path.clone(),
                    source,
                })?;
            let reloc_size = if let Some(explicit) = entry.reloc_size {
                explicit
            } else if entry.no_reloc {
                0
            } else {
                RelocHeader::parse(&data)
                    .map_err(|source| ManifestError::RelocHeader {
                        id: entry.id,
                        source,
                    })?
                    .table_size()
            };
            if reloc_size as usize > data.len() {
                return Err(ManifestError::RelocExceedsPayload {
                    id: entry.id,
                    reloc: reloc_size,
                    payload: data.len(),
                });
            }
            SectionPayload::Fresh { data, reloc_size }
        }
    };

    let resource_subtype = entry
        .subtype
        .unwrap_or_else(|| entry.section_type.default_subtype());
    if resource_subtype > 0xFF {
        return Err(ManifestError::SubtypeTooLarge {
            id: entry.id,
            subtype: resource_subtype,
        });
    }

    Ok(SectionDescriptor {
        section_type: entry.section_type,
        id: entry.id,
        payload,
        is_primary: entry.is_primary,
        resource_subtype,
    })
}

/// Resolve parsed manifest entries into an ordered catalog
///
/// Requires exactly one `primary`-flagged section; zero or several is a
/// configuration error, as is an empty manifest.
pub fn build_catalog(
    entries: &[ManifestEntry],
    provider: &impl PayloadProvider,
) -> ManifestResult<SectionCatalog> {
    if entries.is_empty() {
        return Err(ManifestError::EmptyManifest);
    }

    let primary_count = entries.iter().filter(|e| e.is_primary).count();
    if primary_count != 1 {
        return Err(ManifestError::PrimarySectionCount {
            count: primary_count,
        });
    }

    let mut sections = Vec::with_capacity(entries.len());
    for entry in entries {
        let section = resolve_entry(entry, provider)?;
        debug!(
            id = section.id,
            code = section.section_type.type_code(),
            size = section.resolved_size(),
            reloc = section.reloc_size(),
            "resolved section"
        );
        sections.push(section);
    }

    let primary_index = sections
        .iter()
        .position(|s| s.is_primary)
        .unwrap_or_default() as u32;

    Ok(SectionCatalog {
        sections,
        primary_index,
    })
}
