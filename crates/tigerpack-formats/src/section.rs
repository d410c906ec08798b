//! Section types and descriptors
//!
//! A DRM bundle holds one or more sections, each carrying one resource's
//! payload plus its type and identity metadata. The section type determines
//! the numeric type code stored in the bundle, the canonical file extension
//! used for staging copies, and the default resource subtype packed next to
//! the relocation-table size.

/// Resource section types recognized by the composer
///
/// The numeric codes and extensions match the engine's loader; `dtp` (code 7)
/// carries generic loadable objects, including mesh-collision data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionType {
    /// Texture resource (render resource, PCD payload)
    Texture,
    /// Generic loadable-object data, including mesh-collision data
    Dtp,
    /// Material definition
    Material,
    /// Render mesh
    Mesh,
}

impl SectionType {
    /// Resolve a manifest type token
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "tex" => Some(Self::Texture),
            "dtp" => Some(Self::Dtp),
            "material" => Some(Self::Material),
            "mesh" => Some(Self::Mesh),
            _ => None,
        }
    }

    /// Numeric type code stored in section metadata
    pub const fn type_code(self) -> u8 {
        match self {
            Self::Texture => 5,
            Self::Dtp => 7,
            Self::Material => 10,
            Self::Mesh => 12,
        }
    }

    /// Canonical file extension for staged payload copies
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Texture => ".tr9pcd",
            Self::Dtp => ".tr9dtp",
            Self::Material => ".tr9material",
            Self::Mesh => ".tr9mesh",
        }
    }

    /// Default resource subtype packed into the section's metadata
    pub const fn default_subtype(self) -> u32 {
        match self {
            Self::Texture => 26,
            Self::Dtp | Self::Material => 0,
            Self::Mesh => 24,
        }
    }
}

/// Where a section's payload bytes come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionPayload {
    /// A newly supplied payload that must be framed and placed
    Fresh {
        /// Raw payload bytes, relocation table included
        data: Vec<u8>,
        /// Size of the embedded relocation table
        reloc_size: u32,
    },
    /// Payload bytes already stored in the target archive; only metadata is
    /// emitted, referencing the recorded placement verbatim
    InArchive {
        /// Recorded packed offset within the archive
        offset: u32,
        /// Recorded framed container length
        compressed_size: u32,
        /// Recorded decompressed offset
        decompressed_offset: u32,
        /// Recorded logical section size
        size: u32,
    },
}

/// One fully resolved section of a DRM bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDescriptor {
    /// Resource type
    pub section_type: SectionType,
    /// Author-assigned identifier, unique within the archive
    pub id: u32,
    /// Payload source and sizing
    pub payload: SectionPayload,
    /// Whether this is the bundle's primary section
    pub is_primary: bool,
    /// Resource subtype packed next to the relocation size
    pub resource_subtype: u32,
}

impl SectionDescriptor {
    /// Logical section size: payload length minus the relocation table for
    /// fresh sections, the recorded size for in-archive sections
    pub fn resolved_size(&self) -> u32 {
        match &self.payload {
            SectionPayload::Fresh { data, reloc_size } => data.len() as u32 - reloc_size,
            SectionPayload::InArchive { size, .. } => *size,
        }
    }

    /// Relocation-table size declared in section metadata
    pub fn reloc_size(&self) -> u32 {
        match &self.payload {
            SectionPayload::Fresh { reloc_size, .. } => *reloc_size,
            SectionPayload::InArchive { .. } => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn token_round_trip() {
        for (token, expected) in [
            ("tex", SectionType::Texture),
            ("dtp", SectionType::Dtp),
            ("material", SectionType::Material),
            ("mesh", SectionType::Mesh),
        ] {
            assert_eq!(SectionType::from_token(token), Some(expected));
        }
        assert_eq!(SectionType::from_token("sound"), None);
    }

    #[test]
    fn dtp_metadata_is_pinned() {
        assert_eq!(SectionType::Dtp.type_code(), 7);
        assert_eq!(SectionType::Dtp.extension(), ".tr9dtp");
        assert_eq!(SectionType::Dtp.default_subtype(), 0);
    }

    #[test]
    fn resolved_size_subtracts_reloc_table() {
        let section = SectionDescriptor {
            section_type: SectionType::Dtp,
            id: 1,
            payload: SectionPayload::Fresh {
                data: vec![0; 100],
                reloc_size: 0x14,
            },
            is_primary: true,
            resource_subtype: 0,
        };
        assert_eq!(section.resolved_size(), 100 - 0x14);
        assert_eq!(section.reloc_size(), 0x14);
    }

    #[test]
    fn in_archive_size_is_recorded_verbatim() {
        let section = SectionDescriptor {
            section_type: SectionType::Mesh,
            id: 2,
            payload: SectionPayload::InArchive {
                offset: 0x450,
                compressed_size: 0x1000,
                decompressed_offset: 0x40,
                size: 0xFE0,
            },
            is_primary: false,
            resource_subtype: 24,
        };
        assert_eq!(section.resolved_size(), 0xFE0);
        assert_eq!(section.reloc_size(), 0);
    }
}
