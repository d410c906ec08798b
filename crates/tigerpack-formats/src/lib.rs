//! Binary format parsers and builders for CDC-engine resource bundles
//!
//! This crate implements the container formats used by CDC-engine games to
//! store and locate resources, and the composition logic that packages new
//! resources into an existing installation:
//!
//! - **DRM**: the resource-bundle container holding one or more typed
//!   sections plus the metadata tables describing their storage
//! - **CDRM**: the block-framed encoding wrapped around each section's
//!   payload before it is stored (always in stored/uncompressed mode here)
//! - **Tiger**: the engine's master archive, indexed by a sorted table of
//!   hash records, into which new DRM bundles are spliced
//! - **Manifest**: the line-oriented text format describing the sections of
//!   a bundle, and the catalog builder that resolves it
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: formats that are written are also parsed, so
//!   every build can be verified by reading it back
//! - **Deterministic Core**: composition is a pure function of the manifest,
//!   the payload bytes, and the existing archive bytes; all file access is
//!   injected at the edges and tests run on in-memory buffers
//! - **Fail Fast**: any offset or cursor inconsistency during splicing is a
//!   typed error, never a silently corrupted archive

#![allow(clippy::cast_possible_truncation)] // Intentional for binary format fields
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::uninlined_format_args)] // Backwards compatibility
#![allow(clippy::doc_markdown)] // Many CDC-specific terms don't need backticks
#![warn(missing_docs)]

pub mod cdrm;
pub mod drm;
pub mod manifest;
pub mod reloc;
pub mod section;
pub mod tiger;

mod util;

pub use cdrm::{CdrmContainer, CdrmError, CdrmResult};
pub use drm::{
    ComposedDrm, DrmBuilder, DrmError, DrmFile, DrmHeader, DrmResult, PlacedSection,
    SectionExtraInfo, SectionInfo,
};
pub use manifest::{
    ManifestEntry, ManifestError, ManifestResult, PayloadProvider, SectionCatalog, SectionSource,
    build_catalog, parse_manifest,
};
pub use reloc::{RelocError, RelocHeader};
pub use section::{SectionDescriptor, SectionPayload, SectionType};
pub use tiger::{TigerError, TigerIndex, TigerRecord, TigerResult, splice};
