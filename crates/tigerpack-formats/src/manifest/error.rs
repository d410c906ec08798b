//! Manifest and catalog error types

use thiserror::Error;

use crate::reloc::RelocError;

/// Errors raised while parsing a manifest or resolving its catalog
#[derive(Debug, Error)]
pub enum ManifestError {
    /// Line does not carry the three mandatory tokens
    #[error("malformed manifest line {line}: '{content}'")]
    MalformedLine {
        /// 1-based line number
        line: usize,
        /// The offending line
        content: String,
    },

    /// Unknown section type token
    #[error("unknown section type '{token}' on manifest line {line}")]
    UnknownSectionType {
        /// 1-based line number
        line: usize,
        /// The unrecognized type token
        token: String,
    },

    /// A numeric token or flag value failed to parse
    #[error("invalid integer '{token}' on manifest line {line}")]
    InvalidInteger {
        /// 1-based line number
        line: usize,
        /// The unparseable token
        token: String,
    },

    /// Unrecognized flag token
    #[error("unknown flag '{flag}' on manifest line {line}")]
    UnknownFlag {
        /// 1-based line number
        line: usize,
        /// The unrecognized flag
        flag: String,
    },

    /// An already-in-archive section is missing one of its required flags
    #[error("section {id} is already in the archive but missing required flag '{flag}='")]
    MissingPlacementFlag {
        /// Section id
        id: u32,
        /// Name of the missing flag
        flag: &'static str,
    },

    /// A subtype override does not fit the 8-bit metadata field; a larger
    /// value would bleed into the relocation-size bits packed next to it
    #[error("section {id}: subtype {subtype} does not fit the 8-bit metadata field")]
    SubtypeTooLarge {
        /// Section id
        id: u32,
        /// The out-of-range subtype value
        subtype: u32,
    },

    /// The manifest must flag exactly one primary section
    #[error("manifest flags {count} primary sections (exactly one required)")]
    PrimarySectionCount {
        /// Number of sections flagged primary
        count: usize,
    },

    /// The manifest contains no section lines
    #[error("manifest contains no sections")]
    EmptyManifest,

    /// A fresh payload's relocation header could not be read
    #[error("section {id}: {source}")]
    RelocHeader {
        /// Section id
        id: u32,
        /// Underlying relocation header error
        source: RelocError,
    },

    /// Declared relocation table exceeds the payload itself
    #[error("section {id}: relocation table ({reloc} bytes) exceeds payload ({payload} bytes)")]
    RelocExceedsPayload {
        /// Section id
        id: u32,
        /// Relocation table size
        reloc: u32,
        /// Payload length
        payload: usize,
    },

    /// Payload provider failure
    #[error("failed to read payload '{source_path}': {source}")]
    Payload {
        /// The manifest's source token
        source_path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

/// Result type for manifest operations
pub type ManifestResult<T> = Result<T, ManifestError>;
