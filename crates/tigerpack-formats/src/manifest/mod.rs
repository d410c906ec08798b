//! Section manifest parsing and catalog building
//!
//! A manifest is a line-oriented text file describing the sections of a DRM
//! bundle, one section per line:
//!
//! ```text
//! <type> <id> <source-or-dash> [flag | flag=value]*
//! ```
//!
//! The first three tokens are mandatory. A source of `-` marks a section
//! whose bytes already live in the target archive; such sections carry their
//! placement in `offset=`, `compressed_size=`, `decompressed_offset=` and
//! `size=` flags instead of a payload file. Bare flags are `primary` and
//! `no_reloc`; `reloc_size=` and `subtype=` override the derived values.
//!
//! Blank lines are skipped. There is no comment syntax.

mod catalog;
mod error;

pub use catalog::{PayloadProvider, SectionCatalog, build_catalog};
pub use error::{ManifestError, ManifestResult};

use crate::section::SectionType;

/// Where a manifest entry's payload comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionSource {
    /// Path token naming the payload file
    Path(String),
    /// `-` placeholder: the payload already lives in the target archive
    AlreadyInArchive,
}

/// One parsed manifest line, before catalog resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based manifest line number, kept for diagnostics
    pub line: usize,
    /// Resource type
    pub section_type: SectionType,
    /// Author-assigned section id
    pub id: u32,
    /// Payload source
    pub source: SectionSource,
    /// `primary` flag
    pub is_primary: bool,
    /// `no_reloc` flag
    pub no_reloc: bool,
    /// `reloc_size=` override
    pub reloc_size: Option<u32>,
    /// `subtype=` override
    pub subtype: Option<u32>,
    /// `offset=` flag (required for already-in-archive sections)
    pub offset: Option<u32>,
    /// `compressed_size=` flag (required for already-in-archive sections)
    pub compressed_size: Option<u32>,
    /// `decompressed_offset=` flag (required for already-in-archive sections)
    pub decompressed_offset: Option<u32>,
    /// `size=` flag (required for already-in-archive sections)
    pub size: Option<u32>,
}

fn parse_u32(line: usize, token: &str) -> ManifestResult<u32> {
    let parsed = if let Some(hex) = token.strip_prefix("0x") {
        u32::from_str_radix(hex, 16)
    } else {
        token.parse()
    };
    parsed.map_err(|_| ManifestError::InvalidInteger {
        line,
        token: token.to_string(),
    })
}

fn parse_line(line_no: usize, line: &str) -> ManifestResult<ManifestEntry> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 3 {
        return Err(ManifestError::MalformedLine {
            line: line_no,
            content: line.to_string(),
        });
    }

    let section_type =
        SectionType::from_token(tokens[0]).ok_or_else(|| ManifestError::UnknownSectionType {
            line: line_no,
            token: tokens[0].to_string(),
        })?;
    let id = parse_u32(line_no, tokens[1])?;
    let source = if tokens[2] == "-" {
        SectionSource::AlreadyInArchive
    } else {
        SectionSource::Path(tokens[2].to_string())
    };

    let mut entry = ManifestEntry {
        line: line_no,
        section_type,
        id,
        source,
        is_primary: false,
        no_reloc: false,
        reloc_size: None,
        subtype: None,
        offset: None,
        compressed_size: None,
        decompressed_offset: None,
        size: None,
    };

    for flag in &tokens[3..] {
        match flag.split_once('=') {
            None => match *flag {
                "primary" => entry.is_primary = true,
                "no_reloc" => entry.no_reloc = true,
                _ => {
                    return Err(ManifestError::UnknownFlag {
                        line: line_no,
                        flag: (*flag).to_string(),
                    });
                }
            },
            Some((key, value)) => {
                let value = parse_u32(line_no, value)?;
                match key {
                    "reloc_size" => entry.reloc_size = Some(value),
                    "subtype" => entry.subtype = Some(value),
                    "offset" => entry.offset = Some(value),
                    "compressed_size" => entry.compressed_size = Some(value),
                    "decompressed_offset" => entry.decompressed_offset = Some(value),
                    "size" => entry.size = Some(value),
                    _ => {
                        return Err(ManifestError::UnknownFlag {
                            line: line_no,
                            flag: (*flag).to_string(),
                        });
                    }
                }
            }
        }
    }

    Ok(entry)
}

/// Parse a manifest into its entries, in declaration order
pub fn parse_manifest(text: &str) -> ManifestResult<Vec<ManifestEntry>> {
    let mut entries = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        entries.push(parse_line(index + 1, line)?);
    }
    Ok(entries)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_minimal_line() {
        let entries = parse_manifest("dtp 100 mesh.dat primary\n").unwrap();
        assert_eq!(entries.len(), 1);
        let entry = &entries[0];
        assert_eq!(entry.section_type, SectionType::Dtp);
        assert_eq!(entry.id, 100);
        assert_eq!(entry.source, SectionSource::Path("mesh.dat".to_string()));
        assert!(entry.is_primary);
        assert!(!entry.no_reloc);
    }

    #[test]
    fn parses_value_flags_and_hex() {
        let entries = parse_manifest(
            "tex 7 - offset=0x2000450 compressed_size=4096 decompressed_offset=64 size=4064\n",
        )
        .unwrap();
        let entry = &entries[0];
        assert_eq!(entry.source, SectionSource::AlreadyInArchive);
        assert_eq!(entry.offset, Some(0x0200_0450));
        assert_eq!(entry.compressed_size, Some(4096));
        assert_eq!(entry.decompressed_offset, Some(64));
        assert_eq!(entry.size, Some(4064));
    }

    #[test]
    fn skips_blank_lines_and_numbers_from_one() {
        let entries = parse_manifest("\ndtp 1 a.dat primary\n\nmesh 2 b.dat no_reloc\n").unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].line, 2);
        assert_eq!(entries[1].line, 4);
        assert!(entries[1].no_reloc);
    }

    #[test]
    fn unknown_type_is_fatal() {
        let err = parse_manifest("sound 1 a.dat\n").unwrap_err();
        assert!(matches!(
            err,
            ManifestError::UnknownSectionType { line: 1, .. }
        ));
    }

    #[test]
    fn short_line_is_malformed() {
        let err = parse_manifest("dtp 1\n").unwrap_err();
        assert!(matches!(err, ManifestError::MalformedLine { line: 1, .. }));
    }

    #[test]
    fn unknown_flag_is_fatal() {
        let err = parse_manifest("dtp 1 a.dat compressed\n").unwrap_err();
        assert!(matches!(err, ManifestError::UnknownFlag { .. }));
    }

    #[test]
    fn bad_integer_is_fatal() {
        let err = parse_manifest("dtp banana a.dat\n").unwrap_err();
        assert!(matches!(err, ManifestError::InvalidInteger { .. }));
    }
}
