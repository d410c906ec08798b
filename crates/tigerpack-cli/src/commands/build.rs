//! The `build` command: manifest in, rewritten archive out

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::info;

use tigerpack_formats::manifest::{PayloadProvider, SectionSource};
use tigerpack_formats::tiger::DRM_RECORD_HASH;
use tigerpack_formats::{DrmBuilder, ManifestEntry, build_catalog, parse_manifest, splice};

use crate::BuildConfig;

/// Payload provider backed by the filesystem
struct FsPayloadProvider;

impl PayloadProvider for FsPayloadProvider {
    fn payload(&self, source: &str) -> std::io::Result<Vec<u8>> {
        fs::read(source)
    }
}

/// Derive the output bundle path from the manifest path: swap a `.txtdrm`
/// extension for `.drm`, otherwise append `.drm`
pub fn default_output_path(manifest: &Path) -> PathBuf {
    if manifest.extension().is_some_and(|ext| ext == "txtdrm") {
        manifest.with_extension("drm")
    } else {
        let mut name = manifest.as_os_str().to_os_string();
        name.push(".drm");
        PathBuf::from(name)
    }
}

fn stage_payloads(entries: &[ManifestEntry], staging: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(staging)
        .with_context(|| format!("failed to create staging directory '{}'", staging.display()))?;
    for entry in entries {
        if let SectionSource::Path(source) = &entry.source {
            let staged = staging.join(format!("{}{}", entry.id, entry.section_type.extension()));
            fs::copy(source, &staged)
                .with_context(|| format!("failed to stage '{}'", source))?;
            info!("copied '{}' to '{}'", source, staged.display());
        }
    }
    Ok(())
}

/// Run a full build: catalog, compose, write the bundle, splice the archive
pub fn handle(
    manifest_path: &Path,
    output_path: Option<PathBuf>,
    config: &BuildConfig,
) -> anyhow::Result<()> {
    let output_path = output_path.unwrap_or_else(|| default_output_path(manifest_path));
    info!("building drm '{}'", manifest_path.display());

    let text = fs::read_to_string(manifest_path)
        .with_context(|| format!("failed to read manifest '{}'", manifest_path.display()))?;
    let entries = parse_manifest(&text)?;
    stage_payloads(&entries, &config.staging_directory)?;
    let catalog = build_catalog(&entries, &FsPayloadProvider)?;

    let backup = &config.master_archive_backup_path;
    let base_offset = fs::metadata(backup)
        .with_context(|| format!("failed to stat archive '{}'", backup.display()))?
        .len();
    let composed = DrmBuilder::new(catalog)
        .with_base_offset(base_offset)
        .build()?;

    fs::write(&output_path, &composed.drm)
        .with_context(|| format!("failed to write '{}'", output_path.display()))?;
    info!("built drm '{}'", output_path.display());

    let master = &config.master_archive_path;
    info!("writing to '{}'", master.display());
    let mut original = File::open(backup)
        .with_context(|| format!("failed to open archive '{}'", backup.display()))?;
    let mut output = File::create(master)
        .with_context(|| format!("failed to create archive '{}'", master.display()))?;
    splice(&mut original, &mut output, &composed, DRM_RECORD_HASH)?;
    output.sync_all()?;
    info!("wrote '{}'", master.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn output_path_swaps_txtdrm_extension() {
        assert_eq!(
            default_output_path(Path::new("level/custom.txtdrm")),
            PathBuf::from("level/custom.drm")
        );
    }

    #[test]
    fn output_path_appends_drm_otherwise() {
        assert_eq!(
            default_output_path(Path::new("level/custom.manifest")),
            PathBuf::from("level/custom.manifest.drm")
        );
    }
}
