//! The `inspect` command: dump a DRM bundle's metadata tables

use std::fs;
use std::io::Cursor;
use std::path::Path;

use anyhow::Context;

use tigerpack_formats::DrmFile;

/// Parse a bundle file and print its header and section tables
pub fn handle(path: &Path) -> anyhow::Result<()> {
    let data =
        fs::read(path).with_context(|| format!("failed to read '{}'", path.display()))?;
    let drm = DrmFile::parse(&mut Cursor::new(&data))
        .with_context(|| format!("failed to parse '{}'", path.display()))?;

    println!("DRM bundle '{}'", path.display());
    println!("  version:  0x{:02X}", drm.header.version);
    println!("  sections: {}", drm.header.num_sections);
    println!("  primary:  {}", drm.header.primary_section);
    println!();
    println!("  idx  type      id  size      reloc     subtype");
    for (index, section) in drm.sections.iter().enumerate() {
        println!(
            "  {:<4} {:<4} {:>7}  {:<8}  {:<8}  {}",
            index,
            section.type_code,
            section.id,
            section.size,
            section.reloc_size(),
            section.resource_subtype(),
        );
    }
    println!();
    println!("  idx  uniqueId  offset    compressed  decompressed");
    for (index, extra) in drm.extras.iter().enumerate() {
        println!(
            "  {:<4} {:08x}  {:08x}  {:<10}  {:08x}",
            index,
            extra.unique_id,
            extra.packed_offset,
            extra.compressed_size,
            extra.decompressed_offset,
        );
    }

    Ok(())
}
