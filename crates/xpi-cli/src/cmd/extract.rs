//! Extract command

use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

use xpi_core::io::Archive;

/// Unpack a package and print the resulting tree
pub fn extract(path: &Path, dest: &Path) -> Result<()> {
    let mut archive =
        Archive::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let extracted = archive
        .extract_all(dest)
        .with_context(|| format!("Failed to extract into {}", dest.display()))?;

    for entry in WalkDir::new(dest).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let relative = entry.path().strip_prefix(dest)?;
        if entry.file_type().is_dir() {
            println!("  {}/", relative.display());
        } else {
            println!("  {}", relative.display());
        }
    }

    let dirs = extracted.iter().filter(|f| f.is_directory).count();
    println!(
        "Extracted {} files and {} directories into {}",
        extracted.len() - dirs,
        dirs,
        dest.display()
    );
    Ok(())
}
