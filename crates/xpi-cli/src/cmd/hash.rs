//! Hash command

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use xpi_schema::ContentHash;

/// Print the content hash of each file, in the form uploads are recorded with
pub fn hash(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let hash = compute_file_hash(file)
            .with_context(|| format!("Failed to hash {}", file.display()))?;
        println!("{} {}", hash, file.display());
    }
    Ok(())
}

/// Streaming SHA-256 of a file
pub fn compute_file_hash(path: &Path) -> Result<ContentHash> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 65536]; // 64KB buffer

    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(&buffer[..bytes_read]);
    }

    Ok(ContentHash::sha256(hex::encode(hasher.finalize()))?)
}
