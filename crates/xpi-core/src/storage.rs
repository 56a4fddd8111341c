//! Storage abstraction for staged and permanent artifacts.
//!
//! Every write lands in a temporary file inside the destination directory and
//! is renamed into place, so readers never observe a partially written
//! artifact at its final path.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// How a staged artifact reaches permanent storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    /// Rename the staged file (the staging copy disappears).
    #[default]
    Move,
    /// Copy the staged file and leave the source in place.
    Copy,
}

/// Filesystem-like operations the pipeline needs from a storage backend.
pub trait Storage {
    /// Atomically write `data` to `path`, creating parent directories.
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StorageError>;

    /// Move `src` to `dst`; `dst` appears atomically.
    fn move_file(&self, src: &Path, dst: &Path) -> Result<(), StorageError>;

    /// Copy `src` to `dst`; `dst` appears atomically.
    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), StorageError>;

    /// Delete `path`. Returns `false` if there was nothing to delete.
    fn delete(&self, path: &Path) -> Result<bool, StorageError>;

    /// Whether `path` exists.
    fn exists(&self, path: &Path) -> bool;

    /// Move or copy depending on `mode`.
    fn transfer(&self, src: &Path, dst: &Path, mode: TransferMode) -> Result<(), StorageError> {
        match mode {
            TransferMode::Move => self.move_file(src, dst),
            TransferMode::Copy => self.copy_file(src, dst),
        }
    }
}

/// Local disk storage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }

    fn ensure_parent(path: &Path) -> Result<&Path, StorageError> {
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).map_err(|e| StorageError::io(parent, e))?;
        Ok(parent)
    }

    /// Stream `reader` into a temp file next to `dst`, then rename it over `dst`.
    fn write_via_temp<R: io::Read>(reader: &mut R, dst: &Path) -> Result<(), StorageError> {
        let parent = Self::ensure_parent(dst)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".tmp-")
            .tempfile_in(parent)
            .map_err(|e| StorageError::io(parent, e))?;

        io::copy(reader, &mut tmp).map_err(|e| StorageError::io(dst, e))?;
        tmp.as_file_mut()
            .sync_all()
            .map_err(|e| StorageError::io(dst, e))?;
        tmp.persist(dst).map_err(|e| StorageError::io(dst, e.error))?;
        Ok(())
    }
}

impl Storage for LocalStorage {
    fn write(&self, path: &Path, data: &[u8]) -> Result<(), StorageError> {
        let mut reader = data;
        Self::write_via_temp(&mut reader, path)
    }

    fn move_file(&self, src: &Path, dst: &Path) -> Result<(), StorageError> {
        Self::ensure_parent(dst)?;
        match fs::rename(src, dst) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                // Rename fails across filesystems; fall back to copy + unlink.
                if !src.exists() {
                    return Err(StorageError::io(src, rename_err));
                }
                tracing::debug!(
                    src = %src.display(),
                    dst = %dst.display(),
                    error = %rename_err,
                    "rename failed, copying instead"
                );
                self.copy_file(src, dst)?;
                fs::remove_file(src).map_err(|e| StorageError::io(src, e))
            }
        }
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> Result<(), StorageError> {
        let mut file = fs::File::open(src).map_err(|e| StorageError::io(src, e))?;
        Self::write_via_temp(&mut file, dst)
    }

    fn delete(&self, path: &Path) -> Result<bool, StorageError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::io(path, e)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// Write `data` directly, bypassing atomic placement. Test helper for
/// simulating artifacts created out of band.
#[cfg(test)]
pub(crate) fn write_plain(path: &Path, data: &[u8]) -> io::Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::File::create(path)?.write_all(data)
}
