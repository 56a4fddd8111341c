//! Umbrella error for pipeline operations

use thiserror::Error;

use crate::config::ConfigError;
use crate::io::{ArchiveError, UploadError};
use crate::manifest::ManifestError;
use crate::registry::RegistryError;
use crate::storage::StorageError;

#[derive(Error, Debug)]
pub enum XpiError {
    #[error("Upload failed: {0}")]
    Upload(#[from] UploadError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),

    #[error("Invalid add-on: {0}")]
    Manifest(#[from] ManifestError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl XpiError {
    /// Whether the uploader can fix this by sending a different package, as
    /// opposed to an operator-side failure.
    pub fn is_user_correctable(&self) -> bool {
        match self {
            Self::Upload(e) => matches!(e, UploadError::Incomplete { .. }),
            Self::Archive(e) => archive_is_user_correctable(e),
            Self::Manifest(e) => match e {
                ManifestError::Archive(e) => archive_is_user_correctable(e),
                ManifestError::Registry(_) => false,
                ManifestError::Missing
                | ManifestError::Malformed(_)
                | ManifestError::Invalid(_)
                | ManifestError::DuplicateGuid(_) => true,
            },
            Self::Registry(e) => matches!(
                e,
                RegistryError::DuplicateGuid(_) | RegistryError::DuplicateFilename { .. }
            ),
            Self::Storage(_) | Self::Config(_) => false,
        }
    }

    /// Messages suitable for showing to the uploader.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Manifest(e) => e.messages(),
            other => vec![other.to_string()],
        }
    }
}

fn archive_is_user_correctable(e: &ArchiveError) -> bool {
    matches!(e, ArchiveError::Corrupt(_) | ArchiveError::UnsafeEntry(_))
}
