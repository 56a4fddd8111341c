//! Registry and catalog abstractions.
//!
//! [`Registry`] is the read-only view the manifest parser and the validation
//! rules consult. [`Catalog`] adds the writes the publishing pipeline needs.
//! Both unique constraints (add-on GUID, per-add-on filename) are enforced by
//! the catalog's inserts; everything upstream is an advisory pre-check.

pub mod memory;

pub use memory::MemoryRegistry;

use thiserror::Error;
use xpi_schema::{Addon, AddonType, AppKind, AppVersion, ContentHash, File, Platform, Version};

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("Duplicate GUID: {0}")]
    DuplicateGuid(String),

    #[error("Duplicate filename for add-on {addon_id}: {filename}")]
    DuplicateFilename { addon_id: u64, filename: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Registry is locked")]
    Lock,

    #[error("Registry backend error: {0}")]
    Backend(String),
}

/// Read access to known applications, application versions and add-ons.
pub trait Registry {
    /// Application declaring this GUID, if the registry knows it.
    fn find_application(&self, guid: &str) -> Result<Option<AppKind>, RegistryError>;

    /// Exact-match lookup of a release string for `app`.
    fn find_app_version(
        &self,
        app: AppKind,
        version: &str,
    ) -> Result<Option<AppVersion>, RegistryError>;

    fn find_addon_by_guid(&self, guid: &str) -> Result<Option<Addon>, RegistryError>;
}

/// New add-on row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAddon {
    pub guid: Option<String>,
    pub addon_type: AddonType,
    pub name: String,
}

/// New version row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVersion {
    pub addon: Addon,
    pub version: String,
    pub compatible_apps: Vec<AppKind>,
}

/// New file row; the id is assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewFile {
    pub version_id: u64,
    pub addon_id: u64,
    pub platform: Option<Platform>,
    pub filename: String,
    pub hash: ContentHash,
    pub size_kb: u64,
    pub is_jetpack: bool,
    pub created_at: i64,
}

impl NewFile {
    /// The stored row, once the backend has assigned `id`.
    pub fn into_file(self, id: u64) -> File {
        File {
            id,
            version_id: self.version_id,
            addon_id: self.addon_id,
            platform: self.platform,
            filename: self.filename,
            hash: self.hash,
            size_kb: self.size_kb,
            is_jetpack: self.is_jetpack,
            created_at: self.created_at,
        }
    }
}

/// Registry with writes.
pub trait Catalog: Registry {
    /// Insert an add-on. Fails with [`RegistryError::DuplicateGuid`] if another
    /// add-on already holds the GUID.
    fn insert_addon(&self, addon: NewAddon) -> Result<Addon, RegistryError>;

    fn get_addon(&self, id: u64) -> Result<Option<Addon>, RegistryError>;

    fn insert_version(&self, version: NewVersion) -> Result<Version, RegistryError>;

    fn get_version(&self, id: u64) -> Result<Option<Version>, RegistryError>;

    /// Delete a version record together with its files. Returns `false` if it
    /// did not exist.
    fn delete_version(&self, id: u64) -> Result<bool, RegistryError>;

    /// Insert a file. Fails with [`RegistryError::DuplicateFilename`] if the
    /// add-on already has a file with this name.
    fn insert_file(&self, file: NewFile) -> Result<File, RegistryError>;

    fn get_file(&self, id: u64) -> Result<Option<File>, RegistryError>;

    /// Delete a file record. Returns `false` if it did not exist.
    fn delete_file(&self, id: u64) -> Result<bool, RegistryError>;

    /// Register a release string; returns the existing row if already known.
    fn insert_app_version(&self, app: AppKind, version: &str)
    -> Result<AppVersion, RegistryError>;

    fn list_app_versions(&self, app: AppKind) -> Result<Vec<AppVersion>, RegistryError>;
}
