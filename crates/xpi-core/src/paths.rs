use dirs::home_dir;
use std::path::{Path, PathBuf};

/// Returns the primary data directory, or None if the user's home cannot be resolved.
pub fn try_xpi_home() -> Option<PathBuf> {
    if let Ok(val) = std::env::var("XPI_HOME") {
        return Some(PathBuf::from(val));
    }
    home_dir().map(|h| h.join(".xpi"))
}

/// Returns the canonical data directory (`~/.xpi`).
///
/// Falls back to `./.xpi` when neither `XPI_HOME` nor a home directory is
/// available, so headless service accounts still get a usable layout.
pub fn xpi_home() -> PathBuf {
    try_xpi_home().unwrap_or_else(|| PathBuf::from(".xpi"))
}

/// Optional configuration file: ~/.xpi/config.toml
pub fn config_path() -> PathBuf {
    xpi_home().join("config.toml")
}

/// `SQLite` registry path: ~/.xpi/registry.db
pub fn db_path() -> PathBuf {
    xpi_home().join("registry.db")
}

/// Permanent add-on storage tree: ~/.xpi/addons
pub fn addons_path() -> PathBuf {
    xpi_home().join("addons")
}

/// Upload staging area: ~/.xpi/staging
pub fn staging_path() -> PathBuf {
    xpi_home().join("staging")
}

/// Where a file's artifact lives in the storage tree.
///
/// Pure function of `(addon_id, filename)` so the location can be rebuilt
/// without a registry lookup.
pub fn file_path(addons_root: &Path, addon_id: u64, filename: &str) -> PathBuf {
    addons_root.join(addon_id.to_string()).join(filename)
}
