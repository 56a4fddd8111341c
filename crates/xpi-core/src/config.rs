//! Runtime settings.
//!
//! Resolution order: built-in defaults under `XPI_HOME`, then the optional
//! `config.toml`, then `XPI_*` environment variables.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use xpi_schema::AppKind;

use crate::storage::TransferMode;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Effective settings for one process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root of the permanent add-on storage tree.
    pub addons_path: PathBuf,
    /// Directory receiving in-flight uploads.
    pub staging_path: PathBuf,
    /// `SQLite` registry location (CLI only).
    pub db_path: PathBuf,
    /// Application segment used when building public URLs.
    pub site_app: AppKind,
    /// Locale segment used when building EULA URLs.
    pub locale: String,
    /// Whether staged uploads are moved or copied into storage.
    pub transfer: TransferMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            addons_path: crate::paths::addons_path(),
            staging_path: crate::paths::staging_path(),
            db_path: crate::paths::db_path(),
            site_app: AppKind::Firefox,
            locale: "en-US".to_string(),
            transfer: TransferMode::Move,
        }
    }
}

/// On-disk shape of `config.toml`; every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    addons_path: Option<PathBuf>,
    staging_path: Option<PathBuf>,
    db_path: Option<PathBuf>,
    site_app: Option<AppKind>,
    locale: Option<String>,
    transfer: Option<TransferMode>,
}

impl Settings {
    /// Load settings from `$XPI_HOME/config.toml` (if present) and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if an environment override has an invalid value.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        let path = crate::paths::config_path();
        if path.exists() {
            settings.merge_file(&path)?;
        }
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Overlay values from a TOML config file.
    pub fn merge_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.merge_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn merge_toml(&mut self, content: &str) -> Result<(), toml::de::Error> {
        let file: FileConfig = toml::from_str(content)?;

        if let Some(v) = file.addons_path {
            self.addons_path = v;
        }
        if let Some(v) = file.staging_path {
            self.staging_path = v;
        }
        if let Some(v) = file.db_path {
            self.db_path = v;
        }
        if let Some(v) = file.site_app {
            self.site_app = v;
        }
        if let Some(v) = file.locale {
            self.locale = v;
        }
        if let Some(v) = file.transfer {
            self.transfer = v;
        }
        Ok(())
    }

    /// Overlay `XPI_*` variables obtained through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("XPI_ADDONS_PATH") {
            self.addons_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("XPI_STAGING_PATH") {
            self.staging_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("XPI_DB_PATH") {
            self.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("XPI_SITE_APP") {
            self.site_app = v.parse().map_err(|_| ConfigError::InvalidValue {
                key: "XPI_SITE_APP",
                value: v.clone(),
            })?;
        }
        if let Some(v) = lookup("XPI_LOCALE") {
            self.locale = v;
        }
        if let Some(v) = lookup("XPI_TRANSFER") {
            self.transfer = match v.to_ascii_lowercase().as_str() {
                "move" => TransferMode::Move,
                "copy" => TransferMode::Copy,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: "XPI_TRANSFER",
                        value: v,
                    });
                }
            };
        }
        Ok(())
    }
}
