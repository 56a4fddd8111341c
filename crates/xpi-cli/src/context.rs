//! Shared command context.
//!
//! Groups the resolved settings and the opened registry so every command
//! starts from the same state.

use anyhow::{Context as _, Result};
use xpi_core::{LocalStorage, Pipeline, Settings, UploadReceiver, UrlBuilder};

use crate::store::SqliteRegistry;

#[derive(Debug)]
pub struct Context {
    pub settings: Settings,
    pub registry: SqliteRegistry,
}

impl Context {
    /// Load settings from `XPI_HOME` and the environment, then open the registry.
    pub fn load() -> Result<Self> {
        let settings = Settings::load().context("Failed to load settings")?;
        Self::with_settings(settings)
    }

    pub fn with_settings(settings: Settings) -> Result<Self> {
        let registry = SqliteRegistry::open_at(&settings.db_path).with_context(|| {
            format!("Failed to open registry at {}", settings.db_path.display())
        })?;
        Ok(Self { settings, registry })
    }

    pub fn pipeline(&self) -> Pipeline<'_, SqliteRegistry> {
        Pipeline::new(&self.registry, LocalStorage, &self.settings.addons_path)
            .with_transfer(self.settings.transfer)
    }

    pub fn receiver(&self) -> UploadReceiver {
        UploadReceiver::new(&self.settings.staging_path)
    }

    pub fn urls(&self) -> UrlBuilder {
        UrlBuilder::new(self.settings.site_app, self.settings.locale.clone())
    }
}
