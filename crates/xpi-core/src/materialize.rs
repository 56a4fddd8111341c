//! File materialization: turns a validated upload into a catalog record and
//! an artifact in permanent storage.

use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use xpi_schema::{File, Platform, Upload, Version};

use crate::error::XpiError;
use crate::io::Archive;
use crate::registry::{Catalog, NewFile};
use crate::storage::{LocalStorage, Storage, TransferMode};

/// Lowercase `value`, drop everything except word characters, whitespace and
/// hyphens, and collapse whitespace/hyphen runs into a single hyphen.
pub fn slugify(value: &str) -> String {
    let kept: String = value
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace() || *c == '-')
        .collect();

    let mut slug = String::with_capacity(kept.len());
    let mut in_run = false;
    for c in kept.trim().to_lowercase().chars() {
        if c.is_whitespace() || c == '-' {
            if !in_run {
                slug.push('-');
            }
            in_run = true;
        } else {
            in_run = false;
            slug.push(c);
        }
    }
    slug
}

/// Deterministic filename for a file of `version` on `platform`.
///
/// `{slug}-{version}[-{app}+{app}...][-{platform}].xpi`, where hyphens inside
/// the slug become underscores so the segments stay unambiguous.
pub fn generate_filename(version: &Version, platform: Option<Platform>) -> String {
    let mut parts = vec![
        slugify(&version.addon.name).replace('-', "_"),
        version.version.replace(['/', '\\'], "_"),
    ];

    if !version.compatible_apps.is_empty() {
        let apps: Vec<&str> = version
            .compatible_apps
            .iter()
            .map(|app| app.shortername())
            .collect();
        parts.push(apps.join("+"));
    }

    if let Some(platform) = platform.filter(|p| !p.is_all()) {
        parts.push(platform.shortname().to_string());
    }

    format!("{}.xpi", parts.join("-"))
}

/// Archives built with the Add-on SDK carry a bootstrap script at the root.
pub fn is_jetpack<R: Read + Seek>(archive: &Archive<R>) -> bool {
    archive.contains("bootstrap.js")
}

/// Kilobytes, rounded, never below 1.
pub fn size_kb(bytes: u64) -> u64 {
    (bytes.saturating_add(512) / 1024).max(1)
}

/// Places files into the storage tree and keeps the catalog in step.
pub struct Materializer<'a, C: ?Sized, S = LocalStorage> {
    catalog: &'a C,
    storage: S,
    addons_path: PathBuf,
    transfer: TransferMode,
}

impl<'a, C, S> Materializer<'a, C, S>
where
    C: Catalog + ?Sized,
    S: Storage,
{
    pub fn new(catalog: &'a C, storage: S, addons_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            storage,
            addons_path: addons_path.into(),
            transfer: TransferMode::default(),
        }
    }

    /// Copy staged uploads instead of moving them.
    pub fn with_transfer(mut self, transfer: TransferMode) -> Self {
        self.transfer = transfer;
        self
    }

    pub fn addons_path(&self) -> &Path {
        &self.addons_path
    }

    /// Where `file`'s artifact lives.
    pub fn path_for(&self, file: &File) -> PathBuf {
        crate::paths::file_path(&self.addons_path, file.addon_id, &file.filename)
    }

    /// Record `upload` as a file of `version` and move its bytes into place.
    ///
    /// The record is inserted first, so a filename collision fails before any
    /// bytes move. If the transfer then fails the record is removed again.
    pub fn materialize(
        &self,
        upload: &Upload,
        version: &Version,
        platform: Option<Platform>,
    ) -> Result<File, XpiError> {
        let filename = generate_filename(version, platform);
        let jetpack = is_jetpack(&Archive::open(&upload.path)?);

        let file = self.catalog.insert_file(NewFile {
            version_id: version.id,
            addon_id: version.addon.id,
            platform,
            filename,
            hash: upload.hash.clone(),
            size_kb: size_kb(upload.size),
            is_jetpack: jetpack,
            created_at: chrono::Utc::now().timestamp(),
        })?;

        let dest = self.path_for(&file);
        if let Err(e) = self.storage.transfer(&upload.path, &dest, self.transfer) {
            tracing::warn!(
                file_id = file.id,
                error = %e,
                "artifact transfer failed, removing file record"
            );
            if let Err(rollback) = self.catalog.delete_file(file.id) {
                tracing::error!(file_id = file.id, error = %rollback, "rollback failed");
            }
            return Err(e.into());
        }

        tracing::info!(
            file_id = file.id,
            addon_id = file.addon_id,
            filename = %file.filename,
            path = %dest.display(),
            "file materialized"
        );
        Ok(file)
    }

    /// Remove `file`'s artifact and record. Either may already be gone; both
    /// removals are attempted and the first failure is returned.
    pub fn delete(&self, file: &File) -> Result<(), XpiError> {
        let path = self.path_for(file);
        let artifact = self.storage.delete(&path);
        let record = self.catalog.delete_file(file.id);

        match (artifact, record) {
            (Err(e), _) => Err(e.into()),
            (_, Err(e)) => Err(e.into()),
            (Ok(had_artifact), Ok(had_record)) => {
                tracing::info!(
                    file_id = file.id,
                    had_artifact,
                    had_record,
                    "file deleted"
                );
                Ok(())
            }
        }
    }
}
