//! Publishing pipeline: parse, validate, record and materialize an upload.

use std::path::PathBuf;

use xpi_schema::{Addon, File, Platform, Upload, Version};

use crate::error::XpiError;
use crate::manifest::{self, ManifestError, ParsedManifest};
use crate::materialize::Materializer;
use crate::registry::{Catalog, NewAddon, NewVersion, RegistryError};
use crate::storage::{LocalStorage, Storage, TransferMode};

/// Records created by one publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Published {
    pub addon: Addon,
    pub version: Version,
    pub file: File,
}

pub struct Pipeline<'a, C: ?Sized, S = LocalStorage> {
    catalog: &'a C,
    materializer: Materializer<'a, C, S>,
}

impl<'a, C, S> Pipeline<'a, C, S>
where
    C: Catalog + ?Sized,
    S: Storage,
{
    pub fn new(catalog: &'a C, storage: S, addons_path: impl Into<PathBuf>) -> Self {
        Self {
            catalog,
            materializer: Materializer::new(catalog, storage, addons_path),
        }
    }

    pub fn with_transfer(mut self, transfer: TransferMode) -> Self {
        self.materializer = self.materializer.with_transfer(transfer);
        self
    }

    pub fn materializer(&self) -> &Materializer<'a, C, S> {
        &self.materializer
    }

    /// Publish `upload` as the first version of a new add-on.
    pub fn create_addon(
        &self,
        upload: &Upload,
        platform: Option<Platform>,
    ) -> Result<Published, XpiError> {
        let parsed = manifest::parse_xpi(&upload.path, None, self.catalog)?;

        // The validation pre-check can race with a concurrent publish; the
        // insert is what decides.
        let addon = self
            .catalog
            .insert_addon(NewAddon {
                guid: parsed.guid.clone(),
                addon_type: parsed.addon_type,
                name: parsed.name.clone(),
            })
            .map_err(duplicate_guid)?;

        tracing::info!(addon_id = addon.id, guid = ?addon.guid, "add-on created");
        self.publish(upload, addon, parsed, platform)
    }

    /// Publish `upload` as a new version of `addon`.
    pub fn add_version(
        &self,
        upload: &Upload,
        addon: &Addon,
        platform: Option<Platform>,
    ) -> Result<Published, XpiError> {
        let parsed = manifest::parse_xpi(&upload.path, Some(addon), self.catalog)?;
        self.publish(upload, addon.clone(), parsed, platform)
    }

    fn publish(
        &self,
        upload: &Upload,
        addon: Addon,
        parsed: ParsedManifest,
        platform: Option<Platform>,
    ) -> Result<Published, XpiError> {
        let version = self.catalog.insert_version(NewVersion {
            addon: addon.clone(),
            compatible_apps: parsed.compatible_apps(),
            version: parsed.version,
        })?;
        let file = match self.materializer.materialize(upload, &version, platform) {
            Ok(file) => file,
            Err(e) => {
                tracing::warn!(
                    version_id = version.id,
                    error = %e,
                    "materialization failed, removing version record"
                );
                if let Err(rollback) = self.catalog.delete_version(version.id) {
                    tracing::error!(version_id = version.id, error = %rollback, "rollback failed");
                }
                return Err(e);
            }
        };

        Ok(Published {
            addon,
            version,
            file,
        })
    }
}

fn duplicate_guid(err: RegistryError) -> XpiError {
    match err {
        RegistryError::DuplicateGuid(guid) => ManifestError::DuplicateGuid(guid).into(),
        other => other.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use crate::registry::{MemoryRegistry, Registry};
    use crate::validate::{DUPLICATE_GUID, TYPE_MISMATCH};
    use std::path::Path;
    use tempfile::{TempDir, tempdir};
    use xpi_schema::{AddonType, AppKind, ContentHash};

    fn upload(dir: &Path, xpi: fn(&Path) -> PathBuf) -> Upload {
        let path = xpi(dir);
        Upload {
            size: std::fs::metadata(&path).unwrap().len(),
            path,
            name: "upload.xpi".into(),
            hash: ContentHash::sha256("d".repeat(64)).unwrap(),
        }
    }

    fn pipeline<'a>(dir: &TempDir, registry: &'a MemoryRegistry) -> Pipeline<'a, MemoryRegistry> {
        Pipeline::new(registry, LocalStorage, dir.path().join("addons"))
            .with_transfer(TransferMode::Copy)
    }

    #[test]
    fn create_addon_publishes_everything() {
        let dir = tempdir().unwrap();
        let registry = fixtures::registry();
        let upload = upload(dir.path(), fixtures::extension_xpi);

        let published = pipeline(&dir, &registry).create_addon(&upload, None).unwrap();

        assert_eq!(published.addon.guid.as_deref(), Some("guid@xpi"));
        assert_eq!(published.addon.addon_type, AddonType::Extension);
        assert_eq!(published.version.compatible_apps, vec![AppKind::Firefox]);
        assert_eq!(published.file.filename, "xpi_name-0.1-fx.xpi");
        assert_eq!(
            registry.find_addon_by_guid("guid@xpi").unwrap(),
            Some(published.addon)
        );
    }

    #[test]
    fn create_addon_twice_is_duplicate() {
        let dir = tempdir().unwrap();
        let registry = fixtures::registry();
        let upload = upload(dir.path(), fixtures::extension_xpi);
        let pipeline = pipeline(&dir, &registry);
        pipeline.create_addon(&upload, None).unwrap();

        let err = pipeline.create_addon(&upload, None).unwrap_err();

        assert!(matches!(
            err,
            XpiError::Manifest(ManifestError::DuplicateGuid(_))
        ));
        assert_eq!(err.messages(), vec![DUPLICATE_GUID.to_string()]);
        assert!(err.is_user_correctable());
    }

    #[test]
    fn insert_violation_reported_as_duplicate_guid() {
        let err = duplicate_guid(RegistryError::DuplicateGuid("guid@xpi".into()));
        assert_eq!(err.messages(), vec![DUPLICATE_GUID.to_string()]);

        let other = duplicate_guid(RegistryError::Lock);
        assert!(matches!(other, XpiError::Registry(RegistryError::Lock)));
    }

    #[test]
    fn add_version_per_platform() {
        let dir = tempdir().unwrap();
        let registry = fixtures::registry();
        let upload = upload(dir.path(), fixtures::extension_xpi);
        let pipeline = pipeline(&dir, &registry);
        let first = pipeline.create_addon(&upload, None).unwrap();

        let mac = pipeline
            .add_version(&upload, &first.addon, Some(Platform::Mac))
            .unwrap();

        assert_eq!(mac.file.filename, "xpi_name-0.1-fx-mac.xpi");
        assert_ne!(mac.version.id, first.version.id);
        assert!(pipeline.materializer().path_for(&mac.file).is_file());
    }

    #[test]
    fn failed_add_version_leaves_no_version_behind() {
        let dir = tempdir().unwrap();
        let registry = fixtures::registry();
        let upload = upload(dir.path(), fixtures::extension_xpi);
        let pipeline = pipeline(&dir, &registry);
        let first = pipeline.create_addon(&upload, None).unwrap();

        // Same platform, same filename: every retry collides
        for _ in 0..3 {
            let err = pipeline
                .add_version(&upload, &first.addon, None)
                .unwrap_err();
            assert!(matches!(
                err,
                XpiError::Registry(RegistryError::DuplicateFilename { .. })
            ));
        }

        assert_eq!(registry.version_count(), 1);
        assert_eq!(registry.file_count(), 1);
        assert!(registry.get_version(first.version.id).unwrap().is_some());
    }

    #[test]
    fn add_version_rejects_type_change() {
        let dir = tempdir().unwrap();
        let registry = fixtures::registry();
        let upload = upload(dir.path(), fixtures::extension_xpi);
        let theme = registry
            .insert_addon(NewAddon {
                guid: Some("guid@xpi".into()),
                addon_type: AddonType::Theme,
                name: "a theme".into(),
            })
            .unwrap();

        let err = pipeline(&dir, &registry)
            .add_version(&upload, &theme, None)
            .unwrap_err();

        assert_eq!(err.messages(), vec![TYPE_MISMATCH.to_string()]);
        assert_eq!(registry.file_count(), 0);
    }

    #[test]
    fn jetpack_round_trip() {
        let dir = tempdir().unwrap();
        let registry = fixtures::registry();
        let upload = upload(dir.path(), fixtures::jetpack_xpi);

        let published = pipeline(&dir, &registry)
            .create_addon(&upload, Some(Platform::Mac))
            .unwrap();

        assert!(published.file.is_jetpack);
        assert_eq!(published.file.filename, "xxx-0.1-fx-mac.xpi");
    }
}
