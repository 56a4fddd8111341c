//! In-process catalog.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use xpi_schema::{Addon, AppKind, AppVersion, File, Version};

use super::{Catalog, NewAddon, NewFile, NewVersion, Registry, RegistryError};

#[derive(Debug, Default)]
struct State {
    applications: BTreeSet<AppKind>,
    app_versions: Vec<AppVersion>,
    addons: BTreeMap<u64, Addon>,
    versions: BTreeMap<u64, Version>,
    files: BTreeMap<u64, File>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn app_version(&mut self, app: AppKind, version: &str) -> AppVersion {
        if let Some(existing) = self
            .app_versions
            .iter()
            .find(|av| av.application == app && av.version == version)
        {
            return existing.clone();
        }
        let row = AppVersion {
            id: self.next_id(),
            application: app,
            version: version.to_string(),
        };
        self.app_versions.push(row.clone());
        row
    }
}

/// Catalog kept entirely in memory, guarded by a mutex.
///
/// Enforces the same unique constraints as the `SQLite` catalog, so pipeline
/// tests exercise the real duplicate paths.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    state: Mutex<State>,
}

impl MemoryRegistry {
    /// Empty registry that knows no applications.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry that knows every [`AppKind`] but no release strings.
    pub fn with_default_applications() -> Self {
        let registry = Self::new();
        for app in AppKind::ALL {
            registry.add_application(app);
        }
        registry
    }

    // A panic while holding the lock cannot leave `State` half-updated.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn add_application(&self, app: AppKind) {
        self.lock().applications.insert(app);
    }

    pub fn remove_application(&self, app: AppKind) {
        self.lock().applications.remove(&app);
    }

    pub fn add_app_version(&self, app: AppKind, version: &str) -> AppVersion {
        self.lock().app_version(app, version)
    }

    pub fn clear_app_versions(&self) {
        self.lock().app_versions.clear();
    }

    pub fn file_count(&self) -> usize {
        self.lock().files.len()
    }

    pub fn version_count(&self) -> usize {
        self.lock().versions.len()
    }
}

impl Registry for MemoryRegistry {
    fn find_application(&self, guid: &str) -> Result<Option<AppKind>, RegistryError> {
        let state = self.lock();
        Ok(AppKind::from_guid(guid).filter(|app| state.applications.contains(app)))
    }

    fn find_app_version(
        &self,
        app: AppKind,
        version: &str,
    ) -> Result<Option<AppVersion>, RegistryError> {
        Ok(self
            .lock()
            .app_versions
            .iter()
            .find(|av| av.application == app && av.version == version)
            .cloned())
    }

    fn find_addon_by_guid(&self, guid: &str) -> Result<Option<Addon>, RegistryError> {
        Ok(self
            .lock()
            .addons
            .values()
            .find(|a| a.guid.as_deref() == Some(guid))
            .cloned())
    }
}

impl Catalog for MemoryRegistry {
    fn insert_addon(&self, addon: NewAddon) -> Result<Addon, RegistryError> {
        let mut state = self.lock();
        if let Some(guid) = &addon.guid
            && state.addons.values().any(|a| a.guid.as_ref() == Some(guid))
        {
            return Err(RegistryError::DuplicateGuid(guid.clone()));
        }

        let row = Addon {
            id: state.next_id(),
            guid: addon.guid,
            addon_type: addon.addon_type,
            name: addon.name,
        };
        state.addons.insert(row.id, row.clone());
        Ok(row)
    }

    fn get_addon(&self, id: u64) -> Result<Option<Addon>, RegistryError> {
        Ok(self.lock().addons.get(&id).cloned())
    }

    fn insert_version(&self, version: NewVersion) -> Result<Version, RegistryError> {
        let mut state = self.lock();
        if !state.addons.contains_key(&version.addon.id) {
            return Err(RegistryError::NotFound(format!("add-on {}", version.addon.id)));
        }

        let row = Version {
            id: state.next_id(),
            addon: version.addon,
            version: version.version,
            compatible_apps: version.compatible_apps,
        };
        state.versions.insert(row.id, row.clone());
        Ok(row)
    }

    fn get_version(&self, id: u64) -> Result<Option<Version>, RegistryError> {
        Ok(self.lock().versions.get(&id).cloned())
    }

    fn delete_version(&self, id: u64) -> Result<bool, RegistryError> {
        let mut state = self.lock();
        state.files.retain(|_, f| f.version_id != id);
        Ok(state.versions.remove(&id).is_some())
    }

    fn insert_file(&self, file: NewFile) -> Result<File, RegistryError> {
        let mut state = self.lock();
        if !state.versions.contains_key(&file.version_id) {
            return Err(RegistryError::NotFound(format!("version {}", file.version_id)));
        }
        if state
            .files
            .values()
            .any(|f| f.addon_id == file.addon_id && f.filename == file.filename)
        {
            return Err(RegistryError::DuplicateFilename {
                addon_id: file.addon_id,
                filename: file.filename,
            });
        }

        let id = state.next_id();
        let row = file.into_file(id);
        state.files.insert(id, row.clone());
        Ok(row)
    }

    fn get_file(&self, id: u64) -> Result<Option<File>, RegistryError> {
        Ok(self.lock().files.get(&id).cloned())
    }

    fn delete_file(&self, id: u64) -> Result<bool, RegistryError> {
        Ok(self.lock().files.remove(&id).is_some())
    }

    fn insert_app_version(
        &self,
        app: AppKind,
        version: &str,
    ) -> Result<AppVersion, RegistryError> {
        Ok(self.add_app_version(app, version))
    }

    fn list_app_versions(&self, app: AppKind) -> Result<Vec<AppVersion>, RegistryError> {
        Ok(self
            .lock()
            .app_versions
            .iter()
            .filter(|av| av.application == app)
            .cloned()
            .collect())
    }
}
