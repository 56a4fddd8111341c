//! SQLite catalog
//!
//! Persists applications, application versions, add-ons, versions and files.
//! The unique indexes on `addons.guid` and `files(addon_id, filename)` are the
//! authoritative duplicate checks.

use std::path::Path;

use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, params};
use xpi_core::registry::{Catalog, NewAddon, NewFile, NewVersion, Registry, RegistryError};
use xpi_schema::{Addon, AddonType, AppKind, AppVersion, ContentHash, File, Platform, Version};

/// Catalog stored in a single SQLite database file
#[derive(Debug)]
pub struct SqliteRegistry {
    conn: Connection,
}

impl SqliteRegistry {
    /// Open or create the registry at `path`, seeding the application table
    pub fn open_at(path: &Path) -> Result<Self, RegistryError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| RegistryError::Backend(e.to_string()))?;
        }
        let conn = Connection::open(path).map_err(backend)?;

        // WAL lets readers proceed while a publish is writing
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .map_err(backend)?;

        Self::init(conn)
    }

    /// In-memory registry (for testing)
    pub fn open_in_memory() -> Result<Self, RegistryError> {
        let conn = Connection::open_in_memory().map_err(backend)?;
        conn.execute_batch("PRAGMA foreign_keys=ON;").map_err(backend)?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, RegistryError> {
        let db = Self { conn };
        db.init_schema()?;
        db.seed_applications()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<(), RegistryError> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS applications (
                id INTEGER PRIMARY KEY,
                guid TEXT NOT NULL UNIQUE COLLATE NOCASE
            );

            CREATE TABLE IF NOT EXISTS app_versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                application_id INTEGER NOT NULL REFERENCES applications(id) ON DELETE CASCADE,
                version TEXT NOT NULL,
                UNIQUE (application_id, version)
            );

            CREATE TABLE IF NOT EXISTS addons (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                guid TEXT UNIQUE,
                addon_type INTEGER NOT NULL,
                name TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS versions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                addon_id INTEGER NOT NULL REFERENCES addons(id) ON DELETE CASCADE,
                version TEXT NOT NULL,
                compatible_apps TEXT NOT NULL DEFAULT ''
            );

            CREATE TABLE IF NOT EXISTS files (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                version_id INTEGER NOT NULL REFERENCES versions(id) ON DELETE CASCADE,
                addon_id INTEGER NOT NULL REFERENCES addons(id) ON DELETE CASCADE,
                platform INTEGER,
                filename TEXT NOT NULL,
                hash TEXT NOT NULL,
                size_kb INTEGER NOT NULL,
                is_jetpack INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                UNIQUE (addon_id, filename)
            );

            CREATE INDEX IF NOT EXISTS idx_versions_addon ON versions(addon_id);
            CREATE INDEX IF NOT EXISTS idx_files_version ON files(version_id);
            ",
            )
            .map_err(backend)
    }

    fn seed_applications(&self) -> Result<(), RegistryError> {
        for app in AppKind::ALL {
            self.conn
                .execute(
                    "INSERT OR IGNORE INTO applications (id, guid) VALUES (?1, ?2)",
                    params![app.id(), app.guid()],
                )
                .map_err(backend)?;
        }
        Ok(())
    }

    /// Forget an application; its release strings go with it
    pub fn remove_application(&self, app: AppKind) -> Result<bool, RegistryError> {
        let deleted = self
            .conn
            .execute("DELETE FROM applications WHERE id = ?1", params![app.id()])
            .map_err(backend)?;
        Ok(deleted > 0)
    }

    /// All files of an add-on, newest first
    pub fn files_for_addon(&self, addon_id: u64) -> Result<Vec<File>, RegistryError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, version_id, addon_id, platform, filename, hash, size_kb, is_jetpack, created_at
                 FROM files WHERE addon_id = ?1 ORDER BY id DESC",
            )
            .map_err(backend)?;
        let rows = stmt
            .query_map(params![addon_id], file_from_row)
            .map_err(backend)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(backend)
    }
}

fn backend(err: rusqlite::Error) -> RegistryError {
    match &err {
        rusqlite::Error::SqliteFailure(e, _)
            if matches!(e.code, ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) =>
        {
            RegistryError::Lock
        }
        _ => RegistryError::Backend(err.to_string()),
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn is_foreign_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
    )
}

fn conversion(column: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        message.into(),
    )
}

fn app_from_id(column: usize, id: u32) -> rusqlite::Result<AppKind> {
    AppKind::from_id(id).ok_or_else(|| conversion(column, format!("unknown application id {id}")))
}

fn encode_apps(apps: &[AppKind]) -> String {
    apps.iter()
        .map(|app| app.id().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

fn decode_apps(column: usize, value: &str) -> rusqlite::Result<Vec<AppKind>> {
    value
        .split(',')
        .filter(|s| !s.is_empty())
        .map(|s| {
            let id = s
                .parse()
                .map_err(|_| conversion(column, format!("bad application id {s:?}")))?;
            app_from_id(column, id)
        })
        .collect()
}

fn addon_from_row(row: &Row<'_>) -> rusqlite::Result<Addon> {
    let addon_type: u32 = row.get(2)?;
    Ok(Addon {
        id: row.get(0)?,
        guid: row.get(1)?,
        addon_type: AddonType::from_id(addon_type)
            .ok_or_else(|| conversion(2, format!("unknown add-on type {addon_type}")))?,
        name: row.get(3)?,
    })
}

fn file_from_row(row: &Row<'_>) -> rusqlite::Result<File> {
    let platform: Option<u32> = row.get(3)?;
    let hash: String = row.get(5)?;
    Ok(File {
        id: row.get(0)?,
        version_id: row.get(1)?,
        addon_id: row.get(2)?,
        platform: platform
            .map(|id| {
                Platform::from_id(id).ok_or_else(|| conversion(3, format!("unknown platform {id}")))
            })
            .transpose()?,
        filename: row.get(4)?,
        hash: ContentHash::parse(&hash).map_err(|e| conversion(5, e.to_string()))?,
        size_kb: row.get(6)?,
        is_jetpack: row.get(7)?,
        created_at: row.get(8)?,
    })
}

fn app_version_from_row(row: &Row<'_>) -> rusqlite::Result<AppVersion> {
    Ok(AppVersion {
        id: row.get(0)?,
        application: app_from_id(1, row.get(1)?)?,
        version: row.get(2)?,
    })
}

impl Registry for SqliteRegistry {
    fn find_application(&self, guid: &str) -> Result<Option<AppKind>, RegistryError> {
        let id: Option<u32> = self
            .conn
            .query_row(
                "SELECT id FROM applications WHERE guid = ?1",
                params![guid.trim()],
                |row| row.get(0),
            )
            .optional()
            .map_err(backend)?;
        Ok(id.and_then(AppKind::from_id))
    }

    fn find_app_version(
        &self,
        app: AppKind,
        version: &str,
    ) -> Result<Option<AppVersion>, RegistryError> {
        self.conn
            .query_row(
                "SELECT id, application_id, version FROM app_versions
                 WHERE application_id = ?1 AND version = ?2",
                params![app.id(), version],
                app_version_from_row,
            )
            .optional()
            .map_err(backend)
    }

    fn find_addon_by_guid(&self, guid: &str) -> Result<Option<Addon>, RegistryError> {
        self.conn
            .query_row(
                "SELECT id, guid, addon_type, name FROM addons WHERE guid = ?1",
                params![guid],
                addon_from_row,
            )
            .optional()
            .map_err(backend)
    }
}

impl Catalog for SqliteRegistry {
    fn insert_addon(&self, addon: NewAddon) -> Result<Addon, RegistryError> {
        self.conn
            .execute(
                "INSERT INTO addons (guid, addon_type, name) VALUES (?1, ?2, ?3)",
                params![addon.guid, addon.addon_type.id(), addon.name],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RegistryError::DuplicateGuid(addon.guid.clone().unwrap_or_default())
                } else {
                    backend(e)
                }
            })?;

        Ok(Addon {
            id: self.conn.last_insert_rowid() as u64,
            guid: addon.guid,
            addon_type: addon.addon_type,
            name: addon.name,
        })
    }

    fn get_addon(&self, id: u64) -> Result<Option<Addon>, RegistryError> {
        self.conn
            .query_row(
                "SELECT id, guid, addon_type, name FROM addons WHERE id = ?1",
                params![id],
                addon_from_row,
            )
            .optional()
            .map_err(backend)
    }

    fn insert_version(&self, version: NewVersion) -> Result<Version, RegistryError> {
        if self.get_addon(version.addon.id)?.is_none() {
            return Err(RegistryError::NotFound(format!("add-on {}", version.addon.id)));
        }

        self.conn
            .execute(
                "INSERT INTO versions (addon_id, version, compatible_apps) VALUES (?1, ?2, ?3)",
                params![
                    version.addon.id,
                    version.version,
                    encode_apps(&version.compatible_apps)
                ],
            )
            .map_err(backend)?;

        Ok(Version {
            id: self.conn.last_insert_rowid() as u64,
            addon: version.addon,
            version: version.version,
            compatible_apps: version.compatible_apps,
        })
    }

    fn get_version(&self, id: u64) -> Result<Option<Version>, RegistryError> {
        self.conn
            .query_row(
                "SELECT v.id, v.version, v.compatible_apps, a.id, a.guid, a.addon_type, a.name
                 FROM versions v JOIN addons a ON a.id = v.addon_id
                 WHERE v.id = ?1",
                params![id],
                |row| {
                    let apps: String = row.get(2)?;
                    let addon_type: u32 = row.get(5)?;
                    Ok(Version {
                        id: row.get(0)?,
                        version: row.get(1)?,
                        compatible_apps: decode_apps(2, &apps)?,
                        addon: Addon {
                            id: row.get(3)?,
                            guid: row.get(4)?,
                            addon_type: AddonType::from_id(addon_type).ok_or_else(|| {
                                conversion(5, format!("unknown add-on type {addon_type}"))
                            })?,
                            name: row.get(6)?,
                        },
                    })
                },
            )
            .optional()
            .map_err(backend)
    }

    fn delete_version(&self, id: u64) -> Result<bool, RegistryError> {
        // files go with it through ON DELETE CASCADE
        let deleted = self
            .conn
            .execute("DELETE FROM versions WHERE id = ?1", params![id])
            .map_err(backend)?;
        Ok(deleted > 0)
    }

    fn insert_file(&self, file: NewFile) -> Result<File, RegistryError> {
        self.conn
            .execute(
                "INSERT INTO files
                 (version_id, addon_id, platform, filename, hash, size_kb, is_jetpack, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    file.version_id,
                    file.addon_id,
                    file.platform.map(|p| p.id()),
                    file.filename,
                    file.hash.to_string(),
                    file.size_kb,
                    file.is_jetpack,
                    file.created_at,
                ],
            )
            .map_err(|e| {
                if is_unique_violation(&e) {
                    RegistryError::DuplicateFilename {
                        addon_id: file.addon_id,
                        filename: file.filename.clone(),
                    }
                } else if is_foreign_key_violation(&e) {
                    RegistryError::NotFound(format!("version {}", file.version_id))
                } else {
                    backend(e)
                }
            })?;

        let id = self.conn.last_insert_rowid() as u64;
        Ok(file.into_file(id))
    }

    fn get_file(&self, id: u64) -> Result<Option<File>, RegistryError> {
        self.conn
            .query_row(
                "SELECT id, version_id, addon_id, platform, filename, hash, size_kb, is_jetpack, created_at
                 FROM files WHERE id = ?1",
                params![id],
                file_from_row,
            )
            .optional()
            .map_err(backend)
    }

    fn delete_file(&self, id: u64) -> Result<bool, RegistryError> {
        let deleted = self
            .conn
            .execute("DELETE FROM files WHERE id = ?1", params![id])
            .map_err(backend)?;
        Ok(deleted > 0)
    }

    fn insert_app_version(
        &self,
        app: AppKind,
        version: &str,
    ) -> Result<AppVersion, RegistryError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO app_versions (application_id, version) VALUES (?1, ?2)",
                params![app.id(), version],
            )
            .map_err(|e| {
                if is_foreign_key_violation(&e) {
                    RegistryError::NotFound(format!("application {app}"))
                } else {
                    backend(e)
                }
            })?;

        self.find_app_version(app, version)?
            .ok_or_else(|| RegistryError::NotFound(format!("{app} {version}")))
    }

    fn list_app_versions(&self, app: AppKind) -> Result<Vec<AppVersion>, RegistryError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT id, application_id, version FROM app_versions
                 WHERE application_id = ?1 ORDER BY id",
            )
            .map_err(backend)?;
        let rows = stmt
            .query_map(params![app.id()], app_version_from_row)
            .map_err(backend)?;
        rows.collect::<Result<Vec<_>, _>>().map_err(backend)
    }
}
