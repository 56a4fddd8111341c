//! Registry entities and the upload record.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{AppKind, ContentHash, Platform};

/// Kind of add-on, with the numeric ids stored in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum AddonType {
    /// Regular extension (default).
    #[default]
    Extension,
    /// Complete theme.
    Theme,
    /// Spell-check dictionary.
    Dictionary,
    /// Search engine plugin.
    SearchEngine,
    /// Application language pack.
    LanguagePack,
    /// Add-on language pack.
    LanguagePackAddon,
    /// Binary plugin.
    Plugin,
    /// Lightweight background theme.
    Persona,
}

impl AddonType {
    /// Numeric registry id.
    pub fn id(&self) -> u32 {
        match self {
            Self::Extension => 1,
            Self::Theme => 2,
            Self::Dictionary => 3,
            Self::SearchEngine => 4,
            Self::LanguagePack => 5,
            Self::LanguagePackAddon => 6,
            Self::Plugin => 7,
            Self::Persona => 9,
        }
    }

    /// Look up a type by registry id.
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Extension),
            2 => Some(Self::Theme),
            3 => Some(Self::Dictionary),
            4 => Some(Self::SearchEngine),
            5 => Some(Self::LanguagePack),
            6 => Some(Self::LanguagePackAddon),
            7 => Some(Self::Plugin),
            9 => Some(Self::Persona),
            _ => None,
        }
    }

    /// Map an `install.rdf` `em:type` value to an add-on type.
    ///
    /// Returns `None` for values that do not pin the type down (for
    /// example `32`, a multiple-item package), leaving the caller to infer it.
    pub fn from_em_type(value: &str) -> Option<Self> {
        match value.trim() {
            "2" => Some(Self::Extension),
            "4" => Some(Self::Theme),
            "8" => Some(Self::LanguagePack),
            "64" => Some(Self::Dictionary),
            _ => None,
        }
    }

    /// Lowercase display name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Extension => "extension",
            Self::Theme => "theme",
            Self::Dictionary => "dictionary",
            Self::SearchEngine => "search-engine",
            Self::LanguagePack => "langpack",
            Self::LanguagePackAddon => "langpack-addon",
            Self::Plugin => "plugin",
            Self::Persona => "persona",
        }
    }
}

impl std::fmt::Display for AddonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An add-on as known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Addon {
    /// Registry id.
    pub id: u64,
    /// Globally unique GUID (`em:id`), if the add-on has one.
    pub guid: Option<String>,
    /// Kind of add-on.
    pub addon_type: AddonType,
    /// Display name, used for filename generation.
    pub name: String,
}

/// A release string registered for one host application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppVersion {
    /// Registry id.
    pub id: u64,
    /// Application this release belongs to.
    pub application: AppKind,
    /// Version string exactly as registered (e.g. `3.6.*`).
    pub version: String,
}

/// One release of an [`Addon`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    /// Registry id.
    pub id: u64,
    /// Owning add-on.
    pub addon: Addon,
    /// Version string from the manifest.
    pub version: String,
    /// Applications this release is compatible with, in declaration order.
    #[serde(default)]
    pub compatible_apps: Vec<AppKind>,
}

/// A persisted, downloadable package file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Registry id.
    pub id: u64,
    /// Owning version (deleting it deletes the file).
    pub version_id: u64,
    /// Add-on of the owning version; part of the storage path.
    pub addon_id: u64,
    /// Target platform, `None` meaning every platform.
    pub platform: Option<Platform>,
    /// Generated filename, unique per add-on.
    pub filename: String,
    /// Content hash of the artifact.
    pub hash: ContentHash,
    /// Size in kilobytes, at least 1.
    pub size_kb: u64,
    /// Whether the archive was built with the Add-on SDK.
    pub is_jetpack: bool,
    /// Creation time (unix seconds).
    pub created_at: i64,
}

/// A received upload sitting in the staging area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Upload {
    /// Staging location of the bytes.
    pub path: PathBuf,
    /// Original filename supplied by the uploader.
    pub name: String,
    /// Digest over exactly the stored bytes.
    pub hash: ContentHash,
    /// Size in bytes.
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn em_type_mapping() {
        assert_eq!(AddonType::from_em_type("2"), Some(AddonType::Extension));
        assert_eq!(AddonType::from_em_type(" 4 "), Some(AddonType::Theme));
        assert_eq!(AddonType::from_em_type("8"), Some(AddonType::LanguagePack));
        assert_eq!(AddonType::from_em_type("64"), Some(AddonType::Dictionary));
        assert_eq!(AddonType::from_em_type("32"), None);
    }

    #[test]
    fn type_ids_round_trip() {
        for id in 0..12 {
            if let Some(t) = AddonType::from_id(id) {
                assert_eq!(t.id(), id);
            }
        }
        assert_eq!(AddonType::Extension.id(), 1);
        assert_eq!(AddonType::from_id(8), None);
    }
}
