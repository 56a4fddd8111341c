//! Zip archive reader for XPI/JAR packages.
//!
//! Wraps `zip::ZipArchive` with listing, member reads, and extraction that
//! refuses any entry resolving outside the destination directory.

use std::fs::{self, File};
use std::io::{self, BufReader, Read, Seek};
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use zip::ZipArchive;
use zip::result::ZipError;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Corrupt archive: {0}")]
    Corrupt(String),

    #[error("Unsafe archive entry: {0}")]
    UnsafeEntry(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<ZipError> for ArchiveError {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(e) => Self::Io(e),
            other => Self::Corrupt(other.to_string()),
        }
    }
}

/// One member as stored in the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
}

/// Information about an extracted member
#[derive(Debug, Clone)]
pub struct ExtractedFile {
    /// Path relative to extraction root
    pub relative_path: PathBuf,
    /// Absolute path on disk
    pub absolute_path: PathBuf,
    pub is_directory: bool,
}

/// A member is a directory only when its stored name ends with a separator
/// AND it has no content. A zero-byte regular file is not a directory.
pub fn is_directory_entry(name: &str, size: u64) -> bool {
    (name.ends_with('/') || name.ends_with('\\')) && size == 0
}

/// Normalize a stored member name into a path relative to the extraction root.
///
/// `.` segments are dropped and `..` pops the previous segment; a `..` with
/// nothing to pop, an absolute name, or a drive prefix is rejected.
pub fn safe_relative_path(name: &str) -> Result<PathBuf, ArchiveError> {
    let unsafe_entry = || ArchiveError::UnsafeEntry(name.to_string());
    let normalized = name.replace('\\', "/");

    if normalized.starts_with('/') {
        return Err(unsafe_entry());
    }

    let mut parts: Vec<&str> = Vec::new();
    for segment in normalized.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop().ok_or_else(unsafe_entry)?;
            }
            other => {
                let mut components = Path::new(other).components();
                match (components.next(), components.next()) {
                    (Some(Component::Normal(_)), None) => parts.push(other),
                    _ => return Err(unsafe_entry()),
                }
            }
        }
    }

    Ok(parts.iter().collect())
}

/// An opened add-on archive.
pub struct Archive<R = BufReader<File>> {
    zip: ZipArchive<R>,
}

impl<R: Read + Seek> std::fmt::Debug for Archive<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Archive")
            .field("members", &self.zip.len())
            .finish()
    }
}

impl Archive {
    /// Open an archive on disk.
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Open an archive from any seekable reader.
    pub fn from_reader(reader: R) -> Result<Self, ArchiveError> {
        let zip = ZipArchive::new(reader)?;
        Ok(Self { zip })
    }

    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.len() == 0
    }

    /// List members in stored order.
    pub fn list(&mut self) -> Result<Vec<Entry>, ArchiveError> {
        let mut entries = Vec::with_capacity(self.zip.len());
        for i in 0..self.zip.len() {
            let member = self.zip.by_index_raw(i)?;
            let name = member.name().to_string();
            let size = member.size();
            entries.push(Entry {
                is_directory: is_directory_entry(&name, size),
                name,
                size,
            });
        }
        Ok(entries)
    }

    /// Whether a member with exactly this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.zip.index_for_name(name).is_some()
    }

    /// Whether any member lives under the directory `prefix/`.
    pub fn has_directory(&self, prefix: &str) -> bool {
        let prefix = format!("{}/", prefix.trim_end_matches('/'));
        self.zip.file_names().any(|n| n.starts_with(&prefix))
    }

    /// Read a member fully into memory; `None` if it does not exist.
    pub fn read_member(&mut self, name: &str) -> Result<Option<Vec<u8>>, ArchiveError> {
        let mut member = match self.zip.by_name(name) {
            Ok(member) => member,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut buf = Vec::with_capacity(member.size() as usize);
        member
            .read_to_end(&mut buf)
            .map_err(|e| ArchiveError::Corrupt(format!("{name}: {e}")))?;
        Ok(Some(buf))
    }

    /// Extract every member under `dest_dir`, recreating the directory tree.
    ///
    /// Parent directories are created even when the archive has no explicit
    /// directory entries for them.
    pub fn extract_all(&mut self, dest_dir: &Path) -> Result<Vec<ExtractedFile>, ArchiveError> {
        fs::create_dir_all(dest_dir)?;
        let mut extracted = Vec::new();

        for i in 0..self.zip.len() {
            let mut member = self.zip.by_index(i)?;
            let name = member.name().to_string();
            let relative_path = safe_relative_path(&name)?;
            if relative_path.as_os_str().is_empty() {
                continue;
            }

            let absolute_path = dest_dir.join(&relative_path);
            let is_directory = is_directory_entry(&name, member.size());

            if is_directory {
                fs::create_dir_all(&absolute_path)?;
            } else {
                if let Some(parent) = absolute_path.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut outfile = File::create(&absolute_path)?;
                io::copy(&mut member, &mut outfile)?;
            }

            tracing::debug!(entry = %name, is_directory, "extracted");
            extracted.push(ExtractedFile {
                relative_path,
                absolute_path,
                is_directory,
            });
        }

        Ok(extracted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use tempfile::tempdir;

    #[test]
    fn directory_only_entry_extracts_as_directory() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::write_zip(dir.path(), "directory-test.xpi", &[("chrome/", "")]);
        let dest = dir.path().join("out");

        Archive::open(&xpi).unwrap().extract_all(&dest).unwrap();

        assert!(dest.join("chrome").is_dir());
    }

    #[test]
    fn zero_byte_file_is_not_a_directory() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::write_zip(dir.path(), "empty.xpi", &[("empty.txt", "")]);
        let mut archive = Archive::open(&xpi).unwrap();

        let entries = archive.list().unwrap();
        assert_eq!(
            entries,
            vec![Entry {
                name: "empty.txt".to_string(),
                is_directory: false,
                size: 0,
            }]
        );

        let dest = dir.path().join("out");
        archive.extract_all(&dest).unwrap();
        assert!(dest.join("empty.txt").is_file());
    }

    #[test]
    fn missing_parents_are_created() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::write_zip(
            dir.path(),
            "nested.xpi",
            &[("chrome/content/overlay.xul", "<overlay/>")],
        );
        let dest = dir.path().join("out");

        let files = Archive::open(&xpi).unwrap().extract_all(&dest).unwrap();

        assert_eq!(files.len(), 1);
        assert_eq!(
            fs::read(dest.join("chrome/content/overlay.xul")).unwrap(),
            b"<overlay/>"
        );
    }

    #[test]
    fn traversal_is_rejected() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::write_zip(dir.path(), "evil.xpi", &[("../evil.js", "boom")]);
        let dest = dir.path().join("out");

        let err = Archive::open(&xpi).unwrap().extract_all(&dest).unwrap_err();

        assert!(matches!(err, ArchiveError::UnsafeEntry(name) if name == "../evil.js"));
        assert!(!dir.path().join("evil.js").exists());
    }

    #[test]
    fn garbage_is_corrupt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("not-a-zip.xpi");
        fs::write(&path, "definitely not a zip file ".repeat(100)).unwrap();

        assert!(matches!(
            Archive::open(&path).unwrap_err(),
            ArchiveError::Corrupt(_)
        ));
    }

    #[test]
    fn read_member_and_contains() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::write_zip(
            dir.path(),
            "m.xpi",
            &[("install.rdf", "<RDF/>"), ("dictionaries/en-US.dic", "x")],
        );
        let mut archive = Archive::open(&xpi).unwrap();

        assert!(archive.contains("install.rdf"));
        assert!(!archive.contains("bootstrap.js"));
        assert!(archive.has_directory("dictionaries"));
        assert_eq!(archive.read_member("install.rdf").unwrap().unwrap(), b"<RDF/>");
        assert_eq!(archive.read_member("missing").unwrap(), None);
    }

    #[test]
    fn safe_path_normalization() {
        assert_eq!(
            safe_relative_path("a/./b/../c.txt").unwrap(),
            PathBuf::from("a/c.txt")
        );
        assert_eq!(
            safe_relative_path("chrome\\skin\\x.css").unwrap(),
            PathBuf::from("chrome/skin/x.css")
        );
        assert!(safe_relative_path("/etc/passwd").is_err());
        assert!(safe_relative_path("a/../../b").is_err());
        assert_eq!(safe_relative_path("./").unwrap(), PathBuf::new());
    }

    #[test]
    fn directory_rule_needs_both_conditions() {
        assert!(is_directory_entry("chrome/", 0));
        assert!(!is_directory_entry("chrome/", 12));
        assert!(!is_directory_entry("chrome", 0));
    }
}
