//! Archive and registry fixtures shared by the unit tests.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use xpi_schema::AppKind;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::registry::MemoryRegistry;

pub const FIREFOX: &str = "{ec8030f7-c20a-464f-9b0e-13a3a9e97384}";
pub const THUNDERBIRD: &str = "{3550f703-e582-4d05-9a08-453d09bdfdc6}";

/// Build a zip at `dir/name`. Names ending in `/` with empty content become
/// directory entries.
pub fn write_zip(dir: &Path, name: &str, entries: &[(&str, &str)]) -> PathBuf {
    let path = dir.join(name);
    let mut zip = ZipWriter::new(File::create(&path).unwrap());
    let options = SimpleFileOptions::default();

    for (member, content) in entries {
        if member.ends_with('/') && content.is_empty() {
            zip.add_directory(*member, options).unwrap();
        } else {
            zip.start_file(*member, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
    }

    zip.finish().unwrap();
    path
}

/// Wrap `body` in an install manifest envelope.
pub fn install_rdf(body: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<RDF xmlns="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <Description about="urn:mozilla:install-manifest">
{body}
  </Description>
</RDF>
"#
    )
}

/// A `targetApplication` block.
pub fn target(app_guid: &str, min: &str, max: &str) -> String {
    format!(
        r#"    <em:targetApplication>
      <Description>
        <em:id>{app_guid}</em:id>
        <em:minVersion>{min}</em:minVersion>
        <em:maxVersion>{max}</em:maxVersion>
      </Description>
    </em:targetApplication>"#
    )
}

pub fn extension_rdf() -> String {
    install_rdf(&format!(
        r#"    <em:id>guid@xpi</em:id>
    <em:type>2</em:type>
    <em:name>xpi name</em:name>
    <em:description>xpi description</em:description>
    <em:version>0.1</em:version>
    <em:homepageURL>http://homepage.com</em:homepageURL>
    <em:creator>Someone</em:creator>
{}"#,
        target(FIREFOX, "3.0", "3.6.*")
    ))
}

/// Plain extension targeting Firefox 3.0 - 3.6.*.
pub fn extension_xpi(dir: &Path) -> PathBuf {
    let rdf = extension_rdf();
    write_zip(
        dir,
        "extension.xpi",
        &[
            ("install.rdf", rdf.as_str()),
            ("chrome.manifest", "content xpi chrome/content/"),
            ("chrome/content/overlay.xul", "<overlay/>"),
        ],
    )
}

/// Add-on SDK package.
pub fn jetpack_xpi(dir: &Path) -> PathBuf {
    let rdf = install_rdf(&format!(
        r#"    <em:id>jid0-jetpack@jetpack</em:id>
    <em:type>2</em:type>
    <em:name>xxx</em:name>
    <em:version>0.1</em:version>
    <em:bootstrap>true</em:bootstrap>
{}"#,
        target(FIREFOX, "3.0", "3.6.*")
    ));
    write_zip(
        dir,
        "jetpack.xpi",
        &[
            ("install.rdf", rdf.as_str()),
            ("bootstrap.js", "// bootstrap"),
        ],
    )
}

/// Theme declaring an application nobody knows about.
pub fn theme_invalid_app_jar(dir: &Path) -> PathBuf {
    let rdf = install_rdf(&format!(
        r#"    <em:id>theme@jar</em:id>
    <em:name>invalid app theme</em:name>
    <em:version>1.0</em:version>
    <em:internalName>invalid-app</em:internalName>
{}"#,
        target("{00000000-0000-0000-0000-000000000000}", "1.0", "2.0")
    ));
    write_zip(dir, "theme-invalid-app.jar", &[("install.rdf", rdf.as_str())])
}

/// Registry with every application and a handful of release strings.
pub fn registry() -> MemoryRegistry {
    let registry = MemoryRegistry::with_default_applications();
    registry.add_app_version(AppKind::Firefox, "3.0");
    registry.add_app_version(AppKind::Firefox, "3.6.*");
    registry.add_app_version(AppKind::Thunderbird, "3.0");
    registry.add_app_version(AppKind::Thunderbird, "3.1.*");
    registry
}
