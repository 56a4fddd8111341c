//! `install.rdf` parsing.
//!
//! Reading happens in two steps. [`RawManifest::from_xml`] pulls the declared
//! values out of the RDF/XML without consulting anything else. [`parse`] then
//! resolves those values against a [`Registry`]: the add-on type is inferred,
//! and each declared target application is kept only if the registry knows
//! the application and both version bounds.

use std::io::{Read, Seek};
use std::path::Path;

use quick_xml::NsReader;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use thiserror::Error;
use xpi_schema::{Addon, AddonType, AppKind, AppVersion, EM_NAMESPACE, INSTALL_MANIFEST};

use crate::io::{Archive, ArchiveError};
use crate::registry::{Registry, RegistryError};
use crate::validate;

/// `about` value of the install-manifest resource.
const MANIFEST_ABOUT: &str = "urn:mozilla:install-manifest";

pub const VERSION_MISSING: &str = "Could not find a version in install.rdf.";

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error("No install.rdf found in archive")]
    Missing,

    #[error("Malformed install.rdf: {0}")]
    Malformed(String),

    #[error("{}", .0.join(" "))]
    Invalid(Vec<String>),

    /// Another add-on already holds this GUID.
    #[error("{}", validate::DUPLICATE_GUID)]
    DuplicateGuid(String),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

impl ManifestError {
    pub(crate) fn invalid(message: &str) -> Self {
        Self::Invalid(vec![message.to_string()])
    }

    /// User-facing messages for this error.
    pub fn messages(&self) -> Vec<String> {
        match self {
            Self::Invalid(messages) => messages.clone(),
            other => vec![other.to_string()],
        }
    }
}

/// A target application exactly as declared in the manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclaredTarget {
    pub id: Option<String>,
    pub min_version: Option<String>,
    pub max_version: Option<String>,
}

/// Values declared by the install manifest, before any registry lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawManifest {
    pub guid: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub version: Option<String>,
    pub homepage: Option<String>,
    pub em_type: Option<String>,
    pub internal_name: Option<String>,
    pub targets: Vec<DeclaredTarget>,
}

/// A declared target application the registry recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetApp {
    pub app: AppKind,
    pub min: AppVersion,
    pub max: AppVersion,
}

impl TargetApp {
    pub fn application_id(&self) -> u32 {
        self.app.id()
    }
}

/// Manifest metadata after type inference and target resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedManifest {
    pub guid: Option<String>,
    pub name: String,
    pub description: String,
    pub version: String,
    pub homepage: Option<String>,
    pub addon_type: AddonType,
    /// Resolved targets, in declaration order.
    pub apps: Vec<TargetApp>,
}

impl ParsedManifest {
    /// Distinct applications among the resolved targets, first declaration first.
    pub fn compatible_apps(&self) -> Vec<AppKind> {
        let mut apps = Vec::with_capacity(self.apps.len());
        for target in &self.apps {
            if !apps.contains(&target.app) {
                apps.push(target.app);
            }
        }
        apps
    }
}

/// Open `path`, parse its manifest, and run the validation rules against
/// `existing` (the add-on a new version is being added to, if any).
pub fn parse_xpi<G>(
    path: &Path,
    existing: Option<&Addon>,
    registry: &G,
) -> Result<ParsedManifest, ManifestError>
where
    G: Registry + ?Sized,
{
    let mut archive = Archive::open(path)?;
    let parsed = parse(&mut archive, registry)?;
    validate::validate(&parsed, existing, registry)?;
    Ok(parsed)
}

/// Extract and resolve the install manifest of an opened archive.
pub fn parse<R, G>(archive: &mut Archive<R>, registry: &G) -> Result<ParsedManifest, ManifestError>
where
    R: Read + Seek,
    G: Registry + ?Sized,
{
    let bytes = archive
        .read_member(INSTALL_MANIFEST)?
        .ok_or(ManifestError::Missing)?;
    let raw = RawManifest::from_bytes(&bytes)?;

    let version = raw
        .version
        .clone()
        .ok_or_else(|| ManifestError::invalid(VERSION_MISSING))?;
    let addon_type = infer_type(&raw, archive);

    let mut apps = Vec::with_capacity(raw.targets.len());
    for declared in &raw.targets {
        if let Some(target) = resolve_or_omit(declared, registry)? {
            apps.push(target);
        }
    }

    Ok(ParsedManifest {
        guid: raw.guid,
        name: raw.name.unwrap_or_default(),
        description: raw.description.unwrap_or_default(),
        version,
        homepage: raw.homepage,
        addon_type,
        apps,
    })
}

/// Resolve one declared target. Unknown applications or version bounds are
/// dropped, not reported.
pub fn resolve_or_omit<G>(
    declared: &DeclaredTarget,
    registry: &G,
) -> Result<Option<TargetApp>, RegistryError>
where
    G: Registry + ?Sized,
{
    let (Some(id), Some(min), Some(max)) = (
        declared.id.as_deref(),
        declared.min_version.as_deref(),
        declared.max_version.as_deref(),
    ) else {
        tracing::debug!(?declared, "incomplete targetApplication, skipping");
        return Ok(None);
    };

    let Some(app) = registry.find_application(id)? else {
        tracing::debug!(app = id, "unknown application, skipping");
        return Ok(None);
    };

    let min_version = registry.find_app_version(app, min)?;
    let max_version = registry.find_app_version(app, max)?;
    match (min_version, max_version) {
        (Some(min), Some(max)) => Ok(Some(TargetApp { app, min, max })),
        _ => {
            tracing::debug!(%app, min, max, "unknown application version, skipping");
            Ok(None)
        }
    }
}

fn infer_type<R: Read + Seek>(raw: &RawManifest, archive: &Archive<R>) -> AddonType {
    if let Some(t) = raw.em_type.as_deref().and_then(AddonType::from_em_type) {
        t
    } else if raw.internal_name.is_some() {
        AddonType::Theme
    } else if archive.has_directory("dictionaries") {
        AddonType::Dictionary
    } else {
        AddonType::Extension
    }
}

impl RawManifest {
    /// Decode and parse manifest bytes. A UTF-8 byte order mark is ignored.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ManifestError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let xml = std::str::from_utf8(bytes).map_err(malformed)?;
        Self::from_xml(xml)
    }

    pub fn from_xml(xml: &str) -> Result<Self, ManifestError> {
        let mut reader = NsReader::from_str(xml);
        // Text is not trimmed: declared values are kept as written.
        reader.config_mut().expand_empty_elements = true;

        let mut collector = Collector::default();
        loop {
            let (in_em, event) = match reader.read_resolved_event() {
                Ok((ns, event)) => (is_em(&ns), event),
                Err(e) => {
                    return Err(ManifestError::Malformed(format!(
                        "{e} (at byte {})",
                        reader.buffer_position()
                    )));
                }
            };

            match event {
                Event::Start(e) => collector.start(&reader, in_em, &e)?,
                Event::End(_) => collector.end(),
                Event::Text(t) => collector.text(&t.unescape().map_err(malformed)?),
                Event::CData(c) => collector.text(&String::from_utf8_lossy(&c.into_inner())),
                Event::Eof => break,
                _ => {}
            }
        }

        Ok(collector.manifest)
    }
}

fn malformed(e: impl std::fmt::Display) -> ManifestError {
    ManifestError::Malformed(e.to_string())
}

fn is_em(ns: &ResolveResult<'_>) -> bool {
    matches!(ns, ResolveResult::Bound(Namespace(uri)) if *uri == EM_NAMESPACE.as_bytes())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Id,
    Name,
    Description,
    Version,
    Homepage,
    Type,
    InternalName,
}

impl Field {
    fn from_local(name: &[u8]) -> Option<Self> {
        match name {
            b"id" => Some(Self::Id),
            b"name" => Some(Self::Name),
            b"description" => Some(Self::Description),
            b"version" => Some(Self::Version),
            b"homepageURL" => Some(Self::Homepage),
            b"type" => Some(Self::Type),
            b"internalName" => Some(Self::InternalName),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetField {
    Id,
    MinVersion,
    MaxVersion,
}

impl TargetField {
    fn from_local(name: &[u8]) -> Option<Self> {
        match name {
            b"id" => Some(Self::Id),
            b"minVersion" => Some(Self::MinVersion),
            b"maxVersion" => Some(Self::MaxVersion),
            _ => None,
        }
    }
}

/// Position in the document, one per open element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Root,
    Manifest,
    Field(Field),
    TargetApplication,
    TargetDescription,
    TargetField(TargetField),
    /// Anything else, including the whole subtree below it.
    Other,
}

#[derive(Debug, Default)]
struct Collector {
    stack: Vec<Frame>,
    text: String,
    seen_manifest: bool,
    target: DeclaredTarget,
    manifest: RawManifest,
}

impl Collector {
    fn start(
        &mut self,
        reader: &NsReader<&[u8]>,
        in_em: bool,
        e: &BytesStart<'_>,
    ) -> Result<(), ManifestError> {
        let local = e.local_name();
        let local = local.as_ref();

        let parent = self.stack.last().copied();
        let frame = match parent {
            None => Frame::Root,
            Some(Frame::Root) if local == b"Description" && !self.seen_manifest => {
                match attribute(reader, e, false, b"about")? {
                    Some(about) if about != MANIFEST_ABOUT => Frame::Other,
                    _ => {
                        self.seen_manifest = true;
                        for field in [
                            Field::Id,
                            Field::Name,
                            Field::Description,
                            Field::Version,
                            Field::Homepage,
                            Field::Type,
                            Field::InternalName,
                        ] {
                            if let Some(value) = attribute(reader, e, true, field.local())? {
                                self.set_field(field, &value);
                            }
                        }
                        Frame::Manifest
                    }
                }
            }
            Some(Frame::Manifest) if in_em => {
                if local == b"targetApplication" {
                    Frame::TargetApplication
                } else {
                    Field::from_local(local).map_or(Frame::Other, Frame::Field)
                }
            }
            Some(Frame::TargetApplication) if local == b"Description" => {
                self.target = DeclaredTarget::default();
                for field in [
                    TargetField::Id,
                    TargetField::MinVersion,
                    TargetField::MaxVersion,
                ] {
                    if let Some(value) = attribute(reader, e, true, field.local())? {
                        self.set_target_field(field, &value);
                    }
                }
                Frame::TargetDescription
            }
            Some(Frame::TargetDescription) if in_em => {
                TargetField::from_local(local).map_or(Frame::Other, Frame::TargetField)
            }
            Some(_) => Frame::Other,
        };

        self.text.clear();
        self.stack.push(frame);
        Ok(())
    }

    fn text(&mut self, text: &str) {
        if matches!(
            self.stack.last(),
            Some(Frame::Field(_) | Frame::TargetField(_))
        ) {
            self.text.push_str(text);
        }
    }

    fn end(&mut self) {
        match self.stack.pop() {
            Some(Frame::Field(field)) => {
                let value = std::mem::take(&mut self.text);
                self.set_field(field, &value);
            }
            Some(Frame::TargetField(field)) => {
                let value = std::mem::take(&mut self.text);
                self.set_target_field(field, &value);
            }
            Some(Frame::TargetDescription) => {
                let target = std::mem::take(&mut self.target);
                self.manifest.targets.push(target);
            }
            _ => {}
        }
    }

    fn set_field(&mut self, field: Field, value: &str) {
        let slot = match field {
            Field::Id => &mut self.manifest.guid,
            Field::Name => &mut self.manifest.name,
            Field::Description => &mut self.manifest.description,
            Field::Version => &mut self.manifest.version,
            Field::Homepage => &mut self.manifest.homepage,
            Field::Type => &mut self.manifest.em_type,
            Field::InternalName => &mut self.manifest.internal_name,
        };
        *slot = non_blank(value);
    }

    fn set_target_field(&mut self, field: TargetField, value: &str) {
        let slot = match field {
            TargetField::Id => &mut self.target.id,
            TargetField::MinVersion => &mut self.target.min_version,
            TargetField::MaxVersion => &mut self.target.max_version,
        };
        // Registry lookups match exactly, so stray whitespace would never resolve
        *slot = non_blank(value.trim());
    }
}

impl Field {
    fn local(&self) -> &'static [u8] {
        match self {
            Self::Id => b"id",
            Self::Name => b"name",
            Self::Description => b"description",
            Self::Version => b"version",
            Self::Homepage => b"homepageURL",
            Self::Type => b"type",
            Self::InternalName => b"internalName",
        }
    }
}

impl TargetField {
    fn local(&self) -> &'static [u8] {
        match self {
            Self::Id => b"id",
            Self::MinVersion => b"minVersion",
            Self::MaxVersion => b"maxVersion",
        }
    }
}

/// `None` for empty or whitespace-only values, the value as declared otherwise.
fn non_blank(value: &str) -> Option<String> {
    (!value.trim().is_empty()).then(|| value.to_string())
}

/// Value of the attribute with local name `local`. With `em_only`, the
/// attribute must be in the `em:` namespace; otherwise any prefix matches.
fn attribute(
    reader: &NsReader<&[u8]>,
    e: &BytesStart<'_>,
    em_only: bool,
    local: &[u8],
) -> Result<Option<String>, ManifestError> {
    for attr in e.attributes() {
        let attr = attr.map_err(malformed)?;
        let (ns, name) = reader.resolve_attribute(attr.key);
        if name.as_ref() != local || (em_only && !is_em(&ns)) {
            continue;
        }
        let value = attr.unescape_value().map_err(malformed)?;
        return Ok(Some(value.into_owned()));
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, FIREFOX, THUNDERBIRD, install_rdf, target};
    use tempfile::tempdir;

    fn parse_rdf(rdf: &str, extra: &[(&str, &str)]) -> Result<ParsedManifest, ManifestError> {
        let dir = tempdir().unwrap();
        let mut entries = vec![("install.rdf", rdf)];
        entries.extend_from_slice(extra);
        let xpi = fixtures::write_zip(dir.path(), "test.xpi", &entries);
        parse(&mut Archive::open(&xpi).unwrap(), &fixtures::registry())
    }

    #[test]
    fn parse_basics() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::extension_xpi(dir.path());

        let parsed = parse_xpi(&xpi, None, &fixtures::registry()).unwrap();

        assert_eq!(parsed.guid.as_deref(), Some("guid@xpi"));
        assert_eq!(parsed.name, "xpi name");
        assert_eq!(parsed.description, "xpi description");
        assert_eq!(parsed.version, "0.1");
        assert_eq!(parsed.homepage.as_deref(), Some("http://homepage.com"));
        assert_eq!(parsed.addon_type, AddonType::Extension);
        assert_eq!(parsed.addon_type.id(), 1);
    }

    #[test]
    fn parse_apps() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::extension_xpi(dir.path());

        let parsed = parse_xpi(&xpi, None, &fixtures::registry()).unwrap();

        assert_eq!(parsed.apps.len(), 1);
        let app = &parsed.apps[0];
        assert_eq!(app.app, AppKind::Firefox);
        assert_eq!(app.application_id(), 1);
        assert_eq!(app.min.version, "3.0");
        assert_eq!(app.max.version, "3.6.*");
    }

    #[test]
    fn unknown_application_is_omitted() {
        let dir = tempdir().unwrap();
        let jar = fixtures::theme_invalid_app_jar(dir.path());

        let parsed = parse_xpi(&jar, None, &fixtures::registry()).unwrap();

        assert_eq!(parsed.apps, vec![]);
        assert_eq!(parsed.addon_type, AddonType::Theme);
    }

    #[test]
    fn application_missing_from_registry_is_omitted() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::extension_xpi(dir.path());
        let registry = fixtures::registry();
        registry.remove_application(AppKind::Firefox);

        let parsed = parse_xpi(&xpi, None, &registry).unwrap();

        assert!(parsed.apps.is_empty());
    }

    #[test]
    fn apps_resolve_only_once_versions_are_registered() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::extension_xpi(dir.path());
        let registry = fixtures::registry();
        registry.clear_app_versions();

        let parsed = parse_xpi(&xpi, None, &registry).unwrap();
        assert_eq!(parsed.apps, vec![]);

        registry.add_app_version(AppKind::Firefox, "3.0");
        registry.add_app_version(AppKind::Firefox, "3.6.*");

        let parsed = parse_xpi(&xpi, None, &registry).unwrap();
        assert_eq!(parsed.apps.len(), 1);
        assert_eq!(parsed.apps[0].app, AppKind::Firefox);
    }

    #[test]
    fn unknown_version_bound_is_omitted() {
        let rdf = install_rdf(&format!(
            "<em:id>a@b</em:id><em:version>1</em:version>\n{}\n{}",
            target(FIREFOX, "3.0", "4.0"),
            target(THUNDERBIRD, "3.0", "3.1.*"),
        ));

        let parsed = parse_rdf(&rdf, &[]).unwrap();

        assert_eq!(parsed.compatible_apps(), vec![AppKind::Thunderbird]);
    }

    #[test]
    fn declaration_order_is_kept() {
        let rdf = install_rdf(&format!(
            "<em:version>1</em:version>\n{}\n{}",
            target(THUNDERBIRD, "3.0", "3.1.*"),
            target(FIREFOX, "3.0", "3.6.*"),
        ));

        let parsed = parse_rdf(&rdf, &[]).unwrap();

        assert_eq!(
            parsed.compatible_apps(),
            vec![AppKind::Thunderbird, AppKind::Firefox]
        );
        assert_eq!(parsed.guid, None);
    }

    #[test]
    fn missing_version_is_invalid() {
        let rdf = install_rdf("<em:id>a@b</em:id>");

        let err = parse_rdf(&rdf, &[]).unwrap_err();

        assert_eq!(err.messages(), vec![VERSION_MISSING.to_string()]);
    }

    #[test]
    fn missing_manifest() {
        let dir = tempdir().unwrap();
        let xpi = fixtures::write_zip(dir.path(), "bare.xpi", &[("chrome.manifest", "")]);

        let err = parse_xpi(&xpi, None, &fixtures::registry()).unwrap_err();

        assert!(matches!(err, ManifestError::Missing));
    }

    #[test]
    fn malformed_xml() {
        let err = parse_rdf("<RDF><Description></RDF>", &[]).unwrap_err();
        assert!(matches!(err, ManifestError::Malformed(_)));
    }

    #[test]
    fn corrupt_archive_surfaces_as_archive_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.xpi");
        std::fs::write(&path, "PK not really a zip ".repeat(100)).unwrap();

        let err = parse_xpi(&path, None, &fixtures::registry()).unwrap_err();

        assert!(matches!(err, ManifestError::Archive(ArchiveError::Corrupt(_))));
    }

    #[test]
    fn attribute_form() {
        let rdf = r#"<?xml version="1.0"?>
<RDF:RDF xmlns:RDF="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
         xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <RDF:Description RDF:about="urn:mozilla:install-manifest"
                   em:id="attr@xpi" em:version="2.0" em:name="Attr &amp; Co" em:type="2">
    <em:targetApplication>
      <RDF:Description em:id="{ec8030f7-c20a-464f-9b0e-13a3a9e97384}"
                       em:minVersion="3.0" em:maxVersion="3.6.*"/>
    </em:targetApplication>
  </RDF:Description>
</RDF:RDF>"#;

        let parsed = parse_rdf(rdf, &[]).unwrap();

        assert_eq!(parsed.guid.as_deref(), Some("attr@xpi"));
        assert_eq!(parsed.version, "2.0");
        assert_eq!(parsed.name, "Attr & Co");
        assert_eq!(parsed.compatible_apps(), vec![AppKind::Firefox]);
    }

    #[test]
    fn localized_block_is_ignored() {
        let rdf = install_rdf(
            r#"<em:name>Top name</em:name>
    <em:version>1.0</em:version>
    <em:localized>
      <Description>
        <em:locale>de</em:locale>
        <em:name>Lokaler Name</em:name>
        <em:version>9.9</em:version>
      </Description>
    </em:localized>"#,
        );

        let parsed = parse_rdf(&rdf, &[]).unwrap();

        assert_eq!(parsed.name, "Top name");
        assert_eq!(parsed.version, "1.0");
        assert_eq!(parsed.homepage, None);
    }

    #[test]
    fn other_descriptions_are_ignored() {
        let rdf = r#"<RDF xmlns="http://www.w3.org/1999/02/22-rdf-syntax-ns#"
     xmlns:em="http://www.mozilla.org/2004/em-rdf#">
  <Description about="urn:mozilla:extension:file:x.jar">
    <em:version>6.6</em:version>
  </Description>
  <Description about="urn:mozilla:install-manifest">
    <em:version>1.1</em:version>
  </Description>
</RDF>"#;

        assert_eq!(parse_rdf(rdf, &[]).unwrap().version, "1.1");
    }

    #[test]
    fn non_em_elements_are_ignored() {
        let rdf = install_rdf(
            r#"<version xmlns="urn:other">7.7</version>
    <em:version><![CDATA[1.2]]></em:version>"#,
        );

        assert_eq!(parse_rdf(&rdf, &[]).unwrap().version, "1.2");
    }

    #[test]
    fn type_inference() {
        let typed = install_rdf("<em:version>1</em:version><em:type>4</em:type>");
        assert_eq!(parse_rdf(&typed, &[]).unwrap().addon_type, AddonType::Theme);

        let langpack = install_rdf("<em:version>1</em:version><em:type>8</em:type>");
        assert_eq!(
            parse_rdf(&langpack, &[]).unwrap().addon_type,
            AddonType::LanguagePack
        );

        let plain = install_rdf("<em:version>1</em:version>");
        assert_eq!(
            parse_rdf(&plain, &[("dictionaries/en-US.dic", "words")])
                .unwrap()
                .addon_type,
            AddonType::Dictionary
        );
        assert_eq!(
            parse_rdf(&plain, &[]).unwrap().addon_type,
            AddonType::Extension
        );

        let multi = install_rdf(
            "<em:version>1</em:version><em:type>32</em:type><em:internalName>x</em:internalName>",
        );
        assert_eq!(parse_rdf(&multi, &[]).unwrap().addon_type, AddonType::Theme);
    }

    #[test]
    fn unicode_name() {
        let rdf = install_rdf("<em:name>フォクすけといっしょ</em:name><em:version>0.1.7</em:version>");
        assert_eq!(parse_rdf(&rdf, &[]).unwrap().name, "フォクすけといっしょ");
    }

    #[test]
    fn declared_values_are_kept_verbatim() {
        let rdf = install_rdf(
            r#"<em:id>guid@xpi</em:id>
    <em:name>  Spaced   Name </em:name>
    <em:version>0.1</em:version>
    <em:homepageURL> http://homepage.com </em:homepageURL>
    <em:targetApplication>
      <Description>
        <em:id> {ec8030f7-c20a-464f-9b0e-13a3a9e97384} </em:id>
        <em:minVersion> 3.0 </em:minVersion>
        <em:maxVersion>3.6.*</em:maxVersion>
      </Description>
    </em:targetApplication>"#,
        );

        let parsed = parse_rdf(&rdf, &[]).unwrap();

        assert_eq!(parsed.guid.as_deref(), Some("guid@xpi"));
        assert_eq!(parsed.name, "  Spaced   Name ");
        assert_eq!(parsed.homepage.as_deref(), Some(" http://homepage.com "));
        assert_eq!(parsed.compatible_apps(), vec![AppKind::Firefox]);
    }

    #[test]
    fn absent_optional_fields_default() {
        let rdf = install_rdf("<em:version>1</em:version>");

        let parsed = parse_rdf(&rdf, &[]).unwrap();

        assert_eq!(parsed.guid, None);
        assert_eq!(parsed.name, "");
        assert_eq!(parsed.description, "");
        assert_eq!(parsed.homepage, None);
        assert_eq!(parsed.addon_type, AddonType::Extension);
    }

    #[test]
    fn blank_guid_is_none() {
        let rdf = install_rdf("<em:id>  </em:id><em:version>1</em:version>");
        assert_eq!(parse_rdf(&rdf, &[]).unwrap().guid, None);
    }

    #[test]
    fn bom_is_skipped() {
        let mut bytes = b"\xEF\xBB\xBF".to_vec();
        bytes.extend_from_slice(install_rdf("<em:version>3</em:version>").as_bytes());

        let raw = RawManifest::from_bytes(&bytes).unwrap();

        assert_eq!(raw.version.as_deref(), Some("3"));
    }

    #[test]
    fn registry_errors_propagate() {
        struct Down;
        impl Registry for Down {
            fn find_application(&self, _: &str) -> Result<Option<AppKind>, RegistryError> {
                Err(RegistryError::Lock)
            }
            fn find_app_version(
                &self,
                _: AppKind,
                _: &str,
            ) -> Result<Option<AppVersion>, RegistryError> {
                Ok(None)
            }
            fn find_addon_by_guid(&self, _: &str) -> Result<Option<Addon>, RegistryError> {
                Ok(None)
            }
        }

        let dir = tempdir().unwrap();
        let xpi = fixtures::extension_xpi(dir.path());
        let err = parse(&mut Archive::open(&xpi).unwrap(), &Down).unwrap_err();

        assert!(matches!(err, ManifestError::Registry(RegistryError::Lock)));
    }
}
