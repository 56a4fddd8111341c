//! Validation rules applied to a parsed manifest.
//!
//! Rules run in a fixed order and the first failure is returned.

use xpi_schema::Addon;

use crate::manifest::{ManifestError, ParsedManifest};
use crate::registry::Registry;

pub const GUID_MISMATCH: &str = "GUID doesn't match add-on";
pub const TYPE_MISMATCH: &str = "<em:type> doesn't match add-on";
pub const DUPLICATE_GUID: &str = "Duplicate GUID found.";

/// Check `parsed` against the add-on it is being added to, or, for a new
/// add-on, against every add-on the registry knows.
pub fn validate<G>(
    parsed: &ParsedManifest,
    existing: Option<&Addon>,
    registry: &G,
) -> Result<(), ManifestError>
where
    G: Registry + ?Sized,
{
    match existing {
        Some(addon) => {
            check_guid(parsed, addon)?;
            check_type(parsed, addon)
        }
        None => check_duplicate(parsed, registry),
    }
}

/// Only compared when both sides carry a GUID.
fn check_guid(parsed: &ParsedManifest, addon: &Addon) -> Result<(), ManifestError> {
    match (addon.guid.as_deref(), parsed.guid.as_deref()) {
        (Some(expected), Some(found)) if expected != found => {
            Err(ManifestError::invalid(GUID_MISMATCH))
        }
        _ => Ok(()),
    }
}

fn check_type(parsed: &ParsedManifest, addon: &Addon) -> Result<(), ManifestError> {
    if parsed.addon_type != addon.addon_type {
        return Err(ManifestError::invalid(TYPE_MISMATCH));
    }
    Ok(())
}

/// Advisory; the catalog's unique index is what actually holds the line.
fn check_duplicate<G>(parsed: &ParsedManifest, registry: &G) -> Result<(), ManifestError>
where
    G: Registry + ?Sized,
{
    if let Some(guid) = &parsed.guid
        && registry.find_addon_by_guid(guid)?.is_some()
    {
        return Err(ManifestError::DuplicateGuid(guid.clone()));
    }
    Ok(())
}
