//! Application version commands

use anyhow::Result;
use xpi_core::registry::Catalog;
use xpi_schema::AppKind;

use crate::Context;

/// Register release strings so manifests targeting them resolve
pub fn add(app: AppKind, versions: &[String]) -> Result<()> {
    let ctx = Context::load()?;
    for version in versions {
        let row = ctx.registry.insert_app_version(app, version)?;
        println!("{} {} ({})", app.pretty(), row.version, row.id);
    }
    Ok(())
}

pub fn list(app: AppKind) -> Result<()> {
    let ctx = Context::load()?;
    let versions = ctx.registry.list_app_versions(app)?;
    if versions.is_empty() {
        println!("No versions registered for {}", app.pretty());
    }
    for row in versions {
        println!("{}", row.version);
    }
    Ok(())
}
