//! Publish command

use anyhow::{Context as _, Result, bail};
use std::fs::File;
use std::path::Path;

use xpi_core::registry::Catalog;
use xpi_core::{Published, XpiError};
use xpi_schema::Platform;

use crate::Context;

/// Receive a package into staging and publish it
pub fn publish(path: &Path, addon: Option<u64>, platform: Option<Platform>) -> Result<()> {
    let ctx = Context::load()?;
    let published = publish_with(&ctx, path, addon, platform)?;

    let urls = ctx.urls();
    let path = ctx.pipeline().materializer().path_for(&published.file);
    println!(
        "Published {} {} (add-on {}, version {}, file {})",
        published.addon.name,
        published.version.version,
        published.addon.id,
        published.version.id,
        published.file.id
    );
    println!("  {}", path.display());
    println!("  {}", urls.download_url(&published.file, None));
    Ok(())
}

pub fn publish_with(
    ctx: &Context,
    path: &Path,
    addon: Option<u64>,
    platform: Option<Platform>,
) -> Result<Published> {
    let existing = match addon {
        Some(id) => match ctx.registry.get_addon(id)? {
            Some(addon) => Some(addon),
            None => bail!("Add-on {id} not found"),
        },
        None => None,
    };

    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let size = file.metadata()?.len();
    let name = path
        .file_name()
        .map_or_else(|| "upload.xpi".to_string(), |n| n.to_string_lossy().into_owned());
    let upload = ctx.receiver().receive_reader(file, &name, size)?;

    let pipeline = ctx.pipeline();
    let result = match &existing {
        Some(addon) => pipeline.add_version(&upload, addon, platform),
        None => pipeline.create_addon(&upload, platform),
    };

    // A rejected upload has no further use
    if result.is_err() && upload.path.exists() {
        if let Err(e) = std::fs::remove_file(&upload.path) {
            tracing::warn!(path = %upload.path.display(), error = %e, "failed to remove staged upload");
        }
    }

    result.map_err(|e| rejection(&e))
}

fn rejection(err: &XpiError) -> anyhow::Error {
    if err.is_user_correctable() {
        anyhow::anyhow!("Package rejected: {}", err.messages().join("; "))
    } else {
        anyhow::anyhow!("Publish failed: {err}")
    }
}
