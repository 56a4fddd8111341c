//! Urls command

use anyhow::{Result, bail};
use xpi_core::registry::Catalog;

use crate::Context;

/// Print download, latest and EULA URLs for a file
pub fn urls(file_id: u64, src: Option<&str>) -> Result<()> {
    let ctx = Context::load()?;
    let Some(file) = ctx.registry.get_file(file_id)? else {
        bail!("File {file_id} not found");
    };

    let urls = ctx.urls();
    println!("download  {}", urls.download_url(&file, src));
    println!("latest    {}", urls.latest_url(file.addon_id, file.platform));
    println!("eula      {}", urls.eula_url(file.addon_id, file.id));
    Ok(())
}
