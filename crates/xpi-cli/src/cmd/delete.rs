//! Delete command

use anyhow::{Result, bail};
use xpi_core::registry::Catalog;

use crate::Context;

/// Remove a file record and its artifact
pub fn delete(file_id: u64) -> Result<()> {
    let ctx = Context::load()?;
    let Some(file) = ctx.registry.get_file(file_id)? else {
        bail!("File {file_id} not found");
    };

    ctx.pipeline().materializer().delete(&file)?;
    println!("Deleted {} ({})", file.filename, file.id);
    Ok(())
}
