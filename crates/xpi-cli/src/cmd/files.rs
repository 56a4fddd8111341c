//! Files command

use anyhow::Result;
use xpi_schema::File;

use crate::Context;

/// List published files of an add-on, newest first
pub fn files(addon: u64) -> Result<()> {
    let ctx = Context::load()?;
    let files = ctx.registry.files_for_addon(addon)?;

    if files.is_empty() {
        println!("No files for add-on {addon}");
        return Ok(());
    }

    for file in &files {
        println!("{}", format_row(file));
    }
    Ok(())
}

fn format_row(file: &File) -> String {
    let created = chrono::DateTime::from_timestamp(file.created_at, 0)
        .unwrap_or_default()
        .format("%Y-%m-%d");
    let platform = file.platform.map_or("all", |p| p.shortname());
    format!(
        "{:>6}  {:<40} {:<8} {:>6} KB  {}{}",
        file.id,
        file.filename,
        platform,
        file.size_kb,
        created,
        if file.is_jetpack { "  jetpack" } else { "" }
    )
}
