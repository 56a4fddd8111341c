//! Inspect command

use anyhow::{Context as _, Result};
use serde::Serialize;
use std::path::Path;

use xpi_core::io::Archive;
use xpi_core::manifest::{self, ParsedManifest};
use xpi_core::materialize::is_jetpack;
use xpi_core::registry::Registry;
use xpi_schema::{AddonType, AppKind};

use crate::Context;

#[derive(Debug, Serialize)]
pub struct Report {
    pub guid: Option<String>,
    pub name: String,
    pub description: String,
    pub version: String,
    pub homepage: Option<String>,
    pub addon_type: AddonType,
    pub apps: Vec<ReportApp>,
    pub is_jetpack: bool,
    pub entries: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportApp {
    pub app: AppKind,
    pub min: String,
    pub max: String,
}

/// Show the manifest of a package as the registry resolves it
pub fn inspect(path: &Path, json: bool) -> Result<()> {
    let ctx = Context::load()?;
    let report = build_report(path, &ctx.registry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let lw = 12;
    println!();
    println!("  {} {}", report.name, report.version);
    if !report.description.is_empty() {
        println!("  {}", report.description);
    }
    println!();
    println!("  {:<lw$}{}", "guid", report.guid.as_deref().unwrap_or("-"));
    println!("  {:<lw$}{}", "type", report.addon_type);
    if let Some(homepage) = &report.homepage {
        println!("  {:<lw$}{homepage}", "homepage");
    }
    for app in &report.apps {
        println!(
            "  {:<lw$}{} {} - {}",
            "target",
            app.app.pretty(),
            app.min,
            app.max
        );
    }
    if report.apps.is_empty() {
        println!("  {:<lw$}none recognized", "target");
    }
    println!("  {:<lw$}{}", "jetpack", if report.is_jetpack { "yes" } else { "no" });
    println!("  {:<lw$}{}", "entries", report.entries);
    println!();
    Ok(())
}

pub fn build_report<G: Registry + ?Sized>(path: &Path, registry: &G) -> Result<Report> {
    let mut archive =
        Archive::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let entries = archive.list()?.len();
    let parsed = manifest::parse(&mut archive, registry)
        .map_err(|e| anyhow::anyhow!(e.messages().join("\n")))?;

    Ok(Report::new(parsed, is_jetpack(&archive), entries))
}

impl Report {
    fn new(parsed: ParsedManifest, is_jetpack: bool, entries: usize) -> Self {
        Self {
            apps: parsed
                .apps
                .iter()
                .map(|t| ReportApp {
                    app: t.app,
                    min: t.min.version.clone(),
                    max: t.max.version.clone(),
                })
                .collect(),
            guid: parsed.guid,
            name: parsed.name,
            description: parsed.description,
            version: parsed.version,
            homepage: parsed.homepage,
            addon_type: parsed.addon_type,
            is_jetpack,
            entries,
        }
    }
}
