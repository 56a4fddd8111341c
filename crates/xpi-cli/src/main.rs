//! xpi - add-on ingestion CLI

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use xpi_cli::cmd;
use xpi_cli::{AppVersionCommands, Cli, Commands};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Hash { files } => cmd::hash::hash(&files),
        Commands::Inspect { path, json } => cmd::inspect::inspect(&path, json),
        Commands::Extract { path, dest } => cmd::extract::extract(&path, &dest),
        Commands::Publish {
            path,
            addon,
            platform,
        } => cmd::publish::publish(&path, addon, platform),
        Commands::Files { addon } => cmd::files::files(addon),
        Commands::Delete { file } => cmd::delete::delete(file),
        Commands::Urls { file, src } => cmd::urls::urls(file, src.as_deref()),
        Commands::Appversion { command } => match command {
            AppVersionCommands::Add { app, versions } => cmd::appversion::add(app, &versions),
            AppVersionCommands::List { app } => cmd::appversion::list(app),
        },
    }
}
