//! xpi - add-on ingestion
//!
//! Operator CLI for the XPI ingestion pipeline.
//!
//! # Overview
//!
//! `xpi` receives add-on packages (XPI/JAR archives), checks their
//! `install.rdf` against a local registry of applications and add-ons, and
//! files them into a storage tree under deterministic names. The registry is
//! a SQLite database; storage is the local filesystem.
//!
//! # Directory Layout
//!
//! ```text
//! ~/.xpi/
//! ├── addons/       # Published files, one directory per add-on id
//! ├── staging/      # Uploads in flight
//! ├── config.toml   # Optional settings
//! └── registry.db   # SQLite registry
//! ```
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod cmd;
pub mod context;
pub mod store;

pub use context::Context;
pub use store::SqliteRegistry;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use xpi_schema::{AppKind, Platform};

#[derive(Debug, Parser)]
#[command(name = "xpi")]
#[command(author, version, about = "xpi - add-on package ingestion")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Compute content hashes of files
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Show what an add-on package declares
    Inspect {
        /// Path to an .xpi or .jar
        path: PathBuf,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Extract an add-on package into a directory
    Extract {
        /// Path to an .xpi or .jar
        path: PathBuf,
        /// Destination directory
        dest: PathBuf,
    },
    /// Publish a package as a new add-on or a new version of one
    Publish {
        /// Path to an .xpi or .jar
        path: PathBuf,
        /// Existing add-on id (creates a new add-on when omitted)
        #[arg(long)]
        addon: Option<u64>,
        /// Target platform (all, linux, mac, bsd, win, solaris)
        #[arg(long)]
        platform: Option<Platform>,
    },
    /// List published files of an add-on
    Files {
        /// Add-on id
        addon: u64,
    },
    /// Delete a published file and its artifact
    Delete {
        /// File id
        file: u64,
    },
    /// Print the public URLs of a published file
    Urls {
        /// File id
        file: u64,
        /// Value for the download URL's `src` parameter
        #[arg(long)]
        src: Option<String>,
    },
    /// Manage known application versions
    Appversion {
        #[command(subcommand)]
        command: AppVersionCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum AppVersionCommands {
    /// Register release strings for an application
    Add {
        /// Application (firefox, fx, thunderbird, ...)
        app: AppKind,
        /// Release strings exactly as add-ons declare them (e.g. 3.6.*)
        #[arg(required = true)]
        versions: Vec<String>,
    },
    /// List release strings of an application
    List {
        /// Application (firefox, fx, thunderbird, ...)
        app: AppKind,
    },
}
