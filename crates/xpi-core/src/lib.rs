//! Core library for XPI ingestion: upload receiving, archive reading,
//! manifest parsing and validation, and file materialization.

pub mod config;
pub mod error;
pub mod io;
pub mod manifest;
pub mod materialize;
pub mod paths;
pub mod pipeline;
pub mod registry;
pub mod storage;
pub mod urls;
pub mod validate;

#[cfg(test)]
mod fixtures;

pub use config::{ConfigError, Settings};
pub use error::XpiError;
pub use io::{Archive, ArchiveError, UploadError, UploadReceiver};
pub use manifest::{ManifestError, ParsedManifest, TargetApp, parse_xpi};
pub use materialize::{Materializer, generate_filename};
pub use pipeline::{Pipeline, Published};
pub use registry::{Catalog, MemoryRegistry, Registry, RegistryError};
pub use storage::{LocalStorage, Storage, StorageError, TransferMode};
pub use urls::UrlBuilder;
