//! Shared domain types for the XPI ingestion pipeline.
//!
//! Everything here is plain data: content hashes, the static application and
//! platform tables, and the entity records produced and consumed by
//! `xpi-core`.

pub mod app;
pub mod hash;
pub mod platform;
pub mod types;

// Re-exports
pub use app::AppKind;
pub use hash::{ContentHash, HashAlgorithm, HashError};
pub use platform::Platform;
pub use types::*;

/// Path of the install manifest inside an add-on archive.
pub const INSTALL_MANIFEST: &str = "install.rdf";

/// Namespace URI of the `em:` vocabulary used by `install.rdf`.
pub const EM_NAMESPACE: &str = "http://www.mozilla.org/2004/em-rdf#";
