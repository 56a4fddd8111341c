pub mod archive;
pub mod upload;

pub use archive::{Archive, ArchiveError, Entry, ExtractedFile};
pub use upload::{UploadError, UploadReceiver};
