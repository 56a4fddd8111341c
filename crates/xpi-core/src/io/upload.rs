//! Chunked upload receiver.
//!
//! Streams incoming chunks into a staging file while hashing them. The
//! staging file stays an anonymous temp file until every byte has arrived
//! and the size matches, so an aborted or short upload leaves nothing behind.

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use thiserror::Error;
use xpi_schema::{ContentHash, Upload};

/// Read buffer used when adapting a reader into chunks.
const READ_CHUNK: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Incomplete upload: expected {declared} bytes, received {received}")]
    Incomplete { declared: u64, received: u64 },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Writes uploads into a staging directory.
#[derive(Debug, Clone)]
pub struct UploadReceiver {
    staging_dir: PathBuf,
}

impl UploadReceiver {
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
        }
    }

    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Receive an upload delivered as a sequence of chunks.
    ///
    /// Bytes are written in arrival order and never buffered as a whole. The
    /// upload is rejected with [`UploadError::Incomplete`] unless exactly
    /// `declared_size` bytes arrive.
    pub fn receive<I, B>(
        &self,
        chunks: I,
        filename: &str,
        declared_size: u64,
    ) -> Result<Upload, UploadError>
    where
        I: IntoIterator<Item = io::Result<B>>,
        B: AsRef<[u8]>,
    {
        std::fs::create_dir_all(&self.staging_dir)?;

        let suffix = staging_suffix(filename);
        let mut staged = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&suffix)
            .tempfile_in(&self.staging_dir)?;

        let mut hasher = Sha256::new();
        let mut received: u64 = 0;

        // Any early return drops `staged`, which unlinks the partial file.
        for chunk in chunks {
            let chunk = chunk?;
            let bytes = chunk.as_ref();
            staged.write_all(bytes)?;
            hasher.update(bytes);
            received += bytes.len() as u64;
        }

        if received != declared_size {
            tracing::warn!(
                filename,
                declared = declared_size,
                received,
                "rejecting incomplete upload"
            );
            return Err(UploadError::Incomplete {
                declared: declared_size,
                received,
            });
        }

        staged.flush()?;
        staged.as_file().sync_all()?;
        let (_, path) = staged.keep().map_err(|e| e.error)?;

        let hash = ContentHash::sha256(hex::encode(hasher.finalize()))
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        tracing::info!(
            filename,
            path = %path.display(),
            size = received,
            %hash,
            "upload received"
        );

        Ok(Upload {
            path,
            name: filename.to_string(),
            hash,
            size: received,
        })
    }

    /// Receive an upload from any reader, in fixed-size chunks.
    pub fn receive_reader<R: Read>(
        &self,
        reader: R,
        filename: &str,
        declared_size: u64,
    ) -> Result<Upload, UploadError> {
        self.receive(ReadChunks::new(reader), filename, declared_size)
    }
}

/// Keep the original extension so staged files are recognizable on disk.
fn staging_suffix(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Iterator adapter yielding a reader's content in chunks.
struct ReadChunks<R> {
    reader: R,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            done: false,
        }
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut buffer = vec![0u8; READ_CHUNK];
        loop {
            match self.reader.read(&mut buffer) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buffer.truncate(n);
                    return Some(Ok(buffer));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}
