//! Filesystem runtime abstraction.
//!
//! All request handlers read through the [`Runtime`] trait rather than
//! `std::fs`, so the handler can be driven against any backing store and
//! file I/O never blocks the async executor.

mod native;

pub use native::NativeRuntime;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// File metadata
#[derive(Debug, Clone)]
pub struct FileMetadata {
    /// File size in bytes
    pub size: u64,
    /// Whether this is a directory
    pub is_dir: bool,
    /// Whether this is a file
    pub is_file: bool,
}

/// Platform runtime trait.
///
/// Only the read side is needed: the dev server never writes.
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read a file from the filesystem
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Get file metadata
    async fn metadata(&self, path: &Path) -> RuntimeResult<FileMetadata>;
}

/// Read a file as UTF-8 text.
pub(crate) async fn read_text(runtime: &dyn Runtime, path: &Path) -> crate::Result<String> {
    let bytes = runtime.read_file(path).await?;
    String::from_utf8(bytes).map_err(|_| crate::Error::InvalidUtf8(path.to_path_buf()))
}
