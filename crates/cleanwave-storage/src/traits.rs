//! Storage abstraction trait
//!
//! Every backend is scoped to a single bucket. The pipeline holds one store
//! for the raw bucket and one for the content bucket.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
///
/// `NotFound` and `DownloadFailed` are kept apart so a missing object is never
/// confused with a failing backend.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for cleanwave_core::AppError {
    fn from(err: StorageError) -> Self {
        cleanwave_core::AppError::Storage(err.to_string())
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object bytes together with the content type the backend reported.
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub content_type: Option<String>,
}

impl StoredObject {
    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// pipeline never depends on a concrete backend.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Name of the bucket this store reads and writes.
    fn bucket(&self) -> &str;

    /// Download an object by key.
    ///
    /// Returns `StorageError::NotFound` when the key does not exist.
    async fn get(&self, storage_key: &str) -> StorageResult<StoredObject>;

    /// Write `data` at `storage_key`, replacing any existing object.
    async fn put(&self, storage_key: &str, data: Bytes, content_type: &str) -> StorageResult<()>;
}
