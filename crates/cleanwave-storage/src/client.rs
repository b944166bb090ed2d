//! Raw/content bucket pair used by the enhancement pipeline.

use bytes::Bytes;
use std::path::Path;
use std::sync::Arc;

use crate::keys::{content_type_for_key, replace_basename};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};

/// Reads source audio from the raw bucket and writes results to the content
/// bucket.
#[derive(Clone)]
pub struct StorageClient {
    raw: Arc<dyn Storage>,
    content: Arc<dyn Storage>,
}

impl StorageClient {
    pub fn new(raw: Arc<dyn Storage>, content: Arc<dyn Storage>) -> Self {
        Self { raw, content }
    }

    pub fn raw(&self) -> &Arc<dyn Storage> {
        &self.raw
    }

    pub fn content(&self) -> &Arc<dyn Storage> {
        &self.content
    }

    /// Fetch an uploaded object from the raw bucket.
    ///
    /// A missing object yields `StorageError::NotFound`; any other failure is
    /// reported as the backend's error. Both are logged here.
    pub async fn fetch(&self, storage_key: &str) -> StorageResult<StoredObject> {
        match self.raw.get(storage_key).await {
            Ok(object) => {
                tracing::info!(
                    bucket = %self.raw.bucket(),
                    key = %storage_key,
                    size_bytes = object.len(),
                    content_type = object.content_type.as_deref().unwrap_or("unknown"),
                    "Fetched file from storage"
                );
                Ok(object)
            }
            Err(StorageError::NotFound(key)) => {
                tracing::error!(
                    bucket = %self.raw.bucket(),
                    key = %key,
                    "File not found in storage"
                );
                Err(StorageError::NotFound(key))
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.raw.bucket(),
                    key = %storage_key,
                    "Failed to fetch file from storage"
                );
                Err(e)
            }
        }
    }

    /// Upload a local file to the content bucket.
    ///
    /// When `renamed_filename` is given, the last path segment of
    /// `storage_key` is replaced with it. Returns the key that was written.
    pub async fn upload(
        &self,
        local_path: &Path,
        storage_key: &str,
        renamed_filename: Option<&str>,
    ) -> StorageResult<String> {
        let key = match renamed_filename {
            Some(filename) => replace_basename(storage_key, filename),
            None => storage_key.to_string(),
        };

        let data = tokio::fs::read(local_path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                path = %local_path.display(),
                "Failed to read local file for upload"
            );
            StorageError::UploadFailed(format!(
                "Failed to read {}: {}",
                local_path.display(),
                e
            ))
        })?;

        let content_type = content_type_for_key(&key);
        if let Err(e) = self
            .content
            .put(&key, Bytes::from(data), content_type)
            .await
        {
            tracing::error!(
                error = %e,
                bucket = %self.content.bucket(),
                key = %key,
                "Failed to upload file to storage"
            );
            return Err(e);
        }

        tracing::info!(
            path = %local_path.display(),
            bucket = %self.content.bucket(),
            key = %key,
            "File uploaded to storage"
        );

        Ok(key)
    }
}
