use crate::keys::{content_type_for_key, validate_key};
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
///
/// Each bucket is a directory under a shared root, so `LOCAL_STORAGE_PATH`
/// can hold both the raw and content buckets side by side.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    bucket: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `root` - Directory holding one sub-directory per bucket (e.g., "/var/lib/cleanwave")
    /// * `bucket` - Bucket name, used as the sub-directory name
    pub async fn new(root: impl Into<PathBuf>, bucket: String) -> StorageResult<Self> {
        let base_path = root.into().join(&bucket);

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage { base_path, bucket })
    }

    /// Convert storage key to filesystem path with traversal validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;
        Ok(self.base_path.join(storage_key))
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn get(&self, storage_key: &str) -> StorageResult<StoredObject> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(StoredObject {
            data: Bytes::from(data),
            content_type: Some(content_type_for_key(storage_key).to_string()),
        })
    }

    async fn put(&self, storage_key: &str, data: Bytes, _content_type: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(())
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage_in(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "bucketname-raw-dev-us-east-1".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_put_get() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        storage
            .put("u-1/raw/talk.wav", Bytes::from_static(b"RIFF"), "audio/wav")
            .await
            .unwrap();

        let object = storage.get("u-1/raw/talk.wav").await.unwrap();
        assert_eq!(&object.data[..], b"RIFF");
        assert_eq!(object.content_type.as_deref(), Some("audio/wav"));
        assert!(dir
            .path()
            .join("bucketname-raw-dev-us-east-1/u-1/raw/talk.wav")
            .exists());
    }

    #[tokio::test]
    async fn test_missing_key_is_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage.get("u-1/raw/missing.wav").await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        let result = storage.get("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage
            .put("/etc/passwd", Bytes::from_static(b"x"), "text/plain")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_put_replaces_existing_object() {
        let dir = tempdir().unwrap();
        let storage = storage_in(dir.path()).await;

        storage
            .put("u-1/talk.wav", Bytes::from_static(b"old"), "audio/wav")
            .await
            .unwrap();
        storage
            .put("u-1/talk.wav", Bytes::from_static(b"new"), "audio/wav")
            .await
            .unwrap();

        let object = storage.get("u-1/talk.wav").await.unwrap();
        assert_eq!(&object.data[..], b"new");
    }
}
