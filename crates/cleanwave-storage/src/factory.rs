#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageClient, StorageError, StorageResult};
use cleanwave_core::{BucketKind, Config};
use std::sync::Arc;

/// Create the raw/content storage pair based on configuration
pub async fn create_storage_client(config: &Config) -> StorageResult<StorageClient> {
    let raw = create_storage(config, BucketKind::Raw).await?;
    let content = create_storage(config, BucketKind::Content).await?;

    tracing::info!(
        backend = %config.storage_backend,
        raw_bucket = %raw.bucket(),
        content_bucket = %content.bucket(),
        "Storage initialized"
    );

    Ok(StorageClient::new(raw, content))
}

/// Create a single bucket-scoped storage backend
pub async fn create_storage(config: &Config, kind: BucketKind) -> StorageResult<Arc<dyn Storage>> {
    let bucket = config.bucket_name(kind);

    match config.storage_backend {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let storage =
                S3Storage::new(bucket, config.region.clone(), config.s3_endpoint.clone()).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let root = config.local_storage_path.clone().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;

            let storage = LocalStorage::new(root, bucket).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}
