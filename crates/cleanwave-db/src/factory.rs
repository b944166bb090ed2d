#[cfg(feature = "dynamodb")]
use crate::DynamoFileRepository;
#[cfg(not(feature = "dynamodb"))]
use crate::DbError;
use crate::{DbResult, FileRepository, InMemoryFileRepository};
use cleanwave_core::{Config, MetadataBackend};
use std::sync::Arc;

/// Create the file repository selected by configuration
pub async fn create_file_repository(config: &Config) -> DbResult<Arc<dyn FileRepository>> {
    match config.metadata_backend {
        #[cfg(feature = "dynamodb")]
        MetadataBackend::DynamoDb => {
            let repo = DynamoFileRepository::connect(
                &config.region,
                config.files_table.clone(),
                config.dynamodb_endpoint.clone(),
            )
            .await;
            tracing::info!(table = %config.files_table, region = %config.region, "DynamoDB file repository initialized");
            Ok(Arc::new(repo))
        }

        #[cfg(not(feature = "dynamodb"))]
        MetadataBackend::DynamoDb => Err(DbError::ConfigError(
            "DynamoDB backend not available (dynamodb feature not enabled)".to_string(),
        )),

        MetadataBackend::Memory => {
            tracing::warn!("Using in-memory file repository; records are lost on exit");
            Ok(Arc::new(InMemoryFileRepository::new()))
        }
    }
}
