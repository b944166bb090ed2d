use anyhow::Context;
use cleanwave_core::Config;
use cleanwave_db::{create_file_repository, FileRepository};
use cleanwave_processing::{AudioConverter, DeepFilterModelLoader, FfmpegConverter, ModelCache};
use cleanwave_storage::{create_storage_client, StorageClient};
use std::sync::Arc;

/// Long-lived dependencies shared by every invocation of a warm process.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub storage: StorageClient,
    pub files: Arc<dyn FileRepository>,
    pub models: Arc<ModelCache>,
    pub converter: Arc<dyn AudioConverter>,
}

impl AppContext {
    /// Build the production context. The model is not loaded here; the
    /// first invocation loads it through `models`.
    pub async fn from_config(config: Config) -> anyhow::Result<Self> {
        let storage = create_storage_client(&config)
            .await
            .context("Failed to initialize storage")?;

        let files = create_file_repository(&config)
            .await
            .context("Failed to initialize file repository")?;

        let models = Arc::new(ModelCache::new(Arc::new(
            DeepFilterModelLoader::from_config(&config),
        )));

        let converter: Arc<dyn AudioConverter> = Arc::new(FfmpegConverter::new(
            config.ffmpeg_path.clone(),
            config.mp3_quality,
        ));

        tracing::info!(
            stage = %config.stage,
            region = %config.region,
            metadata_backend = %config.metadata_backend,
            scratch_dir = %config.scratch_dir.display(),
            "Application context initialized"
        );

        Ok(Self {
            config,
            storage,
            files,
            models,
            converter,
        })
    }
}
