//! Test helpers: build an `AppContext` over local storage, the in-memory
//! repository and fake model/ffmpeg implementations.
//!
//! Run from workspace root: `cargo test -p cleanwave-lambda`.

#![allow(dead_code)]

pub mod fakes;
pub mod fixtures;

use bytes::Bytes;
use cleanwave_core::Config;
use cleanwave_db::InMemoryFileRepository;
use cleanwave_lambda::{handle_event, AppContext, HandlerResponse, ResponseBody};
use cleanwave_processing::ModelCache;
use cleanwave_storage::create_storage_client;
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use fakes::{FakeConverter, FakeEnhancer, FakeModelLoader};

/// Test environment: a context plus handles on every fake it uses.
pub struct TestEnv {
    pub ctx: AppContext,
    pub repo: InMemoryFileRepository,
    pub loader: Arc<FakeModelLoader>,
    pub enhancer: Arc<FakeEnhancer>,
    pub converter: Arc<FakeConverter>,
    pub _temp_dir: TempDir,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let vars: HashMap<&str, String> = HashMap::from([
            ("STAGE", "test".to_string()),
            ("AWS_REGION", "us-east-1".to_string()),
            ("STORAGE_BACKEND", "local".to_string()),
            (
                "LOCAL_STORAGE_PATH",
                temp_dir.path().join("storage").to_string_lossy().to_string(),
            ),
            ("METADATA_BACKEND", "memory".to_string()),
            (
                "SCRATCH_DIR",
                temp_dir.path().join("scratch").to_string_lossy().to_string(),
            ),
        ]);
        let config = Config::from_vars(|key| vars.get(key).cloned()).unwrap();

        let storage = create_storage_client(&config).await.unwrap();
        let repo = InMemoryFileRepository::new();
        let enhancer = Arc::new(FakeEnhancer::new());
        let loader = Arc::new(FakeModelLoader::new(enhancer.clone()));
        let converter = Arc::new(FakeConverter::new());

        let ctx = AppContext {
            config,
            storage,
            files: Arc::new(repo.clone()),
            models: Arc::new(ModelCache::new(loader.clone())),
            converter: converter.clone(),
        };

        Self {
            ctx,
            repo,
            loader,
            enhancer,
            converter,
            _temp_dir: temp_dir,
        }
    }

    /// Put `data` into the raw bucket under `key`.
    pub async fn put_raw(&self, key: &str, data: Vec<u8>) {
        self.ctx
            .storage
            .raw()
            .put(key, Bytes::from(data), "audio/wav")
            .await
            .unwrap();
    }

    pub async fn invoke(&self, event: Value, invocation_id: &str) -> (HandlerResponse, ResponseBody) {
        let response = handle_event(&self.ctx, event, invocation_id).await;
        let body = response.parsed_body().unwrap();
        (response, body)
    }

    pub fn invocation_dir(&self, invocation_id: &str) -> PathBuf {
        self.ctx.config.invocation_scratch_root().join(invocation_id)
    }
}
