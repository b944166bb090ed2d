//! Stand-ins for the model, ffmpeg and storage backends.

use async_trait::async_trait;
use bytes::Bytes;
use cleanwave_processing::{
    AudioConverter, LoadedModel, ModelLoader, ModelState, ProcessingError, ProcessingResult,
    SpeechEnhancer,
};
use cleanwave_storage::{Storage, StorageError, StorageResult, StoredObject};
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::fixtures::wav_bytes;

/// Copies its input to the output, or fails on request.
pub struct FakeEnhancer {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl FakeEnhancer {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl SpeechEnhancer for FakeEnhancer {
    async fn enhance(&self, input: &Path, output: &Path) -> ProcessingResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(ProcessingError::Enhancement("model crashed".to_string()));
        }
        tokio::fs::copy(input, output).await?;
        Ok(())
    }
}

/// Counts loads; can be told to fail the next load.
pub struct FakeModelLoader {
    pub loads: AtomicUsize,
    pub fail_next: AtomicBool,
    pub enhancer: Arc<FakeEnhancer>,
    pub sample_rate: u32,
}

impl FakeModelLoader {
    pub fn new(enhancer: Arc<FakeEnhancer>) -> Self {
        Self {
            loads: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            enhancer,
            sample_rate: 48_000,
        }
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ModelLoader for FakeModelLoader {
    async fn load(&self) -> ProcessingResult<LoadedModel> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(ProcessingError::ModelAssetsMissing(
                "/opt/deepfilter_models".to_string(),
            ));
        }

        Ok(LoadedModel {
            state: ModelState {
                sample_rate: self.sample_rate,
                hop_size: Some(480),
                model_name: Some("fake".to_string()),
            },
            enhancer: self.enhancer.clone(),
        })
    }
}

/// Writes synthetic WAV/MP3 files instead of running ffmpeg.
pub struct FakeConverter {
    pub normalize_calls: AtomicUsize,
    pub encode_calls: AtomicUsize,
    /// Delete the normalization input right away, so cleanup finds it gone.
    pub consume_input: AtomicBool,
    /// Replace the normalization input with a non-empty directory, so
    /// removing it during cleanup fails.
    pub pin_input: AtomicBool,
}

impl FakeConverter {
    pub fn new() -> Self {
        Self {
            normalize_calls: AtomicUsize::new(0),
            encode_calls: AtomicUsize::new(0),
            consume_input: AtomicBool::new(false),
            pin_input: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl AudioConverter for FakeConverter {
    async fn normalize_to_wav(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
    ) -> ProcessingResult<()> {
        self.normalize_calls.fetch_add(1, Ordering::SeqCst);
        if !input.exists() {
            return Err(ProcessingError::Conversion("input missing".to_string()));
        }
        tokio::fs::write(output, wav_bytes(1, sample_rate, sample_rate / 2)).await?;
        if self.consume_input.load(Ordering::SeqCst) {
            tokio::fs::remove_file(input).await?;
        }
        if self.pin_input.load(Ordering::SeqCst) {
            tokio::fs::remove_file(input).await?;
            tokio::fs::create_dir_all(input.join("pinned")).await?;
            tokio::fs::write(input.join("pinned/keep"), b"x").await?;
        }
        Ok(())
    }

    async fn encode_mp3(&self, input: &Path, output: &Path) -> ProcessingResult<()> {
        self.encode_calls.fetch_add(1, Ordering::SeqCst);
        let wav = tokio::fs::read(input).await?;
        let mut mp3 = b"ID3".to_vec();
        mp3.extend_from_slice(&wav[..wav.len().min(64)]);
        tokio::fs::write(output, mp3).await?;
        Ok(())
    }
}

/// Raw bucket whose reads always fail with a backend error.
pub struct BrokenStorage;

#[async_trait]
impl Storage for BrokenStorage {
    fn bucket(&self) -> &str {
        "broken-raw"
    }

    async fn get(&self, _storage_key: &str) -> StorageResult<StoredObject> {
        Err(StorageError::DownloadFailed("connection reset".to_string()))
    }

    async fn put(&self, _storage_key: &str, _data: Bytes, _content_type: &str) -> StorageResult<()> {
        Err(StorageError::UploadFailed("connection reset".to_string()))
    }
}
