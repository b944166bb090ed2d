//! Enhancement model loading and the process-wide model cache.
//!
//! Model assets ship on a read-only mount. On first use they are copied once
//! into writable scratch storage, every asset file is logged, and the network
//! is initialized in memory from the scratch copy. The loaded model is kept in
//! a [`ModelCache`] for the rest of the process lifetime.

use async_trait::async_trait;
use cleanwave_core::constants::DEFAULT_MODEL_SAMPLE_RATE;
use cleanwave_core::Config;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OnceCell;
use walkdir::WalkDir;

use crate::enhancer::{DfTractEnhancer, SpeechEnhancer};
use crate::error::{ProcessingError, ProcessingResult};

const MODEL_CONFIG_FILE: &str = "config.ini";
const MODEL_ARCHIVE_SUFFIXES: [&str; 2] = [".tar.gz", ".tgz"];

/// Processing parameters the model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelState {
    pub sample_rate: u32,
    pub hop_size: Option<u32>,
    pub model_name: Option<String>,
}

impl Default for ModelState {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_MODEL_SAMPLE_RATE,
            hop_size: None,
            model_name: None,
        }
    }
}

impl ModelState {
    /// Parse the `sr`, `hop_size` and `model` keys of a DeepFilterNet
    /// `config.ini`, regardless of section. Unknown or malformed values keep
    /// their defaults.
    pub fn from_config_ini(contents: &str) -> Self {
        let mut state = Self::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with(';') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let value = value.trim();

            match key.trim().to_lowercase().as_str() {
                "sr" => {
                    if let Ok(sr) = value.parse::<u32>() {
                        if sr > 0 {
                            state.sample_rate = sr;
                        }
                    }
                }
                "hop_size" => state.hop_size = value.parse().ok(),
                "model" if !value.is_empty() => state.model_name = Some(value.to_string()),
                _ => {}
            }
        }

        state
    }

    /// Read the state from the first `config.ini` found under `dir`.
    pub fn from_model_dir(dir: &Path) -> ProcessingResult<Self> {
        let config_path = WalkDir::new(dir)
            .max_depth(3)
            .into_iter()
            .filter_map(Result::ok)
            .find(|entry| entry.file_type().is_file() && entry.file_name() == MODEL_CONFIG_FILE)
            .map(|entry| entry.into_path());

        match config_path {
            Some(path) => {
                let contents = fs::read_to_string(&path)?;
                Ok(Self::from_config_ini(&contents))
            }
            None => {
                tracing::info!(dir = %dir.display(), "No config.ini in model assets, using default model state");
                Ok(Self::default())
            }
        }
    }
}

/// A model ready for use, immutable once loaded. The enhancer owns the
/// initialized network.
pub struct LoadedModel {
    pub state: ModelState,
    pub enhancer: Arc<dyn SpeechEnhancer>,
}

impl std::fmt::Debug for LoadedModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedModel")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

/// Produces a loaded model. Called at most once per successful load.
#[async_trait]
pub trait ModelLoader: Send + Sync {
    async fn load(&self) -> ProcessingResult<LoadedModel>;
}

/// Copies DeepFilterNet assets to scratch and loads the ONNX archive with
/// [`DfTractEnhancer`].
#[derive(Debug, Clone)]
pub struct DeepFilterModelLoader {
    source_dir: PathBuf,
    scratch_dir: PathBuf,
}

impl DeepFilterModelLoader {
    pub fn new(source_dir: PathBuf, scratch_dir: PathBuf) -> Self {
        Self {
            source_dir,
            scratch_dir,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.model_source_dir.clone(), config.model_scratch_dir())
    }
}

#[async_trait]
impl ModelLoader for DeepFilterModelLoader {
    async fn load(&self) -> ProcessingResult<LoadedModel> {
        copy_model_assets(&self.source_dir, &self.scratch_dir).await?;

        let dir = self.scratch_dir.clone();
        let (mut state, archive) = tokio::task::spawn_blocking(move || {
            log_model_files(&dir);
            let state = ModelState::from_model_dir(&dir)?;
            let archive = find_model_archive(&dir).ok_or_else(|| {
                ProcessingError::ModelLoad(format!(
                    "No DeepFilterNet ONNX archive (.tar.gz) in {}",
                    dir.display()
                ))
            })?;
            Ok::<_, ProcessingError>((state, archive))
        })
        .await
        .map_err(|e| ProcessingError::ModelLoad(format!("Model init task failed: {}", e)))??;

        let enhancer = DfTractEnhancer::spawn(archive.clone()).await?;
        if enhancer.sample_rate() != state.sample_rate {
            tracing::warn!(
                config_sample_rate = state.sample_rate,
                model_sample_rate = enhancer.sample_rate(),
                "config.ini sample rate differs from the model archive, using the archive's"
            );
        }
        state.sample_rate = enhancer.sample_rate();
        state.hop_size = u32::try_from(enhancer.hop_size()).ok();

        tracing::info!(
            archive = %archive.display(),
            sample_rate = state.sample_rate,
            hop_size = ?state.hop_size,
            model_name = ?state.model_name,
            "DeepFilterNet model initialized"
        );

        Ok(LoadedModel {
            state,
            enhancer: Arc::new(enhancer),
        })
    }
}

/// Once-initialized model handle shared by every invocation of the process.
///
/// A failed load leaves the cache empty so a later call retries.
pub struct ModelCache {
    cell: OnceCell<Arc<LoadedModel>>,
    loader: Arc<dyn ModelLoader>,
}

impl ModelCache {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            cell: OnceCell::new(),
            loader,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    pub async fn get_or_load(&self) -> ProcessingResult<Arc<LoadedModel>> {
        if let Some(model) = self.cell.get() {
            tracing::info!(sample_rate = model.state.sample_rate, "Model already loaded");
            return Ok(Arc::clone(model));
        }

        let model = self
            .cell
            .get_or_try_init(|| async {
                tracing::info!("Loading enhancement model");
                let start = std::time::Instant::now();
                let model = self.loader.load().await.map_err(|e| {
                    tracing::error!(error = %e, "Failed to load enhancement model");
                    e
                })?;
                tracing::info!(
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Enhancement model loaded"
                );
                Ok::<_, ProcessingError>(Arc::new(model))
            })
            .await?;

        Ok(Arc::clone(model))
    }
}

/// Copy the model assets from `source` to `dest` unless `dest` exists.
///
/// Returns whether a copy happened. The copy goes to a staging directory
/// first and is renamed into place, so `dest` never holds a partial copy.
pub async fn copy_model_assets(source: &Path, dest: &Path) -> ProcessingResult<bool> {
    if tokio::fs::try_exists(dest).await.unwrap_or(false) {
        tracing::info!(dest = %dest.display(), "Model assets already in scratch, skipping copy");
        return Ok(false);
    }

    if !tokio::fs::try_exists(source).await.unwrap_or(false) {
        return Err(ProcessingError::ModelAssetsMissing(
            source.display().to_string(),
        ));
    }

    let (src, dst) = (source.to_path_buf(), dest.to_path_buf());
    let copied = tokio::task::spawn_blocking(move || copy_tree(&src, &dst))
        .await
        .map_err(|e| ProcessingError::ModelLoad(format!("Model copy task failed: {}", e)))??;

    tracing::info!(
        source = %source.display(),
        dest = %dest.display(),
        files = copied,
        "Copied model assets to scratch"
    );
    Ok(true)
}

fn copy_tree(source: &Path, dest: &Path) -> ProcessingResult<usize> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    let dest_name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "models".to_string());
    let staging = dest.with_file_name(format!("{}.partial-{}", dest_name, std::process::id()));
    if staging.exists() {
        fs::remove_dir_all(&staging)?;
    }

    let mut copied = 0;
    for entry in WalkDir::new(source).follow_links(true) {
        let entry = entry.map_err(|e| ProcessingError::ModelLoad(format!("Failed to read model assets: {}", e)))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|e| ProcessingError::ModelLoad(e.to_string()))?;
        let target = staging.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            copied += 1;
        }
    }

    fs::rename(&staging, dest)?;
    Ok(copied)
}

fn log_model_files(dir: &Path) {
    for entry in WalkDir::new(dir).into_iter().filter_map(Result::ok) {
        if entry.file_type().is_file() {
            let size_bytes = entry.metadata().map(|m| m.len()).unwrap_or(0);
            tracing::info!(path = %entry.path().display(), size_bytes = size_bytes, "Model asset");
        }
    }
}

fn find_model_archive(dir: &Path) -> Option<PathBuf> {
    let mut archives: Vec<PathBuf> = WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            let name = entry.file_name().to_string_lossy();
            MODEL_ARCHIVE_SUFFIXES.iter().any(|suffix| name.ends_with(suffix))
        })
        .map(|entry| entry.into_path())
        .collect();
    archives.sort();
    archives.into_iter().next()
}
