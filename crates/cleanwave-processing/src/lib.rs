//! Audio processing for the enhancement pipeline
//!
//! - `model`: copy-once model assets and the process-wide `ModelCache`
//! - `enhancer`: in-process DeepFilterNet enhancement (libDF, tract backend)
//! - `transcode`: ffmpeg normalization to mono PCM WAV and MP3 encoding
//! - `probe`: WAV header inspection
//! - `scratch`: per-invocation temporary files

pub mod enhancer;
pub mod error;
pub mod model;
pub mod probe;
pub mod scratch;
pub mod transcode;

pub use enhancer::{DfTractEnhancer, SpeechEnhancer};
pub use error::{ProcessingError, ProcessingResult};
pub use model::{
    copy_model_assets, DeepFilterModelLoader, LoadedModel, ModelCache, ModelLoader, ModelState,
};
pub use probe::{file_size, is_mono_pcm_wav_at, wav_info, WavInfo};
pub use scratch::ScratchFiles;
pub use transcode::{AudioConverter, FfmpegConverter};
