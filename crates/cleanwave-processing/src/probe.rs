//! WAV inspection with `hound`.

use std::path::{Path, PathBuf};

use crate::error::{ProcessingError, ProcessingResult};

/// Header-level facts about a WAV file
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub channels: u16,
    pub sample_rate: u32,
    pub bits_per_sample: u16,
    pub is_integer_pcm: bool,
    /// Samples per channel
    pub frames: u32,
}

impl WavInfo {
    /// Duration in seconds
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }
}

/// Read the header of a WAV file.
pub async fn wav_info(path: &Path) -> ProcessingResult<WavInfo> {
    let path: PathBuf = path.to_path_buf();
    tokio::task::spawn_blocking(move || read_wav_info(&path))
        .await
        .map_err(|e| ProcessingError::InvalidAudio(format!("WAV probe task failed: {}", e)))?
}

fn read_wav_info(path: &Path) -> ProcessingResult<WavInfo> {
    let reader = hound::WavReader::open(path).map_err(|e| {
        ProcessingError::InvalidAudio(format!("{} is not a readable WAV: {}", path.display(), e))
    })?;
    let spec = reader.spec();

    Ok(WavInfo {
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        is_integer_pcm: spec.sample_format == hound::SampleFormat::Int,
        frames: reader.duration(),
    })
}

/// True when `path` already is a mono integer PCM WAV at `sample_rate`.
///
/// Anything unreadable as WAV yields `false`.
pub async fn is_mono_pcm_wav_at(path: &Path, sample_rate: u32) -> bool {
    match wav_info(path).await {
        Ok(info) => info.channels == 1 && info.is_integer_pcm && info.sample_rate == sample_rate,
        Err(_) => false,
    }
}

/// Size of a local file in bytes.
pub async fn file_size(path: &Path) -> ProcessingResult<u64> {
    Ok(tokio::fs::metadata(path).await?.len())
}
