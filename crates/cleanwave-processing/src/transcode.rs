//! Format conversion around the enhancement step.

use async_trait::async_trait;
use cleanwave_core::Mp3Quality;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;

use crate::error::{ProcessingError, ProcessingResult};

/// Converts audio into the model's input format and encodes the result.
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Decode `input` (any container ffmpeg understands) into a mono 16-bit
    /// PCM WAV at `sample_rate`.
    async fn normalize_to_wav(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
    ) -> ProcessingResult<()>;

    /// Encode a WAV file as MP3.
    async fn encode_mp3(&self, input: &Path, output: &Path) -> ProcessingResult<()>;
}

pub struct FfmpegConverter {
    ffmpeg_path: String,
    quality: Mp3Quality,
}

impl FfmpegConverter {
    pub fn new(ffmpeg_path: String, quality: Mp3Quality) -> Self {
        Self {
            ffmpeg_path,
            quality,
        }
    }

    fn normalize_args(input: &Path, output: &Path, sample_rate: u32) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-ac".to_string(),
            "1".to_string(),
            "-ar".to_string(),
            sample_rate.to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "-f".to_string(),
            "wav".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    fn mp3_args(&self, input: &Path, output: &Path) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-i".to_string(),
            input.to_string_lossy().to_string(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-q:a".to_string(),
            self.quality.vbr_level().to_string(),
            "-f".to_string(),
            "mp3".to_string(),
            "-y".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    async fn run(&self, args: &[String], step: &str) -> ProcessingResult<()> {
        let start = std::time::Instant::now();

        let output = Command::new(&self.ffmpeg_path)
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                ProcessingError::Conversion(format!(
                    "Failed to execute {}: {}",
                    self.ffmpeg_path, e
                ))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            tracing::error!(step = step, status = %output.status, stderr = %stderr.trim(), "FFmpeg failed");
            return Err(ProcessingError::Conversion(format!(
                "FFmpeg {} failed: {}",
                step,
                stderr.trim()
            )));
        }

        tracing::debug!(
            step = step,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "FFmpeg finished"
        );
        Ok(())
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    #[tracing::instrument(skip_all, fields(input = %input.display()))]
    async fn normalize_to_wav(
        &self,
        input: &Path,
        output: &Path,
        sample_rate: u32,
    ) -> ProcessingResult<()> {
        let args = Self::normalize_args(input, output, sample_rate);
        self.run(&args, "normalize").await
    }

    #[tracing::instrument(skip_all, fields(input = %input.display()))]
    async fn encode_mp3(&self, input: &Path, output: &Path) -> ProcessingResult<()> {
        let args = self.mp3_args(input, output);
        self.run(&args, "mp3 encode").await
    }
}
