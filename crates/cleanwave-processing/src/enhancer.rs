//! Speech enhancement with DeepFilterNet.
//!
//! The network runs in-process through libDF's tract backend. One worker
//! thread owns the initialized `DfTract` for as long as the enhancer lives;
//! invocations hand it sample buffers over a channel, so the weights are read
//! from disk exactly once per process.

use async_trait::async_trait;
use deep_filter::tract::{DfParams, DfTract, RuntimeParams};
use ndarray::{Array2, ArrayView2, Axis};
use std::path::{Path, PathBuf};
use tokio::sync::{mpsc, oneshot};

use crate::error::{ProcessingError, ProcessingResult};

/// Runs a loaded enhancement model over one WAV file.
#[async_trait]
pub trait SpeechEnhancer: Send + Sync {
    /// Enhance `input` (mono PCM WAV at the model's rate) into `output`.
    async fn enhance(&self, input: &Path, output: &Path) -> ProcessingResult<()>;
}

struct DenoiseJob {
    samples: Vec<f32>,
    reply: oneshot::Sender<Result<Vec<f32>, String>>,
}

/// DeepFilterNet model held in memory by a dedicated worker thread.
///
/// Dropping the enhancer closes the job channel and the worker exits.
#[derive(Debug)]
pub struct DfTractEnhancer {
    jobs: mpsc::UnboundedSender<DenoiseJob>,
    sample_rate: u32,
    hop_size: usize,
}

impl DfTractEnhancer {
    /// Initialize the network from a DeepFilterNet ONNX archive (`.tar.gz`).
    ///
    /// Returns once the worker has finished loading, or with the load error.
    pub async fn spawn(model_archive: PathBuf) -> ProcessingResult<Self> {
        let (jobs_tx, jobs_rx) = mpsc::unbounded_channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        std::thread::Builder::new()
            .name("deepfilter".to_string())
            .spawn(move || run_worker(model_archive, jobs_rx, ready_tx))
            .map_err(|e| {
                ProcessingError::ModelLoad(format!("Failed to start model thread: {}", e))
            })?;

        let (sample_rate, hop_size) = ready_rx
            .await
            .map_err(|_| ProcessingError::ModelLoad("Model thread exited during load".to_string()))?
            .map_err(ProcessingError::ModelLoad)?;

        Ok(Self {
            jobs: jobs_tx,
            sample_rate,
            hop_size,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn hop_size(&self) -> usize {
        self.hop_size
    }

    async fn denoise(&self, samples: Vec<f32>) -> ProcessingResult<Vec<f32>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.jobs
            .send(DenoiseJob {
                samples,
                reply: reply_tx,
            })
            .map_err(|_| ProcessingError::Enhancement("Model thread is gone".to_string()))?;

        reply_rx
            .await
            .map_err(|_| ProcessingError::Enhancement("Model thread dropped the job".to_string()))?
            .map_err(ProcessingError::Enhancement)
    }
}

fn run_worker(
    model_archive: PathBuf,
    mut jobs: mpsc::UnboundedReceiver<DenoiseJob>,
    ready: oneshot::Sender<Result<(u32, usize), String>>,
) {
    let mut model = match init_model(model_archive) {
        Ok(model) => model,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    if ready.send(Ok((model.sr as u32, model.hop_size))).is_err() {
        return;
    }

    while let Some(job) = jobs.blocking_recv() {
        let result = denoise_frames(&mut model, &job.samples);
        let _ = job.reply.send(result);
    }
    tracing::debug!("DeepFilterNet worker stopped");
}

fn init_model(model_archive: PathBuf) -> Result<DfTract, String> {
    let params = DfParams::new(model_archive.clone()).map_err(|e| {
        format!(
            "Failed to read model archive {}: {}",
            model_archive.display(),
            e
        )
    })?;
    DfTract::new(params, &RuntimeParams::default_with_ch(1))
        .map_err(|e| format!("Failed to initialize DeepFilterNet: {}", e))
}

/// Run the network hop by hop. A trailing partial hop stays silent.
fn denoise_frames(model: &mut DfTract, samples: &[f32]) -> Result<Vec<f32>, String> {
    let hop = model.hop_size;
    let noisy = ArrayView2::from_shape((1, samples.len()), samples).map_err(|e| e.to_string())?;
    let mut enhanced = Array2::<f32>::zeros((1, samples.len()));

    for (noisy_hop, enhanced_hop) in noisy
        .axis_chunks_iter(Axis(1), hop)
        .zip(enhanced.axis_chunks_iter_mut(Axis(1), hop))
    {
        if noisy_hop.len_of(Axis(1)) < hop {
            break;
        }
        model
            .process(noisy_hop, enhanced_hop)
            .map_err(|e| format!("DeepFilterNet frame failed: {}", e))?;
    }

    Ok(enhanced.into_raw_vec())
}

#[async_trait]
impl SpeechEnhancer for DfTractEnhancer {
    #[tracing::instrument(skip_all, fields(input = %input.display()))]
    async fn enhance(&self, input: &Path, output: &Path) -> ProcessingResult<()> {
        let start = std::time::Instant::now();

        let path = input.to_path_buf();
        let sample_rate = self.sample_rate;
        let samples = tokio::task::spawn_blocking(move || read_mono_samples(&path, sample_rate))
            .await
            .map_err(|e| ProcessingError::Enhancement(format!("WAV read task failed: {}", e)))??;
        let frames = samples.len();

        let enhanced = self.denoise(samples).await?;

        let path = output.to_path_buf();
        tokio::task::spawn_blocking(move || write_pcm16(&path, &enhanced, sample_rate))
            .await
            .map_err(|e| ProcessingError::Enhancement(format!("WAV write task failed: {}", e)))??;

        tracing::info!(
            output = %output.display(),
            frames = frames,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Speech enhancement finished"
        );
        Ok(())
    }
}

/// Read a mono WAV at `sample_rate` as samples in `[-1.0, 1.0]`.
pub fn read_mono_samples(path: &Path, sample_rate: u32) -> ProcessingResult<Vec<f32>> {
    let mut reader = hound::WavReader::open(path)
        .map_err(|e| ProcessingError::InvalidAudio(format!("{}: {}", path.display(), e)))?;
    let spec = reader.spec();

    if spec.channels != 1 || spec.sample_rate != sample_rate {
        return Err(ProcessingError::InvalidAudio(format!(
            "{}: expected mono at {} Hz, got {} channel(s) at {} Hz",
            path.display(),
            sample_rate,
            spec.channels,
            spec.sample_rate
        )));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample.saturating_sub(1))) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<Vec<_>, _>>()
        }
        hound::SampleFormat::Float => reader.samples::<f32>().collect::<Result<Vec<_>, _>>(),
    };

    samples.map_err(|e| ProcessingError::InvalidAudio(format!("{}: {}", path.display(), e)))
}

/// Write samples as a mono 16-bit PCM WAV, clipping to full scale.
pub fn write_pcm16(path: &Path, samples: &[f32], sample_rate: u32) -> ProcessingResult<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let to_err = |e: hound::Error| ProcessingError::Enhancement(format!("{}: {}", path.display(), e));

    let mut writer = hound::WavWriter::create(path, spec).map_err(to_err)?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16;
        writer.write_sample(value).map_err(to_err)?;
    }
    writer.finalize().map_err(to_err)
}
