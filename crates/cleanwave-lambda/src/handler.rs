//! The enhancement pipeline for one invocation.

use cleanwave_core::constants::{ENHANCED_CONTENT_TYPE, ENHANCED_KEY_SEGMENT};
use cleanwave_core::models::{FileVariant, NewFileRecord};
use cleanwave_core::AppError;
use cleanwave_processing::{file_size, is_mono_pcm_wav_at, wav_info, ScratchFiles};
use cleanwave_storage::keys::{enhanced_filename, enhanced_key, file_basename, file_stem};
use serde_json::Value;

use crate::payload::parse_file_id;
use crate::response::HandlerResponse;
use crate::state::AppContext;

// Scratch subdirectories, one per stage.
const INPUT_DIR: &str = "input";
const NORMALIZED_DIR: &str = "normalized";

/// Run one invocation to completion.
///
/// Always produces exactly one response. Scratch files are removed before
/// returning; cleanup problems are logged and never change the outcome.
#[tracing::instrument(skip_all, fields(invocation_id = %invocation_id))]
pub async fn handle_event(ctx: &AppContext, event: Value, invocation_id: &str) -> HandlerResponse {
    tracing::info!(event = %event, "Event received");

    let file_id = match parse_file_id(&event) {
        Ok(file_id) => file_id,
        Err(e) => return HandlerResponse::from_error(&e),
    };

    let mut scratch =
        match ScratchFiles::create(&ctx.config.invocation_scratch_root(), invocation_id).await {
            Ok(scratch) => scratch,
            Err(e) => return HandlerResponse::from_error(&AppError::from(e)),
        };

    let outcome = enhance_file(ctx, &file_id, &mut scratch).await;

    let failures = scratch.cleanup().await;
    if failures > 0 {
        tracing::warn!(failures = failures, "Some scratch files could not be removed");
    }

    match outcome {
        Ok(new_file_id) => {
            tracing::info!(file_id = %file_id, new_file_id = %new_file_id, "Audio enhanced successfully");
            HandlerResponse::success(new_file_id)
        }
        Err(e) => HandlerResponse::from_error(&e),
    }
}

/// Enhance the file `file_id` and return the id of the derived record.
async fn enhance_file(
    ctx: &AppContext,
    file_id: &str,
    scratch: &mut ScratchFiles,
) -> Result<String, AppError> {
    let record = ctx
        .files
        .lookup(file_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;

    let owner = record
        .owner()
        .ok_or_else(|| AppError::IncompleteRecord(format!("File {} has no owner", file_id)))?
        .to_string();
    let storage_key = record
        .storage_key()
        .ok_or_else(|| AppError::IncompleteRecord(format!("File {} has no storage key", file_id)))?
        .to_string();
    let basename = file_basename(&storage_key).to_string();
    if basename.is_empty() {
        return Err(AppError::IncompleteRecord(format!(
            "File {} has an invalid storage key",
            file_id
        )));
    }
    tracing::info!(file_id = %file_id, user_id = %owner, storage_key = %storage_key, "File record found");

    let object = ctx.storage.fetch(&storage_key).await?;

    let input_path = scratch.nested_path_for(INPUT_DIR, &basename).await?;
    tokio::fs::write(&input_path, &object.data).await?;

    let model = ctx.models.get_or_load().await?;
    let sample_rate = model.state.sample_rate;

    let stem = file_stem(&basename).to_string();
    let model_input = if is_mono_pcm_wav_at(&input_path, sample_rate).await {
        tracing::debug!(sample_rate = sample_rate, "Input already mono PCM WAV, skipping normalization");
        input_path.clone()
    } else {
        let normalized = scratch
            .nested_path_for(NORMALIZED_DIR, &format!("{}.wav", stem))
            .await?;
        ctx.converter
            .normalize_to_wav(&input_path, &normalized, sample_rate)
            .await?;
        normalized
    };

    let enhanced_wav = scratch
        .nested_path_for(ENHANCED_KEY_SEGMENT, &format!("{}.wav", stem))
        .await?;
    model.enhancer.enhance(&model_input, &enhanced_wav).await?;

    let output_filename = enhanced_filename(&basename);
    let mp3_path = scratch
        .nested_path_for(ENHANCED_KEY_SEGMENT, &output_filename)
        .await?;
    ctx.converter.encode_mp3(&enhanced_wav, &mp3_path).await?;

    let destination_key = enhanced_key(&owner, &basename);
    let uploaded_key = ctx.storage.upload(&mp3_path, &destination_key, None).await?;

    let size = file_size(&mp3_path).await?;
    let duration = match wav_info(&enhanced_wav).await {
        Ok(info) => Some(info.duration_secs()),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read enhanced WAV duration");
            None
        }
    };

    let new_file_id = ctx
        .files
        .create(NewFileRecord {
            user_id: owner,
            s3_key: uploaded_key,
            filename: output_filename,
            content_type: ENHANCED_CONTENT_TYPE.to_string(),
            file_size: size,
            duration,
            parent_file_id: Some(record.file_id.clone()),
            variant: FileVariant::Enhanced,
        })
        .await?;

    Ok(new_file_id)
}
