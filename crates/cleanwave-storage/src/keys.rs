//! Storage key helpers shared by the backends and the handler.
//!
//! Enhanced key format: `{userID}/enhanced/enhanced_{stem}.mp3`.

use cleanwave_core::constants::{ENHANCED_FILENAME_PREFIX, ENHANCED_KEY_SEGMENT};

use crate::traits::{StorageError, StorageResult};

/// Reject keys that are empty, absolute or contain traversal segments.
pub fn validate_key(storage_key: &str) -> StorageResult<()> {
    if storage_key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if storage_key.starts_with('/') || storage_key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(format!(
            "Storage key contains invalid characters: {}",
            storage_key
        )));
    }
    Ok(())
}

/// Final path segment of a key.
pub fn file_basename(storage_key: &str) -> &str {
    storage_key.rsplit('/').next().unwrap_or(storage_key)
}

/// Filename without its last extension. Dotfiles keep their name.
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(0) | None => filename,
        Some(idx) => &filename[..idx],
    }
}

/// Replace the last path segment of `storage_key` with `filename`.
pub fn replace_basename(storage_key: &str, filename: &str) -> String {
    match storage_key.rfind('/') {
        Some(idx) => format!("{}/{}", &storage_key[..idx], filename),
        None => filename.to_string(),
    }
}

/// `enhanced_{stem}.mp3`
pub fn enhanced_filename(source_basename: &str) -> String {
    format!(
        "{}{}.mp3",
        ENHANCED_FILENAME_PREFIX,
        file_stem(source_basename)
    )
}

/// `{userID}/enhanced/enhanced_{stem}.mp3`
pub fn enhanced_key(user_id: &str, source_basename: &str) -> String {
    format!(
        "{}/{}/{}",
        user_id,
        ENHANCED_KEY_SEGMENT,
        enhanced_filename(source_basename)
    )
}

/// Content type guessed from the key's extension.
pub fn content_type_for_key(storage_key: &str) -> &'static str {
    let basename = file_basename(storage_key);
    let extension = match basename.rfind('.') {
        Some(idx) if idx > 0 => basename[idx + 1..].to_lowercase(),
        _ => String::new(),
    };

    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "ogg" | "oga" => "audio/ogg",
        "m4a" => "audio/mp4",
        "aac" => "audio/aac",
        "webm" => "audio/webm",
        _ => "application/octet-stream",
    }
}
