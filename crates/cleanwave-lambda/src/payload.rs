//! Invocation payload parsing.
//!
//! Two shapes are accepted: the AppSync resolver shape
//! `{ "arguments": { "input": { "fileID": "..." } } }` and the direct shape
//! `{ "fileID": "..." }`. The nested shape wins when both are present.

use cleanwave_core::AppError;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Default, Deserialize)]
struct Payload {
    #[serde(default)]
    arguments: Option<Arguments>,
    #[serde(rename = "fileID", default)]
    file_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Arguments {
    #[serde(default)]
    input: Option<Input>,
}

#[derive(Debug, Default, Deserialize)]
struct Input {
    #[serde(rename = "fileID", default)]
    file_id: Option<String>,
}

/// Extract the file identifier from an invocation event.
///
/// Missing, empty or non-string identifiers are a `BadRequest`.
pub fn parse_file_id(event: &Value) -> Result<String, AppError> {
    let payload: Payload = serde_json::from_value(event.clone())
        .map_err(|e| AppError::BadRequest(format!("Invalid invocation payload: {}", e)))?;

    let nested = payload
        .arguments
        .and_then(|args| args.input)
        .and_then(|input| input.file_id);

    nested
        .into_iter()
        .chain(payload.file_id)
        .map(|id| id.trim().to_string())
        .find(|id| !id.is_empty())
        .ok_or_else(|| AppError::BadRequest("fileID is required".to_string()))
}
