//! Structured invocation response.

use cleanwave_core::{AppError, ErrorMetadata, LogLevel};
use serde::{Deserialize, Serialize};

/// Lambda proxy style result: a status code and a JSON-encoded body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBody {
    pub success: bool,
    pub message: String,
    #[serde(rename = "newFileID", default, skip_serializing_if = "Option::is_none")]
    pub new_file_id: Option<String>,
    /// Machine-readable error code
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl HandlerResponse {
    pub fn success(new_file_id: String) -> Self {
        Self::with_body(
            200,
            &ResponseBody {
                success: true,
                message: "Audio enhanced successfully".to_string(),
                new_file_id: Some(new_file_id),
                code: None,
            },
        )
    }

    /// Log `error` at its level and render the caller-facing response.
    pub fn from_error(error: &AppError) -> Self {
        log_error(error);

        Self::with_body(
            error.status_code(),
            &ResponseBody {
                success: false,
                message: error.client_message(),
                new_file_id: None,
                code: Some(error.error_code().to_string()),
            },
        )
    }

    fn with_body(status_code: u16, body: &ResponseBody) -> Self {
        let body = serde_json::to_string(body).unwrap_or_else(|e| {
            tracing::error!(error = %e, "Failed to encode response body");
            r#"{"success":false,"message":"Internal server error"}"#.to_string()
        });
        Self { status_code, body }
    }

    pub fn parsed_body(&self) -> serde_json::Result<ResponseBody> {
        serde_json::from_str(&self.body)
    }

    pub fn is_success(&self) -> bool {
        self.status_code == 200
    }
}

fn log_error(error: &AppError) {
    let details = error.detailed_message();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %details, code = error.error_code(), "Invocation rejected");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %details, code = error.error_code(), "Invocation failed");
        }
        LogLevel::Error => {
            tracing::error!(error = %details, code = error.error_code(), "Invocation failed");
        }
    }
}
