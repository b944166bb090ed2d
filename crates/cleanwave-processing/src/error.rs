use thiserror::Error;

/// Audio processing errors
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("Model assets not found at {0}")]
    ModelAssetsMissing(String),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Enhancement failed: {0}")]
    Enhancement(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Invalid audio: {0}")]
    InvalidAudio(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProcessingResult<T> = Result<T, ProcessingError>;

impl From<ProcessingError> for cleanwave_core::AppError {
    fn from(err: ProcessingError) -> Self {
        use cleanwave_core::AppError;

        match err {
            ProcessingError::ModelAssetsMissing(_) | ProcessingError::ModelLoad(_) => {
                AppError::ModelLoad(err.to_string())
            }
            ProcessingError::Enhancement(_) => AppError::Enhancement(err.to_string()),
            ProcessingError::Conversion(_) | ProcessingError::InvalidAudio(_) => {
                AppError::MediaConversion(err.to_string())
            }
            ProcessingError::Io(_) => AppError::Internal(err.to_string()),
        }
    }
}
