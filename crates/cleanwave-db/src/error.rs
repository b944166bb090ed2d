use thiserror::Error;

/// Metadata store errors
#[derive(Debug, Error)]
pub enum DbError {
    #[error("Lookup failed: {0}")]
    LookupFailed(String),

    #[error("Create failed: {0}")]
    CreateFailed(String),

    #[error("File record {0} already exists")]
    AlreadyExists(String),

    #[error("Malformed item: {0}")]
    MalformedItem(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for metadata store operations
pub type DbResult<T> = Result<T, DbError>;

impl From<DbError> for cleanwave_core::AppError {
    fn from(err: DbError) -> Self {
        cleanwave_core::AppError::Database(err.to_string())
    }
}
