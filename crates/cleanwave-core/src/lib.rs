//! Cleanwave Core Library
//!
//! Domain models, error types, configuration and naming constants shared by
//! every Cleanwave component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{Config, LogFormat, MetadataBackend, Mp3Quality};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::{BucketKind, StorageBackend};
