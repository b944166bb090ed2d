//! Cleanwave metadata store
//!
//! File records live in a DynamoDB table keyed by `fileID`. The
//! `FileRepository` trait is what the handler depends on; the in-memory
//! implementation backs local runs and tests.

#[cfg(feature = "dynamodb")]
pub mod dynamo;
pub mod error;
pub mod factory;
pub mod memory;
pub mod repository;

// Re-export commonly used types
#[cfg(feature = "dynamodb")]
pub use dynamo::DynamoFileRepository;
pub use error::{DbError, DbResult};
pub use factory::create_file_repository;
pub use memory::InMemoryFileRepository;
pub use repository::FileRepository;
