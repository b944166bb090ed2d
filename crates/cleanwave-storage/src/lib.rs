//! Cleanwave Storage Library
//!
//! Object storage for the enhancement pipeline: a bucket-scoped `Storage`
//! trait with S3 and local filesystem backends, and the `StorageClient` that
//! reads uploads from the raw bucket and writes enhanced files to the content
//! bucket.
//!
//! # Naming
//!
//! Buckets are named `{prefix}-{raw|content}-{stage}-{region}`. Enhanced files
//! are stored at `{userID}/enhanced/enhanced_{stem}.mp3`. Key helpers live in
//! the `keys` module so every backend and the handler agree on the layout.

pub mod client;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use cleanwave_core::StorageBackend;
pub use client::StorageClient;
pub use factory::create_storage_client;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
