use async_trait::async_trait;
use cleanwave_core::models::{FileRecord, NewFileRecord};

use crate::error::DbResult;

/// File metadata repository.
#[async_trait]
pub trait FileRepository: Send + Sync {
    /// Fetch a record by its `fileID`. `Ok(None)` when no such record exists.
    async fn lookup(&self, file_id: &str) -> DbResult<Option<FileRecord>>;

    /// Persist a new record and return its assigned `fileID`.
    async fn create(&self, record: NewFileRecord) -> DbResult<String>;
}
