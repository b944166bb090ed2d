use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use cleanwave_core::models::{FileRecord, NewFileRecord};

use crate::error::{DbError, DbResult};
use crate::repository::FileRepository;

/// In-process file repository for local runs and tests
#[derive(Clone, Default)]
pub struct InMemoryFileRepository {
    records: Arc<RwLock<HashMap<String, FileRecord>>>,
}

impl InMemoryFileRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record as if written by the upload path.
    pub async fn insert(&self, record: FileRecord) {
        self.records
            .write()
            .await
            .insert(record.file_id.clone(), record);
    }

    pub async fn get(&self, file_id: &str) -> Option<FileRecord> {
        self.records.read().await.get(file_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl FileRepository for InMemoryFileRepository {
    async fn lookup(&self, file_id: &str) -> DbResult<Option<FileRecord>> {
        Ok(self.get(file_id).await)
    }

    async fn create(&self, record: NewFileRecord) -> DbResult<String> {
        let file_id = Uuid::new_v4().to_string();
        let mut records = self.records.write().await;

        if records.contains_key(&file_id) {
            return Err(DbError::AlreadyExists(file_id));
        }

        records.insert(
            file_id.clone(),
            record.into_record(file_id.clone(), Utc::now()),
        );
        tracing::debug!(file_id = %file_id, "Created in-memory file entry");

        Ok(file_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cleanwave_core::models::FileVariant;

    fn new_record() -> NewFileRecord {
        NewFileRecord {
            user_id: "u-1".to_string(),
            s3_key: "u-1/enhanced/enhanced_talk.mp3".to_string(),
            filename: "enhanced_talk.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            file_size: 2048,
            duration: Some(1.5),
            parent_file_id: Some("f-1".to_string()),
            variant: FileVariant::Enhanced,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_timestamp() {
        let repo = InMemoryFileRepository::new();
        let id = repo.create(new_record()).await.unwrap();

        assert!(Uuid::parse_str(&id).is_ok());
        let stored = repo.lookup(&id).await.unwrap().unwrap();
        assert_eq!(stored.file_id, id);
        assert_eq!(stored.parent_file_id.as_deref(), Some("f-1"));
        assert_eq!(stored.variant, FileVariant::Enhanced);
        assert!(stored.created_at.is_some());
    }

    #[tokio::test]
    async fn test_lookup_unknown_is_none() {
        let repo = InMemoryFileRepository::new();
        assert!(repo.lookup("missing").await.unwrap().is_none());
        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn test_creates_get_distinct_ids() {
        let repo = InMemoryFileRepository::new();
        let a = repo.create(new_record()).await.unwrap();
        let b = repo.create(new_record()).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(repo.len().await, 2);
    }
}
