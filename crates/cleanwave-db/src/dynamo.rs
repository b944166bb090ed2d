//! DynamoDB-backed file repository.
//!
//! Table layout: partition key `fileID` (S). Other attributes: `userID`,
//! `s3Key`, `filename`, `contentType`, `variant`, `parentFileID`, `createdAt`
//! (S, RFC 3339) and `fileSize`, `duration` (N).

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client as DynamoClient;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use cleanwave_core::models::{FileRecord, FileVariant, NewFileRecord};

use crate::error::{DbError, DbResult};
use crate::repository::FileRepository;

pub const ATTR_FILE_ID: &str = "fileID";
pub const ATTR_USER_ID: &str = "userID";
pub const ATTR_S3_KEY: &str = "s3Key";
pub const ATTR_FILENAME: &str = "filename";
pub const ATTR_CONTENT_TYPE: &str = "contentType";
pub const ATTR_FILE_SIZE: &str = "fileSize";
pub const ATTR_DURATION: &str = "duration";
pub const ATTR_PARENT_FILE_ID: &str = "parentFileID";
pub const ATTR_VARIANT: &str = "variant";
pub const ATTR_CREATED_AT: &str = "createdAt";

type Item = HashMap<String, AttributeValue>;

/// File repository over a single DynamoDB table
#[derive(Clone)]
pub struct DynamoFileRepository {
    client: DynamoClient,
    table: String,
}

impl DynamoFileRepository {
    pub fn new(client: DynamoClient, table: String) -> Self {
        Self { client, table }
    }

    /// Create a repository with a client for the given region
    ///
    /// `endpoint_url` points the client at DynamoDB Local or LocalStack.
    pub async fn connect(region: &str, table: String, endpoint_url: Option<String>) -> Self {
        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);
        if let Some(endpoint) = endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self::new(DynamoClient::from_conf(builder.build()), table)
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

#[async_trait]
impl FileRepository for DynamoFileRepository {
    #[tracing::instrument(skip(self), fields(db.table = %self.table))]
    async fn lookup(&self, file_id: &str) -> DbResult<Option<FileRecord>> {
        tracing::info!(file_id = %file_id, "Fetching file metadata");

        let output = self
            .client
            .get_item()
            .table_name(&self.table)
            .key(ATTR_FILE_ID, AttributeValue::S(file_id.to_string()))
            .send()
            .await
            .map_err(|e| {
                let message = DisplayErrorContext(&e).to_string();
                tracing::error!(error = %message, file_id = %file_id, "Failed to fetch file from DynamoDB");
                DbError::LookupFailed(message)
            })?;

        output.item().map(item_to_record).transpose()
    }

    #[tracing::instrument(skip(self, record), fields(db.table = %self.table))]
    async fn create(&self, record: NewFileRecord) -> DbResult<String> {
        let file_id = Uuid::new_v4().to_string();
        let filename = record.filename.clone();
        let record = record.into_record(file_id.clone(), Utc::now());

        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(record_to_item(&record)))
            .condition_expression("attribute_not_exists(#id)")
            .expression_attribute_names("#id", ATTR_FILE_ID)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .map(|se| se.is_conditional_check_failed_exception())
                    .unwrap_or(false)
                {
                    return DbError::AlreadyExists(file_id.clone());
                }
                let message = DisplayErrorContext(&e).to_string();
                tracing::error!(error = %message, "Error creating file entry");
                DbError::CreateFailed(message)
            })?;

        tracing::info!(file_id = %file_id, filename = %filename, "Created file entry");
        Ok(file_id)
    }
}

/// Encode a record as a DynamoDB item. Absent optional fields are omitted.
pub fn record_to_item(record: &FileRecord) -> Item {
    let mut item = Item::new();
    item.insert(
        ATTR_FILE_ID.to_string(),
        AttributeValue::S(record.file_id.clone()),
    );

    let strings = [
        (ATTR_USER_ID, &record.user_id),
        (ATTR_S3_KEY, &record.s3_key),
        (ATTR_FILENAME, &record.filename),
        (ATTR_CONTENT_TYPE, &record.content_type),
        (ATTR_PARENT_FILE_ID, &record.parent_file_id),
    ];
    for (name, value) in strings {
        if let Some(value) = value {
            item.insert(name.to_string(), AttributeValue::S(value.clone()));
        }
    }

    if let Some(size) = record.file_size {
        item.insert(ATTR_FILE_SIZE.to_string(), AttributeValue::N(size.to_string()));
    }
    if let Some(duration) = record.duration {
        item.insert(
            ATTR_DURATION.to_string(),
            AttributeValue::N(duration.to_string()),
        );
    }
    item.insert(
        ATTR_VARIANT.to_string(),
        AttributeValue::S(record.variant.to_string()),
    );
    if let Some(created_at) = record.created_at {
        item.insert(
            ATTR_CREATED_AT.to_string(),
            AttributeValue::S(created_at.to_rfc3339()),
        );
    }

    item
}

/// Decode a DynamoDB item.
///
/// Only `fileID` is required. Optional attributes of the wrong type are
/// logged and treated as absent so the handler can decide whether the record
/// is usable.
pub fn item_to_record(item: &Item) -> DbResult<FileRecord> {
    let file_id = item
        .get(ATTR_FILE_ID)
        .and_then(|v| v.as_s().ok())
        .cloned()
        .ok_or_else(|| DbError::MalformedItem(format!("missing string attribute {}", ATTR_FILE_ID)))?;

    let string_attr = |name: &str| -> Option<String> {
        match item.get(name) {
            None => None,
            Some(AttributeValue::S(value)) => Some(value.clone()),
            Some(other) => {
                tracing::warn!(file_id = %file_id, attribute = name, value = ?other, "Ignoring non-string attribute");
                None
            }
        }
    };

    let number_attr = |name: &str| -> Option<&str> {
        match item.get(name) {
            None => None,
            Some(AttributeValue::N(value)) => Some(value.as_str()),
            Some(other) => {
                tracing::warn!(file_id = %file_id, attribute = name, value = ?other, "Ignoring non-number attribute");
                None
            }
        }
    };

    let variant = string_attr(ATTR_VARIANT)
        .and_then(|v| v.parse::<FileVariant>().ok())
        .unwrap_or(FileVariant::Original);

    let created_at = string_attr(ATTR_CREATED_AT).and_then(|v| {
        DateTime::parse_from_rfc3339(&v)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    });

    Ok(FileRecord {
        user_id: string_attr(ATTR_USER_ID),
        s3_key: string_attr(ATTR_S3_KEY),
        filename: string_attr(ATTR_FILENAME),
        content_type: string_attr(ATTR_CONTENT_TYPE),
        file_size: number_attr(ATTR_FILE_SIZE).and_then(|v| v.parse().ok()),
        duration: number_attr(ATTR_DURATION).and_then(|v| v.parse().ok()),
        parent_file_id: string_attr(ATTR_PARENT_FILE_ID),
        variant,
        created_at,
        file_id,
    })
}
