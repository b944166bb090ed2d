use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

/// Which step of the pipeline produced a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileVariant {
    #[default]
    Original,
    Enhanced,
}

impl FromStr for FileVariant {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "original" => Ok(FileVariant::Original),
            "enhanced" => Ok(FileVariant::Enhanced),
            _ => Err(anyhow::anyhow!("Invalid file variant: {}", s)),
        }
    }
}

impl Display for FileVariant {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            FileVariant::Original => write!(f, "original"),
            FileVariant::Enhanced => write!(f, "enhanced"),
        }
    }
}

/// A stored file as recorded in the metadata store.
///
/// Records are written by the upload path, outside this service. Owner and
/// storage key are optional here so that an incomplete record can be
/// reported as such instead of failing to decode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    #[serde(rename = "fileID")]
    pub file_id: String,
    #[serde(rename = "userID")]
    pub user_id: Option<String>,
    pub s3_key: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub file_size: Option<u64>,
    /// Seconds
    pub duration: Option<f64>,
    #[serde(rename = "parentFileID")]
    pub parent_file_id: Option<String>,
    #[serde(default)]
    pub variant: FileVariant,
    pub created_at: Option<DateTime<Utc>>,
}

impl FileRecord {
    /// Owner id, if present and non-empty.
    pub fn owner(&self) -> Option<&str> {
        self.user_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Storage key, if present and non-empty.
    pub fn storage_key(&self) -> Option<&str> {
        self.s3_key.as_deref().filter(|s| !s.is_empty())
    }
}

/// A file record about to be created. The repository assigns the id and
/// creation time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewFileRecord {
    pub user_id: String,
    pub s3_key: String,
    pub filename: String,
    pub content_type: String,
    pub file_size: u64,
    pub duration: Option<f64>,
    pub parent_file_id: Option<String>,
    pub variant: FileVariant,
}

impl NewFileRecord {
    pub fn into_record(self, file_id: String, created_at: DateTime<Utc>) -> FileRecord {
        FileRecord {
            file_id,
            user_id: Some(self.user_id),
            s3_key: Some(self.s3_key),
            filename: Some(self.filename),
            content_type: Some(self.content_type),
            file_size: Some(self.file_size),
            duration: self.duration,
            parent_file_id: self.parent_file_id,
            variant: self.variant,
            created_at: Some(created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(user_id: Option<&str>, s3_key: Option<&str>) -> FileRecord {
        FileRecord {
            file_id: "f-1".to_string(),
            user_id: user_id.map(String::from),
            s3_key: s3_key.map(String::from),
            filename: None,
            content_type: None,
            file_size: None,
            duration: None,
            parent_file_id: None,
            variant: FileVariant::Original,
            created_at: None,
        }
    }

    #[test]
    fn test_empty_owner_and_key_count_as_missing() {
        let rec = record(Some(""), Some(""));
        assert_eq!(rec.owner(), None);
        assert_eq!(rec.storage_key(), None);

        let rec = record(Some("u-1"), Some("u-1/raw/talk.wav"));
        assert_eq!(rec.owner(), Some("u-1"));
        assert_eq!(rec.storage_key(), Some("u-1/raw/talk.wav"));
    }

    #[test]
    fn test_record_json_uses_store_attribute_names() {
        let rec = record(Some("u-1"), Some("k"));
        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["fileID"], "f-1");
        assert_eq!(json["userID"], "u-1");
        assert_eq!(json["s3Key"], "k");
        assert_eq!(json["variant"], "original");
    }

    #[test]
    fn test_minimal_upload_record_deserializes() {
        let rec: FileRecord =
            serde_json::from_str(r#"{"fileID":"f-1","userID":"u-1","s3Key":"u-1/talk.wav"}"#)
                .unwrap();
        assert_eq!(rec.variant, FileVariant::Original);
        assert_eq!(rec.storage_key(), Some("u-1/talk.wav"));
        assert!(rec.created_at.is_none());
    }

    #[test]
    fn test_into_record() {
        let new = NewFileRecord {
            user_id: "u-1".to_string(),
            s3_key: "u-1/enhanced/enhanced_talk.mp3".to_string(),
            filename: "enhanced_talk.mp3".to_string(),
            content_type: "audio/mpeg".to_string(),
            file_size: 2048,
            duration: Some(1.5),
            parent_file_id: Some("f-1".to_string()),
            variant: FileVariant::Enhanced,
        };
        let now = Utc::now();
        let rec = new.into_record("f-2".to_string(), now);
        assert_eq!(rec.file_id, "f-2");
        assert_eq!(rec.owner(), Some("u-1"));
        assert_eq!(rec.file_size, Some(2048));
        assert_eq!(rec.variant, FileVariant::Enhanced);
        assert_eq!(rec.created_at, Some(now));
    }

    #[test]
    fn test_variant_parse() {
        assert_eq!("Enhanced".parse::<FileVariant>().unwrap(), FileVariant::Enhanced);
        assert!("remixed".parse::<FileVariant>().is_err());
    }
}
