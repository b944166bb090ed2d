//! Configuration module
//!
//! All settings come from the process environment (optionally seeded from a
//! `.env` file). Bucket names and the metadata table name are derived from the
//! bucket prefix, the deployment stage and the region.

use std::env;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::path::PathBuf;
use std::str::FromStr;

use crate::constants::{INVOCATION_SCRATCH_DIR_NAME, MODEL_SCRATCH_DIR_NAME};
use crate::storage_types::{BucketKind, StorageBackend};

const DEFAULT_STAGE: &str = "dev";
const DEFAULT_REGION: &str = "us-east-1";
const DEFAULT_BUCKET_PREFIX: &str = "bucketname";
const DEFAULT_MODEL_SOURCE_DIR: &str = "/opt/deepfilter_models";
const DEFAULT_SCRATCH_DIR: &str = "/tmp";
const DEFAULT_FFMPEG_PATH: &str = "ffmpeg";

/// Where file records are read from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataBackend {
    DynamoDb,
    Memory,
}

impl FromStr for MetadataBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dynamodb" | "dynamo" => Ok(MetadataBackend::DynamoDb),
            "memory" => Ok(MetadataBackend::Memory),
            _ => Err(anyhow::anyhow!("Invalid metadata backend: {}", s)),
        }
    }
}

impl Display for MetadataBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            MetadataBackend::DynamoDb => write!(f, "dynamodb"),
            MetadataBackend::Memory => write!(f, "memory"),
        }
    }
}

/// MP3 encoder quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mp3Quality {
    High,
    Medium,
    Low,
}

impl Mp3Quality {
    /// LAME VBR quality passed to ffmpeg as `-q:a`.
    pub fn vbr_level(&self) -> &'static str {
        match self {
            Mp3Quality::High => "0",
            Mp3Quality::Medium => "4",
            Mp3Quality::Low => "9",
        }
    }
}

impl FromStr for Mp3Quality {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "high" => Ok(Mp3Quality::High),
            "medium" => Ok(Mp3Quality::Medium),
            "low" => Ok(Mp3Quality::Low),
            _ => Err(anyhow::anyhow!("Invalid MP3 quality: {}", s)),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub environment: String,
    pub stage: String,
    pub region: String,
    pub bucket_prefix: String,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, LocalStack)
    pub local_storage_path: Option<PathBuf>,
    // Metadata configuration
    pub metadata_backend: MetadataBackend,
    pub files_table: String,
    pub dynamodb_endpoint: Option<String>,
    // Model and processing configuration
    pub model_source_dir: PathBuf,
    pub scratch_dir: PathBuf,
    pub ffmpeg_path: String,
    pub mp3_quality: Mp3Quality,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_vars<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let stage = var("STAGE").unwrap_or_else(|| DEFAULT_STAGE.to_string());
        let region = var("AWS_REGION")
            .or_else(|| var("REGION"))
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let bucket_prefix =
            var("BUCKET_PREFIX").unwrap_or_else(|| DEFAULT_BUCKET_PREFIX.to_string());

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let metadata_backend = match var("METADATA_BACKEND") {
            Some(value) => value.parse()?,
            None => MetadataBackend::DynamoDb,
        };

        let files_table = var("FILES_TABLE")
            .unwrap_or_else(|| format!("{}-files-{}", bucket_prefix, stage));

        let mp3_quality = match var("MP3_QUALITY") {
            Some(value) => value.parse()?,
            None => Mp3Quality::Medium,
        };

        let is_production = is_production_env(&environment);
        let log_format = match var("LOG_FORMAT").map(|v| v.to_lowercase()) {
            Some(v) if v == "json" => LogFormat::Json,
            Some(v) if v == "pretty" => LogFormat::Pretty,
            _ if is_production => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        let config = Config {
            environment,
            stage,
            region,
            bucket_prefix,
            storage_backend,
            s3_endpoint: var("S3_ENDPOINT"),
            local_storage_path: var("LOCAL_STORAGE_PATH").map(PathBuf::from),
            metadata_backend,
            files_table,
            dynamodb_endpoint: var("DYNAMODB_ENDPOINT"),
            model_source_dir: var("MODEL_SOURCE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_MODEL_SOURCE_DIR)),
            scratch_dir: var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SCRATCH_DIR)),
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| DEFAULT_FFMPEG_PATH.to_string()),
            mp3_quality,
            log_format,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.stage.trim().is_empty() {
            return Err(anyhow::anyhow!("STAGE must not be empty"));
        }

        if self.region.trim().is_empty() {
            return Err(anyhow::anyhow!("AWS_REGION or REGION must not be empty"));
        }

        // S3 bucket names are lowercase only
        if self.bucket_prefix.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(anyhow::anyhow!(
                "BUCKET_PREFIX must be lowercase, got '{}'",
                self.bucket_prefix
            ));
        }

        if self.storage_backend == StorageBackend::Local && self.local_storage_path.is_none() {
            return Err(anyhow::anyhow!(
                "LOCAL_STORAGE_PATH must be set when using local storage backend"
            ));
        }

        if self.is_production() && self.metadata_backend == MetadataBackend::Memory {
            return Err(anyhow::anyhow!(
                "METADATA_BACKEND=memory is not allowed in production"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_env(&self.environment)
    }

    /// `{prefix}-{raw|content}-{stage}-{region}`
    pub fn bucket_name(&self, kind: BucketKind) -> String {
        format!(
            "{}-{}-{}-{}",
            self.bucket_prefix, kind, self.stage, self.region
        )
    }

    /// Writable copy of the model assets.
    pub fn model_scratch_dir(&self) -> PathBuf {
        self.scratch_dir.join(MODEL_SCRATCH_DIR_NAME)
    }

    /// Parent of the per-invocation scratch directories.
    pub fn invocation_scratch_root(&self) -> PathBuf {
        self.scratch_dir.join(INVOCATION_SCRATCH_DIR_NAME)
    }
}

fn is_production_env(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.stage, "dev");
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.storage_backend, StorageBackend::S3);
        assert_eq!(config.metadata_backend, MetadataBackend::DynamoDb);
        assert_eq!(config.files_table, "bucketname-files-dev");
        assert_eq!(config.model_source_dir, PathBuf::from("/opt/deepfilter_models"));
        assert_eq!(
            config.model_scratch_dir(),
            PathBuf::from("/tmp/deepfilter_models")
        );
        assert_eq!(config.mp3_quality, Mp3Quality::Medium);
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_bucket_names() {
        let config = config_from(&[
            ("STAGE", "prod"),
            ("AWS_REGION", "eu-west-1"),
            ("BUCKET_PREFIX", "acme"),
        ])
        .unwrap();
        assert_eq!(config.bucket_name(BucketKind::Raw), "acme-raw-prod-eu-west-1");
        assert_eq!(
            config.bucket_name(BucketKind::Content),
            "acme-content-prod-eu-west-1"
        );
    }

    #[test]
    fn test_region_fallback() {
        let config = config_from(&[("REGION", "ap-south-1")]).unwrap();
        assert_eq!(config.region, "ap-south-1");

        let config = config_from(&[("REGION", "ap-south-1"), ("AWS_REGION", "us-west-2")]).unwrap();
        assert_eq!(config.region, "us-west-2");
    }

    #[test]
    fn test_empty_values_are_unset() {
        let config = config_from(&[("STAGE", "  "), ("S3_ENDPOINT", "")]).unwrap();
        assert_eq!(config.stage, "dev");
        assert!(config.s3_endpoint.is_none());
    }

    #[test]
    fn test_local_backend_requires_path() {
        let err = config_from(&[("STORAGE_BACKEND", "local")]).unwrap_err();
        assert!(err.to_string().contains("LOCAL_STORAGE_PATH"));

        let config = config_from(&[
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_PATH", "/var/lib/cleanwave"),
        ])
        .unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Local);
    }

    #[test]
    fn test_memory_metadata_rejected_in_production() {
        let err = config_from(&[("ENVIRONMENT", "production"), ("METADATA_BACKEND", "memory")])
            .unwrap_err();
        assert!(err.to_string().contains("METADATA_BACKEND"));
    }

    #[test]
    fn test_production_defaults_to_json_logs() {
        let config = config_from(&[("ENVIRONMENT", "prod")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Json);

        let config = config_from(&[("ENVIRONMENT", "prod"), ("LOG_FORMAT", "pretty")]).unwrap();
        assert_eq!(config.log_format, LogFormat::Pretty);
    }

    #[test]
    fn test_uppercase_prefix_rejected() {
        assert!(config_from(&[("BUCKET_PREFIX", "Acme")]).is_err());
    }

    #[test]
    fn test_invalid_enum_values() {
        assert!(config_from(&[("MP3_QUALITY", "lossless")]).is_err());
        assert!(config_from(&[("METADATA_BACKEND", "postgres")]).is_err());
    }

    #[test]
    fn test_mp3_quality_levels() {
        assert_eq!(Mp3Quality::High.vbr_level(), "0");
        assert_eq!(Mp3Quality::Medium.vbr_level(), "4");
        assert_eq!(Mp3Quality::Low.vbr_level(), "9");
    }
}
