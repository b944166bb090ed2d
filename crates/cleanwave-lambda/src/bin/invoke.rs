//! Run one invocation locally and print the response.
//!
//! Uses the same environment configuration as the Lambda binary. Combine
//! with `STORAGE_BACKEND=local` and `METADATA_BACKEND=memory` plus
//! `--seed-record` to exercise the pipeline without AWS.

use anyhow::{bail, Context};
use clap::Parser;
use cleanwave_core::models::FileRecord;
use cleanwave_core::{Config, MetadataBackend};
use cleanwave_db::InMemoryFileRepository;
use cleanwave_infra::init_telemetry;
use cleanwave_lambda::{handle_event, AppContext};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "cleanwave-invoke", about = "Invoke the Cleanwave handler locally")]
struct Cli {
    /// File identifier, sent as `{ "fileID": ... }`
    #[arg(long, conflicts_with = "payload")]
    file_id: Option<String>,

    /// Path to a JSON invocation payload
    #[arg(long)]
    payload: Option<PathBuf>,

    /// JSON file record to seed into the in-memory repository
    #[arg(long)]
    seed_record: Option<PathBuf>,

    /// Number of times to invoke (exercises the warm model cache)
    #[arg(long, default_value = "1")]
    repeat: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_telemetry(config.log_format).map_err(|e| anyhow::anyhow!(e))?;

    let event = match (&cli.file_id, &cli.payload) {
        (Some(file_id), _) => json!({ "fileID": file_id }),
        (None, Some(path)) => {
            let raw = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("Failed to read payload {}", path.display()))?;
            serde_json::from_str::<Value>(&raw).context("Payload is not valid JSON")?
        }
        (None, None) => bail!("Either --file-id or --payload is required"),
    };

    let mut ctx = AppContext::from_config(config).await?;

    if let Some(path) = &cli.seed_record {
        if ctx.config.metadata_backend != MetadataBackend::Memory {
            bail!("--seed-record requires METADATA_BACKEND=memory");
        }
        let raw = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read record {}", path.display()))?;
        let record: FileRecord = serde_json::from_str(&raw).context("Invalid file record JSON")?;

        let repo = InMemoryFileRepository::new();
        repo.insert(record).await;
        ctx.files = Arc::new(repo);
    }

    for attempt in 1..=cli.repeat.max(1) {
        let invocation_id = uuid::Uuid::new_v4().to_string();
        let response = handle_event(&ctx, event.clone(), &invocation_id).await;
        tracing::debug!(attempt = attempt, status = response.status_code, "Invocation finished");
        println!("{}", serde_json::to_string_pretty(&response)?);
    }

    Ok(())
}
