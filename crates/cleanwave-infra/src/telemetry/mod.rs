//! Tracing subscriber initialization
//!
//! JSON lines for Lambda (CloudWatch), a compact human format for local runs.

mod init;

pub use init::{default_filter, init_telemetry};
