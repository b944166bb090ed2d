//! Process-level infrastructure shared by the Cleanwave binaries

pub mod telemetry;

pub use telemetry::init_telemetry;
