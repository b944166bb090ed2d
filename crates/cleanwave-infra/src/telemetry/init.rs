use cleanwave_core::LogFormat;
use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

const CLEANWAVE_TARGETS: [&str; 6] = [
    "cleanwave_core",
    "cleanwave_storage",
    "cleanwave_db",
    "cleanwave_processing",
    "cleanwave_lambda",
    "cleanwave_invoke",
];

/// Filter used when `RUST_LOG` is unset: `info` for our crates, `warn`
/// for everything else (AWS SDK, hyper).
pub fn default_filter() -> String {
    let mut filter = String::from("warn");
    for target in CLEANWAVE_TARGETS {
        filter.push_str(&format!(",{}=info", target));
    }
    filter
}

/// Install the global subscriber.
pub fn init_telemetry(format: LogFormat) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter().into());

    match format {
        LogFormat::Json => {
            let json_fmt = tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(false)
                .with_ansi(false);
            tracing_subscriber::registry()
                .with(filter)
                .with(json_fmt)
                .try_init()?;
        }
        LogFormat::Pretty => {
            let console_fmt = tracing_subscriber::fmt::layer()
                .event_format(Format::default().compact().with_target(false));
            tracing_subscriber::registry()
                .with(filter)
                .with(console_fmt)
                .try_init()?;
        }
    }

    tracing::debug!(format = ?format, "Tracing initialized");
    Ok(())
}
