//! Telemetry initialization
//!
//! Installs the global `tracing` subscriber: an `EnvFilter` driven by
//! `RUST_LOG` and either the human-readable or the JSON formatter.

use cropper_core::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "cropper=debug,tower_http=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Initialize tracing for the process.
///
/// Fails if a global subscriber is already installed.
pub fn init_telemetry(
    format: LogFormat,
    environment: &str,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let registry = tracing_subscriber::registry().with(env_filter());

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()?,
    }

    tracing::info!(
        environment = %environment,
        log_format = ?format,
        "Tracing initialized"
    );
    Ok(())
}
