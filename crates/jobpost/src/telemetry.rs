//! Subscriber setup for hosts embedding the workflow.

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::{LogFormat, WizardConfig};
use crate::error::{JobpostError, Result};

/// Installs a global fmt subscriber and routes `log` records into it.
///
/// `RUST_LOG` takes precedence over `filter`. Returns `Ok(false)` when a global
/// subscriber was already installed.
pub fn init(filter: &str, format: LogFormat) -> Result<bool> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter))
        .map_err(|e| JobpostError::Telemetry(format!("Invalid log filter '{}': {}", filter, e)))?;

    let fmt_layer = match format {
        LogFormat::Pretty => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Json => tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(fmt_layer).with(env_filter);
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        return Ok(false);
    }

    // A logger may already exist when the host set one up itself.
    let _ = tracing_log::LogTracer::init();

    tracing::debug!(filter, "Telemetry initialized");
    Ok(true)
}

pub fn init_from_config(config: &WizardConfig) -> Result<bool> {
    init(&config.log_level, config.log_format)
}
