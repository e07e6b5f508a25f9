//! # Registry Telemetry
//!
//! Structured-logging bootstrap for registry hosts and test harnesses.
//!
//! The registry core logs through `tracing` with a `[registry]` message
//! prefix; this crate wires those events to a formatted subscriber with an
//! env-filter. Exporters (OTLP, log shipping) are host concerns layered on
//! top of the same `tracing` events.
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `REGISTRY_LOG_LEVEL` | `info` | Log level filter (env-filter syntax) |
//! | `REGISTRY_SERVICE_NAME` | `gc-registry` | Service name in log lines |
//!
//! ## Usage
//!
//! ```rust,ignore
//! use registry_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("failed to init logging");
//!     // Registry calls now emit structured log lines
//! }
//! ```

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Telemetry initialization errors.
#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(String),

    #[error("failed to install subscriber: {0}")]
    Subscriber(String),
}

/// Logging configuration for a registry host.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to log lines.
    pub service_name: String,
    /// Env-filter directive string, e.g. `info` or `registry_core=debug`.
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "gc-registry".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl TelemetryConfig {
    /// Read configuration from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            service_name: std::env::var("REGISTRY_SERVICE_NAME")
                .unwrap_or(defaults.service_name),
            log_level: std::env::var("REGISTRY_LOG_LEVEL").unwrap_or(defaults.log_level),
        }
    }
}

/// Install the global formatted subscriber.
///
/// Call once at host startup; a second call fails with
/// [`TelemetryError::Subscriber`].
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(&config.log_level)
        .map_err(|err| TelemetryError::Filter(err.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|err| TelemetryError::Subscriber(err.to_string()))
}
