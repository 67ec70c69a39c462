//! Explicit logging initialization.
//!
//! Installed once at process start; everything else in the crate logs
//! through `tracing` macros against the process-wide dispatcher. A second
//! initialization is reported as an error instead of silently replacing the
//! subscriber.

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

use crate::result::{PilotarError, PilotarResult};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive when `RUST_LOG` is unset (e.g. `info`, `pilotar=debug`)
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

fn build_filter(directive: &str) -> PilotarResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| PilotarError::Config {
        message: format!("invalid log filter '{directive}': {e}"),
    })
}

/// Install the process-wide tracing subscriber.
///
/// `RUST_LOG` takes precedence over the configured filter.
///
/// # Errors
///
/// Returns [`PilotarError::Config`] if the filter directive is invalid or a
/// subscriber is already installed.
pub fn init(config: &LogConfig) -> PilotarResult<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => build_filter(&config.filter)?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| PilotarError::Config {
        message: format!("failed to install tracing subscriber: {e}"),
    })
}
