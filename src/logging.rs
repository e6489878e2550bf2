//! Logging setup.
//!
//! Structured logging via the `tracing` crate. The tree operations emit
//! `debug!` events on every successful mutation; embedding applications
//! call [`init_logging`] once (or install their own subscriber) to see
//! them. Configuration covers level and output format; the `ARBOR_LOG`
//! environment variable overrides the configured level with a full
//! `EnvFilter` directive string.

use crate::error::LoggingError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Whether logging is enabled (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            level: default_log_level(),
            format: default_format(),
        }
    }
}

/// Initialize the logging system.
///
/// Priority order (highest to lowest): the `ARBOR_LOG` environment
/// variable, the passed configuration, defaults. Events go to stderr.
/// Fails if a global subscriber is already installed.
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), LoggingError> {
    let enabled = config.map(|c| c.enabled).unwrap_or(true);
    if !enabled {
        return Registry::default()
            .with(EnvFilter::new("off"))
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized);
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let base_subscriber = Registry::default().with(filter);

    if format == "json" {
        base_subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized)
    } else {
        base_subscriber
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized)
    }
}

/// Build the event filter from the environment or the configuration.
fn build_env_filter(config: Option<&LoggingConfig>) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_env("ARBOR_LOG") {
        return Ok(filter);
    }

    let level = config.map(|c| c.level.as_str()).unwrap_or("info");
    EnvFilter::try_new(level)
        .map_err(|e| LoggingError::InvalidConfig(format!("invalid log level {:?}: {}", level, e)))
}

/// Determine the output format from the configuration.
fn determine_format(config: Option<&LoggingConfig>) -> Result<String, LoggingError> {
    let format = config.map(|c| c.format.as_str()).unwrap_or("text");
    if format != "json" && format != "text" {
        return Err(LoggingError::InvalidConfig(format!(
            "invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(format.to_string())
}
