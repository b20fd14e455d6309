//! Logging via the tracing crate.
//!
//! Log output goes to stderr; stdout is reserved for the deploy report.

use std::io;

use serde::{Deserialize, Serialize};
use tracing::{debug, Level};
use tracing_subscriber::EnvFilter;

/// Logging configuration.
#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Maximum level logged, unless overridden by `RUST_LOG`.
    #[serde(with = "log_level")]
    pub level: Level,
    /// Output format for log.
    pub format: LoggingFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: Level::WARN,
            format: LoggingFormat::default(),
        }
    }
}

/// Logging output format.
///
/// Defaults to "text".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoggingFormat {
    /// Text format.
    #[default]
    Text,
    /// JSON format.
    Json,
}

impl LoggingConfig {
    fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.to_string().to_lowercase()))
    }
}

/// Initializes the logging system.
///
/// This function should only be called once during the lifetime of the application. Do not call
/// this outside of the application or testing code, the installed logger is global.
pub fn init_with_config(config: &LoggingConfig) -> anyhow::Result<()> {
    match config.format {
        LoggingFormat::Text => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_env_filter(config.env_filter())
                .finish(),
        )?,
        LoggingFormat::Json => tracing::subscriber::set_global_default(
            tracing_subscriber::fmt()
                .with_writer(io::stderr)
                .with_env_filter(config.env_filter())
                .json()
                .finish(),
        )?,
    }
    debug!(format = ?config.format, "logging initialized");

    Ok(())
}

/// Serialization/deserialization
mod log_level {
    use std::str::FromStr;

    use serde::{self, de::Error, Deserialize, Deserializer, Serializer};
    use tracing::Level;

    pub(super) fn serialize<S>(value: &Level, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(value.to_string().as_str())
    }

    pub(super) fn deserialize<'de, D>(deserializer: D) -> Result<Level, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;

        Level::from_str(s.as_str()).map_err(Error::custom)
    }
}
