//! Subscriber setup for applications that do not install their own.

use std::str::FromStr;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::{Error, Result};

pub const ENV_LOG_LEVEL: &str = "BB_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "BB_LOG_FORMAT";

const DEFAULT_LEVEL: &str = "info";

/// Output format for log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable single-line output
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" | "compact" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(Error::Config(format!("unknown log format: {other}"))),
        }
    }
}

/// Filter from `RUST_LOG`, else from `level`, else `info`.
pub fn env_filter(level: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback_filter(level))
}

fn fallback_filter(level: Option<&str>) -> EnvFilter {
    let level = level
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or(DEFAULT_LEVEL);
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LEVEL))
}

/// Install a global `tracing` subscriber.
///
/// The filter comes from `RUST_LOG`, falling back to `BB_LOG_LEVEL` and then
/// `info`. `BB_LOG_FORMAT` selects `text` (default) or `json` output.
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> Result<()> {
    let level = std::env::var(ENV_LOG_LEVEL).ok();
    let format = match std::env::var(ENV_LOG_FORMAT) {
        Ok(raw) => raw.parse()?,
        Err(_) => LogFormat::default(),
    };
    init_logging_with(env_filter(level.as_deref()), format)
}

/// Install a global subscriber with an explicit filter and format.
pub fn init_logging_with(filter: EnvFilter, format: LogFormat) -> Result<()> {
    let registry = tracing_subscriber::registry().with(filter);
    let result = match format {
        LogFormat::Text => registry.with(fmt::layer().with_target(true)).try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(false))
            .try_init(),
    };
    result.map_err(|e| Error::Config(format!("failed to install log subscriber: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::filter::LevelFilter;

    #[test]
    fn test_format_parse() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("TEXT".parse::<LogFormat>().unwrap(), LogFormat::Text);
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_fallback_filter_level() {
        assert_eq!(
            fallback_filter(Some("warn")).max_level_hint(),
            Some(LevelFilter::WARN)
        );
        assert_eq!(fallback_filter(None).max_level_hint(), Some(LevelFilter::INFO));
        assert_eq!(fallback_filter(Some(" ")).max_level_hint(), Some(LevelFilter::INFO));
    }
}
