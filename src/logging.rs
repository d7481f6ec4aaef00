// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log level:
//! 1. an explicit [`LogLevel`] (usually `log_level` from the config file)
//! 2. `PATTERNLAB_WATCH_LOG` environment variable (e.g. "info", "debug")
//! 3. default to `info`
//!
//! Logs go to STDERR so the host's stdout stays untouched.

use anyhow::{Result, anyhow};
use serde::Deserialize;
use tracing_subscriber::fmt;

use crate::config::WatchConfig;

/// Environment variable consulted when no explicit level is given.
pub const LOG_ENV_VAR: &str = "PATTERNLAB_WATCH_LOG";

#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Initialise the global logging subscriber.
///
/// Fails if another global subscriber has already been installed.
pub fn init_logging(level: Option<LogLevel>) -> Result<()> {
    let level = effective_level(level, std::env::var(LOG_ENV_VAR).ok().as_deref());

    fmt()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}

/// Initialise logging with the config file's `log_level`, if it sets one.
pub fn init_logging_from_config(cfg: &WatchConfig) -> Result<()> {
    init_logging(cfg.log_level)
}

fn effective_level(explicit: Option<LogLevel>, env_value: Option<&str>) -> tracing::Level {
    match explicit {
        Some(lvl) => level_from_log_level(lvl),
        None => env_value
            .and_then(parse_level_str)
            .unwrap_or(tracing::Level::INFO),
    }
}

fn level_from_log_level(lvl: LogLevel) -> tracing::Level {
    match lvl {
        LogLevel::Error => tracing::Level::ERROR,
        LogLevel::Warn => tracing::Level::WARN,
        LogLevel::Info => tracing::Level::INFO,
        LogLevel::Debug => tracing::Level::DEBUG,
        LogLevel::Trace => tracing::Level::TRACE,
    }
}

fn parse_level_str(s: &str) -> Option<tracing::Level> {
    match s.trim().to_lowercase().as_str() {
        "error" => Some(tracing::Level::ERROR),
        "warn" | "warning" => Some(tracing::Level::WARN),
        "info" => Some(tracing::Level::INFO),
        "debug" => Some(tracing::Level::DEBUG),
        "trace" => Some(tracing::Level::TRACE),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_level_strings_loosely() {
        assert_eq!(parse_level_str(" Warning "), Some(tracing::Level::WARN));
        assert_eq!(parse_level_str("TRACE"), Some(tracing::Level::TRACE));
        assert_eq!(parse_level_str("loud"), None);
    }

    #[test]
    fn config_level_wins_over_environment() {
        let cfg = WatchConfig::try_from(
            crate::config::load_from_str(r#"log_level = "debug""#).unwrap(),
        )
        .unwrap();
        assert_eq!(
            effective_level(cfg.log_level, Some("error")),
            tracing::Level::DEBUG
        );
    }

    #[test]
    fn environment_then_info_when_config_is_silent() {
        assert_eq!(effective_level(None, Some("trace")), tracing::Level::TRACE);
        assert_eq!(effective_level(None, Some("nonsense")), tracing::Level::INFO);
        assert_eq!(effective_level(None, None), tracing::Level::INFO);
    }
}
