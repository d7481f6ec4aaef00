// src/config/validate.rs

use crate::config::model::{RawWatchConfig, WatchConfig};
use crate::errors::{Result, WatchError};

impl TryFrom<RawWatchConfig> for WatchConfig {
    type Error = WatchError;

    fn try_from(raw: RawWatchConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(WatchConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawWatchConfig) -> Result<()> {
    validate_watch_section(cfg)?;
    validate_source_dirs(cfg)?;
    for ext in &cfg.extensions {
        validate_extension(ext)?;
    }
    Ok(())
}

fn validate_watch_section(cfg: &RawWatchConfig) -> Result<()> {
    let watch = &cfg.watch;
    if watch.poll_interval_ms == 0 {
        return Err(WatchError::ConfigError(
            "[watch].poll_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }
    if watch.stability_threshold_ms < watch.poll_interval_ms {
        return Err(WatchError::ConfigError(format!(
            "[watch].stability_threshold_ms ({}) must not be shorter than poll_interval_ms ({})",
            watch.stability_threshold_ms, watch.poll_interval_ms
        )));
    }
    Ok(())
}

fn validate_source_dirs(cfg: &RawWatchConfig) -> Result<()> {
    let source = &cfg.paths.source;
    for (key, value) in [
        ("data", &source.data),
        ("meta", &source.meta),
        ("patterns", &source.patterns),
    ] {
        if value.trim().is_empty() {
            return Err(WatchError::ConfigError(format!(
                "[paths.source].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

/// Extensions are spliced straight into `**/*<ext>` globs, so they must be a
/// plain dotted suffix.
pub fn validate_extension(ext: &str) -> Result<()> {
    if !ext.starts_with('.') || ext.len() < 2 {
        return Err(WatchError::ConfigError(format!(
            "extension '{ext}' must start with '.' followed by at least one character"
        )));
    }
    if ext.contains(['/', '\\']) {
        return Err(WatchError::ConfigError(format!(
            "extension '{ext}' must not contain a path separator"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw() -> RawWatchConfig {
        RawWatchConfig::default()
    }

    #[test]
    fn default_config_is_valid() {
        assert!(WatchConfig::try_from(raw()).is_ok());
    }

    #[test]
    fn zero_poll_interval_is_rejected() {
        let mut cfg = raw();
        cfg.watch.poll_interval_ms = 0;
        match WatchConfig::try_from(cfg) {
            Err(WatchError::ConfigError(msg)) => assert!(msg.contains("poll_interval_ms")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }

    #[test]
    fn threshold_shorter_than_poll_is_rejected() {
        let mut cfg = raw();
        cfg.watch.stability_threshold_ms = 50;
        assert!(matches!(
            WatchConfig::try_from(cfg),
            Err(WatchError::ConfigError(_))
        ));
    }

    #[test]
    fn bad_extensions_are_rejected() {
        assert!(validate_extension(".hbs").is_ok());
        assert!(validate_extension("hbs").is_err());
        assert!(validate_extension(".").is_err());
        assert!(validate_extension("./x").is_err());
    }

    #[test]
    fn empty_source_dir_is_rejected() {
        let mut cfg = raw();
        cfg.paths.source.patterns = "  ".to_string();
        match WatchConfig::try_from(cfg) {
            Err(WatchError::ConfigError(msg)) => assert!(msg.contains("patterns")),
            other => panic!("expected ConfigError, got {other:?}"),
        }
    }
}
