// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{RawWatchConfig, WatchConfig};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw
/// `RawWatchConfig`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawWatchConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    load_from_str(&contents)
}

/// Deserialize configuration from TOML text.
pub fn load_from_str(contents: &str) -> Result<RawWatchConfig> {
    let config: RawWatchConfig = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from path and run validation.
///
/// - Reads TOML.
/// - Applies defaults (handled by `serde` + `Default` impls).
/// - Checks debounce timings, extension syntax and directory names.
///
/// Relative `base_path` values are resolved against the directory that holds
/// the config file, so a project can be watched from anywhere.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<WatchConfig> {
    let path = path.as_ref();
    let mut raw = load_from_path(path)?;
    if raw.base_path.is_relative() {
        raw.base_path = config_root_dir(path).join(&raw.base_path);
    }
    WatchConfig::try_from(raw)
}

/// Directory a config file lives in.
///
/// - If the config path has a non-empty parent (e.g. "site/patternlab.toml"),
///   we use that directory.
/// - If it's a bare filename like "patternlab.toml" (parent = ""), we fall
///   back to the current working directory ".".
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    }
}
