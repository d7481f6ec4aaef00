// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::logging::LogLevel;
use crate::types::WatchOnceScope;
use crate::watch::source::WatchOptions;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// base_path = "."
/// watch_once = false
/// watch_once_scope = "global_only"
/// extensions = [".hbs"]
///
/// [paths.source]
/// root = "./source/"
/// data = "./source/_data/"
/// meta = "./source/_meta/"
/// patterns = "./source/_patterns/"
///
/// [watch]
/// stability_threshold_ms = 200
/// poll_interval_ms = 100
/// ```
///
/// All keys are optional and default to Pattern Lab's usual layout.
#[derive(Debug, Clone, Deserialize)]
pub struct RawWatchConfig {
    /// Directory all `paths.source.*` entries are relative to.
    #[serde(default = "default_base_path")]
    pub base_path: PathBuf,

    /// Stop watching after the first settled batch of changes.
    #[serde(default)]
    pub watch_once: bool,

    /// Which targets `watch_once` applies to.
    #[serde(default)]
    pub watch_once_scope: WatchOnceScope,

    /// Template-engine extensions for hosts without an engine registry.
    #[serde(default)]
    pub extensions: Vec<String>,

    #[serde(default)]
    pub log_level: Option<LogLevel>,

    #[serde(default)]
    pub paths: AssetDirectories,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration. Construct via `TryFrom<RawWatchConfig>` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct WatchConfig {
    pub base_path: PathBuf,
    pub watch_once: bool,
    pub watch_once_scope: WatchOnceScope,
    pub extensions: Vec<String>,
    pub log_level: Option<LogLevel>,
    pub paths: AssetDirectories,
    pub watch: WatchSection,
}

impl WatchConfig {
    pub(crate) fn new_unchecked(raw: RawWatchConfig) -> Self {
        Self {
            base_path: raw.base_path,
            watch_once: raw.watch_once,
            watch_once_scope: raw.watch_once_scope,
            extensions: raw.extensions,
            log_level: raw.log_level,
            paths: raw.paths,
            watch: raw.watch,
        }
    }

    /// Debounce/ignore options for a persistent watch.
    pub fn watch_options(&self) -> WatchOptions {
        WatchOptions::from(&self.watch)
    }
}

impl Default for RawWatchConfig {
    fn default() -> Self {
        Self {
            base_path: default_base_path(),
            watch_once: false,
            watch_once_scope: WatchOnceScope::default(),
            extensions: Vec::new(),
            log_level: None,
            paths: AssetDirectories::default(),
            watch: WatchSection::default(),
        }
    }
}

fn default_base_path() -> PathBuf {
    PathBuf::from(".")
}

/// `[paths]` section. Only the source side matters for watching.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetDirectories {
    #[serde(default)]
    pub source: SourceDirectories,
}

/// `[paths.source]`: directories relative to `base_path`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceDirectories {
    /// Label used in the "watching for changes" summary log line.
    #[serde(default = "default_root")]
    pub root: String,
    #[serde(default = "default_data")]
    pub data: String,
    #[serde(default = "default_meta")]
    pub meta: String,
    #[serde(default = "default_patterns")]
    pub patterns: String,
}

fn default_root() -> String {
    "./source/".to_string()
}

fn default_data() -> String {
    "./source/_data/".to_string()
}

fn default_meta() -> String {
    "./source/_meta/".to_string()
}

fn default_patterns() -> String {
    "./source/_patterns/".to_string()
}

impl Default for SourceDirectories {
    fn default() -> Self {
        Self {
            root: default_root(),
            data: default_data(),
            meta: default_meta(),
            patterns: default_patterns(),
        }
    }
}

impl SourceDirectories {
    pub fn new(
        root: impl Into<String>,
        data: impl Into<String>,
        meta: impl Into<String>,
        patterns: impl Into<String>,
    ) -> Self {
        Self {
            root: root.into(),
            data: data.into(),
            meta: meta.into(),
            patterns: patterns.into(),
        }
    }
}

/// `[watch]` section: write-stability debounce and ignore policy.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// How long a file must stay unchanged before its event is delivered.
    #[serde(default = "default_stability_threshold_ms")]
    pub stability_threshold_ms: u64,

    /// How often pending files are re-checked.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Skip anything with a dot-prefixed path component.
    #[serde(default = "default_true")]
    pub ignore_dotfiles: bool,
}

fn default_stability_threshold_ms() -> u64 {
    200
}

fn default_poll_interval_ms() -> u64 {
    100
}

fn default_true() -> bool {
    true
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            stability_threshold_ms: default_stability_threshold_ms(),
            poll_interval_ms: default_poll_interval_ms(),
            ignore_dotfiles: true,
        }
    }
}

impl From<&WatchSection> for WatchOptions {
    fn from(section: &WatchSection) -> Self {
        WatchOptions {
            stability_threshold: Duration::from_millis(section.stability_threshold_ms),
            poll_interval: Duration::from_millis(section.poll_interval_ms),
            ignore_dotfiles: section.ignore_dotfiles,
            persistent: true,
        }
    }
}
