#![allow(dead_code)]

use std::path::PathBuf;

use patternlab_watch::config::{AssetDirectories, RawWatchConfig, SourceDirectories, WatchConfig};
use patternlab_watch::types::WatchOnceScope;

/// Builder for `WatchConfig` to simplify test setup.
pub struct WatchConfigBuilder {
    config: RawWatchConfig,
}

impl WatchConfigBuilder {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let mut config = RawWatchConfig::default();
        config.base_path = base_path.into();
        Self { config }
    }

    pub fn with_source(mut self, source: SourceDirectories) -> Self {
        self.config.paths.source = source;
        self
    }

    pub fn with_extension(mut self, ext: &str) -> Self {
        self.config.extensions.push(ext.to_string());
        self
    }

    pub fn watch_once(mut self, val: bool) -> Self {
        self.config.watch_once = val;
        self
    }

    pub fn watch_once_scope(mut self, scope: WatchOnceScope) -> Self {
        self.config.watch_once_scope = scope;
        self
    }

    pub fn timings(mut self, stability_threshold_ms: u64, poll_interval_ms: u64) -> Self {
        self.config.watch.stability_threshold_ms = stability_threshold_ms;
        self.config.watch.poll_interval_ms = poll_interval_ms;
        self
    }

    pub fn build(self) -> WatchConfig {
        WatchConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

/// The `_data` / `_meta` / `_patterns` layout used throughout the tests.
pub fn underscore_layout() -> AssetDirectories {
    AssetDirectories {
        source: SourceDirectories::new("./", "_data", "_meta", "_patterns"),
    }
}
