// src/lib.rs

pub mod bus;
pub mod config;
pub mod errors;
pub mod extensions;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::anyhow;
use tracing::{debug, info};

use crate::bus::EventBus;
use crate::config::{AssetDirectories, WatchConfig};
use crate::errors::{Result, WatchError};
use crate::extensions::{ExtensionResolver, StaticExtensions};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::WatchOnceScope;
use crate::watch::path_utils::absolutize;
use crate::watch::{WatchOptions, WatchRegistry, WatchSource, plan_watch_targets, spawn_emitter};

/// The pieces of Pattern Lab state the watcher works with.
///
/// - `events`: the shared bus change events are published on
/// - `engines`: where the template-engine extensions come from
/// - `watchers`: every live watch, keyed by its literal pattern
pub struct PatternLab {
    pub events: EventBus,
    pub engines: Arc<dyn ExtensionResolver>,
    pub watchers: WatchRegistry,
    /// Debounce/ignore policy applied to every target.
    pub options: WatchOptions,
    pub watch_once_scope: WatchOnceScope,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for PatternLab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternLab")
            .field("events", &self.events)
            .field("engines", &self.engines)
            .field("watchers", &self.watchers.paths())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl PatternLab {
    pub fn new(events: EventBus, engines: Arc<dyn ExtensionResolver>) -> Self {
        Self {
            events,
            engines,
            watchers: WatchRegistry::new(),
            options: WatchOptions::default(),
            watch_once_scope: WatchOnceScope::default(),
            fs: Arc::new(RealFileSystem),
        }
    }

    /// State for hosts that take their extension list and debounce timings
    /// from a config file instead of a live engine registry.
    pub fn from_config(cfg: &WatchConfig, events: EventBus) -> Self {
        let mut lab = Self::new(events, Arc::new(StaticExtensions::new(cfg.extensions.clone())));
        lab.options = cfg.watch_options();
        lab.watch_once_scope = cfg.watch_once_scope;
        lab
    }

    pub fn with_options(mut self, options: WatchOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_watch_once_scope(mut self, scope: WatchOnceScope) -> Self {
        self.watch_once_scope = scope;
        self
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Close every watch.
    pub fn shutdown(&mut self) {
        self.watchers.close_all();
    }
}

/// What a call to [`watch_pattern_lab_files`] ended up watching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchSummary {
    /// The `paths.source.root` label.
    pub root: String,
    pub global: Vec<String>,
    pub pattern: Vec<String>,
}

/// Watch the global sources (data, meta) and the pattern tree, publishing
/// `GLOBAL_CHANGE` / `PATTERN_CHANGE` events on `lab.events`.
///
/// Calling this again (e.g. after a config reload) replaces every existing
/// watch for the same paths instead of stacking a second one.
///
/// - `watch_once` makes global targets (and pattern targets too, with
///   [`WatchOnceScope::All`]) stop after their first settled batch.
/// - A missing `base_path` is fatal; missing source directories are not.
/// - Resource exhaustion while attaching any target aborts with an error;
///   targets attached before the failure stay registered until the caller
///   shuts them down.
///
/// Must be called from inside a Tokio runtime.
pub fn watch_pattern_lab_files(
    lab: &mut PatternLab,
    source: &dyn WatchSource,
    assets: &AssetDirectories,
    base_path: &Path,
    watch_once: bool,
) -> Result<WatchSummary> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|e| WatchError::Other(anyhow!("watching needs a Tokio runtime: {e}")))?;

    let base = absolutize(base_path);
    if !lab.fs.is_dir(&base) {
        return Err(WatchError::RootNotFound(base));
    }

    let extensions = lab.engines.supported_file_extensions();
    let plan = plan_watch_targets(&base, assets, &extensions);

    let mut summary = WatchSummary {
        root: assets.source.root.clone(),
        ..WatchSummary::default()
    };

    for target in plan.iter() {
        debug!("Pattern Lab is watching {} for changes", target.pattern());

        let persistent = lab
            .watch_once_scope
            .persistent_for(target.category(), watch_once);
        let options = lab.options.with_persistent(persistent);
        let bus = lab.events.clone();

        lab.watchers.establish(target.pattern(), || {
            let active = source.watch(target, &options)?;
            spawn_emitter(&runtime, target.pattern().to_string(), active.events, bus);
            Ok(active.handle)
        })?;

        match target.category() {
            types::WatchCategory::Global => summary.global.push(target.pattern().to_string()),
            types::WatchCategory::Pattern => summary.pattern.push(target.pattern().to_string()),
        }
    }

    info!(
        "Pattern Lab is watching for changes to files under {}",
        assets.source.root
    );

    Ok(summary)
}

/// [`watch_pattern_lab_files`] driven by a loaded config.
pub fn watch_with_config(
    lab: &mut PatternLab,
    source: &dyn WatchSource,
    cfg: &WatchConfig,
) -> Result<WatchSummary> {
    watch_pattern_lab_files(lab, source, &cfg.paths, &cfg.base_path, cfg.watch_once)
}
