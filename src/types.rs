// src/types.rs

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Deserialize;

/// Which group a watch target belongs to.
///
/// - `Global`: data/meta directories whose changes affect the whole build.
/// - `Pattern`: the pattern source tree; changes affect individual patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchCategory {
    Global,
    Pattern,
}

impl fmt::Display for WatchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchCategory::Global => f.write_str("global"),
            WatchCategory::Pattern => f.write_str("pattern"),
        }
    }
}

/// Kind of settled filesystem change surfaced by a watcher.
///
/// Removals are deliberately absent: deletions never produce a rebuild signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawEventKind {
    /// A new file appeared.
    Added,
    /// A new directory appeared.
    AddedDirectory,
    /// An existing file's content changed.
    Modified,
}

/// One detected filesystem occurrence, tagged with the category of the
/// watch target that saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFsEvent {
    pub kind: RawEventKind,
    pub path: PathBuf,
    pub category: WatchCategory,
}

impl RawFsEvent {
    pub fn new(kind: RawEventKind, path: impl Into<PathBuf>, category: WatchCategory) -> Self {
        Self {
            kind,
            path: path.into(),
            category,
        }
    }
}

/// Which watch targets honour `watch_once`.
///
/// - `GlobalOnly` (default): only data/meta watches stop after their first
///   batch; pattern watches stay persistent.
/// - `All`: pattern watches are run-once as well.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchOnceScope {
    #[default]
    GlobalOnly,
    All,
}

impl WatchOnceScope {
    /// Whether a target of `category` should be persistent given the
    /// caller's `watch_once` flag.
    pub fn persistent_for(self, category: WatchCategory, watch_once: bool) -> bool {
        match (self, category) {
            (_, WatchCategory::Global) => !watch_once,
            (WatchOnceScope::All, WatchCategory::Pattern) => !watch_once,
            (WatchOnceScope::GlobalOnly, WatchCategory::Pattern) => true,
        }
    }
}

impl FromStr for WatchOnceScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "global_only" | "global" => Ok(WatchOnceScope::GlobalOnly),
            "all" => Ok(WatchOnceScope::All),
            other => Err(format!(
                "invalid watch_once_scope: {other} (expected \"global_only\" or \"all\")"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_once_only_touches_global_targets_by_default() {
        let scope = WatchOnceScope::default();
        assert!(!scope.persistent_for(WatchCategory::Global, true));
        assert!(scope.persistent_for(WatchCategory::Pattern, true));
        assert!(scope.persistent_for(WatchCategory::Global, false));
    }

    #[test]
    fn watch_once_scope_all_applies_to_patterns() {
        assert!(!WatchOnceScope::All.persistent_for(WatchCategory::Pattern, true));
        assert!(WatchOnceScope::All.persistent_for(WatchCategory::Pattern, false));
    }

    #[test]
    fn parses_scope_strings() {
        assert_eq!("ALL".parse::<WatchOnceScope>(), Ok(WatchOnceScope::All));
        assert_eq!(
            " global_only ".parse::<WatchOnceScope>(),
            Ok(WatchOnceScope::GlobalOnly)
        );
        assert!("sometimes".parse::<WatchOnceScope>().is_err());
    }
}
