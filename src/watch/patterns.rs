// src/watch/patterns.rs

use std::fmt;
use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::config::model::AssetDirectories;
use crate::errors::{Result, WatchError};
use crate::types::WatchCategory;
use crate::watch::path_utils::{absolutize, relative_str, slash_str};

/// Extensions every pattern tree is watched for, regardless of engine.
pub const BASE_EXTENSIONS: [&str; 4] = [".json", ".yml", ".yaml", ".md"];

/// A resolved watch target: an absolute directory plus a glob evaluated
/// relative to it.
///
/// `pattern()` is the literal joined form (e.g. `/proj/_data/*`), which is
/// also the key the registry deduplicates on.
#[derive(Clone, PartialEq, Eq)]
pub struct WatchTarget {
    pattern: String,
    category: WatchCategory,
    root: PathBuf,
    glob: String,
}

impl fmt::Debug for WatchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchTarget")
            .field("pattern", &self.pattern)
            .field("category", &self.category)
            .finish_non_exhaustive()
    }
}

impl WatchTarget {
    pub fn new(root: impl Into<PathBuf>, glob: impl Into<String>, category: WatchCategory) -> Self {
        let root = root.into();
        let glob = glob.into();
        let root_str = slash_str(&root);
        let pattern = format!("{}/{}", root_str.trim_end_matches('/'), glob);
        Self {
            pattern,
            category,
            root,
            glob,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn category(&self) -> WatchCategory {
        self.category
    }

    /// Directory the OS watch is attached to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Glob relative to [`WatchTarget::root`].
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// Whether events below the immediate children of the root matter.
    pub fn recursive(&self) -> bool {
        self.glob.contains("**")
    }

    /// Compile the relative glob. `*` never crosses a `/`.
    pub fn matcher(&self) -> Result<TargetMatcher> {
        let glob = GlobBuilder::new(&self.glob)
            .literal_separator(true)
            .build()
            .map_err(|source| WatchError::InvalidPattern {
                pattern: self.pattern.clone(),
                source,
            })?;
        Ok(TargetMatcher {
            root: self.root.clone(),
            matcher: glob.compile_matcher(),
        })
    }
}

/// Compiled matcher for a single [`WatchTarget`].
#[derive(Debug, Clone)]
pub struct TargetMatcher {
    root: PathBuf,
    matcher: GlobMatcher,
}

impl TargetMatcher {
    /// Path of `path` relative to the target root, if it lies beneath it.
    pub fn relative(&self, path: &Path) -> Option<String> {
        relative_str(&self.root, path).filter(|rel| !rel.is_empty())
    }

    pub fn matches_relative(&self, rel: &str) -> bool {
        self.matcher.is_match(rel)
    }

    /// Returns true if the absolute `path` is selected by this target.
    pub fn matches(&self, path: &Path) -> bool {
        self.relative(path)
            .is_some_and(|rel| self.matches_relative(&rel))
    }
}

/// The two target groups computed from the asset-directory layout.
#[derive(Debug, Clone, Default)]
pub struct WatchPlan {
    pub global: Vec<WatchTarget>,
    pub pattern: Vec<WatchTarget>,
}

impl WatchPlan {
    /// Global targets first, then pattern targets.
    pub fn iter(&self) -> impl Iterator<Item = &WatchTarget> {
        self.global.iter().chain(self.pattern.iter())
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.pattern.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute the concrete watch targets.
///
/// - Global: one non-recursive `<dir>/*` target per data/meta directory.
/// - Pattern: one recursive `<patterns>/**/*<ext>` target per extension in
///   [`BASE_EXTENSIONS`] followed by `engine_extensions` (duplicates dropped,
///   order kept).
///
/// Directories are joined onto `base_path` like string paths (a leading `/`
/// on a source directory does not escape the base) and made absolute. Missing
/// directories are not an error here; their targets simply never fire.
pub fn plan_watch_targets(
    base_path: &Path,
    assets: &AssetDirectories,
    engine_extensions: &[String],
) -> WatchPlan {
    let source = &assets.source;
    let base = absolutize(base_path);

    let mut global: Vec<WatchTarget> = Vec::new();
    for dir in [&source.data, &source.meta] {
        let target = WatchTarget::new(join_source_dir(&base, dir), "*", WatchCategory::Global);
        if !global.iter().any(|t| t.pattern() == target.pattern()) {
            global.push(target);
        }
    }

    let patterns_root = join_source_dir(&base, &source.patterns);
    let pattern = effective_extensions(engine_extensions)
        .into_iter()
        .map(|ext| {
            WatchTarget::new(
                patterns_root.clone(),
                format!("**/*{ext}"),
                WatchCategory::Pattern,
            )
        })
        .collect();

    WatchPlan { global, pattern }
}

/// Base extensions unioned with the engine's, first occurrence wins.
pub fn effective_extensions(engine_extensions: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(BASE_EXTENSIONS.len() + engine_extensions.len());
    let all = BASE_EXTENSIONS
        .iter()
        .map(|s| s.to_string())
        .chain(engine_extensions.iter().cloned());
    for ext in all {
        if !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}

fn join_source_dir(base: &Path, dir: &str) -> PathBuf {
    absolutize(&base.join(dir.trim_start_matches(['/', '\\'])))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::model::SourceDirectories;

    fn assets() -> AssetDirectories {
        AssetDirectories {
            source: SourceDirectories::new("./source/", "_data", "_meta", "_patterns"),
        }
    }

    #[test]
    fn global_targets_are_single_level_wildcards() {
        let plan = plan_watch_targets(Path::new("/proj"), &assets(), &[]);
        let globals: Vec<&str> = plan.global.iter().map(|t| t.pattern()).collect();
        assert_eq!(globals, vec!["/proj/_data/*", "/proj/_meta/*"]);
        assert!(plan.global.iter().all(|t| !t.recursive()));
        assert!(
            plan.global
                .iter()
                .all(|t| t.category() == WatchCategory::Global)
        );
    }

    #[test]
    fn pattern_targets_cover_base_and_engine_extensions() {
        let plan = plan_watch_targets(
            Path::new("/proj"),
            &assets(),
            &[".hbs".to_string(), ".json".to_string()],
        );
        let patterns: Vec<&str> = plan.pattern.iter().map(|t| t.pattern()).collect();
        assert_eq!(
            patterns,
            vec![
                "/proj/_patterns/**/*.json",
                "/proj/_patterns/**/*.yml",
                "/proj/_patterns/**/*.yaml",
                "/proj/_patterns/**/*.md",
                "/proj/_patterns/**/*.hbs",
            ]
        );
        assert!(plan.pattern.iter().all(|t| t.recursive()));
    }

    #[test]
    fn source_dirs_are_normalized_onto_base() {
        let assets = AssetDirectories {
            source: SourceDirectories::new(
                "./source/",
                "./source/_data/",
                "/source/_meta",
                "./source/../source/_patterns/",
            ),
        };
        let plan = plan_watch_targets(Path::new("/proj/"), &assets, &[]);
        assert_eq!(plan.global[0].pattern(), "/proj/source/_data/*");
        assert_eq!(plan.global[1].pattern(), "/proj/source/_meta/*");
        assert_eq!(plan.pattern[0].root(), Path::new("/proj/source/_patterns"));
    }

    #[test]
    fn identical_global_dirs_yield_one_target() {
        let assets = AssetDirectories {
            source: SourceDirectories::new("src", "shared", "shared/", "_patterns"),
        };
        let plan = plan_watch_targets(Path::new("/proj"), &assets, &[]);
        assert_eq!(plan.global.len(), 1);
    }

    #[test]
    fn relative_base_is_made_absolute() {
        let plan = plan_watch_targets(Path::new("site"), &assets(), &[]);
        assert!(plan.iter().all(|t| t.root().is_absolute()));
    }

    #[test]
    fn global_matcher_only_sees_immediate_children() {
        let plan = plan_watch_targets(Path::new("/proj"), &assets(), &[]);
        let matcher = plan.global[0].matcher().unwrap();
        assert!(matcher.matches(Path::new("/proj/_data/foo.json")));
        assert!(matcher.matches(Path::new("/proj/_data/sub")));
        assert!(!matcher.matches(Path::new("/proj/_data/sub/foo.json")));
        assert!(!matcher.matches(Path::new("/proj/_data")));
        assert!(!matcher.matches(Path::new("/proj/_meta/foo.json")));
    }

    #[test]
    fn pattern_matcher_is_recursive_and_extension_bound() {
        let target = WatchTarget::new("/proj/_patterns", "**/*.hbs", WatchCategory::Pattern);
        let matcher = target.matcher().unwrap();
        assert!(matcher.matches(Path::new("/proj/_patterns/button.hbs")));
        assert!(matcher.matches(Path::new("/proj/_patterns/atoms/buttons/button.hbs")));
        assert!(!matcher.matches(Path::new("/proj/_patterns/atoms/button.mustache")));
        assert!(!matcher.matches(Path::new("/proj/_patterns/atoms/button.hbs.bak")));
    }

    #[test]
    fn broken_extension_surfaces_as_invalid_pattern() {
        let target = WatchTarget::new("/proj/_patterns", "**/*.[hbs", WatchCategory::Pattern);
        assert!(matches!(
            target.matcher(),
            Err(WatchError::InvalidPattern { .. })
        ));
    }
}
