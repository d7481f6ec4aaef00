// src/watch/path_utils.rs

//! Utility functions for path handling in the watcher.

use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

/// Matches a dot at the start of the string or right after a separator.
static DOT_COMPONENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(^|[/\\])\.").expect("static regex is valid"));

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// - First we try a direct `strip_prefix(root)`.
/// - If that fails (e.g. due to symlinks or different absolute prefixes),
///   we canonicalize both paths and try again.
///
/// Returns `None` if the path cannot be reasonably related to `root`.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return Some(rel.to_string_lossy().replace('\\', "/"));
    }

    // macOS reports events under /private/var/... for watches on /var/...
    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return Some(rel.to_string_lossy().replace('\\', "/"));
        }
    }

    None
}

/// True if any component of `rel` starts with `.` (dotfiles and anything
/// inside a dot-directory).
pub fn has_dot_component(rel: &str) -> bool {
    DOT_COMPONENT.is_match(rel)
}

/// Resolve `.` and `..` components without touching the filesystem, the same
/// way a string path join would.
pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(
                    out.components().next_back(),
                    Some(Component::Normal(_))
                ) && out.pop();
                if !popped && !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` absolute against the current directory and normalize it.
pub fn absolutize(path: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    normalize_lexically(&joined)
}

/// Render a path with forward slashes, which is what the glob matchers
/// expect.
pub fn slash_str(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_components_are_detected_anywhere() {
        assert!(has_dot_component(".DS_Store"));
        assert!(has_dot_component("buttons/.cache/x.hbs"));
        assert!(has_dot_component("a\\.git\\b"));
        assert!(!has_dot_component("buttons/button.hbs"));
        assert!(!has_dot_component("foo.json"));
        assert!(!has_dot_component(""));
    }

    #[test]
    fn normalizes_like_a_path_join() {
        assert_eq!(
            normalize_lexically(Path::new("/proj/./source/_data/../_meta/")),
            PathBuf::from("/proj/source/_meta")
        );
        assert_eq!(
            normalize_lexically(Path::new("/../proj")),
            PathBuf::from("/proj")
        );
        assert_eq!(
            normalize_lexically(Path::new("../a/./b")),
            PathBuf::from("../a/b")
        );
    }

    #[test]
    fn relative_str_strips_root() {
        assert_eq!(
            relative_str(Path::new("/proj/_data"), Path::new("/proj/_data/foo.json")),
            Some("foo.json".to_string())
        );
        assert_eq!(
            relative_str(Path::new("/proj/_data"), Path::new("/elsewhere/foo.json")),
            None
        );
    }
}
