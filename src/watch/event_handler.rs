// src/watch/event_handler.rs

//! Translation of raw `notify` events into candidate changes for one target.

use std::path::{Path, PathBuf};

use notify::event::{CreateKind, MetadataKind, ModifyKind, RenameMode};
use notify::{Event, EventKind};
use tracing::{debug, trace};

use crate::fs::FileSystem;
use crate::types::RawEventKind;
use crate::watch::path_utils::has_dot_component;
use crate::watch::patterns::TargetMatcher;

/// Map a notify event kind onto the change kinds we report.
///
/// Removals, renames away, access and most metadata events are not
/// interesting; deletions never trigger a rebuild.
pub fn classify_notify_kind(kind: &EventKind) -> Option<RawEventKind> {
    match kind {
        EventKind::Create(CreateKind::Folder) => Some(RawEventKind::AddedDirectory),
        EventKind::Create(_) => Some(RawEventKind::Added),
        EventKind::Modify(ModifyKind::Data(_))
        | EventKind::Modify(ModifyKind::Any)
        | EventKind::Modify(ModifyKind::Other) => Some(RawEventKind::Modified),
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime)) => {
            Some(RawEventKind::Modified)
        }
        // Something moved into place under its new name.
        EventKind::Modify(ModifyKind::Name(RenameMode::To))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Both))
        | EventKind::Modify(ModifyKind::Name(RenameMode::Any)) => Some(RawEventKind::Added),
        _ => None,
    }
}

/// Process a single notify event for a target.
///
/// This:
/// 1. Maps the event kind (dropping removals and noise)
/// 2. Picks the affected path(s); for a two-sided rename only the new name
/// 3. Applies the dot-component ignore policy beneath the target root
/// 4. Keeps only paths the target's glob selects
pub fn accepted_changes(
    event: &Event,
    matcher: &TargetMatcher,
    ignore_dotfiles: bool,
) -> Vec<(PathBuf, RawEventKind)> {
    let Some(kind) = classify_notify_kind(&event.kind) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    for path in affected_paths(event) {
        let Some(rel) = visible_relative(path, matcher, ignore_dotfiles) else {
            continue;
        };
        if !matcher.matches_relative(&rel) {
            continue;
        }
        out.push((path.clone(), kind));
    }
    out
}

/// Paths an addition event might have brought in as directories.
///
/// Same kind mapping and ignore policy as [`accepted_changes`], but without
/// the glob filter: a new `buttons/` never matches `**/*.hbs` itself, yet its
/// contents may. Callers still have to check that each path is a directory.
pub fn added_directory_candidates(
    event: &Event,
    matcher: &TargetMatcher,
    ignore_dotfiles: bool,
) -> Vec<PathBuf> {
    match classify_notify_kind(&event.kind) {
        Some(RawEventKind::Added) | Some(RawEventKind::AddedDirectory) => {}
        _ => return Vec::new(),
    }
    affected_paths(event)
        .iter()
        .filter(|path| visible_relative(path, matcher, ignore_dotfiles).is_some())
        .cloned()
        .collect()
}

/// Files under a freshly created directory that the target would report.
///
/// The OS watch on a new directory is only attached once its creation has
/// been seen, so anything written into it before then produces no event.
/// Listing the directory afterwards picks those files up.
pub fn scan_new_directory(
    fs: &dyn FileSystem,
    dir: &Path,
    matcher: &TargetMatcher,
    ignore_dotfiles: bool,
) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut stack = vec![dir.to_path_buf()];
    while let Some(current) = stack.pop() {
        let entries = match fs.read_dir(&current) {
            Ok(entries) => entries,
            Err(err) => {
                debug!(dir = ?current, error = %err, "new directory unreadable; skipping scan");
                continue;
            }
        };
        for entry in entries {
            let Some(rel) = visible_relative(&entry, matcher, ignore_dotfiles) else {
                continue;
            };
            if fs.is_dir(&entry) {
                stack.push(entry);
            } else if matcher.matches_relative(&rel) {
                found.push(entry);
            }
        }
    }
    found.sort();
    found
}

/// For a two-sided rename only the new name counts.
fn affected_paths(event: &Event) -> &[PathBuf] {
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            event.paths.last().map(std::slice::from_ref).unwrap_or(&[])
        }
        _ => &event.paths,
    }
}

/// `path` relative to the target root, unless it lies outside the root or
/// the dot policy hides it.
fn visible_relative(path: &Path, matcher: &TargetMatcher, ignore_dotfiles: bool) -> Option<String> {
    let rel = matcher.relative(path)?;
    if ignore_dotfiles && has_dot_component(&rel) {
        trace!(?path, "ignoring dot path");
        return None;
    }
    Some(rel)
}
