// src/watch/debounce.rs

//! Write-stability debouncing.
//!
//! A file is only reported once its size and mtime have stopped changing for
//! the stability threshold. This keeps half-written files (large template
//! saves, editors writing in chunks) from reaching the rebuild pipeline.
//!
//! The tracker is driven by explicit `Instant`s and a [`FileSystem`] so it can
//! be tested without real timers or disk IO.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::fs::{FileStat, FileSystem};
use crate::types::RawEventKind;

#[derive(Debug, Clone)]
struct PendingChange {
    kind: RawEventKind,
    last_stat: Option<FileStat>,
    last_change: Instant,
    /// First-seen order, so a batch comes out in notification order.
    seq: u64,
}

/// Tracks pending changes per path until they settle.
#[derive(Debug)]
pub struct StabilityTracker {
    pending: HashMap<PathBuf, PendingChange>,
    threshold: Duration,
    next_seq: u64,
}

impl StabilityTracker {
    pub fn new(threshold: Duration) -> Self {
        Self {
            pending: HashMap::new(),
            threshold,
            next_seq: 0,
        }
    }

    /// Record raw activity on `path`. Resets the path's quiet period.
    ///
    /// Kinds fold together: a new file that keeps being written stays
    /// `Added`, and repeated writes stay a single `Modified`.
    pub fn record(&mut self, fs: &dyn FileSystem, path: PathBuf, kind: RawEventKind, now: Instant) {
        let stat = fs.stat(&path).ok();
        match self.pending.get_mut(&path) {
            Some(entry) => {
                entry.kind = merge_kinds(entry.kind, kind);
                entry.last_stat = stat;
                entry.last_change = now;
            }
            None => {
                let seq = self.next_seq;
                self.next_seq += 1;
                self.pending.insert(
                    path,
                    PendingChange {
                        kind,
                        last_stat: stat,
                        last_change: now,
                        seq,
                    },
                );
            }
        }
    }

    /// Re-check every pending path and return those that have settled, in the
    /// order they were first seen.
    ///
    /// Paths that vanished in the meantime are dropped silently.
    pub fn poll(&mut self, fs: &dyn FileSystem, now: Instant) -> Vec<(PathBuf, RawEventKind)> {
        let threshold = self.threshold;
        let mut ready: Vec<(u64, PathBuf, RawEventKind)> = Vec::new();

        self.pending.retain(|path, entry| {
            let stat = match fs.stat(path) {
                Ok(stat) => stat,
                Err(err) => {
                    debug!(?path, error = %err, "pending path vanished before settling; dropping");
                    return false;
                }
            };

            if stat.is_dir {
                return match entry.kind {
                    RawEventKind::AddedDirectory | RawEventKind::Added => {
                        ready.push((entry.seq, path.clone(), RawEventKind::AddedDirectory));
                        false
                    }
                    // Directory mtimes move whenever children change.
                    RawEventKind::Modified => false,
                };
            }

            if entry.last_stat != Some(stat) {
                entry.last_stat = Some(stat);
                entry.last_change = now;
                return true;
            }

            if now.saturating_duration_since(entry.last_change) >= threshold {
                let kind = match entry.kind {
                    RawEventKind::AddedDirectory => RawEventKind::Added,
                    other => other,
                };
                ready.push((entry.seq, path.clone(), kind));
                false
            } else {
                true
            }
        });

        ready.sort_by_key(|(seq, _, _)| *seq);
        ready.into_iter().map(|(_, path, kind)| (path, kind)).collect()
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }
}

fn merge_kinds(existing: RawEventKind, incoming: RawEventKind) -> RawEventKind {
    match (existing, incoming) {
        (RawEventKind::AddedDirectory, _) | (_, RawEventKind::AddedDirectory) => {
            RawEventKind::AddedDirectory
        }
        (RawEventKind::Added, _) | (_, RawEventKind::Added) => RawEventKind::Added,
        (RawEventKind::Modified, RawEventKind::Modified) => RawEventKind::Modified,
    }
}
