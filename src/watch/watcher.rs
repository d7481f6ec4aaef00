// src/watch/watcher.rs

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::errors::{Result, WatchError};
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::{RawEventKind, RawFsEvent, WatchCategory};
use crate::watch::debounce::StabilityTracker;
use crate::watch::event_handler::{accepted_changes, added_directory_candidates, scan_new_directory};
use crate::watch::patterns::{TargetMatcher, WatchTarget};
use crate::watch::source::{ActiveWatch, WatchHandle, WatchOptions, WatchSource};

const ENOSPC: i32 = 28;
const EMFILE: i32 = 24;

/// [`WatchSource`] backed by the platform's native watcher (`notify`).
///
/// Each target gets its own `RecommendedWatcher` and a Tokio task that
/// debounces events and forwards the settled ones. Must be used from inside a
/// Tokio runtime.
#[derive(Debug, Clone)]
pub struct NotifyWatchSource {
    fs: Arc<dyn FileSystem>,
}

impl Default for NotifyWatchSource {
    fn default() -> Self {
        Self::new()
    }
}

impl NotifyWatchSource {
    pub fn new() -> Self {
        Self::with_fs(Arc::new(RealFileSystem))
    }

    pub fn with_fs(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }
}

impl WatchSource for NotifyWatchSource {
    fn watch(&self, target: &WatchTarget, options: &WatchOptions) -> Result<ActiveWatch> {
        let matcher = target.matcher()?;
        let runtime = tokio::runtime::Handle::try_current().map_err(|e| {
            WatchError::Other(anyhow!("watching {} needs a Tokio runtime: {e}", target.pattern()))
        })?;

        let root = target.root();
        let (out_tx, out_rx) = mpsc::unbounded_channel::<RawFsEvent>();

        if !self.fs.is_dir(root) {
            warn!(
                pattern = %target.pattern(),
                "watch root {:?} is missing; no changes will be reported for it",
                root
            );
            return Ok(inert_watch(target, out_tx, out_rx));
        }

        // Channel from the blocking notify callback into the async world.
        let (raw_tx, raw_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                // Receiver gone means the watch loop already stopped.
                let _ = raw_tx.send(res);
            },
            Config::default(),
        )
        .map_err(|err| map_notify_error(root, err))?;

        let mode = if target.recursive() {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };

        if let Err(err) = watcher.watch(root, mode) {
            if is_missing_or_denied(&err) {
                warn!(
                    pattern = %target.pattern(),
                    error = %err,
                    "cannot watch {:?}; no changes will be reported for it",
                    root
                );
                return Ok(inert_watch(target, out_tx, out_rx));
            }
            return Err(map_notify_error(root, err));
        }

        debug!(pattern = %target.pattern(), ?mode, "filesystem watch attached");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let watch_loop = WatchLoop {
            pattern: target.pattern().to_string(),
            category: target.category(),
            recursive: target.recursive(),
            matcher,
            options: *options,
            fs: Arc::clone(&self.fs),
            out_tx,
        };
        runtime.spawn(watch_loop.run(watcher, raw_rx, shutdown_rx));

        Ok(ActiveWatch {
            events: out_rx,
            handle: Box::new(NotifyWatchHandle {
                pattern: target.pattern().to_string(),
                shutdown: Some(shutdown_tx),
                keepalive: None,
            }),
        })
    }
}

fn inert_watch(
    target: &WatchTarget,
    out_tx: mpsc::UnboundedSender<RawFsEvent>,
    out_rx: mpsc::UnboundedReceiver<RawFsEvent>,
) -> ActiveWatch {
    ActiveWatch {
        events: out_rx,
        handle: Box::new(NotifyWatchHandle {
            pattern: target.pattern().to_string(),
            shutdown: None,
            keepalive: Some(out_tx),
        }),
    }
}

/// Stops a watch loop when closed or dropped.
#[derive(Debug)]
pub struct NotifyWatchHandle {
    pattern: String,
    shutdown: Option<oneshot::Sender<()>>,
    /// Inert watches hold their sender so the stream stays open until close.
    keepalive: Option<mpsc::UnboundedSender<RawFsEvent>>,
}

impl WatchHandle for NotifyWatchHandle {
    fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // Err means the loop already ended on its own (run-once).
            let _ = tx.send(());
        }
        self.keepalive = None;
        debug!(pattern = %self.pattern, "watch close requested");
    }

    fn is_closed(&self) -> bool {
        let loop_gone = self.shutdown.as_ref().is_none_or(|tx| tx.is_closed());
        loop_gone && self.keepalive.is_none()
    }
}

/// Everything the background task needs for one target.
struct WatchLoop {
    pattern: String,
    category: WatchCategory,
    recursive: bool,
    matcher: TargetMatcher,
    options: WatchOptions,
    fs: Arc<dyn FileSystem>,
    out_tx: mpsc::UnboundedSender<RawFsEvent>,
}

impl WatchLoop {
    /// Feed one notify event into the tracker.
    ///
    /// On recursive targets a new directory is also listed, so files written
    /// into it before the OS watch covered it are still reported.
    fn record_event(&self, tracker: &mut StabilityTracker, event: &Event, now: Instant) {
        let fs = self.fs.as_ref();
        let ignore_dotfiles = self.options.ignore_dotfiles;

        for (path, kind) in accepted_changes(event, &self.matcher, ignore_dotfiles) {
            tracker.record(fs, path, kind, now);
        }

        if !self.recursive {
            return;
        }
        for dir in added_directory_candidates(event, &self.matcher, ignore_dotfiles) {
            if !fs.is_dir(&dir) {
                continue;
            }
            let found = scan_new_directory(fs, &dir, &self.matcher, ignore_dotfiles);
            if !found.is_empty() {
                debug!(pattern = %self.pattern, ?dir, files = found.len(), "new directory already has files");
            }
            for path in found {
                tracker.record(fs, path, RawEventKind::Added, now);
            }
        }
    }

    async fn run(
        self,
        watcher: RecommendedWatcher,
        mut raw_rx: mpsc::UnboundedReceiver<notify::Result<Event>>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        // Dropping the notify watcher at the end of this task releases the
        // OS watch.
        let _watcher = watcher;
        let mut tracker = StabilityTracker::new(self.options.stability_threshold);
        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = &mut shutdown_rx => {
                    debug!(pattern = %self.pattern, "watch closed");
                    break;
                }
                received = raw_rx.recv() => match received {
                    Some(Ok(event)) => self.record_event(&mut tracker, &event, Instant::now()),
                    Some(Err(err)) => {
                        warn!(pattern = %self.pattern, error = %err, "file watch error; event dropped");
                    }
                    None => break,
                },
                _ = ticker.tick(), if tracker.has_pending() => {
                    let ready = tracker.poll(self.fs.as_ref(), Instant::now());
                    if ready.is_empty() {
                        continue;
                    }
                    for (path, kind) in ready {
                        if self.out_tx.send(RawFsEvent::new(kind, path, self.category)).is_err() {
                            debug!(pattern = %self.pattern, "event consumer gone; stopping watch");
                            return;
                        }
                    }
                    if !self.options.persistent {
                        info!(pattern = %self.pattern, "run-once watch delivered its batch; stopping");
                        break;
                    }
                }
            }
        }
        debug!(pattern = %self.pattern, "watch loop finished");
    }
}

fn is_exhaustion(err: &notify::Error) -> bool {
    match &err.kind {
        notify::ErrorKind::MaxFilesWatch => true,
        notify::ErrorKind::Io(io) => matches!(io.raw_os_error(), Some(ENOSPC) | Some(EMFILE)),
        _ => false,
    }
}

fn is_missing_or_denied(err: &notify::Error) -> bool {
    match &err.kind {
        notify::ErrorKind::PathNotFound => true,
        notify::ErrorKind::Io(io) => matches!(
            io.kind(),
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied
        ),
        _ => false,
    }
}

fn map_notify_error(path: &Path, err: notify::Error) -> WatchError {
    if is_exhaustion(&err) {
        WatchError::ResourceExhausted {
            path: path.to_path_buf(),
            reason: err.to_string(),
        }
    } else {
        WatchError::WatchFailed {
            path: path.to_path_buf(),
            source: err,
        }
    }
}
