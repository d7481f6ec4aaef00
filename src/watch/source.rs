// src/watch/source.rs

//! The watch capability, as seen by the rest of the crate.
//!
//! A [`WatchSource`] turns one [`WatchTarget`] into a stream of settled
//! [`RawFsEvent`]s plus a handle that can stop it. The real implementation is
//! [`crate::watch::watcher::NotifyWatchSource`]; tests plug in fakes that emit
//! synthetic events.

use std::fmt::Debug;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::errors::Result;
use crate::types::RawFsEvent;
use crate::watch::patterns::WatchTarget;

/// Per-watch policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Quiet period a file needs before its event is delivered.
    pub stability_threshold: Duration,
    /// How often pending files are re-checked.
    pub poll_interval: Duration,
    /// Drop anything with a dot-prefixed path component.
    pub ignore_dotfiles: bool,
    /// `false` stops the watch after its first delivered batch.
    pub persistent: bool,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            stability_threshold: Duration::from_millis(200),
            poll_interval: Duration::from_millis(100),
            ignore_dotfiles: true,
            persistent: true,
        }
    }
}

impl WatchOptions {
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }
}

/// Handle to one live watch.
///
/// Closing is best-effort and asynchronous: events already in flight may
/// still be delivered after `close` returns.
pub trait WatchHandle: Send + Debug {
    fn close(&mut self);
    fn is_closed(&self) -> bool;
}

/// A freshly established watch: its event stream and its stop handle.
///
/// The stream ends once the watch has shut down (closed, dropped, or finished
/// its single batch in run-once mode).
#[derive(Debug)]
pub struct ActiveWatch {
    pub events: mpsc::UnboundedReceiver<RawFsEvent>,
    pub handle: Box<dyn WatchHandle>,
}

/// Something that can watch a target.
pub trait WatchSource: Send + Sync + Debug {
    /// Establish a watch.
    ///
    /// Errors only for failures that make coverage untrustworthy (resource
    /// exhaustion, an uncompilable glob). Missing directories give an inert
    /// watch instead.
    fn watch(&self, target: &WatchTarget, options: &WatchOptions) -> Result<ActiveWatch>;
}
