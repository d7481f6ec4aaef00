//! In-memory [`WatchSource`] that never touches the filesystem.
//!
//! Tests establish watches through it like through the real source, then push
//! synthetic settled events with [`FakeWatchSource::emit`].

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use patternlab_watch::errors::{Result, WatchError};
use patternlab_watch::types::{RawEventKind, RawFsEvent, WatchCategory};
use patternlab_watch::watch::{ActiveWatch, WatchHandle, WatchOptions, WatchSource, WatchTarget};

type SharedSender = Arc<Mutex<Option<mpsc::UnboundedSender<RawFsEvent>>>>;

#[derive(Debug)]
struct FakeWatch {
    pattern: String,
    category: WatchCategory,
    options: WatchOptions,
    sender: SharedSender,
}

impl FakeWatch {
    fn is_live(&self) -> bool {
        self.sender.lock().unwrap().is_some()
    }
}

#[derive(Debug, Default)]
struct FakeState {
    watches: Vec<FakeWatch>,
    fail_next: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FakeWatchSource {
    state: Arc<Mutex<FakeState>>,
}

impl FakeWatchSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `watch` call fail as if the OS ran out of watches.
    pub fn exhaust_next(&self, reason: &str) {
        self.state.lock().unwrap().fail_next = Some(reason.to_string());
    }

    /// Every pattern ever watched, in establishment order (repeats included).
    pub fn watched_patterns(&self) -> Vec<String> {
        let state = self.state.lock().unwrap();
        state.watches.iter().map(|w| w.pattern.clone()).collect()
    }

    /// Number of watches for `pattern` that have not been closed.
    pub fn live_count(&self, pattern: &str) -> usize {
        let state = self.state.lock().unwrap();
        state
            .watches
            .iter()
            .filter(|w| w.pattern == pattern && w.is_live())
            .count()
    }

    /// Total number of live watches.
    pub fn total_live(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.watches.iter().filter(|w| w.is_live()).count()
    }

    /// Options the most recent watch for `pattern` was created with.
    pub fn options_for(&self, pattern: &str) -> Option<WatchOptions> {
        let state = self.state.lock().unwrap();
        state
            .watches
            .iter()
            .rev()
            .find(|w| w.pattern == pattern)
            .map(|w| w.options)
    }

    /// Deliver a settled event to every live watch of `pattern`.
    ///
    /// Run-once watches stop after delivering, like the real source does
    /// after its first batch. Returns how many watches received it.
    pub fn emit(&self, pattern: &str, kind: RawEventKind, path: impl Into<PathBuf>) -> usize {
        let path = path.into();
        let state = self.state.lock().unwrap();
        let mut delivered = 0;
        for watch in state.watches.iter().filter(|w| w.pattern == pattern) {
            let mut sender = watch.sender.lock().unwrap();
            let Some(tx) = sender.as_ref() else {
                continue;
            };
            if tx
                .send(RawFsEvent::new(kind, path.clone(), watch.category))
                .is_ok()
            {
                delivered += 1;
            }
            if !watch.options.persistent {
                *sender = None;
            }
        }
        delivered
    }
}

impl WatchSource for FakeWatchSource {
    fn watch(&self, target: &WatchTarget, options: &WatchOptions) -> Result<ActiveWatch> {
        let mut state = self.state.lock().unwrap();
        if let Some(reason) = state.fail_next.take() {
            return Err(WatchError::ResourceExhausted {
                path: target.root().to_path_buf(),
                reason,
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let sender: SharedSender = Arc::new(Mutex::new(Some(tx)));
        state.watches.push(FakeWatch {
            pattern: target.pattern().to_string(),
            category: target.category(),
            options: *options,
            sender: Arc::clone(&sender),
        });

        Ok(ActiveWatch {
            events: rx,
            handle: Box::new(FakeHandle { sender }),
        })
    }
}

#[derive(Debug)]
struct FakeHandle {
    sender: SharedSender,
}

impl WatchHandle for FakeHandle {
    fn close(&mut self) {
        self.sender.lock().unwrap().take();
    }

    fn is_closed(&self) -> bool {
        self.sender.lock().unwrap().is_none()
    }
}
