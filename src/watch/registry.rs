// src/watch/registry.rs

//! Owner of every live watch handle, keyed by the literal watch pattern.
//!
//! At most one live watch exists per key: establishing a watch for a key that
//! is already present closes the old handle before the new one is created.

use std::collections::HashMap;

use tracing::debug;

use crate::errors::Result;
use crate::watch::source::WatchHandle;

#[derive(Debug, Default)]
pub struct WatchRegistry {
    entries: HashMap<String, Box<dyn WatchHandle>>,
}

impl WatchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close-if-exists, then create via `factory`, then store.
    ///
    /// Closing is only requested, not awaited. If `factory` fails the old
    /// entry stays closed and removed, and the error is returned.
    pub fn establish<F>(&mut self, path: &str, factory: F) -> Result<()>
    where
        F: FnOnce() -> Result<Box<dyn WatchHandle>>,
    {
        if let Some(mut previous) = self.entries.remove(path) {
            debug!(path, "closing previous watch before re-establishing");
            previous.close();
        }

        let handle = factory()?;
        self.entries.insert(path.to_string(), handle);
        Ok(())
    }

    /// Close and forget the watch for `path`. Returns false if none existed.
    pub fn close(&mut self, path: &str) -> bool {
        match self.entries.remove(path) {
            Some(mut handle) => {
                handle.close();
                true
            }
            None => false,
        }
    }

    /// Close every watch. Used at shutdown.
    pub fn close_all(&mut self) {
        for (path, mut handle) in self.entries.drain() {
            debug!(path = %path, "closing watch");
            handle.close();
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered paths, sorted.
    pub fn paths(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}

impl Drop for WatchRegistry {
    fn drop(&mut self) {
        self.close_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::WatchError;
    use std::sync::{Arc, Mutex};

    /// Records the order of create/close calls across handles.
    #[derive(Debug)]
    struct LoggedHandle {
        id: usize,
        closed: bool,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl WatchHandle for LoggedHandle {
        fn close(&mut self) {
            self.closed = true;
            self.log.lock().unwrap().push(format!("close {}", self.id));
        }

        fn is_closed(&self) -> bool {
            self.closed
        }
    }

    fn factory(
        id: usize,
        log: &Arc<Mutex<Vec<String>>>,
    ) -> impl FnOnce() -> Result<Box<dyn WatchHandle>> {
        let log = Arc::clone(log);
        move || {
            log.lock().unwrap().push(format!("create {id}"));
            Ok(Box::new(LoggedHandle {
                id,
                closed: false,
                log,
            }) as Box<dyn WatchHandle>)
        }
    }

    #[test]
    fn re_establishing_closes_before_creating() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = WatchRegistry::new();

        registry.establish("/proj/_data/*", factory(1, &log)).unwrap();
        registry.establish("/proj/_data/*", factory(2, &log)).unwrap();

        assert_eq!(registry.len(), 1);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["create 1", "close 1", "create 2"]
        );
    }

    #[test]
    fn distinct_paths_coexist() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = WatchRegistry::new();

        registry.establish("/proj/_data/*", factory(1, &log)).unwrap();
        registry.establish("/proj/_meta/*", factory(2, &log)).unwrap();

        assert_eq!(registry.paths(), vec!["/proj/_data/*", "/proj/_meta/*"]);
        assert!(log.lock().unwrap().iter().all(|l| l.starts_with("create")));
    }

    #[test]
    fn failed_factory_leaves_no_entry() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = WatchRegistry::new();

        registry.establish("/proj/_data/*", factory(1, &log)).unwrap();
        let err = registry.establish("/proj/_data/*", || {
            Err(WatchError::ConfigError("no more watches".to_string()))
        });

        assert!(err.is_err());
        assert!(!registry.contains("/proj/_data/*"));
        assert_eq!(*log.lock().unwrap(), vec!["create 1", "close 1"]);
    }

    #[test]
    fn close_and_drop_release_handles() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut registry = WatchRegistry::new();
        registry.establish("a", factory(1, &log)).unwrap();
        registry.establish("b", factory(2, &log)).unwrap();

        assert!(registry.close("a"));
        assert!(!registry.close("a"));
        drop(registry);

        let log = log.lock().unwrap();
        assert!(log.contains(&"close 1".to_string()));
        assert!(log.contains(&"close 2".to_string()));
    }
}
