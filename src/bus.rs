// src/bus.rs

//! Shared event bus that carries classified change events to the rebuild
//! pipeline.
//!
//! The bus is a thin wrapper around a `tokio::sync::broadcast` channel. It is
//! created once by the host and cloned into every emitter; publishing is
//! fire-and-forget and never blocks.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::trace;

/// Default number of events buffered per subscriber before it starts lagging.
pub const DEFAULT_BUS_CAPACITY: usize = 256;

/// Name of a published change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeEventName {
    /// Something under a global source (data, meta) changed.
    GlobalChange,
    /// A file in the pattern tree changed.
    PatternChange,
}

impl ChangeEventName {
    pub const fn as_str(self) -> &'static str {
        match self {
            ChangeEventName::GlobalChange => "GLOBAL_CHANGE",
            ChangeEventName::PatternChange => "PATTERN_CHANGE",
        }
    }
}

impl fmt::Display for ChangeEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload published on the bus: `{ "file": "<absolute path>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    #[serde(skip)]
    pub name: ChangeEventName,
    pub file: PathBuf,
}

impl ChangeEvent {
    pub fn new(name: ChangeEventName, file: impl Into<PathBuf>) -> Self {
        Self {
            name,
            file: file.into(),
        }
    }
}

/// Process-wide event bus.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<ChangeEvent>,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscribers", &self.sender.receiver_count())
            .finish()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_BUS_CAPACITY)
    }
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publish an event to every current subscriber.
    ///
    /// Having no subscribers is not an error; the event is simply dropped.
    pub fn emit(&self, event: ChangeEvent) {
        match self.sender.send(event) {
            Ok(count) => trace!(subscribers = count, "change event published"),
            Err(broadcast::error::SendError(event)) => {
                trace!(name = %event.name, file = ?event.file, "no subscribers for change event");
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_names_match_wire_names() {
        assert_eq!(ChangeEventName::GlobalChange.as_str(), "GLOBAL_CHANGE");
        assert_eq!(ChangeEventName::PatternChange.to_string(), "PATTERN_CHANGE");
    }

    #[test]
    fn payload_carries_only_the_file() {
        let event = ChangeEvent::new(ChangeEventName::GlobalChange, "/proj/_data/a.json");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json, serde_json::json!({ "file": "/proj/_data/a.json" }));
    }

    #[test]
    fn emit_without_subscribers_is_silent() {
        let bus = EventBus::new(4);
        bus.emit(ChangeEvent::new(ChangeEventName::GlobalChange, "/proj/_data/a.json"));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[test]
    fn every_subscriber_sees_each_event() {
        let bus = EventBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.clone().subscribe();

        let event = ChangeEvent::new(ChangeEventName::PatternChange, "/proj/_patterns/x.hbs");
        bus.emit(event.clone());

        assert_eq!(a.try_recv().unwrap(), event);
        assert_eq!(b.try_recv().unwrap(), event);
        assert!(a.try_recv().is_err());
    }
}
