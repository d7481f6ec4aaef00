// src/watch/emitter.rs

//! Classification of raw watcher output into bus events.

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::bus::{ChangeEvent, ChangeEventName, EventBus};
use crate::types::{RawFsEvent, WatchCategory};

/// Map a raw event to the bus event it announces.
///
/// Purely a function of the category of the target that saw the change; the
/// extension filtering already happened when the globs were built.
pub fn classify(raw: RawFsEvent) -> ChangeEvent {
    let name = match raw.category {
        WatchCategory::Global => ChangeEventName::GlobalChange,
        WatchCategory::Pattern => ChangeEventName::PatternChange,
    };
    ChangeEvent::new(name, raw.path)
}

/// Forward every event from one watch stream onto the bus, in order, until
/// the stream ends.
pub fn spawn_emitter(
    runtime: &Handle,
    pattern: String,
    mut events: mpsc::UnboundedReceiver<RawFsEvent>,
    bus: EventBus,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        while let Some(raw) = events.recv().await {
            debug!(pattern = %pattern, kind = ?raw.kind, path = ?raw.path, "change detected");
            bus.emit(classify(raw));
        }
        debug!(pattern = %pattern, "watch stream ended");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawEventKind;

    #[test]
    fn category_decides_the_event_name() {
        for kind in [
            RawEventKind::Added,
            RawEventKind::AddedDirectory,
            RawEventKind::Modified,
        ] {
            let global = classify(RawFsEvent::new(kind, "/proj/_data/a.json", WatchCategory::Global));
            assert_eq!(global.name, ChangeEventName::GlobalChange);
            assert_eq!(global.file.to_str(), Some("/proj/_data/a.json"));

            // Extension is irrelevant: a .json under the pattern tree is still a pattern change.
            let pattern = classify(RawFsEvent::new(
                kind,
                "/proj/_patterns/a.json",
                WatchCategory::Pattern,
            ));
            assert_eq!(pattern.name, ChangeEventName::PatternChange);
        }
    }

    #[tokio::test]
    async fn emitter_forwards_in_order_and_stops_with_stream() {
        let bus = EventBus::new(16);
        let mut sub = bus.subscribe();
        let (tx, rx) = mpsc::unbounded_channel();

        let task = spawn_emitter(&Handle::current(), "/proj/_data/*".to_string(), rx, bus.clone());
        for name in ["a.json", "b.json", "c.json"] {
            tx.send(RawFsEvent::new(
                RawEventKind::Modified,
                format!("/proj/_data/{name}"),
                WatchCategory::Global,
            ))
            .unwrap();
        }
        drop(tx);
        task.await.unwrap();

        let mut files = Vec::new();
        while let Ok(event) = sub.try_recv() {
            assert_eq!(event.name, ChangeEventName::GlobalChange);
            files.push(event.file.to_string_lossy().into_owned());
        }
        assert_eq!(
            files,
            vec!["/proj/_data/a.json", "/proj/_data/b.json", "/proj/_data/c.json"]
        );
    }
}
