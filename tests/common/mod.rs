#![allow(dead_code)]

pub use patternlab_watch_test_utils::builders;
pub use patternlab_watch_test_utils::fake_source::FakeWatchSource;
pub use patternlab_watch_test_utils::{init_tracing, with_timeout};

use std::time::Duration;

use tokio::sync::broadcast;

use patternlab_watch::bus::ChangeEvent;

/// Collect whatever arrives on `rx` within `window`.
pub async fn drain_for(rx: &mut broadcast::Receiver<ChangeEvent>, window: Duration) -> Vec<ChangeEvent> {
    let mut out = Vec::new();
    let deadline = tokio::time::Instant::now() + window;
    loop {
        match tokio::time::timeout_at(deadline, rx.recv()).await {
            Ok(Ok(event)) => out.push(event),
            Ok(Err(broadcast::error::RecvError::Lagged(_))) => continue,
            Ok(Err(broadcast::error::RecvError::Closed)) | Err(_) => break,
        }
    }
    out
}

/// Wait (up to 5s) for the next event.
pub async fn next_event(rx: &mut broadcast::Receiver<ChangeEvent>) -> ChangeEvent {
    with_timeout(async {
        loop {
            match rx.recv().await {
                Ok(event) => return event,
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event bus closed"),
            }
        }
    })
    .await
}
