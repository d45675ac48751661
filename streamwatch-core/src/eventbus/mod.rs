//! src/eventbus/mod.rs
//!
//! In-process event bus. Every subscriber gets its own bounded MPSC queue,
//! so nothing is dropped: a full queue makes `publish` wait.

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};

use crate::models::{Snapshot, UpdateEvent};

/// Events flowing between ingress, the presence engine and persistence.
#[derive(Debug, Clone)]
pub enum BusEvent {
    /// Initial live/offline lists. Subscribers that hold state reset to it.
    Snapshot(Snapshot),

    /// A validated partial update for one broadcaster.
    StreamerUpdate(UpdateEvent),

    /// Free-form diagnostics.
    SystemMessage(String),
}

impl BusEvent {
    pub fn event_type(&self) -> &'static str {
        match self {
            BusEvent::Snapshot(_) => "snapshot",
            BusEvent::StreamerUpdate(_) => "streamer_update",
            BusEvent::SystemMessage(_) => "system_message",
        }
    }
}

/// Fan-out bus with a shared shutdown flag.
///
/// - If a subscriber's buffer fills, `publish` awaits until there's space.
/// - Subscribers that dropped their `Receiver` are pruned on the next publish.
#[derive(Clone)]
pub struct EventBus {
    subscribers: Arc<Mutex<Vec<mpsc::Sender<BusEvent>>>>,
    shutdown_tx: watch::Sender<bool>,
    pub shutdown_rx: watch::Receiver<bool>,
}

/// Default size for each subscriber's buffer.
pub const DEFAULT_BUFFER_SIZE: usize = 10000;

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            subscribers: Arc::new(Mutex::new(vec![])),
            shutdown_tx: tx,
            shutdown_rx: rx,
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    pub fn is_shutdown(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Returns a receiver on which every event published from now on is delivered.
    pub async fn subscribe(&self, buffer_size: Option<usize>) -> mpsc::Receiver<BusEvent> {
        let size = buffer_size.unwrap_or(DEFAULT_BUFFER_SIZE).max(1);
        let (tx, rx) = mpsc::channel(size);
        let mut subs = self.subscribers.lock().await;
        subs.push(tx);
        rx
    }

    pub async fn subscriber_count(&self) -> usize {
        self.subscribers.lock().await.len()
    }

    /// Publish an event to all subscribers, in subscription order.
    /// Returns how many subscribers accepted it.
    pub async fn publish(&self, event: BusEvent) -> usize {
        let senders = {
            let subs = self.subscribers.lock().await;
            subs.clone()
        };
        let mut delivered = 0;
        let mut closed = false;
        for s in senders {
            if s.send(event.clone()).await.is_ok() {
                delivered += 1;
            } else {
                closed = true;
            }
        }
        if closed {
            self.subscribers.lock().await.retain(|s| !s.is_closed());
        }
        delivered
    }

    pub async fn publish_update(&self, update: UpdateEvent) -> usize {
        self.publish(BusEvent::StreamerUpdate(update)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{sleep, timeout, Duration};

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new();

        let mut rx1 = bus.subscribe(Some(5)).await;
        let mut rx2 = bus.subscribe(Some(5)).await;

        let n = bus.publish_update(UpdateEvent::new("42").with_live(true)).await;
        assert_eq!(n, 2);

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await.expect("subscriber should get event") {
                BusEvent::StreamerUpdate(u) => {
                    assert_eq!(u.id, "42");
                    assert_eq!(u.is_live, Some(true));
                }
                other => panic!("wrong event type: {}", other.event_type()),
            }
        }
    }

    #[tokio::test]
    async fn test_backpressure_blocking() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe(Some(1)).await;

        bus.publish(BusEvent::SystemMessage("msg1".into())).await;

        let handle = tokio::spawn(async move {
            sleep(Duration::from_millis(50)).await;
            let first = rx.recv().await.expect("expected first message");
            let second = rx.recv().await.expect("expected second message");
            (first, second)
        });

        // Waits until the reader frees a slot.
        let second_publish = bus.publish(BusEvent::SystemMessage("msg2".into()));
        let result = timeout(Duration::from_millis(500), second_publish).await;
        assert!(result.is_ok(), "publish should eventually unblock");

        let (evt1, evt2) = handle.await.unwrap();
        match (evt1, evt2) {
            (BusEvent::SystemMessage(a), BusEvent::SystemMessage(b)) => {
                assert_eq!(a, "msg1");
                assert_eq!(b, "msg2");
            }
            _ => panic!("message mismatch"),
        }
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let bus = EventBus::new();
        let rx1 = bus.subscribe(Some(1)).await;
        let mut rx2 = bus.subscribe(Some(1)).await;
        drop(rx1);

        let n = bus.publish(BusEvent::SystemMessage("hi".into())).await;
        assert_eq!(n, 1);
        assert_eq!(bus.subscriber_count().await, 1);
        assert!(rx2.recv().await.is_some());
    }

    #[tokio::test]
    async fn test_shutdown_flag() {
        let bus = EventBus::new();
        let mut watcher = bus.shutdown_rx.clone();
        assert!(!bus.is_shutdown());

        bus.shutdown();
        watcher.changed().await.unwrap();
        assert!(*watcher.borrow());
        assert!(bus.is_shutdown());
    }
}
