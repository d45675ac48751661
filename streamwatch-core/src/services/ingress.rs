//! src/services/ingress.rs
//!
//! Entry point for raw JSON from the outside world. Recognizes the three
//! shapes we receive (bare updates, EventSub notifications, realtime feed
//! frames), validates, and publishes onto the bus.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, trace};

use crate::Error;
use crate::eventbus::{BusEvent, EventBus};
use crate::models::{RawUpdateEvent, Snapshot, UpdateEvent};
use crate::platforms::{realtime, twitch_eventsub};
use crate::presence::validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageShape {
    EventSub,
    Realtime,
    Bare,
}

impl MessageShape {
    pub fn detect(value: &Value) -> Self {
        if twitch_eventsub::is_notification(value) {
            MessageShape::EventSub
        } else if realtime::is_frame(value) {
            MessageShape::Realtime
        } else {
            MessageShape::Bare
        }
    }
}

/// Turns a JSON value of any supported shape into a validated update.
///
/// `Ok(None)` means the message is well-formed but carries no update
/// (keep-alives, untracked notification types).
pub fn decode(value: &Value) -> Result<Option<UpdateEvent>, Error> {
    match MessageShape::detect(value) {
        MessageShape::EventSub => twitch_eventsub::parse_envelope(value),
        MessageShape::Realtime => realtime::parse_frame(value).map(validate).transpose(),
        MessageShape::Bare => {
            let raw: RawUpdateEvent = serde_json::from_value(value.clone())?;
            validate(raw).map(Some)
        }
    }
}

pub struct EventIngress {
    bus: Arc<EventBus>,
}

impl EventIngress {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self { bus }
    }

    pub async fn publish_snapshot(&self, snapshot: Snapshot) {
        debug!("Publishing snapshot with {} broadcasters", snapshot.len());
        self.bus.publish(BusEvent::Snapshot(snapshot)).await;
    }

    /// Publishes an already validated update.
    pub async fn ingest(&self, update: UpdateEvent) -> Result<(), Error> {
        if self.bus.is_shutdown() {
            return Err(Error::EventBus("event bus is shut down".into()));
        }
        trace!("Ingesting update for '{}'", update.id);
        self.bus.publish_update(update).await;
        Ok(())
    }

    /// Returns whether an update was published. Malformed JSON and invalid
    /// updates are errors and publish nothing.
    pub async fn ingest_value(&self, value: &Value) -> Result<bool, Error> {
        match decode(value)? {
            Some(update) => {
                self.ingest(update).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn ingest_json(&self, json: &str) -> Result<bool, Error> {
        let value: Value = serde_json::from_str(json)?;
        self.ingest_value(&value).await
    }
}
