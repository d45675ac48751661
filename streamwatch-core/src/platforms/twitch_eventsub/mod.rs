// File: src/platforms/twitch_eventsub/mod.rs

pub mod events;

use serde_json::Value;
use tracing::debug;

use crate::Error;
use crate::models::UpdateEvent;
pub use events::{parse_twitch_notification, EventSubNotificationEnvelope};

/// True when `value` has the `{ "subscription": ..., "event": ... }` shape.
pub fn is_notification(value: &Value) -> bool {
    value.get("subscription").is_some_and(Value::is_object) && value.get("event").is_some()
}

/// Unwraps a notification envelope and converts its event.
///
/// Untracked subscription types yield `Ok(None)`; a malformed envelope or a
/// tracked event without a broadcaster id is a validation error.
pub fn parse_envelope(value: &Value) -> Result<Option<UpdateEvent>, Error> {
    let envelope = serde_json::from_value::<EventSubNotificationEnvelope>(value.clone())
        .map_err(|e| Error::Validation(format!("malformed EventSub envelope: {}", e)))?;

    let update = parse_twitch_notification(&envelope.subscription.sub_type, &envelope.event)?;
    if update.is_none() {
        debug!(
            "Ignoring EventSub notification of type '{}'",
            envelope.subscription.sub_type
        );
    }
    Ok(update)
}
