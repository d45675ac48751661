// File: streamwatch-core/src/platforms/twitch_eventsub/events/mod.rs

pub mod base;
pub mod stream_online_offline;
pub mod update;

pub use base::*;
pub use stream_online_offline::*;
pub use update::*;

use serde::de::DeserializeOwned;

use crate::Error;
use crate::models::UpdateEvent;

fn decode_event<T>(sub_type: &str, event_json: &serde_json::Value) -> Result<UpdateEvent, Error>
where
    T: DeserializeOwned + Into<UpdateEvent>,
{
    let evt: T = serde_json::from_value(event_json.clone()).map_err(|e| {
        Error::Validation(format!("malformed '{}' event: {}", sub_type, e))
    })?;
    Ok(evt.into())
}

/// Parses a notification's `event` object into an update.
///
/// Untracked subscription types yield `Ok(None)`. A tracked type whose event
/// doesn't deserialize or has no broadcaster id is a validation error.
pub fn parse_twitch_notification(
    sub_type: &str,
    event_json: &serde_json::Value,
) -> Result<Option<UpdateEvent>, Error> {
    let update = match sub_type {
        "stream.online" => decode_event::<StreamOnline>(sub_type, event_json)?,
        "stream.offline" => decode_event::<StreamOffline>(sub_type, event_json)?,
        "channel.update" => decode_event::<ChannelUpdate>(sub_type, event_json)?,
        _ => return Ok(None),
    };
    if update.id.trim().is_empty() {
        return Err(Error::Validation(format!(
            "'{}' event has no broadcaster_user_id",
            sub_type
        )));
    }
    Ok(Some(update))
}
