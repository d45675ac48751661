// File: src/platforms/realtime/mod.rs
//
// Frames from the GraphQL-over-websocket subscription feed. Only data frames
// carry a streamer; everything else is connection housekeeping.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::models::RawUpdateEvent;

/// Frame types the feed is known to send.
pub const FRAME_TYPES: &[&str] = &[
    "connection_ack",
    "ka",
    "start_ack",
    "data",
    "next",
    "complete",
    "error",
    "connection_error",
];

#[derive(Debug, Clone, Deserialize)]
pub struct RealtimeFrame {
    #[serde(rename = "type")]
    pub frame_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub payload: Option<Value>,
}

impl RealtimeFrame {
    pub fn is_data(&self) -> bool {
        matches!(self.frame_type.as_str(), "data" | "next")
    }

    /// The `onUpdateStreamer` object, under `payload.data` or directly under `payload`.
    pub fn streamer(&self) -> Option<&Value> {
        let payload = self.payload.as_ref()?;
        payload
            .get("data")
            .and_then(|d| d.get("onUpdateStreamer"))
            .or_else(|| payload.get("onUpdateStreamer"))
            .filter(|v| v.is_object())
    }
}

/// True when `value` looks like a feed frame rather than a bare update.
pub fn is_frame(value: &Value) -> bool {
    value
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| FRAME_TYPES.contains(&t))
}

/// Extracts the raw streamer update from a data frame. Housekeeping frames
/// and data frames without a streamer object yield `None`.
pub fn parse_frame(value: &Value) -> Option<RawUpdateEvent> {
    let frame = serde_json::from_value::<RealtimeFrame>(value.clone()).ok()?;
    match frame.frame_type.as_str() {
        "data" | "next" => {}
        "error" | "connection_error" => {
            warn!("Realtime feed reported an error: {:?}", frame.payload);
            return None;
        }
        other => {
            debug!("Skipping realtime frame '{}'", other);
            return None;
        }
    }

    let Some(streamer) = frame.streamer() else {
        debug!("Data frame {:?} without a streamer object", frame.id);
        return None;
    };
    if let Some(kind) = streamer.get("type").and_then(Value::as_str) {
        debug!("Realtime update of kind '{}'", kind);
    }
    match serde_json::from_value::<RawUpdateEvent>(streamer.clone()) {
        Ok(raw) => Some(raw),
        Err(e) => {
            warn!("Malformed streamer object in data frame: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn data_frame_with_nested_streamer() {
        let frame = json!({
            "type": "data",
            "id": "sub-1",
            "payload": { "data": { "onUpdateStreamer": {
                "broadcaster_id": "77",
                "broadcaster_name": "Zed",
                "is_live": true,
                "title": null,
                "type": "status"
            }}}
        });
        assert!(is_frame(&frame));
        let raw = parse_frame(&frame).unwrap();
        assert_eq!(raw.id, Some(json!("77")));
        assert_eq!(raw.name.as_deref(), Some("Zed"));
        assert_eq!(raw.is_live, Some(true));
        assert_eq!(raw.title, None);
    }

    #[test]
    fn next_frame_with_flat_payload() {
        let frame = json!({
            "type": "next",
            "payload": { "onUpdateStreamer": { "broadcaster_id": "8", "category": "Art" } }
        });
        let raw = parse_frame(&frame).unwrap();
        assert_eq!(raw.category.as_deref(), Some("Art"));
        assert_eq!(raw.is_live, None);
    }

    #[test]
    fn housekeeping_frames_are_skipped() {
        for t in ["ka", "connection_ack", "start_ack", "complete", "error"] {
            assert!(parse_frame(&json!({ "type": t })).is_none(), "{t}");
        }
        assert!(parse_frame(&json!({ "type": "data", "payload": {} })).is_none());
    }

    #[test]
    fn bare_update_is_not_a_frame() {
        assert!(!is_frame(&json!({ "id": "1", "is_live": true })));
        assert!(!is_frame(&json!({ "id": "1", "type": "status" })));
    }
}
