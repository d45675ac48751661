use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::UpdateEvent;

/// "stream.online" payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamOnline {
    #[serde(default)]
    pub id: String,                                 // stream id, e.g. "9001"
    #[serde(default)]
    pub broadcaster_user_id: String,                // e.g. "1337"
    #[serde(default)]
    pub broadcaster_user_login: Option<String>,     // e.g. "cool_user"
    #[serde(default)]
    pub broadcaster_user_name: Option<String>,      // e.g. "Cool_User"
    #[serde(default)]
    pub r#type: String,                             // e.g. "live"
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
}

/// "stream.offline" payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamOffline {
    #[serde(default)]
    pub broadcaster_user_id: String,
    #[serde(default)]
    pub broadcaster_user_login: Option<String>,
    #[serde(default)]
    pub broadcaster_user_name: Option<String>,
}

impl From<StreamOnline> for UpdateEvent {
    fn from(evt: StreamOnline) -> Self {
        UpdateEvent {
            id: evt.broadcaster_user_id,
            name: evt.broadcaster_user_name,
            is_live: Some(true),
            ..Default::default()
        }
    }
}

impl From<StreamOffline> for UpdateEvent {
    fn from(evt: StreamOffline) -> Self {
        UpdateEvent {
            id: evt.broadcaster_user_id,
            name: evt.broadcaster_user_name,
            is_live: Some(false),
            ..Default::default()
        }
    }
}
