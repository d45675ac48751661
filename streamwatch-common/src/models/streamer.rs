// File: streamwatch-common/src/models/streamer.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row of the `streamers` table, keyed by `broadcaster_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamerRecord {
    pub broadcaster_id: String,
    #[serde(default)]
    pub broadcaster_name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_live: bool,
    #[serde(default)]
    pub profile_picture: Option<String>,
    #[serde(default)]
    pub created: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated: Option<DateTime<Utc>>,
}

impl StreamerRecord {
    pub fn new(broadcaster_id: impl Into<String>) -> Self {
        Self {
            broadcaster_id: broadcaster_id.into(),
            broadcaster_name: String::new(),
            category: String::new(),
            title: String::new(),
            is_live: false,
            profile_picture: None,
            created: None,
            updated: None,
        }
    }
}
