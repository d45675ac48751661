// File: streamwatch-common/src/models/broadcaster.rs

use serde::{Deserialize, Deserializer, Serialize};

use crate::models::streamer::StreamerRecord;

/// A followed channel as the presence engine and the view see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broadcaster {
    #[serde(alias = "broadcaster_id", deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, alias = "broadcaster_name")]
    pub name: String,
    /// Only meaningful while live.
    #[serde(default)]
    pub category: String,
    /// Only meaningful while live.
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub is_live: bool,
    /// Filled by snapshots only; updates never carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

impl Broadcaster {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            title: String::new(),
            is_live: false,
            profile_picture: None,
        }
    }
}

impl From<StreamerRecord> for Broadcaster {
    fn from(r: StreamerRecord) -> Self {
        // Registration writes "" when Twitch had no picture for the user.
        let profile_picture = r.profile_picture.filter(|p| !p.is_empty());
        Self {
            id: r.broadcaster_id,
            name: r.broadcaster_name,
            category: r.category,
            title: r.title,
            is_live: r.is_live,
            profile_picture,
        }
    }
}

/// Initial `{live, offline}` membership, loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub live: Vec<Broadcaster>,
    #[serde(default)]
    pub offline: Vec<Broadcaster>,
}

impl Snapshot {
    pub fn new(live: Vec<Broadcaster>, offline: Vec<Broadcaster>) -> Self {
        Self { live, offline }
    }

    /// Partitions durable records by their stored liveness.
    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = StreamerRecord>,
    {
        let (live, offline) = records
            .into_iter()
            .map(Broadcaster::from)
            .partition(|b| b.is_live);
        Self { live, offline }
    }

    pub fn len(&self) -> usize {
        self.live.len() + self.offline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.offline.is_empty()
    }
}

/// What gets handed to the view after every mutation, each list sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresenceView {
    pub live: Vec<Broadcaster>,
    pub offline: Vec<Broadcaster>,
}

impl PresenceView {
    pub fn find(&self, id: &str) -> Option<&Broadcaster> {
        self.live
            .iter()
            .chain(self.offline.iter())
            .find(|b| b.id == id)
    }

    pub fn is_live(&self, id: &str) -> bool {
        self.live.iter().any(|b| b.id == id)
    }
}

/// Twitch ids are numeric strings, but feeds sometimes send them as JSON numbers.
pub fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        Str(String),
        Num(serde_json::Number),
    }

    match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::Str(s) => Ok(s),
        StringOrNumber::Num(n) => Ok(n.to_string()),
    }
}
