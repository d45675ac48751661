use serde::Deserialize;

use crate::models::UpdateEvent;

/// "channel.update" event. Says nothing about whether the channel is live.
/// Fields the notification leaves out stay `None` and are not touched.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelUpdate {
    #[serde(default)]
    pub broadcaster_user_id: String,
    #[serde(default)]
    pub broadcaster_user_login: Option<String>,
    #[serde(default)]
    pub broadcaster_user_name: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub content_classification_labels: Vec<String>,
}

impl From<ChannelUpdate> for UpdateEvent {
    fn from(evt: ChannelUpdate) -> Self {
        UpdateEvent {
            id: evt.broadcaster_user_id,
            name: evt.broadcaster_user_name,
            category: evt.category_name,
            title: evt.title,
            is_live: None,
        }
    }
}
