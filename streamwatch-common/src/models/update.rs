// File: streamwatch-common/src/models/update.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A validated, field-sparse change to one broadcaster.
///
/// `None` means "leave as is"; `Some(String::new())` clears the field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEvent {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_live: Option<bool>,
}

impl UpdateEvent {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_live(mut self, is_live: bool) -> Self {
        self.is_live = Some(is_live);
        self
    }

    /// True when at least one field besides the id is present.
    pub fn has_changes(&self) -> bool {
        self.name.is_some() || self.category.is_some() || self.title.is_some() || self.is_live.is_some()
    }
}

/// The event exactly as it came off the wire, before validation.
///
/// Accepts both the short field names and the `broadcaster_*` names used by
/// the real-time feed. Unknown keys are ignored and JSON `null` reads as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawUpdateEvent {
    #[serde(default, alias = "broadcaster_id")]
    pub id: Option<Value>,
    #[serde(default, alias = "broadcaster_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub is_live: Option<bool>,
}
