// File: streamwatch-core/src/repositories/partial_update.rs
//
// Builds field-sparse writes against a single streamer record.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};

use crate::models::UpdateEvent;

/// Columns of the streamer record that a partial update may set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StreamerField {
    Name,
    Category,
    Title,
    IsLive,
    Updated,
}

impl StreamerField {
    pub fn column(self) -> &'static str {
        match self {
            StreamerField::Name => "broadcaster_name",
            StreamerField::Category => "category",
            StreamerField::Title => "title",
            StreamerField::IsLive => "is_live",
            StreamerField::Updated => "updated",
        }
    }

    /// Attribute-name placeholder, e.g. `#title`.
    pub fn name_placeholder(self) -> String {
        format!("#{}", self.column())
    }

    /// Attribute-value placeholder, e.g. `:title`.
    pub fn value_placeholder(self) -> String {
        format!(":{}", self.column())
    }
}

impl fmt::Display for StreamerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Bool(bool),
    Timestamp(DateTime<Utc>),
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(t: DateTime<Utc>) -> Self {
        FieldValue::Timestamp(t)
    }
}

/// A write touching only the defined fields of the record at `key`.
///
/// Fields whose value is `None` are skipped entirely; they are never written
/// as null. An update with no fields is valid and stores treat it as a no-op.
#[derive(Debug, Clone, PartialEq)]
pub struct PartialUpdate {
    key: String,
    fields: BTreeMap<StreamerField, FieldValue>,
}

impl PartialUpdate {
    /// Resolves a sparse field map. When a field is given more than once the
    /// last defined value wins.
    pub fn resolve<I>(key: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (StreamerField, Option<FieldValue>)>,
    {
        let fields = fields
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();
        Self {
            key: key.into(),
            fields,
        }
    }

    /// Maps an engine update onto store columns.
    pub fn from_update(update: &UpdateEvent) -> Self {
        Self::resolve(
            update.id.clone(),
            [
                (StreamerField::Name, update.name.clone().map(FieldValue::from)),
                (StreamerField::Category, update.category.clone().map(FieldValue::from)),
                (StreamerField::Title, update.title.clone().map(FieldValue::from)),
                (StreamerField::IsLive, update.is_live.map(FieldValue::from)),
            ],
        )
    }

    /// Adds an `updated` timestamp, but only to a write that sets something.
    pub fn stamped(mut self, at: DateTime<Utc>) -> Self {
        if !self.fields.is_empty() {
            self.fields.insert(StreamerField::Updated, FieldValue::Timestamp(at));
        }
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_noop(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn touches(&self, field: StreamerField) -> bool {
        self.fields.contains_key(&field)
    }

    pub fn value(&self, field: StreamerField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    /// Fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = (StreamerField, &FieldValue)> {
        self.fields.iter().map(|(f, v)| (*f, v))
    }

    /// `SET #a = :a, #b = :b`, or `None` when there is nothing to set.
    pub fn update_expression(&self) -> Option<String> {
        if self.fields.is_empty() {
            return None;
        }
        let clauses: Vec<String> = self
            .fields
            .keys()
            .map(|f| format!("{} = {}", f.name_placeholder(), f.value_placeholder()))
            .collect();
        Some(format!("SET {}", clauses.join(", ")))
    }

    /// Placeholder name to column name.
    pub fn attribute_names(&self) -> BTreeMap<String, &'static str> {
        self.fields
            .keys()
            .map(|f| (f.name_placeholder(), f.column()))
            .collect()
    }

    /// Placeholder value to bound value.
    pub fn attribute_values(&self) -> BTreeMap<String, &FieldValue> {
        self.fields
            .iter()
            .map(|(f, v)| (f.value_placeholder(), v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn undefined_fields_are_never_set() {
        let update = PartialUpdate::resolve(
            "x",
            [
                (StreamerField::Name, None),
                (StreamerField::Title, Some(FieldValue::from("New Title"))),
            ],
        );

        assert_eq!(update.key(), "x");
        assert_eq!(update.len(), 1);
        assert!(update.touches(StreamerField::Title));
        assert!(!update.touches(StreamerField::Name));
        assert_eq!(update.update_expression().as_deref(), Some("SET #title = :title"));
        assert_eq!(update.attribute_names().get("#title"), Some(&"title"));
        assert!(!update.attribute_names().contains_key("#broadcaster_name"));
        assert_eq!(
            update.attribute_values().get(":title"),
            Some(&&FieldValue::Text("New Title".into()))
        );
    }

    #[test]
    fn empty_field_set_has_no_clause() {
        let update = PartialUpdate::resolve("x", [(StreamerField::Title, None)]);
        assert!(update.is_noop());
        assert_eq!(update.update_expression(), None);
        assert!(update.attribute_values().is_empty());
    }

    #[test]
    fn empty_string_is_a_defined_value() {
        let update = PartialUpdate::from_update(&UpdateEvent::new("1").with_category(""));
        assert_eq!(
            update.value(StreamerField::Category),
            Some(&FieldValue::Text(String::new()))
        );
    }

    #[test]
    fn last_defined_value_wins() {
        let update = PartialUpdate::resolve(
            "x",
            [
                (StreamerField::Title, Some(FieldValue::from("first"))),
                (StreamerField::Title, None),
                (StreamerField::Title, Some(FieldValue::from("second"))),
            ],
        );
        assert_eq!(update.value(StreamerField::Title), Some(&FieldValue::from("second")));
    }

    #[test]
    fn from_update_maps_every_present_field() {
        let update = PartialUpdate::from_update(
            &UpdateEvent::new("1")
                .with_name("Bob")
                .with_live(true)
                .with_category("Art"),
        );
        assert_eq!(
            update.update_expression().as_deref(),
            Some("SET #broadcaster_name = :broadcaster_name, #category = :category, #is_live = :is_live")
        );
        assert_eq!(update.value(StreamerField::IsLive), Some(&FieldValue::Bool(true)));
    }

    #[test]
    fn stamping_skips_empty_writes() {
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let empty = PartialUpdate::from_update(&UpdateEvent::new("1")).stamped(at);
        assert!(empty.is_noop());

        let live = PartialUpdate::from_update(&UpdateEvent::new("1").with_live(false)).stamped(at);
        assert_eq!(live.value(StreamerField::Updated), Some(&FieldValue::Timestamp(at)));
        assert_eq!(live.len(), 2);
    }
}
