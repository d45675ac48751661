// File: streamwatch-core/src/presence/validate.rs

use serde_json::Value;

use crate::Error;
use crate::models::{RawUpdateEvent, UpdateEvent};

/// Normalizes a raw event into an `UpdateEvent`.
///
/// The id must be a non-blank string or a JSON number; everything else is a
/// validation error. Field values are kept verbatim so an explicit `""`
/// still clears the field downstream.
pub fn validate(raw: RawUpdateEvent) -> Result<UpdateEvent, Error> {
    let id = match raw.id {
        Some(Value::String(s)) if !s.trim().is_empty() => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::String(_)) => {
            return Err(Error::Validation("update event has a blank `id`".into()));
        }
        Some(other) => {
            return Err(Error::Validation(format!(
                "update event `id` must be a string or number, got {}",
                other
            )));
        }
        None => {
            return Err(Error::Validation("update event is missing `id`".into()));
        }
    };

    Ok(UpdateEvent {
        id,
        name: raw.name,
        category: raw.category,
        title: raw.title,
        is_live: raw.is_live,
    })
}

/// Parses and validates a single JSON-encoded update event.
pub fn parse_update(json: &str) -> Result<UpdateEvent, Error> {
    let raw: RawUpdateEvent = serde_json::from_str(json)?;
    validate(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_string_and_numeric_ids() {
        let a = parse_update(r#"{"id":"42","is_live":true}"#).unwrap();
        assert_eq!(a.id, "42");
        assert_eq!(a.is_live, Some(true));

        let b = parse_update(r#"{"id":9,"name":"New"}"#).unwrap();
        assert_eq!(b.id, "9");
        assert_eq!(b.name.as_deref(), Some("New"));
    }

    #[test]
    fn accepts_broadcaster_prefixed_names() {
        let u = parse_update(
            r#"{"broadcaster_id":"5","broadcaster_name":"Eve","category":"Art","type":"status"}"#,
        )
        .unwrap();
        assert_eq!(u.id, "5");
        assert_eq!(u.name.as_deref(), Some("Eve"));
        assert_eq!(u.category.as_deref(), Some("Art"));
        assert_eq!(u.title, None);
    }

    #[test]
    fn missing_or_blank_id_is_rejected() {
        let missing = parse_update(r#"{"is_live":true}"#).unwrap_err();
        assert!(missing.is_validation());

        let blank = parse_update(r#"{"id":"  ","is_live":true}"#).unwrap_err();
        assert!(blank.is_validation());

        let wrong = parse_update(r#"{"id":true}"#).unwrap_err();
        assert!(wrong.is_validation());
    }

    #[test]
    fn empty_string_is_kept_and_null_is_absent() {
        let u = parse_update(r#"{"id":"1","title":"","category":null}"#).unwrap();
        assert_eq!(u.title.as_deref(), Some(""));
        assert_eq!(u.category, None);
        assert!(u.has_changes());
    }

    #[test]
    fn malformed_json_is_not_a_validation_error() {
        let err = parse_update("{not json").unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
