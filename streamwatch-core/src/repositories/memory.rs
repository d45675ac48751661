// File: streamwatch-core/src/repositories/memory.rs

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use tracing::trace;

use crate::Error;
use crate::models::StreamerRecord;
use crate::repositories::StreamerRepository;
use crate::repositories::partial_update::{FieldValue, PartialUpdate, StreamerField};

/// Process-local store used for `--in-memory` runs and tests.
#[derive(Clone, Default)]
pub struct InMemoryStreamerRepository {
    records: Arc<DashMap<String, StreamerRecord>>,
}

impl InMemoryStreamerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = StreamerRecord>,
    {
        let repo = Self::new();
        for r in records {
            repo.records.insert(r.broadcaster_id.clone(), r);
        }
        repo
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn contains(&self, broadcaster_id: &str) -> bool {
        self.records.contains_key(broadcaster_id)
    }
}

fn check_type(field: StreamerField, value: &FieldValue) -> Result<(), Error> {
    let ok = match field {
        StreamerField::Name | StreamerField::Category | StreamerField::Title => {
            matches!(value, FieldValue::Text(_))
        }
        StreamerField::IsLive => matches!(value, FieldValue::Bool(_)),
        StreamerField::Updated => matches!(value, FieldValue::Timestamp(_)),
    };
    if ok {
        Ok(())
    } else {
        Err(Error::Store(format!(
            "type mismatch for column {}: {:?}",
            field, value
        )))
    }
}

fn apply_field(record: &mut StreamerRecord, field: StreamerField, value: &FieldValue) {
    match (field, value) {
        (StreamerField::Name, FieldValue::Text(s)) => record.broadcaster_name.clone_from(s),
        (StreamerField::Category, FieldValue::Text(s)) => record.category.clone_from(s),
        (StreamerField::Title, FieldValue::Text(s)) => record.title.clone_from(s),
        (StreamerField::IsLive, FieldValue::Bool(b)) => record.is_live = *b,
        (StreamerField::Updated, FieldValue::Timestamp(t)) => record.updated = Some(*t),
        _ => {}
    }
}

#[async_trait]
impl StreamerRepository for InMemoryStreamerRepository {
    async fn update_partial(&self, update: &PartialUpdate) -> Result<(), Error> {
        if update.is_noop() {
            trace!("Skipping empty write for {}", update.key());
            return Ok(());
        }

        // Type-check everything first so a bad field leaves the record untouched.
        for (field, value) in update.fields() {
            check_type(field, value)?;
        }

        let mut record = self
            .records
            .entry(update.key().to_string())
            .or_insert_with(|| {
                let mut r = StreamerRecord::new(update.key());
                r.created = Some(Utc::now());
                r
            });
        for (field, value) in update.fields() {
            apply_field(&mut record, field, value);
        }
        Ok(())
    }

    async fn get(&self, broadcaster_id: &str) -> Result<Option<StreamerRecord>, Error> {
        Ok(self.records.get(broadcaster_id).map(|r| r.value().clone()))
    }

    async fn batch_get(&self, broadcaster_ids: &[String]) -> Result<Vec<StreamerRecord>, Error> {
        Ok(broadcaster_ids
            .iter()
            .filter_map(|id| self.records.get(id).map(|r| r.value().clone()))
            .collect())
    }

    async fn insert_if_absent(&self, records: &[StreamerRecord]) -> Result<HashSet<String>, Error> {
        let mut inserted = HashSet::new();
        for r in records {
            let entry = self.records.entry(r.broadcaster_id.clone());
            if let dashmap::mapref::entry::Entry::Vacant(slot) = entry {
                let mut record = r.clone();
                record.created.get_or_insert_with(Utc::now);
                slot.insert(record);
                inserted.insert(r.broadcaster_id.clone());
            }
        }
        Ok(inserted)
    }
}
