// src/repositories/mod.rs

use std::collections::HashSet;

use async_trait::async_trait;

use crate::Error;
use crate::models::StreamerRecord;

pub mod memory;
pub mod partial_update;
pub mod postgres;

pub use memory::InMemoryStreamerRepository;
pub use partial_update::{FieldValue, PartialUpdate, StreamerField};
pub use postgres::streamers::PostgresStreamerRepository;

/// Durable store of streamer records keyed by `broadcaster_id`.
///
/// Implementations surface backend failures unchanged and never retry;
/// retry policy belongs to the caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StreamerRepository: Send + Sync {
    /// Writes only the fields listed in `update`. An empty update is a no-op.
    async fn update_partial(&self, update: &PartialUpdate) -> Result<(), Error>;

    async fn get(&self, broadcaster_id: &str) -> Result<Option<StreamerRecord>, Error>;

    /// Ids with no record are simply absent from the result.
    async fn batch_get(&self, broadcaster_ids: &[String]) -> Result<Vec<StreamerRecord>, Error>;

    /// Inserts full records for ids not stored yet and returns those ids.
    async fn insert_if_absent(&self, records: &[StreamerRecord]) -> Result<HashSet<String>, Error>;
}
