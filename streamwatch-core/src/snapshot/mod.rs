// File: streamwatch-core/src/snapshot/mod.rs
//
// Startup snapshot: one bulk read of every followed channel, split into the
// disjoint live/offline lists the presence engine is initialized with.

use std::sync::Arc;

use tokio::time::Duration;
use tracing::{debug, info};

use crate::Error;
use crate::models::{Snapshot, StreamerRecord};
use crate::repositories::StreamerRepository;
use crate::utils::retry::RetryPolicy;

pub struct SnapshotLoader {
    repo: Arc<dyn StreamerRepository>,
    retry: RetryPolicy,
}

impl SnapshotLoader {
    pub fn new(repo: Arc<dyn StreamerRepository>) -> Self {
        Self {
            repo,
            retry: RetryPolicy::new(5, Duration::from_millis(50)),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Registers channels that have no stored record yet. Existing records are
    /// left alone; the ids actually inserted are logged.
    pub async fn register(&self, records: &[StreamerRecord]) -> Result<usize, Error> {
        if records.is_empty() {
            return Ok(0);
        }
        let inserted = self.repo.insert_if_absent(records).await?;
        info!(
            "Registered {} of {} followed streamers",
            inserted.len(),
            records.len()
        );
        Ok(inserted.len())
    }

    /// Reads the stored state of `broadcaster_ids` and partitions it.
    ///
    /// Ids are de-duplicated first. Unknown ids are skipped.
    pub async fn load(&self, broadcaster_ids: &[String]) -> Result<Snapshot, Error> {
        let mut ids: Vec<String> = broadcaster_ids
            .iter()
            .map(|id| id.trim())
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect();
        ids.sort();
        ids.dedup();

        if ids.is_empty() {
            debug!("No followed streamers; starting from an empty snapshot");
            return Ok(Snapshot::default());
        }

        let ids_ref = &ids;
        let records = self
            .retry
            .run("snapshot bulk read", || self.repo.batch_get(ids_ref))
            .await?;

        if records.len() < ids.len() {
            debug!(
                "{} followed streamers have no stored record yet",
                ids.len() - records.len()
            );
        }

        let snapshot = Snapshot::from_records(records);
        info!(
            "Loaded snapshot: {} live, {} offline",
            snapshot.live.len(),
            snapshot.offline.len()
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryStreamerRepository, MockStreamerRepository};
    use std::sync::atomic::{AtomicU32, Ordering};

    fn record(id: &str, name: &str, is_live: bool) -> StreamerRecord {
        let mut r = StreamerRecord::new(id);
        r.broadcaster_name = name.into();
        r.is_live = is_live;
        r
    }

    #[tokio::test]
    async fn partitions_and_skips_unknown_ids() {
        let repo = InMemoryStreamerRepository::with_records([
            record("1", "Bob", false),
            record("2", "Ann", true),
        ]);
        let loader = SnapshotLoader::new(Arc::new(repo));

        let snap = loader
            .load(&["2".into(), "1".into(), "2".into(), "99".into(), " ".into()])
            .await
            .unwrap();

        assert_eq!(snap.live.len(), 1);
        assert_eq!(snap.live[0].name, "Ann");
        assert_eq!(snap.offline.len(), 1);
        assert_eq!(snap.offline[0].name, "Bob");
    }

    #[tokio::test]
    async fn empty_id_list_skips_the_store() {
        let mut mock = MockStreamerRepository::new();
        mock.expect_batch_get().never();
        let loader = SnapshotLoader::new(Arc::new(mock));

        let snap = loader.load(&[]).await.unwrap();
        assert!(snap.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn bulk_read_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let seen = calls.clone();
        let mut mock = MockStreamerRepository::new();
        mock.expect_batch_get().times(2).returning(move |ids| {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(Error::Store("throttled".into()))
            } else {
                Ok(ids.iter().map(|id| record(id, "X", true)).collect())
            }
        });
        let loader = SnapshotLoader::new(Arc::new(mock));

        let snap = loader.load(&["5".into()]).await.unwrap();
        assert_eq!(snap.live.len(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn register_only_counts_new_rows() {
        let repo = Arc::new(InMemoryStreamerRepository::with_records([record("1", "Bob", false)]));
        let loader = SnapshotLoader::new(repo.clone());

        let n = loader
            .register(&[record("1", "Other", true), record("2", "Ann", false)])
            .await
            .unwrap();

        assert_eq!(n, 1);
        assert_eq!(repo.len(), 2);
        assert_eq!(repo.get("1").await.unwrap().unwrap().broadcaster_name, "Bob");
    }
}
