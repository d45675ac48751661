//! src/services/persistence_service.rs
//!
//! Writes each validated update to the store as a partial write. Runs
//! alongside the presence engine; a failed write never rolls back the view.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use crate::Error;
use crate::eventbus::{BusEvent, EventBus};
use crate::models::UpdateEvent;
use crate::repositories::{PartialUpdate, StreamerRepository};
use crate::utils::retry::RetryPolicy;

pub struct PersistenceService {
    repo: Arc<dyn StreamerRepository>,
    retry: RetryPolicy,
    written: AtomicU64,
    failed: AtomicU64,
}

impl PersistenceService {
    pub fn new(repo: Arc<dyn StreamerRepository>) -> Self {
        Self {
            repo,
            retry: RetryPolicy::default(),
            written: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn written_count(&self) -> u64 {
        self.written.load(Ordering::Relaxed)
    }

    /// Writes that exhausted their retries. Each one is a store/view desync.
    pub fn failed_count(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    /// Persists the present fields of `update`, stamping `updated`.
    /// Returns `Ok(false)` when there was nothing to write.
    pub async fn persist(&self, update: &UpdateEvent) -> Result<bool, Error> {
        let write = PartialUpdate::from_update(update);
        if write.is_noop() {
            trace!("Nothing to persist for '{}'", update.id);
            return Ok(false);
        }
        let write = write.stamped(Utc::now());
        if let Some(expr) = write.update_expression() {
            debug!("Persisting '{}': {}", write.key(), expr);
        }

        let what = format!("write for streamer '{}'", write.key());
        let write_ref = &write;
        self.retry
            .run(&what, || self.repo.update_partial(write_ref))
            .await?;
        self.written.fetch_add(1, Ordering::Relaxed);
        Ok(true)
    }

    async fn handle_event(&self, event: &BusEvent) {
        let BusEvent::StreamerUpdate(update) = event else {
            return;
        };
        if let Err(e) = self.persist(update).await {
            self.failed.fetch_add(1, Ordering::Relaxed);
            error!(
                "Store is out of sync with the live view for '{}': {}",
                update.id, e
            );
        }
    }

    /// Subscribes to `bus` and persists updates until the bus shuts down.
    pub async fn spawn(self: Arc<Self>, bus: &EventBus, buffer_size: Option<usize>) -> JoinHandle<()> {
        let mut rx = bus.subscribe(buffer_size).await;
        let mut shutdown_rx = bus.shutdown_rx.clone();

        tokio::spawn(async move {
            info!("Persistence service started");
            loop {
                tokio::select! {
                    biased;
                    maybe_event = rx.recv() => {
                        match maybe_event {
                            Some(event) => self.handle_event(&event).await,
                            None => {
                                info!("Persistence channel closed => break from loop.");
                                break;
                            }
                        }
                    },
                    Ok(_) = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("Persistence service shutting down => break from loop.");
                            break;
                        }
                    }
                }
            }

            while let Ok(event) = rx.try_recv() {
                self.handle_event(&event).await;
            }
            info!(
                "Persistence service exited ({} written, {} failed).",
                self.written_count(),
                self.failed_count()
            );
        })
    }
}
