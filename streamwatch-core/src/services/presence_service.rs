//! src/services/presence_service.rs
//!
//! Owns the presence engine and feeds it from the event bus. Every applied
//! update produces a fresh view, published on a watch channel and, when a
//! sink is attached, pushed in order to that sink.

use std::sync::Arc;
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::eventbus::{BusEvent, EventBus};
use crate::models::PresenceView;
use crate::presence::PresenceEngine;

pub struct PresenceService {
    engine: Mutex<PresenceEngine>,
    views_tx: watch::Sender<PresenceView>,
    sink: Option<mpsc::Sender<PresenceView>>,
}

impl Default for PresenceService {
    fn default() -> Self {
        Self::new()
    }
}

impl PresenceService {
    pub fn new() -> Self {
        let (views_tx, _) = watch::channel(PresenceView::default());
        Self {
            engine: Mutex::new(PresenceEngine::new()),
            views_tx,
            sink: None,
        }
    }

    /// Every view, in order. A slow sink slows the service down.
    pub fn with_sink(mut self, sink: mpsc::Sender<PresenceView>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Latest view only; intermediate views may be skipped by slow readers.
    pub fn views(&self) -> watch::Receiver<PresenceView> {
        self.views_tx.subscribe()
    }

    pub fn current_view(&self) -> PresenceView {
        self.views_tx.borrow().clone()
    }

    /// Applies one bus event. Returns the new view, or None when the event
    /// was ignored or rejected.
    pub async fn handle_event(&self, event: &BusEvent) -> Option<PresenceView> {
        let view = {
            let mut engine = self.engine.lock().await;
            match event {
                BusEvent::Snapshot(snapshot) => {
                    engine.initialize(snapshot.clone());
                    info!(
                        "Presence initialized: {} live, {} offline",
                        engine.live().len(),
                        engine.offline().len()
                    );
                    engine.view()
                }
                BusEvent::StreamerUpdate(update) => match engine.apply(update) {
                    Ok(view) => view,
                    Err(e) => {
                        warn!("Dropping update for '{}': {}", update.id, e);
                        return None;
                    }
                },
                BusEvent::SystemMessage(_) => return None,
            }
        };

        self.views_tx.send_replace(view.clone());
        if let Some(sink) = &self.sink {
            if sink.send(view.clone()).await.is_err() {
                debug!("Presence view sink closed");
            }
        }
        Some(view)
    }

    /// Subscribes to `bus` and applies events until the bus shuts down.
    /// Events already queued at shutdown are still applied.
    pub async fn spawn(self: Arc<Self>, bus: &EventBus, buffer_size: Option<usize>) -> JoinHandle<()> {
        let mut rx = bus.subscribe(buffer_size).await;
        let mut shutdown_rx = bus.shutdown_rx.clone();

        tokio::spawn(async move {
            info!("Presence service started");
            loop {
                tokio::select! {
                    biased;
                    maybe_event = rx.recv() => {
                        match maybe_event {
                            Some(event) => {
                                self.handle_event(&event).await;
                            }
                            None => {
                                info!("Presence service channel closed => break from loop.");
                                break;
                            }
                        }
                    },
                    Ok(_) = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            info!("Presence service shutting down => break from loop.");
                            break;
                        }
                    }
                }
            }

            while let Ok(event) = rx.try_recv() {
                self.handle_event(&event).await;
            }
            info!("Presence service exited.");
        })
    }
}
