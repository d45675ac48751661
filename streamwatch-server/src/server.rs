// streamwatch-server/src/server.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use streamwatch_core::Database;
use streamwatch_core::Error;
use streamwatch_core::eventbus::EventBus;
use streamwatch_core::models::StreamerRecord;
use streamwatch_core::repositories::{
    InMemoryStreamerRepository, PostgresStreamerRepository, StreamerRepository,
};
use streamwatch_core::services::{EventIngress, PersistenceService, PresenceService};
use streamwatch_core::snapshot::SnapshotLoader;
use streamwatch_core::utils::retry::RetryPolicy;

use crate::Args;
use crate::feed;

const VIEW_BUFFER: usize = 256;

async fn open_store(args: &Args) -> Result<Arc<dyn StreamerRepository>, Error> {
    if args.in_memory {
        info!("Using the in-memory streamer store");
        return Ok(Arc::new(InMemoryStreamerRepository::new()));
    }

    let db = Database::new(&args.db_url).await?;
    if args.skip_migrations {
        warn!("Skipping migrations; the schema must already be current");
    } else {
        db.migrate().await?;
    }
    Ok(Arc::new(PostgresStreamerRepository::new(db.pool().clone())))
}

async fn read_seed(args: &Args) -> Result<Vec<StreamerRecord>, Error> {
    let Some(path) = &args.seed else {
        return Ok(Vec::new());
    };
    let raw = tokio::fs::read_to_string(path).await?;
    let records: Vec<StreamerRecord> = serde_json::from_str(&raw)?;
    info!("Read {} seed records from {}", records.len(), path.display());
    Ok(records)
}

/// Followed ids from the command line, plus every seeded id.
fn followed_ids(args: &Args, seed: &[StreamerRecord]) -> Vec<String> {
    args.broadcaster_ids
        .iter()
        .map(|id| id.trim().to_string())
        .filter(|id| !id.is_empty())
        .chain(seed.iter().map(|r| r.broadcaster_id.clone()))
        .collect()
}

pub async fn run_server(args: Args) -> Result<(), Error> {
    let repo = open_store(&args).await?;

    let seed = read_seed(&args).await?;
    let loader = SnapshotLoader::new(repo.clone());
    loader.register(&seed).await?;

    let bus = Arc::new(EventBus::new());
    let (view_tx, view_rx) = mpsc::channel(VIEW_BUFFER);
    let printer = tokio::spawn(feed::write_views(view_rx, tokio::io::stdout()));

    let presence = Arc::new(PresenceService::new().with_sink(view_tx));
    let write_retry = RetryPolicy::new(
        args.write_retries,
        Duration::from_millis(args.retry_backoff_ms),
    );
    let persistence = Arc::new(PersistenceService::new(repo.clone()).with_retry(write_retry));

    let presence_task = presence.clone().spawn(&bus, None).await;
    let persistence_task = persistence.clone().spawn(&bus, None).await;

    let ingress = EventIngress::new(bus.clone());
    let snapshot = loader.load(&followed_ids(&args, &seed)).await?;
    ingress.publish_snapshot(snapshot).await;

    let source = feed::open_source(args.events.as_deref()).await?;
    let fed = feed::pump_events(source, &ingress).await;

    info!("End of input; shutting down.");
    bus.shutdown();
    if let Err(e) = presence_task.await {
        warn!("Presence task ended abnormally: {:?}", e);
    }
    if let Err(e) = persistence_task.await {
        warn!("Persistence task ended abnormally: {:?}", e);
    }
    if persistence.failed_count() > 0 {
        warn!(
            "{} writes failed; the store is behind the live view until the next snapshot",
            persistence.failed_count()
        );
    }

    // Last sender goes away with the service, which ends the printer.
    drop(presence);
    match printer.await {
        Ok(Ok(n)) => info!("Printed {} views", n),
        Ok(Err(e)) => warn!("View printer failed: {}", e),
        Err(e) => warn!("View printer ended abnormally: {:?}", e),
    }

    fed.map(|_| ())
}
