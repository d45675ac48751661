// streamwatch-server/src/feed.rs
//
// NDJSON event source in, JSON-line views out.

use std::path::Path;

use tokio::fs::File;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use streamwatch_core::Error;
use streamwatch_core::models::PresenceView;
use streamwatch_core::services::EventIngress;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FeedStats {
    pub lines: usize,
    pub published: usize,
    pub ignored: usize,
    pub rejected: usize,
}

pub async fn open_source(path: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin + Send>, Error> {
    match path {
        Some(p) => {
            info!("Reading events from {}", p.display());
            let file = File::open(p).await?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => {
            info!("Reading events from stdin");
            Ok(Box::new(BufReader::new(io::stdin())))
        }
    }
}

/// Feeds every line of `reader` through `ingress` until end of input.
/// Bad lines are logged and skipped; only I/O and bus failures stop the feed.
pub async fn pump_events<R>(reader: R, ingress: &EventIngress) -> Result<FeedStats, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = FeedStats::default();
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.lines += 1;

        match ingress.ingest_json(line).await {
            Ok(true) => stats.published += 1,
            Ok(false) => stats.ignored += 1,
            Err(e) if e.is_validation() => {
                warn!("Rejected event on line {}: {}", stats.lines, e);
                stats.rejected += 1;
            }
            Err(Error::Json(e)) => {
                warn!("Malformed JSON on line {}: {}", stats.lines, e);
                stats.rejected += 1;
            }
            Err(e) => {
                error!("Event feed stopped on line {}: {}", stats.lines, e);
                return Err(e);
            }
        }
    }

    info!(
        "Event feed finished: {} lines, {} published, {} ignored, {} rejected",
        stats.lines, stats.published, stats.ignored, stats.rejected
    );
    Ok(stats)
}

/// Writes each view as one JSON line until the sender side closes.
pub async fn write_views<W>(mut rx: mpsc::Receiver<PresenceView>, mut out: W) -> Result<usize, Error>
where
    W: AsyncWrite + Unpin,
{
    let mut written = 0;
    while let Some(view) = rx.recv().await {
        debug!("View: {} live, {} offline", view.live.len(), view.offline.len());
        let mut line = serde_json::to_vec(&view)?;
        line.push(b'\n');
        out.write_all(&line).await?;
        out.flush().await?;
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use streamwatch_core::eventbus::{BusEvent, EventBus};
    use streamwatch_core::models::Broadcaster;

    #[tokio::test]
    async fn test_pump_counts_outcomes() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe(Some(16)).await;
        let ingress = EventIngress::new(bus.clone());

        let input = concat!(
            "{\"id\":\"1\",\"is_live\":true}\n",
            "\n",
            "{\"type\":\"ka\"}\n",
            "{\"name\":\"no id\"}\n",
            "not json\n",
            "{\"broadcaster_id\":2,\"title\":\"t\"}\n",
        );
        let stats = pump_events(input.as_bytes(), &ingress).await.unwrap();

        assert_eq!(
            stats,
            FeedStats { lines: 5, published: 2, ignored: 1, rejected: 2 }
        );
        for expected in ["1", "2"] {
            match rx.recv().await.unwrap() {
                BusEvent::StreamerUpdate(u) => assert_eq!(u.id, expected),
                other => panic!("unexpected {}", other.event_type()),
            }
        }
    }

    #[tokio::test]
    async fn test_pump_stops_when_bus_is_down() {
        let bus = Arc::new(EventBus::new());
        let ingress = EventIngress::new(bus.clone());
        bus.shutdown();

        let res = pump_events("{\"id\":\"1\"}\n".as_bytes(), &ingress).await;
        assert!(matches!(res, Err(Error::EventBus(_))));
    }

    #[tokio::test]
    async fn test_views_are_json_lines() {
        let (tx, rx) = mpsc::channel(4);
        let mut view = PresenceView::default();
        view.offline.push(Broadcaster::new("1", "Bob"));
        tx.send(PresenceView::default()).await.unwrap();
        tx.send(view).await.unwrap();
        drop(tx);

        let mut out = Vec::new();
        let n = tokio_test::assert_ok!(write_views(rx, &mut out).await);
        assert_eq!(n, 2);
        assert_eq!(
            String::from_utf8(out).unwrap(),
            concat!(
                "{\"live\":[],\"offline\":[]}\n",
                "{\"live\":[],\"offline\":[{\"id\":\"1\",\"name\":\"Bob\",\"category\":\"\",\"title\":\"\",\"is_live\":false}]}\n",
            )
        );
    }
}
