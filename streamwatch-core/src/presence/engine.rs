// File: streamwatch-core/src/presence/engine.rs

use std::collections::HashSet;

use tracing::{debug, trace, warn};

use crate::Error;
use crate::models::{Broadcaster, PresenceView, Snapshot, UpdateEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    Live,
    Offline,
}

impl Bucket {
    fn from_live(is_live: bool) -> Self {
        if is_live { Bucket::Live } else { Bucket::Offline }
    }

    fn is_live(self) -> bool {
        self == Bucket::Live
    }
}

/// Owns the `live` and `offline` lists and reconciles partial updates into them.
///
/// Storage order is recency order: records that enter a list are placed at its
/// head. Alphabetical order only exists in the `PresenceView` produced by
/// [`PresenceEngine::view`]. An id is present in at most one list, at most once.
///
/// The engine does no I/O and is not synchronized; callers must funnel all
/// `initialize`/`apply` calls through a single owner (see `PresenceService`).
#[derive(Debug, Clone, Default)]
pub struct PresenceEngine {
    live: Vec<Broadcaster>,
    offline: Vec<Broadcaster>,
}

impl PresenceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_snapshot(snapshot: Snapshot) -> Self {
        let mut engine = Self::new();
        engine.initialize(snapshot);
        engine
    }

    /// Replaces all state with the snapshot.
    ///
    /// Duplicates inside a list keep their first occurrence. An id listed as
    /// both live and offline is kept as live.
    pub fn initialize(&mut self, snapshot: Snapshot) {
        let mut seen: HashSet<String> = HashSet::with_capacity(snapshot.len());

        let mut live = Vec::with_capacity(snapshot.live.len());
        for mut b in snapshot.live {
            if seen.insert(b.id.clone()) {
                b.is_live = true;
                live.push(b);
            } else {
                warn!("Snapshot lists broadcaster {} twice as live; keeping the first", b.id);
            }
        }

        let mut offline = Vec::with_capacity(snapshot.offline.len());
        for mut b in snapshot.offline {
            if seen.insert(b.id.clone()) {
                b.is_live = false;
                offline.push(b);
            } else {
                warn!("Snapshot lists broadcaster {} more than once; keeping the live entry", b.id);
            }
        }

        debug!(
            "Presence engine initialized: {} live, {} offline",
            live.len(),
            offline.len()
        );
        self.live = live;
        self.offline = offline;
    }

    /// Reconciles one update and returns the resulting view.
    ///
    /// A target bucket is derived from `is_live`, or from the current bucket
    /// when `is_live` is absent (unknown ids then land offline). Then:
    /// - already in the target bucket: present fields are patched in place;
    /// - in the other bucket: the merged record moves to the head of the target;
    /// - unknown: a record is built from the update and put at the head.
    ///
    /// Fails only when the event has no id, in which case nothing changes.
    pub fn apply(&mut self, update: &UpdateEvent) -> Result<PresenceView, Error> {
        if update.id.trim().is_empty() {
            return Err(Error::Validation("update event is missing `id`".into()));
        }

        let current = self.locate(&update.id);
        let target = match update.is_live {
            Some(is_live) => Bucket::from_live(is_live),
            None => current.map(|(bucket, _)| bucket).unwrap_or(Bucket::Offline),
        };

        match current {
            Some((bucket, idx)) if bucket == target => {
                let existing = &mut self.bucket_mut(bucket)[idx];
                patch(existing, update);
                trace!("Patched broadcaster {} in place", update.id);
            }
            Some((bucket, idx)) => {
                let existing = self.bucket_mut(bucket).remove(idx);
                let moved = merge(existing, update, target.is_live());
                debug!(
                    "Broadcaster {} moved to {}",
                    moved.id,
                    if target.is_live() { "live" } else { "offline" }
                );
                self.bucket_mut(target).insert(0, moved);
            }
            None => {
                let created = synthesize(update, target.is_live());
                debug!("New broadcaster {} observed through an update", created.id);
                self.bucket_mut(target).insert(0, created);
            }
        }

        Ok(self.view())
    }

    /// Both lists sorted by name. Equal names keep their recency order.
    pub fn view(&self) -> PresenceView {
        let mut live = self.live.clone();
        let mut offline = self.offline.clone();
        sort_by_name(&mut live);
        sort_by_name(&mut offline);
        PresenceView { live, offline }
    }

    /// Live list in storage (most-recent-first) order.
    pub fn live(&self) -> &[Broadcaster] {
        &self.live
    }

    /// Offline list in storage (most-recent-first) order.
    pub fn offline(&self) -> &[Broadcaster] {
        &self.offline
    }

    pub fn get(&self, id: &str) -> Option<&Broadcaster> {
        self.locate(id).map(|(bucket, idx)| match bucket {
            Bucket::Live => &self.live[idx],
            Bucket::Offline => &self.offline[idx],
        })
    }

    pub fn len(&self) -> usize {
        self.live.len() + self.offline.len()
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.offline.is_empty()
    }

    fn locate(&self, id: &str) -> Option<(Bucket, usize)> {
        let in_live = self.live.iter().position(|b| b.id == id);
        let in_offline = self.offline.iter().position(|b| b.id == id);
        debug_assert!(
            in_live.is_none() || in_offline.is_none(),
            "broadcaster {id} is in both lists"
        );

        match (in_live, in_offline) {
            (Some(idx), _) => Some((Bucket::Live, idx)),
            (None, Some(idx)) => Some((Bucket::Offline, idx)),
            (None, None) => None,
        }
    }

    fn bucket_mut(&mut self, bucket: Bucket) -> &mut Vec<Broadcaster> {
        match bucket {
            Bucket::Live => &mut self.live,
            Bucket::Offline => &mut self.offline,
        }
    }
}

fn patch(existing: &mut Broadcaster, update: &UpdateEvent) {
    if let Some(name) = &update.name {
        existing.name.clone_from(name);
    }
    if let Some(category) = &update.category {
        existing.category.clone_from(category);
    }
    if let Some(title) = &update.title {
        existing.title.clone_from(title);
    }
    if let Some(is_live) = update.is_live {
        existing.is_live = is_live;
    }
}

fn merge(existing: Broadcaster, update: &UpdateEvent, is_live: bool) -> Broadcaster {
    Broadcaster {
        id: existing.id,
        name: update.name.clone().unwrap_or(existing.name),
        category: update.category.clone().unwrap_or(existing.category),
        title: update.title.clone().unwrap_or(existing.title),
        is_live,
        profile_picture: existing.profile_picture,
    }
}

fn synthesize(update: &UpdateEvent, is_live: bool) -> Broadcaster {
    Broadcaster {
        id: update.id.clone(),
        name: update.name.clone().unwrap_or_default(),
        category: update.category.clone().unwrap_or_default(),
        title: update.title.clone().unwrap_or_default(),
        is_live,
        profile_picture: None,
    }
}

/// Stable sort by `str::cmp`: byte-wise, case-sensitive, no locale collation.
fn sort_by_name(list: &mut [Broadcaster]) {
    list.sort_by(|a, b| a.name.cmp(&b.name));
}
