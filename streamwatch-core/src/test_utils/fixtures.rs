// File: streamwatch-core/src/test_utils/fixtures.rs

use crate::models::{Broadcaster, Snapshot, StreamerRecord};

pub fn live(id: &str, name: &str) -> Broadcaster {
    let mut b = Broadcaster::new(id, name);
    b.is_live = true;
    b
}

pub fn offline(id: &str, name: &str) -> Broadcaster {
    Broadcaster::new(id, name)
}

pub fn record(id: &str, name: &str, is_live: bool) -> StreamerRecord {
    let mut r = StreamerRecord::new(id);
    r.broadcaster_name = name.to_string();
    r.is_live = is_live;
    r
}

/// Ann and Cat live, Bob offline.
pub fn sample_snapshot() -> Snapshot {
    Snapshot::new(
        vec![live("1", "Ann"), live("3", "Cat")],
        vec![offline("2", "Bob")],
    )
}

pub fn ids(view_list: &[Broadcaster]) -> Vec<&str> {
    view_list.iter().map(|b| b.id.as_str()).collect()
}
