// File: streamwatch-common/src/models/mod.rs
pub mod broadcaster;
pub mod streamer;
pub mod update;

pub use broadcaster::{Broadcaster, PresenceView, Snapshot};
pub use streamer::StreamerRecord;
pub use update::{RawUpdateEvent, UpdateEvent};
