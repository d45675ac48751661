// File: streamwatch-core/src/presence/mod.rs
//
// In-memory presence reconciliation: the engine that keeps the live/offline
// lists consistent with incoming partial updates, plus the validation that
// turns raw wire events into `UpdateEvent`s.

pub mod engine;
pub mod validate;

pub use engine::PresenceEngine;
pub use validate::{parse_update, validate};
