// File: src/platforms/mod.rs
//
// Wire formats that carry streamer changes into the engine.

pub mod realtime;
pub mod twitch_eventsub;
