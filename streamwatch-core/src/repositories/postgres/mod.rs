// File: streamwatch-core/src/repositories/postgres/mod.rs

pub mod streamers;

pub use streamers::PostgresStreamerRepository;
