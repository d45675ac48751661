// src/lib.rs

pub mod db;
pub mod eventbus;
pub mod platforms;
pub mod presence;
pub mod repositories;
pub mod services;
pub mod snapshot;
pub mod test_utils;
pub mod utils;

pub use db::Database;
pub use streamwatch_common::error::Error;
pub use streamwatch_common::models;
