//! Infrastructure layer: configuration, database connection, user stores.

pub mod config;
pub mod db;
pub mod store;
