// Shared building blocks for the setup randomizer: session record types,
// catalog master data, configuration loading, and the SQLite record store.

pub mod catalog;
pub mod config;
pub mod db;
pub mod record;
pub mod store;
