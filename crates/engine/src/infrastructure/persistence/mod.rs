//! SQLite persistence adapter.

pub mod connection;
pub mod player_repository;

pub use connection::connect;
pub use player_repository::SqlitePlayerRepo;
