//! Port traits for infrastructure boundaries.
//!
//! The store port is the only abstraction in the engine; it exists so the
//! use cases can be tested against a mock and so the SQLite adapter could be
//! swapped for another relational backend.

use async_trait::async_trait;

use roster_domain::{Page, Player, PlayerFilter, PlayerOrder};

// Absence is an `Option`, not an error, so the only failure class here is
// the database itself.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error("Database error: {0}")]
    Database(String),
}

/// Persistence boundary for player records. No business validation happens
/// behind this trait.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PlayerRepo: Send + Sync {
    /// Point read by id.
    async fn get(&self, id: i64) -> Result<Option<Player>, RepoError>;

    /// Insert a new record; the store assigns the id. Returns the persisted
    /// record with the assigned id populated.
    async fn insert(&self, player: &Player) -> Result<Player, RepoError>;

    /// Persist the full row for an existing id, returning the number of rows
    /// touched (0 when the id vanished between read and write).
    async fn update(&self, player: &Player) -> Result<u64, RepoError>;

    /// Delete by id, returning the number of rows removed (0 or 1).
    async fn delete(&self, id: i64) -> Result<u64, RepoError>;

    /// Filtered, ordered, paginated listing.
    async fn list(
        &self,
        filter: &PlayerFilter,
        order: PlayerOrder,
        page: Page,
    ) -> Result<Vec<Player>, RepoError>;

    /// Unsliced size of the same filtered set `list` enumerates.
    async fn count(&self, filter: &PlayerFilter) -> Result<i64, RepoError>;
}
