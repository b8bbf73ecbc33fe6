//! Roster domain.
//!
//! Pure domain layer for the player roster service:
//!
//! - `player` - the Player entity, request shapes, and the closed
//!   race/profession vocabularies
//! - `progression` - level / until-next-level derivation
//! - `validation` - field constraint checks for create and partial update
//! - `filter` - the typed filter / order / page vocabulary for listing

pub mod filter;
pub mod player;
pub mod progression;
pub mod validation;

pub use filter::{Page, PlayerFilter, PlayerOrder};
pub use player::{Player, PlayerDraft, PlayerPatch, Profession, Race};
pub use validation::ValidationError;
