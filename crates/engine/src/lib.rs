//! Roster Engine library.
//!
//! Server-side code for the player roster service.
//!
//! ## Structure
//!
//! - `use_cases/` - request/response orchestration over the store port
//! - `infrastructure/` - port traits and the SQLite adapter
//! - `api/` - HTTP entry points
//! - `app` - application composition

pub mod api;
pub mod app;
pub mod infrastructure;
pub mod use_cases;

pub use app::App;
