//! Application state and composition.

use std::sync::Arc;

use crate::infrastructure::ports::PlayerRepo;
use crate::use_cases::PlayerOps;

/// Main application state, passed to HTTP handlers via axum state.
pub struct App {
    pub players: PlayerOps,
}

impl App {
    pub fn new(repo: Arc<dyn PlayerRepo>) -> Self {
        Self {
            players: PlayerOps::new(repo),
        }
    }
}
