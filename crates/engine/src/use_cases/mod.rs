//! Use-case orchestration over the store port.

pub mod players;

pub use players::{PlayerError, PlayerOps};
