//! External dependency implementations (ports + adapters).

pub mod persistence;
pub mod ports;
