//! Configuration module for book-tower
//!
//! Holds the constants of the height formula, the stagger cycle, label
//! truncation and rendering scale, plus loading them from a JSON file.

pub mod tower;

pub use tower::{ConfigError, TowerConfig};
