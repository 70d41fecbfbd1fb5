//! Application orchestration layer
//!
//! Connects the catalog, the shelf and the layout engine. Each reader
//! interaction goes through the controller and yields a new layout.

pub mod controller;
pub mod state;

pub use controller::TowerController;
pub use state::{SessionError, SessionEvent, SessionState, Shelf};
