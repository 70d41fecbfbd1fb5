//! Render surface for the book tower
//!
//! Everything here works in pixels; layout units stop at the scene builder.

pub mod renderer;

pub use renderer::{RendererError, TowerRenderer, TowerScene};
