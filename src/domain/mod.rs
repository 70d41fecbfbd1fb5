//! Domain logic and core data structures
//!
//! Pure book-tower logic with no knowledge of files, catalogs or pixels.

pub mod book;
pub mod core;
pub mod palette;
pub mod tower;
