//! Book tower: stack the books you've read into a picture
//!
//! A session searches a catalog, shelves picked books and lays them out as a
//! staggered tower of spines whose heights follow their page counts. The
//! layout is deterministic for a given shelf, so every redraw is identical.

pub mod app;
pub mod catalog;
pub mod config;
pub mod domain;
pub mod recommend;
pub mod ui;

pub use app::{SessionEvent, TowerController};
pub use config::TowerConfig;
pub use domain::book::{BookRecord, Rgb, parse_page_count};
pub use domain::tower::{PlacedBook, StackOrder, TowerLayout, layout};
