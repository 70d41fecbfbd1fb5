//! Tower layout engine
//!
//! Turns the ordered list of shelved books into stacked rectangles. The
//! computation is a pure function of the records and the configuration:
//! horizontal jitter depends only on the stacking index and colors come
//! from the records, so redrawing the same shelf always yields the same
//! tower.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TowerConfig;
use crate::domain::book::{BookRecord, Rgb, truncate_label};
use crate::domain::core::Rect;

/// Which end of the shelf sits at the bottom of the tower
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StackOrder {
    /// First book added is at the bottom
    #[default]
    Insertion,
    /// Most recently added book is at the bottom
    Reverse,
}

/// A book positioned in the tower, in layout units
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedBook {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub color: Rgb,
    pub label: String,
    /// Position of the record in the shelf (insertion order)
    pub source_index: usize,
}

impl PlacedBook {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Result of laying out a shelf
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TowerLayout {
    /// Books from the bottom of the tower to the top
    pub books: Vec<PlacedBook>,
    /// Drawing extent including margin, `None` for an empty shelf
    pub bounds: Option<Rect>,
}

impl TowerLayout {
    /// Lays out `books` with the order and constants from `config`
    pub fn compute(books: &[BookRecord], config: &TowerConfig) -> Self {
        layout(books, config.order, config)
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Sum of book heights plus the gaps between them
    pub fn total_height(&self) -> f32 {
        match (self.books.first(), self.books.last()) {
            (Some(bottom), Some(top)) => top.y + top.height - bottom.y,
            _ => 0.0,
        }
    }
}

/// Height of a book with `pages` pages, bounded to the configured range
///
/// Out-of-range constants fall back to their defaults, so the result is
/// always finite and within the (reordered) bounds.
pub fn height_for_pages(pages: u32, config: &TowerConfig) -> f32 {
    let (min, max) = config.height_range();
    let raw = config.effective_base_height() + pages as f32 / config.effective_page_divisor();
    raw.clamp(min, max)
}

/// Horizontal jitter for the book at `index` in stacking order
///
/// Magnitudes cycle through `offset_steps`; the sign alternates with the
/// parity of the index.
pub fn horizontal_offset(index: usize, config: &TowerConfig) -> f32 {
    let steps = &config.offset_steps;
    if steps.is_empty() {
        return 0.0;
    }

    let magnitude = steps[index % steps.len()];
    if index % 2 == 0 { magnitude } else { -magnitude }
}

/// Places `books` bottom-up in the requested stacking order
///
/// Never fails: an empty shelf produces an empty layout with no bounds, and
/// a malformed `config` is repaired before use.
pub fn layout(books: &[BookRecord], order: StackOrder, config: &TowerConfig) -> TowerLayout {
    if books.is_empty() {
        return TowerLayout::default();
    }
    let config = &config.sanitized();

    let stacking: Vec<(usize, &BookRecord)> = match order {
        StackOrder::Insertion => books.iter().enumerate().collect(),
        StackOrder::Reverse => books.iter().enumerate().rev().collect(),
    };

    let mut placed = Vec::with_capacity(books.len());
    let mut cursor = 0.0_f32;
    let left = -config.book_width / 2.0;

    for (stack_index, (source_index, book)) in stacking.into_iter().enumerate() {
        let height = height_for_pages(book.page_count(), config);
        placed.push(PlacedBook {
            x: left + horizontal_offset(stack_index, config),
            y: cursor,
            width: config.book_width,
            height,
            color: book.color(),
            label: truncate_label(book.title(), config.label_max_chars, &config.label_marker),
            source_index,
        });
        cursor += height;
        if stack_index + 1 < books.len() {
            cursor += config.gap;
        }
    }

    let bounds = placed
        .iter()
        .map(PlacedBook::rect)
        .reduce(|acc, rect| acc.union(&rect))
        .map(|extent| extent.expand(config.margin));

    debug!(
        books = placed.len(),
        height = cursor,
        ?order,
        "laid out book tower"
    );

    TowerLayout {
        books: placed,
        bounds,
    }
}
