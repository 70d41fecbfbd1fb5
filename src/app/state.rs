//! Session state
//!
//! The shelf is the only long-lived state of a session. It is owned by the
//! controller and passed explicitly to whatever needs to read it; only
//! [`Shelf::add`] and [`Shelf::reset`] change it.

use serde::Deserialize;
use thiserror::Error;

use crate::catalog::{CandidateBook, SearchQuery};
use crate::domain::book::{BookRecord, RawPageCount, Rgb};
use crate::domain::palette::ColorPicker;

/// Saved book as written in a shelf file
#[derive(Debug, Deserialize)]
struct ShelfEntry {
    title: String,
    #[serde(default)]
    pages: RawPageCount,
    #[serde(default)]
    color: Option<Rgb>,
}

/// Books saved during the current session, in insertion order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Shelf {
    books: Vec<BookRecord>,
}

impl Shelf {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a candidate, assigning its color once and for all
    pub fn add(&mut self, candidate: &CandidateBook, picker: &mut dyn ColorPicker) -> &BookRecord {
        let record = BookRecord::new(candidate.title.clone(), candidate.pages, picker.pick());
        self.books.push(record);
        &self.books[self.books.len() - 1]
    }

    /// Builds a shelf from a JSON array of `{title, pages, color}` objects
    ///
    /// Entries without a color get one from `picker`, in file order.
    pub fn from_json_str(json: &str, picker: &mut dyn ColorPicker) -> Result<Self, serde_json::Error> {
        let entries: Vec<ShelfEntry> = serde_json::from_str(json)?;
        let books = entries
            .into_iter()
            .map(|entry| {
                let color = entry.color.unwrap_or_else(|| picker.pick());
                BookRecord::new(entry.title, Some(entry.pages.resolve()), color)
            })
            .collect();
        Ok(Self { books })
    }

    /// Empties the shelf
    pub fn reset(&mut self) {
        self.books.clear();
    }

    pub fn books(&self) -> &[BookRecord] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }
}

/// Where the reader is in the search-then-pick flow
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing to pick from
    #[default]
    Idle,
    /// The last search produced candidates
    Choosing { candidates: Vec<CandidateBook> },
}

impl SessionState {
    pub fn candidates(&self) -> &[CandidateBook] {
        match self {
            SessionState::Idle => &[],
            SessionState::Choosing { candidates } => candidates,
        }
    }
}

/// One reader interaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Look up books in the catalog
    Search(SearchQuery),
    /// Add the candidate at this position of the last search
    Pick(usize),
    /// Clear the shelf
    Reset,
    /// Redraw without changing anything
    Refresh,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("There are no search results to pick from")]
    NothingToPick,
    #[error("Pick {index} is out of range, only {available} candidates are listed")]
    PickOutOfRange { index: usize, available: usize },
}
