//! Application controller
//!
//! Owns the session (catalog, color picker, shelf and search state) and
//! turns each reader interaction into a fresh tower layout.

use tracing::{debug, info, warn};

use crate::app::state::{SessionError, SessionEvent, SessionState, Shelf};
use crate::catalog::{CandidateBook, CatalogLookup, SearchQuery};
use crate::config::TowerConfig;
use crate::domain::palette::ColorPicker;
use crate::domain::tower::TowerLayout;

/// Session driver: one event in, one layout out
pub struct TowerController<C, P> {
    catalog: C,
    picker: P,
    config: TowerConfig,
    shelf: Shelf,
    state: SessionState,
}

impl<C, P> TowerController<C, P>
where
    C: CatalogLookup,
    P: ColorPicker,
{
    /// Creates a controller with an empty shelf; `config` is sanitized here
    pub fn new(catalog: C, picker: P, config: TowerConfig) -> Self {
        Self {
            catalog,
            picker,
            config: config.sanitized(),
            shelf: Shelf::new(),
            state: SessionState::Idle,
        }
    }

    pub fn shelf(&self) -> &Shelf {
        &self.shelf
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &TowerConfig {
        &self.config
    }

    /// Current candidates, empty unless a search is awaiting a pick
    pub fn candidates(&self) -> &[CandidateBook] {
        self.state.candidates()
    }

    /// Lays out the shelf as it stands
    pub fn layout(&self) -> TowerLayout {
        TowerLayout::compute(self.shelf.books(), &self.config)
    }

    /// Applies one interaction and returns the layout to redraw
    ///
    /// A rejected pick leaves the session untouched.
    pub fn handle(&mut self, event: SessionEvent) -> Result<TowerLayout, SessionError> {
        match event {
            SessionEvent::Search(query) => self.search(&query),
            SessionEvent::Pick(index) => self.pick(index)?,
            SessionEvent::Reset => {
                info!(books = self.shelf.len(), "resetting shelf");
                self.shelf.reset();
                self.state = SessionState::Idle;
            }
            SessionEvent::Refresh => {}
        }

        Ok(self.layout())
    }

    fn search(&mut self, query: &SearchQuery) {
        let candidates = self.catalog.search(query);
        info!(
            query = %query.to_query_string(),
            results = candidates.len(),
            "catalog search"
        );

        self.state = if candidates.is_empty() {
            SessionState::Idle
        } else {
            SessionState::Choosing { candidates }
        };
    }

    fn pick(&mut self, index: usize) -> Result<(), SessionError> {
        let candidates = match &self.state {
            SessionState::Idle => {
                warn!(index, "pick without search results");
                return Err(SessionError::NothingToPick);
            }
            SessionState::Choosing { candidates } => candidates,
        };

        let candidate = candidates.get(index).ok_or(SessionError::PickOutOfRange {
            index,
            available: candidates.len(),
        })?;

        let record = self.shelf.add(candidate, &mut self.picker);
        debug!(
            title = record.title(),
            pages = record.page_count(),
            color = %record.color().to_hex(),
            "added book to shelf"
        );

        self.state = SessionState::Idle;
        Ok(())
    }
}
