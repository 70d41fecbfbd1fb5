//! Catalog lookup
//!
//! The tower only needs a way to turn a query into a handful of candidate
//! books. Any failure on the catalog side looks the same to callers as an
//! empty result: there is simply nothing to pick.

use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::domain::book::RawPageCount;

/// Maximum number of candidates offered for one query
pub const MAX_RESULTS: usize = 5;

/// A search hit the reader may add to the shelf
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBook {
    pub title: String,
    pub author: String,
    /// Empty when the catalog did not name one
    pub publisher: String,
    pub cover_image_url: String,
    /// Absent when the catalog did not report a usable page count
    pub pages: Option<u32>,
}

/// What the reader typed into the search form
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub title: String,
    pub author: Option<String>,
}

impl SearchQuery {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: None,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        let author = author.into();
        self.author = if author.trim().is_empty() { None } else { Some(author) };
        self
    }

    /// Keyword string sent to the catalog: title, then author if given
    ///
    /// Blank parts are skipped, so the result never has stray spaces.
    pub fn to_query_string(&self) -> String {
        [Some(self.title.as_str()), self.author.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn is_blank(&self) -> bool {
        self.to_query_string().is_empty()
    }
}

/// A searchable book catalog
pub trait CatalogLookup {
    /// Returns at most [`MAX_RESULTS`] candidates, best match first
    fn search(&self, query: &SearchQuery) -> Vec<CandidateBook>;
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    publisher: String,
    #[serde(default, alias = "cover")]
    cover_image_url: String,
    #[serde(default, alias = "itemPage")]
    pages: Option<RawPageCount>,
}

impl From<CatalogEntry> for CandidateBook {
    fn from(entry: CatalogEntry) -> Self {
        // Unparseable counts resolve to the default here; only absence stays None.
        let pages = match entry.pages {
            Some(RawPageCount::Missing(())) | None => None,
            Some(raw) => Some(raw.resolve()),
        };
        CandidateBook {
            title: entry.title,
            author: entry.author,
            publisher: entry.publisher,
            cover_image_url: entry.cover_image_url,
            pages,
        }
    }
}

/// In-memory catalog, typically loaded from a JSON array of books
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    entries: Vec<CandidateBook>,
}

impl StaticCatalog {
    pub fn new(entries: Vec<CandidateBook>) -> Self {
        Self { entries }
    }

    /// Parses a JSON array of `{title, author, publisher, cover, pages}` objects
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
        Ok(Self::new(entries.into_iter().map(CandidateBook::from).collect()))
    }

    /// Loads a catalog file; unreadable or malformed files give an empty catalog
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let parsed = std::fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|json| Self::from_json_str(&json).map_err(|err| err.to_string()));

        match parsed {
            Ok(catalog) => {
                debug!(path = %path.display(), books = catalog.len(), "loaded catalog");
                catalog
            }
            Err(reason) => {
                warn!(path = %path.display(), %reason, "catalog unavailable, searches will be empty");
                Self::default()
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl CatalogLookup for StaticCatalog {
    fn search(&self, query: &SearchQuery) -> Vec<CandidateBook> {
        if query.is_blank() {
            return Vec::new();
        }

        let title = query.title.trim().to_lowercase();
        let author = query.author.as_deref().map(|a| a.trim().to_lowercase());

        self.entries
            .iter()
            .filter(|entry| entry.title.to_lowercase().contains(&title))
            .filter(|entry| match &author {
                Some(author) => entry.author.to_lowercase().contains(author.as_str()),
                None => true,
            })
            .take(MAX_RESULTS)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::book::DEFAULT_PAGE_COUNT;

    const CATALOG: &str = r#"[
        { "title": "Dune", "author": "Frank Herbert", "publisher": "Chilton", "cover": "https://covers/dune.jpg", "pages": 412 },
        { "title": "Dune Messiah", "author": "Frank Herbert", "itemPage": "256" },
        { "title": "Children of Dune", "author": "Frank Herbert", "pages": null },
        { "title": "God Emperor of Dune", "author": "Frank Herbert", "pages": "unknown" },
        { "title": "Heretics of Dune", "author": "Frank Herbert", "pages": 480 },
        { "title": "Chapterhouse: Dune", "author": "Frank Herbert", "pages": 464 },
        { "title": "Dune: House Atreides", "author": "Brian Herbert", "pages": 604 }
    ]"#;

    fn catalog() -> StaticCatalog {
        StaticCatalog::from_json_str(CATALOG).unwrap()
    }

    #[test]
    fn query_string_joins_title_and_author() {
        let query = SearchQuery::new(" Dune ").with_author("Herbert");
        assert_eq!(query.to_query_string(), "Dune Herbert");

        let query = SearchQuery::new("Dune").with_author("   ");
        assert_eq!(query.author, None);
        assert_eq!(query.to_query_string(), "Dune");
    }

    #[test]
    fn query_string_skips_blank_title() {
        let query = SearchQuery::new("   ").with_author(" Herbert ");
        assert_eq!(query.to_query_string(), "Herbert");
        assert!(!query.is_blank());

        assert_eq!(SearchQuery::new("").to_query_string(), "");
        assert!(SearchQuery::default().is_blank());
    }

    #[test]
    fn publisher_is_optional() {
        let catalog = catalog();
        assert_eq!(catalog.entries[0].publisher, "Chilton");
        assert_eq!(catalog.entries[1].publisher, "");
    }

    #[test]
    fn results_are_capped() {
        let hits = catalog().search(&SearchQuery::new("dune"));
        assert_eq!(hits.len(), MAX_RESULTS);
        assert_eq!(hits[0].title, "Dune");
    }

    #[test]
    fn author_narrows_results() {
        let hits = catalog().search(&SearchQuery::new("dune").with_author("brian"));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title, "Dune: House Atreides");
    }

    #[test]
    fn page_counts_are_normalised() {
        let catalog = catalog();
        let pages: Vec<Option<u32>> = catalog.entries.iter().map(|c| c.pages).collect();
        assert_eq!(
            pages[..4].to_vec(),
            vec![Some(412), Some(256), None, Some(DEFAULT_PAGE_COUNT)]
        );
        assert_eq!(catalog.entries[0].cover_image_url, "https://covers/dune.jpg");
    }

    #[test]
    fn no_match_and_blank_query_are_empty() {
        assert!(catalog().search(&SearchQuery::new("Neuromancer")).is_empty());
        assert!(catalog().search(&SearchQuery::new("  ")).is_empty());
    }

    #[test]
    fn unreadable_catalog_degrades_to_empty() {
        let catalog = StaticCatalog::load("/definitely/not/here/catalog.json");
        assert!(catalog.is_empty());
        assert!(catalog.search(&SearchQuery::new("Dune")).is_empty());
    }
}
