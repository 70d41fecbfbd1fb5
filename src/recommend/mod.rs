//! Keyword book recommendations
//!
//! A reader types a keyword and gets a few books, each with a one-sentence
//! reason. [`RecommendRequest::prompt`] is the text a language-model backend
//! would send; [`StaticRecommender`] answers from a local JSON list instead.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

/// Books suggested per keyword unless asked otherwise
pub const DEFAULT_RECOMMENDATIONS: usize = 3;

/// Upper bound on a single request
pub const MAX_RECOMMENDATIONS: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecommendError {
    #[error("Enter a keyword to get recommendations")]
    BlankKeyword,
}

/// A validated recommendation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendRequest {
    keyword: String,
    count: usize,
}

impl RecommendRequest {
    /// Builds a request for [`DEFAULT_RECOMMENDATIONS`] books; the keyword is trimmed
    pub fn new(keyword: impl AsRef<str>) -> Result<Self, RecommendError> {
        let keyword = keyword.as_ref().trim();
        if keyword.is_empty() {
            return Err(RecommendError::BlankKeyword);
        }
        Ok(Self {
            keyword: keyword.to_string(),
            count: DEFAULT_RECOMMENDATIONS,
        })
    }

    /// Number of books to ask for, kept within `1..=MAX_RECOMMENDATIONS`
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = count.clamp(1, MAX_RECOMMENDATIONS);
        self
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn prompt(&self) -> String {
        let books = if self.count == 1 { "book" } else { "books" };
        format!(
            "Recommend {} {books} for the keyword '{}'. For each book, explain in one sentence why it is recommended.",
            self.count, self.keyword
        )
    }
}

/// One suggested book
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Recommendation {
    pub title: String,
    #[serde(default)]
    pub author: String,
    pub reason: String,
}

/// Something that can suggest books for a keyword
pub trait Recommender {
    /// Returns at most `request.count()` books; failures give an empty list
    fn recommend(&self, request: &RecommendRequest) -> Vec<Recommendation>;
}

#[derive(Debug, Deserialize)]
struct ListEntry {
    #[serde(flatten)]
    book: Recommendation,
    #[serde(default)]
    keywords: Vec<String>,
}

/// Offline recommender backed by a curated reading list
#[derive(Debug, Clone, Default)]
pub struct StaticRecommender {
    entries: Vec<(Recommendation, Vec<String>)>,
}

impl StaticRecommender {
    /// Parses a JSON array of `{title, author, reason, keywords}` objects
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<ListEntry> = serde_json::from_str(json)?;
        Ok(Self {
            entries: entries
                .into_iter()
                .map(|entry| {
                    let keywords = entry.keywords.iter().map(|k| k.trim().to_lowercase()).collect();
                    (entry.book, keywords)
                })
                .collect(),
        })
    }

    /// Loads a reading list; unreadable or malformed files give an empty list
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let parsed = std::fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|json| Self::from_json_str(&json).map_err(|err| err.to_string()));

        match parsed {
            Ok(list) => {
                debug!(path = %path.display(), books = list.len(), "loaded reading list");
                list
            }
            Err(reason) => {
                warn!(path = %path.display(), %reason, "reading list unavailable, no recommendations");
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

impl Recommender for StaticRecommender {
    fn recommend(&self, request: &RecommendRequest) -> Vec<Recommendation> {
        let keyword = request.keyword().to_lowercase();

        // Tagged books first, then titles that mention the keyword.
        let tagged = self
            .entries
            .iter()
            .filter(|(_, keywords)| keywords.iter().any(|k| *k == keyword));
        let titled = self.entries.iter().filter(|(book, keywords)| {
            !keywords.contains(&keyword) && book.title.to_lowercase().contains(&keyword)
        });

        tagged
            .chain(titled)
            .take(request.count())
            .map(|(book, _)| book.clone())
            .collect()
    }
}
