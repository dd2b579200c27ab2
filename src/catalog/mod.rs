//! Remote movie catalog access.
//!
//! The feed core only talks to the catalog through the [`Catalog`] trait so
//! the fetch lifecycle can be exercised against in-process fakes. The
//! production implementation is [`TmdbClient`], a thin reqwest wrapper over
//! the TMDB v3 REST API.
//!
//! - [`tmdb`] - HTTP client, URL building, bounded body reads

mod tmdb;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub use tmdb::{TmdbClient, DEFAULT_BASE_URL};

/// A single catalog entry.
///
/// Only `id` is required on the wire; the catalog omits or nulls the other
/// fields for sparse records, so every other field falls back to a default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Movie {
    /// Release year, if the catalog reported a parseable date.
    pub fn year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .filter(|y| y.chars().all(|c| c.is_ascii_digit()))
    }
}

/// One page of search results plus the catalog's total page count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub results: Vec<Movie>,
    pub total_pages: u32,
}

/// Errors surfaced by catalog requests.
///
/// The feed controller collapses all of these into a single user-visible
/// failure message; the variants exist for logging and tests.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Malformed response: {0}")]
    Parse(String),
    #[error("Invalid catalog base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Read access to a paginated movie catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch one page of results for `query`.
    ///
    /// An empty query asks for the catalog's default listing.
    async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError>;

    /// Fetch the top `n` trending titles. Not paginated.
    async fn trending_top(&self, n: usize) -> Result<Vec<Movie>, CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparse_movie_deserializes() {
        let movie: Movie = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        assert_eq!(movie.id, 42);
        assert!(movie.title.is_empty());
        assert!(movie.vote_average.is_none());
    }

    #[test]
    fn test_null_fields_accepted() {
        let movie: Movie = serde_json::from_str(
            r#"{"id": 7, "title": "Heat", "vote_average": null, "release_date": null}"#,
        )
        .unwrap();
        assert_eq!(movie.title, "Heat");
        assert!(movie.release_date.is_none());
    }

    #[test]
    fn test_null_title_is_empty() {
        let movies: Vec<Movie> =
            serde_json::from_str(r#"[{"id": 1, "title": null}, {"id": 2, "title": "Ran"}]"#)
                .unwrap();
        assert!(movies[0].title.is_empty());
        assert_eq!(movies[1].title, "Ran");
    }

    #[test]
    fn test_year_from_release_date() {
        let mut movie: Movie = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert_eq!(movie.year(), None);

        movie.release_date = Some("1995-12-15".to_string());
        assert_eq!(movie.year(), Some("1995"));

        movie.release_date = Some(String::new());
        assert_eq!(movie.year(), None);

        movie.release_date = Some("TBA".to_string());
        assert_eq!(movie.year(), None);
    }
}
