use super::FeedEvent;
use crate::catalog::{Catalog, CatalogError, Movie};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Default size of the trending highlight strip.
pub const DEFAULT_TRENDING_COUNT: usize = 10;

/// Non-paginated highlight list, loaded once at startup.
#[derive(Debug, Default)]
pub struct TrendingList {
    pub items: Vec<Movie>,
    pub loading: bool,
    pub error: Option<String>,
}

impl TrendingList {
    /// Spawn the fetch. The result arrives as [`FeedEvent::Trending`].
    pub fn load(
        &mut self,
        catalog: Arc<dyn Catalog>,
        count: usize,
        events: mpsc::Sender<FeedEvent>,
    ) -> JoinHandle<()> {
        self.loading = true;
        self.error = None;

        tokio::spawn(async move {
            let result = catalog.trending_top(count).await;
            if let Err(e) = events.send(FeedEvent::Trending(result)).await {
                tracing::warn!(error = %e, "Failed to send trending list (receiver dropped)");
            }
        })
    }

    pub fn apply(&mut self, result: Result<Vec<Movie>, CatalogError>) {
        self.loading = false;
        match result {
            Ok(items) => {
                tracing::debug!(count = items.len(), "Trending list loaded");
                self.items = items;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Trending fetch failed");
                self.error =
                    Some("Failed to fetch trending movies, please try again later.".to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_keeps_previous_items() {
        let mut trending = TrendingList {
            items: vec![serde_json::from_str(r#"{"id": 1, "title": "Jaws"}"#).unwrap()],
            loading: true,
            error: None,
        };

        trending.apply(Err(CatalogError::HttpStatus(503)));
        assert!(!trending.loading);
        assert_eq!(trending.items.len(), 1);
        assert!(trending.error.as_deref().unwrap().contains("trending"));
    }

    #[test]
    fn test_success_replaces_items() {
        let mut trending = TrendingList::default();
        let movies: Vec<Movie> =
            serde_json::from_str(r#"[{"id": 1}, {"id": 2}]"#).unwrap();

        trending.apply(Ok(movies));
        assert_eq!(trending.items.len(), 2);
        assert!(trending.error.is_none());
    }
}
