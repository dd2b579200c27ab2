use super::FeedEvent;
use crate::catalog::{Catalog, CatalogError, Movie, SearchPage};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// User-visible feed failures.
///
/// Reaching the end of the listing is not an error; it only clears
/// [`FeedState::has_more`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedError {
    /// The catalog answered a fresh query with zero results.
    #[error("No movies found")]
    NoResults,
    /// Transport, HTTP or parse failure. The detail is kept for logs only.
    #[error("Failed to fetch movies, please try again later.")]
    FetchFailed(String),
}

/// Which of the two entry points dispatched a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Reset,
    Append,
}

/// Completion of a page fetch, sent back from the spawned task.
///
/// `generation`, `query` and `page` are captured at dispatch time and form
/// the token checked by [`FeedController::apply`].
#[derive(Debug)]
pub struct PageLoaded {
    pub generation: u64,
    pub kind: FetchKind,
    pub query: String,
    pub page: u32,
    pub result: Result<SearchPage, CatalogError>,
}

/// Observable state of the paginated feed.
///
/// Only [`FeedController`] writes it; everyone else gets a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedState {
    /// Results in arrival order across pages.
    pub items: Vec<Movie>,
    pub query: String,
    /// Last page requested for `query`.
    pub page: u32,
    /// Last total page count reported by the catalog (0 before any response).
    pub total_pages: u32,
    pub has_more: bool,
    /// Reset fetch in flight.
    pub loading: bool,
    /// Append fetch in flight.
    pub loading_more: bool,
    pub error: Option<FeedError>,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            query: String::new(),
            page: 1,
            total_pages: 0,
            // Nothing to append to until the first reset.
            has_more: false,
            loading: false,
            loading_more: false,
            error: None,
        }
    }
}

impl FeedState {
    /// True once a query has been fully paged through.
    pub fn is_exhausted(&self) -> bool {
        !self.has_more && !self.loading && !self.loading_more && self.error.is_none()
    }
}

/// Owns the fetch lifecycle of the paginated feed.
///
/// [`reset`](Self::reset) and [`append`](Self::append) dispatch a fetch as a
/// spawned task and return immediately. The task reports back through the
/// event channel and the owner folds the result in with
/// [`apply`](Self::apply), which drops anything dispatched for a superseded
/// query or page. Both entry points must be called from within a Tokio
/// runtime.
pub struct FeedController {
    catalog: Arc<dyn Catalog>,
    events: mpsc::Sender<FeedEvent>,
    state: FeedState,
    generation: u64,
    in_flight: Option<JoinHandle<()>>,
}

impl FeedController {
    pub fn new(catalog: Arc<dyn Catalog>, events: mpsc::Sender<FeedEvent>) -> Self {
        Self {
            catalog,
            events,
            state: FeedState::default(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &FeedState {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start over with a fresh query at page 1.
    ///
    /// Supersedes every fetch still in flight, including appends for the
    /// previous query.
    pub fn reset(&mut self, query: impl Into<String>) {
        self.abort_in_flight();
        self.generation = self.generation.wrapping_add(1);

        let state = &mut self.state;
        state.query = query.into();
        state.page = 1;
        state.total_pages = 0;
        state.has_more = true;
        state.loading = true;
        state.loading_more = false;
        state.error = None;

        tracing::debug!(
            query = %self.state.query,
            generation = self.generation,
            "Resetting feed"
        );
        self.spawn_fetch(FetchKind::Reset);
    }

    /// Request the next page for the current query.
    ///
    /// Returns `false` without doing anything while a reset or another
    /// append is in flight, or once the feed is exhausted.
    pub fn append(&mut self) -> bool {
        if self.state.loading_more || !self.state.has_more || self.state.loading {
            return false;
        }

        self.state.page = self.state.page.saturating_add(1);
        self.state.loading_more = true;
        self.state.error = None;

        tracing::debug!(
            query = %self.state.query,
            page = self.state.page,
            generation = self.generation,
            "Appending next page"
        );
        self.spawn_fetch(FetchKind::Append);
        true
    }

    /// Fold a completed fetch into the state.
    ///
    /// Returns `false` if the completion was stale and has been dropped.
    pub fn apply(&mut self, loaded: PageLoaded) -> bool {
        let in_flight = match loaded.kind {
            FetchKind::Reset => self.state.loading,
            FetchKind::Append => self.state.loading_more,
        };

        if loaded.generation != self.generation
            || loaded.page != self.state.page
            || loaded.query != self.state.query
            || !in_flight
        {
            tracing::debug!(
                expected = self.generation,
                got = loaded.generation,
                query = %loaded.query,
                page = loaded.page,
                kind = ?loaded.kind,
                "Ignoring stale feed page"
            );
            return false;
        }

        self.in_flight = None;
        match loaded.kind {
            FetchKind::Reset => self.finish_reset(loaded.result),
            FetchKind::Append => self.finish_append(loaded.result),
        }
        true
    }

    fn finish_reset(&mut self, result: Result<SearchPage, CatalogError>) {
        let state = &mut self.state;
        state.loading = false;

        match result {
            Ok(page) if !page.results.is_empty() => {
                state.total_pages = page.total_pages;
                state.has_more = state.page < page.total_pages;
                state.items = page.results;
                tracing::debug!(
                    query = %state.query,
                    count = state.items.len(),
                    total_pages = state.total_pages,
                    "Feed loaded"
                );
            }
            Ok(page) => {
                state.items.clear();
                state.total_pages = page.total_pages;
                state.has_more = false;
                state.error = Some(FeedError::NoResults);
                tracing::debug!(query = %state.query, "No results");
            }
            Err(e) => {
                tracing::warn!(query = %state.query, error = %e, "Feed fetch failed");
                state.items.clear();
                state.total_pages = 0;
                state.has_more = false;
                state.error = Some(FeedError::FetchFailed(e.to_string()));
            }
        }
    }

    fn finish_append(&mut self, result: Result<SearchPage, CatalogError>) {
        let state = &mut self.state;
        state.loading_more = false;

        match result {
            Ok(page) if !page.results.is_empty() => {
                state.total_pages = page.total_pages;
                state.has_more = state.page < page.total_pages;
                state.items.extend(page.results);
                tracing::debug!(
                    query = %state.query,
                    page = state.page,
                    count = state.items.len(),
                    has_more = state.has_more,
                    "Page appended"
                );
            }
            Ok(_) => {
                state.has_more = false;
                tracing::debug!(query = %state.query, page = state.page, "Feed exhausted");
            }
            Err(e) => {
                tracing::warn!(
                    query = %state.query,
                    page = state.page,
                    error = %e,
                    "Append fetch failed"
                );
                state.has_more = false;
                state.error = Some(FeedError::FetchFailed(e.to_string()));
            }
        }
    }

    fn spawn_fetch(&mut self, kind: FetchKind) {
        let catalog = Arc::clone(&self.catalog);
        let tx = self.events.clone();
        let generation = self.generation;
        let query = self.state.query.clone();
        let page = self.state.page;

        self.in_flight = Some(tokio::spawn(async move {
            let result = catalog.search_page(&query, page).await;
            let loaded = PageLoaded {
                generation,
                kind,
                query,
                page,
                result,
            };

            if let Err(e) = tx.send(FeedEvent::Page(loaded)).await {
                tracing::warn!(error = %e, "Failed to send feed page (receiver dropped)");
            }
        }));
    }

    fn abort_in_flight(&mut self) {
        if let Some(handle) = self.in_flight.take() {
            handle.abort();
            tracing::debug!("Aborted superseded feed fetch");
        }
    }
}

impl Drop for FeedController {
    fn drop(&mut self) {
        self.abort_in_flight();
    }
}
