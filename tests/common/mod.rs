//! In-process catalog double shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use reelfeed::catalog::{Catalog, CatalogError, Movie, SearchPage};
use reelfeed::feed::{FeedController, FeedEvent};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, Semaphore};

/// Serves `total_pages` pages of `per_page` movies for any non-empty query.
///
/// - queries listed in `empty` get a page with no results
/// - `fail_page` answers that page number with an HTTP 500
/// - queries listed in `failing` get an HTTP 500 on every page
/// - queries with a gate block until the test adds a permit
pub struct FakeCatalog {
    pub total_pages: u32,
    pub per_page: u64,
    pub empty: Vec<String>,
    pub fail_page: Option<u32>,
    pub failing: Vec<String>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
    calls: Mutex<Vec<(String, u32)>>,
}

impl FakeCatalog {
    pub fn new(total_pages: u32) -> Self {
        Self {
            total_pages,
            per_page: 20,
            empty: Vec::new(),
            fail_page: None,
            failing: Vec::new(),
            gates: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Hold every request for `query` until [`release`](Self::release).
    pub fn gate(&self, query: &str) -> Arc<Semaphore> {
        let sem = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(query.to_string(), Arc::clone(&sem));
        sem
    }

    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn movie(id: u64, title: &str) -> Movie {
    serde_json::from_value(serde_json::json!({ "id": id, "title": title })).unwrap()
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError> {
        self.calls.lock().unwrap().push((query.to_string(), page));

        let gate = self.gates.lock().unwrap().get(query).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.fail_page == Some(page) || self.failing.iter().any(|q| q == query) {
            return Err(CatalogError::HttpStatus(500));
        }
        if self.empty.iter().any(|q| q == query) || page > self.total_pages {
            return Ok(SearchPage {
                results: Vec::new(),
                total_pages: 0,
            });
        }

        let results = (0..self.per_page)
            .map(|i| movie(u64::from(page) * 1000 + i, &format!("{query} p{page} #{i}")))
            .collect();
        Ok(SearchPage {
            results,
            total_pages: self.total_pages,
        })
    }

    async fn trending_top(&self, n: usize) -> Result<Vec<Movie>, CatalogError> {
        Ok((0..n as u64).map(|i| movie(i, &format!("Trending {i}"))).collect())
    }
}

pub fn controller(catalog: Arc<FakeCatalog>) -> (FeedController, mpsc::Receiver<FeedEvent>) {
    let (tx, rx) = mpsc::channel(16);
    (FeedController::new(catalog, tx), rx)
}

/// Wait for the next page completion and fold it in. Returns `apply`'s verdict.
pub async fn apply_next(feed: &mut FeedController, rx: &mut mpsc::Receiver<FeedEvent>) -> bool {
    loop {
        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for a feed event")
            .expect("feed channel closed");
        if let FeedEvent::Page(loaded) = event {
            return feed.apply(loaded);
        }
    }
}

/// True if no event arrives within a short grace period.
pub async fn stays_quiet(rx: &mut mpsc::Receiver<FeedEvent>) -> bool {
    tokio::time::timeout(Duration::from_millis(100), rx.recv())
        .await
        .is_err()
}
