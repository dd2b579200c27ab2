use super::{Catalog, CatalogError, Movie, SearchPage};
use async_trait::async_trait;
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.themoviedb.org/3";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_RESPONSE_SIZE: usize = 5 * 1024 * 1024; // 5MB

/// Wire shape shared by the search, discover and trending endpoints.
#[derive(Debug, Deserialize)]
struct PageResponse {
    #[serde(default)]
    results: Option<Vec<Movie>>,
    #[serde(default)]
    total_pages: Option<u32>,
}

/// TMDB v3 client.
///
/// Non-empty queries hit `search/movie`; the empty query maps to the
/// popularity-sorted `discover/movie` listing, scoped to `region` when known.
pub struct TmdbClient {
    http: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
    timeout: Duration,
    region: Option<String>,
}

impl std::fmt::Debug for TmdbClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TmdbClient")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("timeout", &self.timeout)
            .field("region", &self.region)
            .finish()
    }
}

impl TmdbClient {
    /// Build a client against `base_url`.
    ///
    /// The bearer token is only ever sent over HTTPS. Plain HTTP is accepted
    /// for localhost so tests can point the client at a mock server.
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        token: Option<SecretString>,
    ) -> Result<Self, CatalogError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| CatalogError::InvalidBaseUrl(format!("{base_url}: {e}")))?;

        if base_url.cannot_be_a_base() {
            return Err(CatalogError::InvalidBaseUrl(base_url.to_string()));
        }

        match base_url.scheme() {
            "https" => {}
            "http" if is_loopback(&base_url) => {
                tracing::warn!(base_url = %base_url, "Using non-HTTPS catalog base URL (localhost only)");
            }
            _ => {
                tracing::error!(base_url = %base_url, "Rejecting non-HTTPS catalog base URL");
                return Err(CatalogError::InvalidBaseUrl(base_url.to_string()));
            }
        }

        Ok(Self {
            http,
            base_url,
            token,
            timeout: DEFAULT_TIMEOUT,
            region: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_region(mut self, region: Option<String>) -> Self {
        self.region = region;
        self
    }

    fn endpoint(&self, path: &str, params: &[(&str, String)]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(path.split('/'));
        {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in params {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    fn page_url(&self, query: &str, page: u32) -> Result<Url, CatalogError> {
        let query = query.trim();
        if query.is_empty() {
            let mut params = vec![
                ("sort_by", "popularity.desc".to_string()),
                ("page", page.to_string()),
            ];
            if let Some(region) = &self.region {
                params.push(("region", region.clone()));
            }
            self.endpoint("discover/movie", &params)
        } else {
            self.endpoint(
                "search/movie",
                &[
                    ("query", query.to_string()),
                    ("page", page.to_string()),
                    ("include_adult", "false".to_string()),
                ],
            )
        }
    }

    async fn get_page(&self, url: Url) -> Result<PageResponse, CatalogError> {
        tracing::debug!(url = %url, "Catalog request");

        let mut request = self.http.get(url).header("Accept", "application/json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = tokio::time::timeout(self.timeout, request.send())
            .await
            .map_err(|_| CatalogError::Timeout)?
            .map_err(CatalogError::Network)?;

        if !response.status().is_success() {
            return Err(CatalogError::HttpStatus(response.status().as_u16()));
        }

        let body = read_limited_bytes(response, MAX_RESPONSE_SIZE).await?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::Parse(e.to_string()))
    }
}

#[async_trait]
impl Catalog for TmdbClient {
    async fn search_page(&self, query: &str, page: u32) -> Result<SearchPage, CatalogError> {
        let url = self.page_url(query, page)?;
        let response = self.get_page(url).await?;
        Ok(SearchPage {
            results: response.results.unwrap_or_default(),
            total_pages: response.total_pages.unwrap_or(0),
        })
    }

    async fn trending_top(&self, n: usize) -> Result<Vec<Movie>, CatalogError> {
        let url = self.endpoint("trending/movie/week", &[])?;
        let mut results = self.get_page(url).await?.results.unwrap_or_default();
        results.truncate(n);
        Ok(results)
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost") | Some("127.0.0.1") | Some("[::1]"))
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, CatalogError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(CatalogError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(CatalogError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(CatalogError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
