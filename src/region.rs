//! Two-letter region lookup with a 24-hour file cache.
//!
//! The region scopes the catalog's default listing. Lookups never fail: any
//! network, HTTP or cache problem degrades to [`FALLBACK_REGION`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_ENDPOINT: &str = "https://ipapi.co/country_code/";
pub const FALLBACK_REGION: &str = "TW";
pub const CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
enum RegionError {
    #[error("Request timed out")]
    Timeout,
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Unexpected region code: {0:?}")]
    Malformed(String),
}

/// On-disk cache record. `timestamp` is Unix milliseconds.
#[derive(Debug, Serialize, Deserialize)]
struct CachedRegion {
    region: String,
    timestamp: i64,
}

#[derive(Debug, Clone)]
pub struct RegionCache {
    http: reqwest::Client,
    cache_path: PathBuf,
    endpoint: String,
    ttl: Duration,
}

impl RegionCache {
    pub fn new(http: reqwest::Client, cache_path: impl Into<PathBuf>, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            cache_path: cache_path.into(),
            endpoint: endpoint.into(),
            ttl: CACHE_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Cached region if fresh, otherwise a fresh lookup, otherwise the fallback.
    pub async fn get_region(&self) -> String {
        self.get_region_at(Utc::now()).await
    }

    async fn get_region_at(&self, now: DateTime<Utc>) -> String {
        if let Some(region) = self.read_cached(now).await {
            tracing::debug!(region = %region, "Using cached region");
            return region;
        }

        match self.fetch_region().await {
            Ok(region) => {
                if let Err(e) = self.write_cache(&region, now).await {
                    tracing::warn!(
                        path = %self.cache_path.display(),
                        error = %e,
                        "Failed to write region cache"
                    );
                }
                tracing::info!(region = %region, "Resolved region");
                region
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    fallback = FALLBACK_REGION,
                    "Region lookup failed, using fallback"
                );
                FALLBACK_REGION.to_string()
            }
        }
    }

    /// Remove the cache file. A missing file is not an error.
    pub async fn clear(&self) -> std::io::Result<()> {
        match tokio::fs::remove_file(&self.cache_path).await {
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }

    async fn read_cached(&self, now: DateTime<Utc>) -> Option<String> {
        let content = tokio::fs::read_to_string(&self.cache_path).await.ok()?;

        let cached: CachedRegion = match serde_json::from_str(&content) {
            Ok(c) => c,
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring unreadable region cache");
                return None;
            }
        };

        // Timestamps from the future are treated as expired.
        let age_ms = now.timestamp_millis().checked_sub(cached.timestamp)?;
        let fresh = age_ms >= 0 && (age_ms as u128) < self.ttl.as_millis();
        if !fresh {
            tracing::debug!(age_ms, "Region cache expired");
            return None;
        }

        normalize_region(&cached.region)
    }

    async fn write_cache(&self, region: &str, now: DateTime<Utc>) -> std::io::Result<()> {
        let record = CachedRegion {
            region: region.to_string(),
            timestamp: now.timestamp_millis(),
        };
        let json = serde_json::to_string(&record)?;

        if let Some(parent) = self.cache_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.cache_path, json).await
    }

    async fn fetch_region(&self) -> Result<String, RegionError> {
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.http.get(&self.endpoint).send())
            .await
            .map_err(|_| RegionError::Timeout)??;

        if !response.status().is_success() {
            return Err(RegionError::HttpStatus(response.status().as_u16()));
        }

        let body = response.text().await?;
        normalize_region(&body).ok_or(RegionError::Malformed(body))
    }
}

/// Accept exactly two ASCII letters, returned uppercased.
pub fn normalize_region(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| trimmed.to_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn temp_cache(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("reelfeed_region_test_{name}"));
        std::fs::remove_dir_all(&dir).ok();
        dir.join("region.json")
    }

    fn write_record(path: &Path, region: &str, timestamp: i64) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        let json = serde_json::json!({ "region": region, "timestamp": timestamp });
        std::fs::write(path, json.to_string()).unwrap();
    }

    async fn endpoint_returning(body: &str, expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn test_normalize_region() {
        assert_eq!(normalize_region("US\n").as_deref(), Some("US"));
        assert_eq!(normalize_region("de").as_deref(), Some("DE"));
        assert_eq!(normalize_region("Undefined"), None);
        assert_eq!(normalize_region(""), None);
        assert_eq!(normalize_region("1A"), None);
    }

    #[tokio::test]
    async fn test_fresh_lookup_returns_region_and_caches() {
        let path = temp_cache("fresh_lookup");
        let server = endpoint_returning("JP\n", 1).await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri());

        assert_eq!(cache.get_region().await, "JP");

        let content = std::fs::read_to_string(&path).unwrap();
        let record: CachedRegion = serde_json::from_str(&content).unwrap();
        assert_eq!(record.region, "JP");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let path = temp_cache("cache_hit");
        write_record(&path, "FR", Utc::now().timestamp_millis() - 60_000);
        let server = endpoint_returning("US", 0).await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri());

        assert_eq!(cache.get_region().await, "FR");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_expired_cache_refetches() {
        let path = temp_cache("expired");
        let day_and_a_bit = CACHE_TTL.as_millis() as i64 + 1_000;
        write_record(&path, "FR", Utc::now().timestamp_millis() - day_and_a_bit);
        let server = endpoint_returning("BR", 1).await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri());

        assert_eq!(cache.get_region().await, "BR");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_custom_ttl_expires_sooner() {
        let path = temp_cache("custom_ttl");
        write_record(&path, "FR", Utc::now().timestamp_millis() - 120_000);
        let server = endpoint_returning("NZ", 1).await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri())
            .with_ttl(Duration::from_secs(60));

        assert_eq!(cache.cache_path(), path.as_path());
        assert_eq!(cache.get_region().await, "NZ");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_future_timestamp_is_expired() {
        let path = temp_cache("future");
        write_record(&path, "FR", Utc::now().timestamp_millis() + 3_600_000);
        let server = endpoint_returning("CA", 1).await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri());

        assert_eq!(cache.get_region().await, "CA");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_endpoint_failure_falls_back() {
        let path = temp_cache("failure");
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri());

        assert_eq!(cache.get_region().await, FALLBACK_REGION);
        assert!(!path.exists(), "fallback must not be cached");
    }

    #[tokio::test]
    async fn test_malformed_body_falls_back() {
        let path = temp_cache("malformed");
        let server = endpoint_returning("<html>rate limited</html>", 1).await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri());

        assert_eq!(cache.get_region().await, FALLBACK_REGION);
    }

    #[tokio::test]
    async fn test_corrupt_cache_is_ignored() {
        let path = temp_cache("corrupt");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "not json").unwrap();
        let server = endpoint_returning("GB", 1).await;
        let cache = RegionCache::new(reqwest::Client::new(), &path, server.uri());

        assert_eq!(cache.get_region().await, "GB");

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[tokio::test]
    async fn test_clear_missing_file_is_ok() {
        let path = temp_cache("clear");
        let cache = RegionCache::new(reqwest::Client::new(), &path, DEFAULT_ENDPOINT);
        assert!(cache.clear().await.is_ok());
    }
}
