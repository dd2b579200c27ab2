//! Configuration file parser for ~/.config/reelfeed/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as warnings, since they are
//! usually typos.
use crate::catalog::DEFAULT_BASE_URL;
use crate::feed::{DEFAULT_THRESHOLD, DEFAULT_TRENDING_COUNT};
use crate::region::DEFAULT_ENDPOINT;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// `Debug` masks `api_token`.
#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Catalog API root, e.g. "https://api.themoviedb.org/3".
    pub api_base_url: String,

    /// TMDB read access token (alternative to TMDB_API_TOKEN env var).
    /// Env var takes precedence over config file.
    pub api_token: Option<String>,

    /// Quiet period before a search query is sent, in milliseconds.
    pub debounce_ms: u64,

    /// Number of titles in the trending strip.
    pub trending_count: usize,

    /// Per-request timeout for catalog calls, in seconds.
    pub request_timeout_secs: u64,

    /// Fixed two-letter region. Skips the geolocation lookup when set.
    pub region: Option<String>,

    /// Geolocation endpoint returning a bare two-letter country code.
    pub region_endpoint: String,

    /// Fraction of the sentinel row that must be on screen to load more.
    pub scroll_threshold: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            debounce_ms: 500,
            trending_count: DEFAULT_TRENDING_COUNT,
            request_timeout_secs: 20,
            region: None,
            region_endpoint: DEFAULT_ENDPOINT.to_string(),
            scroll_threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[REDACTED]"))
            .field("debounce_ms", &self.debounce_ms)
            .field("trending_count", &self.trending_count)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("region", &self.region)
            .field("region_endpoint", &self.region_endpoint)
            .field("scroll_threshold", &self.scroll_threshold)
            .finish()
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 8] = [
        "api_base_url",
        "api_token",
        "debounce_ms",
        "trending_count",
        "request_timeout_secs",
        "region",
        "region_endpoint",
        "scroll_threshold",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    /// - Out-of-range values → replaced with defaults, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        let config = config.sanitized();
        tracing::info!(path = %path.display(), base_url = %config.api_base_url, "Loaded configuration");
        Ok(config)
    }

    /// Replace out-of-range values with their defaults.
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        if self.debounce_ms == 0 {
            tracing::warn!("debounce_ms must be positive, using default");
            self.debounce_ms = defaults.debounce_ms;
        }
        if self.request_timeout_secs == 0 {
            tracing::warn!("request_timeout_secs must be positive, using default");
            self.request_timeout_secs = defaults.request_timeout_secs;
        }
        if !(self.scroll_threshold > 0.0 && self.scroll_threshold <= 1.0) {
            tracing::warn!(
                value = self.scroll_threshold,
                "scroll_threshold must be in (0, 1], using default"
            );
            self.scroll_threshold = defaults.scroll_threshold;
        }
        if self.trending_count == 0 {
            tracing::warn!("trending_count must be positive, using default");
            self.trending_count = defaults.trending_count;
        }

        self
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn write_config(name: &str, content: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("reelfeed_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent() {
            std::fs::remove_dir_all(dir).ok();
        }
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.trending_count, 10);
        assert_eq!(config.request_timeout_secs, 20);
        assert!(config.region.is_none());
        assert_eq!(config.scroll_threshold, 0.1);
        assert!(config.api_token.is_none());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/reelfeed_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.debounce_ms, 500);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let path = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.debounce_ms, 500);
        cleanup(&path);
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_base_url = "https://tmdb.example.com/3"
api_token = "token-123"
debounce_ms = 250
trending_count = 5
request_timeout_secs = 8
region = "US"
region_endpoint = "https://geo.example.com/cc"
scroll_threshold = 0.5
"#;
        let path = write_config("full", content);

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "https://tmdb.example.com/3");
        assert_eq!(config.api_token.as_deref(), Some("token-123"));
        assert_eq!(config.debounce(), Duration::from_millis(250));
        assert_eq!(config.trending_count, 5);
        assert_eq!(config.request_timeout(), Duration::from_secs(8));
        assert_eq!(config.region.as_deref(), Some("US"));
        assert_eq!(config.region_endpoint, "https://geo.example.com/cc");
        assert_eq!(config.scroll_threshold, 0.5);

        cleanup(&path);
    }

    #[test]
    fn test_out_of_range_values_use_defaults() {
        let path = write_config(
            "out_of_range",
            "debounce_ms = 0\nscroll_threshold = 1.5\ntrending_count = 0\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.debounce_ms, 500);
        assert_eq!(config.scroll_threshold, 0.1);
        assert_eq!(config.trending_count, 10);

        cleanup(&path);
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let path = write_config("invalid", "this is not [valid toml");

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));

        cleanup(&path);
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let path = write_config("unknown", "debounce_ms = 300\ntheme = \"dark\"\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.debounce_ms, 300);
        cleanup(&path);
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let path = write_config("wrong_type", "debounce_ms = \"fast\"\n");
        assert!(Config::load(&path).is_err());
        cleanup(&path);
    }

    #[test]
    fn test_too_large_file_rejected() {
        let path = write_config("too_large", &"a".repeat(1_048_577));

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));

        cleanup(&path);
    }

    #[test]
    fn test_debug_masks_api_token() {
        let config = Config {
            api_token: Some("super-secret-token".to_string()),
            ..Config::default()
        };

        let debug_output = format!("{:?}", config);
        assert!(!debug_output.contains("super-secret-token"));
        assert!(debug_output.contains("[REDACTED]"));
    }
}
