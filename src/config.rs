//! Configuration Module
//!
//! Handles loading client configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::limiter::DEFAULT_CONCURRENCY;

/// Default API root.
pub const DEFAULT_API_BASE_URL: &str = "https://tornium.com/api/v1";

/// Client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum lookups in flight at once
    pub concurrency_limit: usize,
    /// Default freshness of cached responses in milliseconds
    pub cache_ttl_ms: u64,
    /// When false, nothing is cached
    pub cache_enabled: bool,
    /// Directory for the persistent cache; in-memory when unset
    pub cache_dir: Option<PathBuf>,
    /// Bound on in-memory entries; unbounded when unset
    pub cache_max_entries: Option<usize>,
    /// API root that endpoint paths are appended to
    pub api_base_url: String,
    /// OAuth bearer token sent with every request
    pub api_access_token: Option<String>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CONCURRENCY_LIMIT` - Parallel lookups (default: 10)
    /// - `CACHE_TTL_MS` - Cache freshness in ms (default: 15000)
    /// - `CACHE_ENABLED` - `false`/`0` disables caching (default: true)
    /// - `CACHE_DIR` - Persistent cache directory (default: in-memory)
    /// - `CACHE_MAX_ENTRIES` - In-memory entry bound (default: unbounded)
    /// - `API_BASE_URL` - API root (default: https://tornium.com/api/v1)
    /// - `API_ACCESS_TOKEN` - Bearer token (default: none)
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            concurrency_limit: parse_var("CONCURRENCY_LIMIT").unwrap_or(defaults.concurrency_limit),
            cache_ttl_ms: parse_var("CACHE_TTL_MS").unwrap_or(defaults.cache_ttl_ms),
            cache_enabled: env::var("CACHE_ENABLED")
                .ok()
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.cache_enabled),
            cache_dir: non_empty_var("CACHE_DIR").map(PathBuf::from),
            cache_max_entries: parse_var("CACHE_MAX_ENTRIES"),
            api_base_url: non_empty_var("API_BASE_URL").unwrap_or(defaults.api_base_url),
            api_access_token: non_empty_var("API_ACCESS_TOKEN"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            concurrency_limit: DEFAULT_CONCURRENCY,
            cache_ttl_ms: 15_000,
            cache_enabled: true,
            cache_dir: None,
            cache_max_entries: None,
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_access_token: None,
        }
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}
