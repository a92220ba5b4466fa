//! Read-Through Cache Module
//!
//! Freshness checks, lazy expiry and the fetch-on-miss path on top of a
//! [`CacheBackend`].

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::{CacheBackend, CacheEntry, CacheStats, FileBackend, MemoryBackend, NullBackend};
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::error::Error;
use crate::fetch::Payload;

// == Freshness Windows ==
/// Freshness of API responses (user stats, estimates).
pub const API_RESPONSE_TTL: Duration = Duration::from_secs(15);
/// Freshness of Discord role and channel lists.
pub const DISCORD_LIST_TTL: Duration = Duration::from_secs(60);
/// Freshness of the item catalog.
pub const ITEM_CATALOG_TTL: Duration = Duration::from_secs(3600);

// == Read-Through Cache ==
/// Advisory key/value cache with per-entry expiration.
///
/// Never fails a caller: backend errors degrade to misses and dropped
/// writes. Concurrent writers to the same key are last-write-wins.
#[derive(Debug)]
pub struct ReadThroughCache {
    backend: Arc<dyn CacheBackend>,
    clock: Arc<dyn Clock>,
    default_ttl: Duration,
    stats: Mutex<CacheStats>,
}

impl ReadThroughCache {
    // == Constructors ==
    /// Creates a cache over `backend` using the wall clock.
    pub fn new(backend: Arc<dyn CacheBackend>, default_ttl: Duration) -> Self {
        Self::with_clock(backend, Arc::new(SystemClock), default_ttl)
    }

    pub fn with_clock(
        backend: Arc<dyn CacheBackend>,
        clock: Arc<dyn Clock>,
        default_ttl: Duration,
    ) -> Self {
        Self {
            backend,
            clock,
            default_ttl,
            stats: Mutex::new(CacheStats::new()),
        }
    }

    /// Creates a cache that never stores anything.
    pub fn disabled(default_ttl: Duration) -> Self {
        Self::new(Arc::new(NullBackend), default_ttl)
    }

    /// Selects a backend from configuration.
    ///
    /// - caching disabled: no-op backend
    /// - `cache_dir` set: file backend, or no-op if the directory is unusable
    /// - otherwise: in-memory backend bounded by `cache_max_entries`
    pub async fn from_config(config: &Config) -> Self {
        let backend: Arc<dyn CacheBackend> = if !config.cache_enabled {
            Arc::new(NullBackend)
        } else if let Some(dir) = &config.cache_dir {
            match FileBackend::open(dir).await {
                Ok(backend) => Arc::new(backend),
                Err(err) => {
                    warn!(dir = %dir.display(), error = %err, "cache storage unavailable, caching disabled");
                    Arc::new(NullBackend)
                }
            }
        } else {
            Arc::new(MemoryBackend::with_capacity_limit(config.cache_max_entries))
        };

        info!(backend = backend.name(), ttl_ms = config.cache_ttl_ms, "cache initialized");
        Self::new(backend, Duration::from_millis(config.cache_ttl_ms))
    }

    // == Accessors ==
    /// Name of the active backend (`memory`, `file` or `null`).
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Freshness applied when `put` gets no explicit TTL.
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    // == Get ==
    /// Returns the cached value if it is still fresh.
    ///
    /// Stale and unreadable entries are deleted and reported as a miss.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let entry = match self.backend.load(key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => {
                self.update_stats(CacheStats::record_miss);
                return None;
            }
            Err(Error::CorruptEntry(reason)) => {
                warn!(key, %reason, "discarding corrupt cache entry");
                self.discard(key).await;
                self.update_stats(|stats| {
                    stats.record_backend_error();
                    stats.record_miss();
                });
                return None;
            }
            Err(err) => {
                warn!(key, backend = self.backend.name(), error = %err, "cache read failed");
                self.update_stats(|stats| {
                    stats.record_backend_error();
                    stats.record_miss();
                });
                return None;
            }
        };

        if entry.is_expired_at(self.clock.now_ms()) {
            debug!(key, "cache entry expired");
            self.discard(key).await;
            self.update_stats(CacheStats::record_expired);
            return None;
        }

        debug!(key, "cache hit");
        self.update_stats(CacheStats::record_hit);
        Some(entry.value)
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous entry.
    ///
    /// `ttl` of `None` uses the instance default. The value is not
    /// inspected; only pass payloads known to be successful.
    pub async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(key, value, self.clock.now_ms(), ttl);

        match self.backend.store(entry).await {
            Ok(()) => {
                debug!(key, ttl_ms = ttl.as_millis() as u64, "cache write");
                self.update_stats(CacheStats::record_write);
            }
            Err(err) => {
                warn!(key, backend = self.backend.name(), error = %err, "cache write dropped");
                self.update_stats(CacheStats::record_backend_error);
            }
        }
    }

    // == Remove ==
    /// Invalidates `key`.
    pub async fn remove(&self, key: &str) {
        self.discard(key).await;
    }

    // == Get Or Fetch ==
    /// Serves `key` from the cache or calls `fetch` and writes back a
    /// successful payload.
    ///
    /// Failure payloads are returned but not cached; fetch errors propagate
    /// unchanged.
    pub async fn get_or_fetch<F, Fut, E>(
        &self,
        key: &str,
        ttl: Option<Duration>,
        fetch: F,
    ) -> std::result::Result<Payload, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = std::result::Result<Payload, E>>,
    {
        if let Some(value) = self.get(key).await {
            return Ok(Payload::Success(value));
        }

        let payload = fetch().await?;
        match &payload {
            Payload::Success(value) => self.put(key, value.clone(), ttl).await,
            Payload::Failure(_) => {
                debug!(key, "not caching failure payload");
                self.update_stats(CacheStats::record_skipped);
            }
        }
        Ok(payload)
    }

    // == Stats ==
    /// Snapshot of the counters, with evictions read from the backend.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self
            .stats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        stats.evictions = self.backend.evictions();
        stats
    }

    fn update_stats(&self, update: impl FnOnce(&mut CacheStats)) {
        update(&mut self.stats.lock().unwrap_or_else(PoisonError::into_inner));
    }

    async fn discard(&self, key: &str) {
        if let Err(err) = self.backend.remove(key).await {
            warn!(key, backend = self.backend.name(), error = %err, "failed to delete cache entry");
            self.update_stats(CacheStats::record_backend_error);
        }
    }
}
