//! API Client
//!
//! Composes the HTTP fetcher, the read-through cache and the concurrency
//! limiter into one lookup entry point.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::cache::ReadThroughCache;
use crate::config::Config;
use crate::error::Result;
use crate::fetch::{HttpFetcher, Payload};
use crate::limiter::{ConcurrencyLimiter, TaskHandle};

// == API Client ==
/// Cached, throttled access to API endpoints.
///
/// Clones share the cache, the fetcher and the limiter's slots.
#[derive(Debug, Clone)]
pub struct ApiClient {
    cache: Arc<ReadThroughCache>,
    fetcher: Arc<HttpFetcher>,
    limiter: ConcurrencyLimiter,
    ttl: Option<Duration>,
}

impl ApiClient {
    pub fn new(cache: Arc<ReadThroughCache>, fetcher: HttpFetcher, limiter: ConcurrencyLimiter) -> Self {
        Self {
            cache,
            fetcher: Arc::new(fetcher),
            limiter,
            ttl: None,
        }
    }

    /// Builds the cache, fetcher and limiter described by `config`.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let limiter = ConcurrencyLimiter::new(config.concurrency_limit)?;
        let cache = Arc::new(ReadThroughCache::from_config(config).await);
        let fetcher = HttpFetcher::from_config(config);

        info!(
            limit = config.concurrency_limit,
            base_url = %config.api_base_url,
            "API client ready"
        );
        Ok(Self::new(cache, fetcher, limiter))
    }

    /// Overrides the cache's default freshness for this client's lookups.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn cache(&self) -> &ReadThroughCache {
        &self.cache
    }

    pub fn limiter(&self) -> &ConcurrencyLimiter {
        &self.limiter
    }

    // == Lookup ==
    /// Queues a cached fetch of `endpoint` behind the limiter.
    ///
    /// The handle's outer `Result` reports a task that never finished; the
    /// inner one is the fetch outcome.
    pub fn lookup(&self, endpoint: impl Into<String>) -> TaskHandle<Result<Payload>> {
        let endpoint = endpoint.into();
        let cache = Arc::clone(&self.cache);
        let fetcher = Arc::clone(&self.fetcher);
        let ttl = self.ttl;

        self.limiter.run(move || async move {
            cache
                .get_or_fetch(&endpoint, ttl, || fetcher.fetch(&endpoint))
                .await
        })
    }

    /// Looks up every endpoint, returning outcomes in input order.
    pub async fn lookup_many<I, S>(&self, endpoints: I) -> Vec<Result<Payload>>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        // Submit everything first so the limiter keeps its slots busy
        let handles: Vec<_> = endpoints.into_iter().map(|e| self.lookup(e)).collect();

        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.and_then(|fetched| fetched));
        }
        outcomes
    }
}
