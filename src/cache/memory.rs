//! In-Memory Backend Module
//!
//! HashMap storage with optional LRU-bounded capacity.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::cache::{CacheBackend, CacheEntry, LruTracker};
use crate::error::Result;

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
}

// == Memory Backend ==
/// Process-local cache storage.
///
/// Unbounded unless `max_entries` is set, in which case inserting a new key
/// at capacity evicts the least recently used key.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<MemoryState>,
    max_entries: Option<usize>,
    evictions: AtomicU64,
}

impl MemoryBackend {
    // == Constructor ==
    /// Creates an unbounded backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend holding at most `max_entries` entries
    /// (`None` = unbounded).
    pub fn with_capacity_limit(max_entries: Option<usize>) -> Self {
        Self {
            max_entries,
            ..Self::default()
        }
    }

    /// Capacity bound, `None` when unbounded.
    pub fn max_entries(&self) -> Option<usize> {
        self.max_entries
    }

    /// Returns the number of stored entries, fresh or not.
    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn evictions(&self) -> u64 {
        self.evictions.load(Ordering::Relaxed)
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        let mut state = self.state.lock().await;
        let entry = state.entries.get(key).cloned();
        // Recency only matters when there is a bound to enforce
        if entry.is_some() && self.max_entries.is_some() {
            state.lru.touch(key);
        }
        Ok(entry)
    }

    async fn store(&self, entry: CacheEntry) -> Result<()> {
        let mut state = self.state.lock().await;
        let is_overwrite = state.entries.contains_key(&entry.key);

        if let Some(max) = self.max_entries {
            // A zero bound stores nothing
            if max == 0 {
                return Ok(());
            }
            if !is_overwrite && state.entries.len() >= max {
                if let Some(evicted) = state.lru.pop_least_recent() {
                    state.entries.remove(&evicted);
                    self.evictions.fetch_add(1, Ordering::Relaxed);
                    debug!(key = %evicted, "evicted least recently used cache entry");
                }
            }
            state.lru.touch(&entry.key);
        }

        state.entries.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let mut state = self.state.lock().await;
        state.entries.remove(key);
        state.lru.forget(key);
        Ok(())
    }
}
