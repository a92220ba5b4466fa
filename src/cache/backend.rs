//! Cache Backend Module
//!
//! Storage strategy behind the read-through cache.

use std::fmt::Debug;

use async_trait::async_trait;

use crate::cache::CacheEntry;
use crate::error::Result;

// == Backend Trait ==
/// Keyed storage for cache entries.
///
/// Backends store and return entries as-is; freshness is decided by
/// [`ReadThroughCache`](crate::cache::ReadThroughCache). `load` returns
/// `Err(Error::CorruptEntry)` for an entry it cannot decode so the caller
/// can discard it.
#[async_trait]
pub trait CacheBackend: Send + Sync + Debug {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Entries dropped to stay within a capacity bound.
    fn evictions(&self) -> u64 {
        0
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Stores `entry`, replacing any entry with the same key.
    async fn store(&self, entry: CacheEntry) -> Result<()>;

    /// Deletes the entry for `key`. Deleting an absent key is not an error.
    async fn remove(&self, key: &str) -> Result<()>;
}

// == Null Backend ==
/// Backend used when no storage is available: every load misses and every
/// store is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBackend;

#[async_trait]
impl CacheBackend for NullBackend {
    fn name(&self) -> &'static str {
        "null"
    }

    async fn load(&self, _key: &str) -> Result<Option<CacheEntry>> {
        Ok(None)
    }

    async fn store(&self, _entry: CacheEntry) -> Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> Result<()> {
        Ok(())
    }
}
