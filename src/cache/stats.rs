//! Cache Statistics Module
//!
//! Tracks read-through cache outcomes.

use serde::Serialize;

// == Cache Stats ==
/// Counters for cache lookups and writes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Lookups served from a fresh entry
    pub hits: u64,
    /// Lookups that found nothing usable (absent, expired or unreadable)
    pub misses: u64,
    /// Stale entries discarded on read
    pub expired: u64,
    /// Entries written
    pub writes: u64,
    /// Fetched error payloads that were not written
    pub skipped: u64,
    /// Backend failures swallowed as misses or dropped writes
    pub backend_errors: u64,
    /// Entries the backend evicted to stay within capacity
    pub evictions: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Recorders ==
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Counts a stale entry; the lookup itself is also a miss.
    pub fn record_expired(&mut self) {
        self.expired += 1;
        self.misses += 1;
    }

    pub fn record_write(&mut self) {
        self.writes += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub fn record_backend_error(&mut self) {
        self.backend_errors += 1;
    }
}
