//! Cache Module
//!
//! Read-through TTL cache with pluggable storage backends.

mod backend;
mod entry;
mod file;
mod lru;
mod memory;
mod read_through;
mod stats;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use backend::{CacheBackend, NullBackend};
pub use entry::CacheEntry;
pub use file::FileBackend;
pub use lru::LruTracker;
pub use memory::MemoryBackend;
pub use read_through::{ReadThroughCache, API_RESPONSE_TTL, DISCORD_LIST_TTL, ITEM_CATALOG_TTL};
pub use stats::CacheStats;
