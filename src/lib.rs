//! Tornium Fetch - throttled, cached access to the Tornium API
//!
//! Provides a bounded-concurrency task runner and a read-through TTL cache,
//! plus the HTTP client that composes them.

pub mod cache;
pub mod client;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod limiter;

pub use cache::ReadThroughCache;
pub use client::ApiClient;
pub use config::Config;
pub use error::{Error, Result};
pub use fetch::Payload;
pub use limiter::{ConcurrencyLimiter, TaskHandle};
