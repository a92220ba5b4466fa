//! Limiter Module
//!
//! Bounded-concurrency execution of async tasks.

mod handle;
mod runner;

pub use handle::TaskHandle;
pub use runner::ConcurrencyLimiter;

/// Parallel lookups allowed by default.
pub const DEFAULT_CONCURRENCY: usize = 10;
