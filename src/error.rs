//! Error types for the fetch layer
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Error Enum ==
/// Unified error type for the limiter, cache backends and HTTP fetcher.
///
/// A cache miss is never an error; lookups return `Option` instead.
#[derive(Error, Debug)]
pub enum Error {
    /// Limiter constructed with a limit below 1
    #[error("Invalid concurrency limit: {0} (must be at least 1)")]
    InvalidLimit(usize),

    /// Task panicked or was dropped before producing a result
    #[error("Task aborted before completion")]
    TaskAborted,

    /// Cache backend I/O failure
    #[error("Cache I/O error: {0}")]
    CacheIo(#[from] std::io::Error),

    /// Stored cache entry could not be decoded
    #[error("Corrupt cache entry: {0}")]
    CorruptEntry(String),

    /// Transport or decoding failure talking to the API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API rejected the access token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

// == Result Type Alias ==
/// Convenience Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
