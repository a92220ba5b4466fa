//! Fetch Module
//!
//! Response classification and the HTTP fetcher that feeds the cache.

mod http;
mod payload;

pub use http::HttpFetcher;
pub use payload::{ApiError, Payload};
