//! Fetcher implementations.
//!
//! - `HttpFetcher` - reqwest-based, used in production
//! - `MockFetcher` - canned responses for tests

pub mod http;
pub mod mock;

pub use http::HttpFetcher;
pub use mock::{FetchCall, MockFetcher};
