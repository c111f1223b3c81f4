//! Retrieval of the source document.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::FetchResult;

/// A single outbound request for the source document.
///
/// Implementations make exactly one attempt. Anything other than a success
/// status within `timeout` is an error.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch `url`, identifying as `user_agent`, and return the raw body.
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> FetchResult<Vec<u8>>;

    /// Name of this fetcher (for logging).
    fn name(&self) -> &str;
}
