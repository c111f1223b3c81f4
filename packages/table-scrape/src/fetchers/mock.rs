//! Mock fetcher for testing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;

/// A recorded call to [`MockFetcher::fetch`].
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

/// Canned-response fetcher.
///
/// Clones share state, so a test can hand one clone to the job and keep
/// another for assertions.
///
/// # Example
///
/// ```rust
/// use table_scrape::fetchers::MockFetcher;
///
/// let mock = MockFetcher::new().with_document("https://example.com", "<table></table>");
/// assert_eq!(mock.call_count(), 0);
/// ```
#[derive(Clone, Default)]
pub struct MockFetcher {
    documents: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    statuses: Arc<RwLock<HashMap<String, u16>>>,
    calls: Arc<RwLock<Vec<FetchCall>>>,
}

impl MockFetcher {
    /// Create a mock with no documents. Every fetch returns 404.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `body` for `url`.
    pub fn add_document(&self, url: impl Into<String>, body: impl Into<Vec<u8>>) {
        self.documents
            .write()
            .unwrap()
            .insert(url.into(), body.into());
    }

    /// Serve `body` for `url` (builder pattern).
    pub fn with_document(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.add_document(url, body);
        self
    }

    /// Answer `url` with a non-success status (builder pattern).
    pub fn with_status(self, url: impl Into<String>, status: u16) -> Self {
        self.statuses.write().unwrap().insert(url.into(), status);
        self
    }

    /// Number of fetches performed.
    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Every fetch performed, in order.
    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> FetchResult<Vec<u8>> {
        self.calls.write().unwrap().push(FetchCall {
            url: url.to_string(),
            user_agent: user_agent.to_string(),
            timeout,
        });

        if let Some(status) = self.statuses.read().unwrap().get(url) {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: *status,
            });
        }

        self.documents
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::Status {
                url: url.to_string(),
                status: 404,
            })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
