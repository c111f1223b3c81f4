//! HTTP fetcher backed by reqwest.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::Fetcher;

/// Fetches the source document with a single GET.
///
/// The underlying client is built once and reused for the process lifetime;
/// the timeout and identification header are applied per request.
///
/// # Example
///
/// ```rust,ignore
/// use table_scrape::{Fetcher, HttpFetcher};
///
/// let fetcher = HttpFetcher::new()?;
/// let body = fetcher
///     .fetch("https://example.com", "MyBot/1.0", Duration::from_secs(15))
///     .await?;
/// ```
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a fetcher with its own connection pool.
    pub fn new() -> FetchResult<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Transport(Box::new(e)))?;

        Ok(Self { client })
    }

    /// Use an existing client instead.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str, user_agent: &str, timeout: Duration) -> FetchResult<Vec<u8>> {
        let parsed = Url::parse(url).map_err(|_| FetchError::InvalidUrl {
            url: url.to_string(),
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(FetchError::InvalidUrl {
                url: url.to_string(),
            });
        }

        debug!(url = %url, timeout_secs = timeout.as_secs(), "HTTP fetch starting");

        let map_err = |e: reqwest::Error| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout,
                }
            } else {
                FetchError::Transport(Box::new(e))
            }
        };

        let response = self
            .client
            .get(parsed)
            .header(reqwest::header::USER_AGENT, user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                map_err(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "HTTP error status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(map_err)?;

        info!(url = %url, status = %status, bytes = body.len(), "Document fetched");
        Ok(body.to_vec())
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_rejects_malformed_url() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch("not a url", "test", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_rejects_non_http_scheme() {
        let fetcher = HttpFetcher::new().unwrap();
        let err = fetcher
            .fetch("file:///etc/passwd", "test", Duration::from_secs(1))
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }
}
