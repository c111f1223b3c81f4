//! Typed errors for the scrape pipeline.
//!
//! Each component has its own error enum. They all collapse into
//! [`ScrapeError`], the closed set of failure kinds an invocation can
//! report. Messages never repeat their `source()`; [`error_chain`] appends
//! the causes.

use std::error::Error as StdError;
use std::time::Duration;

use thiserror::Error;

/// Every way a single invocation can fail.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Required configuration missing or malformed
    #[error(transparent)]
    Configuration(#[from] ConfigError),

    /// Source document could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Selector matched nothing in the document
    #[error("no element matches selector `{selector}`")]
    StructureNotFound { selector: String },

    /// Table was found but had no data rows
    #[error("table matched by `{selector}` contains no data rows")]
    EmptyExtraction { selector: String },

    /// Drain or load against the collection failed
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Configuration errors, raised before any I/O happens.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set
    #[error("environment variable {0} must be set")]
    MissingVar(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid value for {var}: {reason}")]
    InvalidVar { var: &'static str, reason: String },

    /// The structural selector is not valid CSS
    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Errors from retrieving the source document.
#[derive(Debug, Error)]
pub enum FetchError {
    /// URL could not be parsed
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Server answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    /// Request did not complete within the timeout
    #[error("timed out after {timeout:?} fetching {url}")]
    Timeout { url: String, timeout: Duration },

    /// Connection or body read failed
    #[error("HTTP request failed")]
    Transport(#[source] Box<dyn StdError + Send + Sync>),
}

/// Errors from the persisted collection.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Collection name is not usable by the backend
    #[error("invalid collection name: {0}")]
    InvalidCollection(String),

    /// Listing existing identifiers failed
    #[error("listing ids in {collection} failed")]
    List {
        collection: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A delete batch failed
    #[error("deleting {count} items from {collection} failed")]
    Delete {
        collection: String,
        count: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A put batch failed
    #[error("writing {count} items to {collection} failed")]
    Put {
        collection: String,
        count: usize,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// Backend could not be reached or configured
    #[error("could not set up the store connection")]
    Connection(#[source] Box<dyn StdError + Send + Sync>),

    /// Attempted to replace a collection with nothing
    #[error("refusing to replace {0} with an empty record set")]
    EmptyReplacement(String),
}

/// Result type alias for a whole invocation.
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Render an error and its full `source()` chain, one cause per line.
pub fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = err.to_string();
    let mut current = err.source();
    while let Some(cause) = current {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        current = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_chain_walks_sources() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "connection reset");
        let err = ScrapeError::from(FetchError::Transport(Box::new(inner)));

        let chain = error_chain(&err);

        assert_eq!(chain, "HTTP request failed\n  caused by: connection reset");
    }

    #[test]
    fn test_each_cause_appears_once() {
        let err = ScrapeError::from(StoreError::Put {
            collection: "sismos".to_string(),
            count: 2,
            source: "disk full".into(),
        });

        let chain = error_chain(&err);

        assert_eq!(chain.matches("disk full").count(), 1);
        assert_eq!(chain.matches("writing 2 items to sismos failed").count(), 1);
    }

    #[test]
    fn test_missing_var_message_names_variable() {
        let err = ScrapeError::from(ConfigError::MissingVar("TARGET_COLLECTION_NAME"));
        assert!(matches!(err, ScrapeError::Configuration(_)));
        assert_eq!(
            err.to_string(),
            "environment variable TARGET_COLLECTION_NAME must be set"
        );
    }
}
