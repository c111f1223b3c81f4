//! Table scrape-and-replace library.
//!
//! Fetches a public HTML page, pulls one table out of it and replaces the
//! whole contents of a keyed collection with the rows found.
//!
//! # Usage
//!
//! ```rust,ignore
//! use table_scrape::{HttpFetcher, MemoryStore, ScrapeJob, StderrSink};
//!
//! let job = ScrapeJob::new(HttpFetcher::new()?, MemoryStore::new(), StderrSink);
//!
//! // Reads SOURCE_URL, TARGET_COLLECTION_NAME, STRUCTURAL_SELECTOR, ...
//! let result = job.invoke(&serde_json::Value::Null).await;
//! assert!(result.is_success());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Seams for fetching, storage and outcome events
//! - [`types`] - Records, configuration and the result descriptor
//! - [`pipeline`] - Extractor, Replacer, Reporter and the job that runs them
//! - [`fetchers`] - HTTP and mock fetchers
//! - [`stores`] - Memory and PostgreSQL collection stores

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod stores;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ConfigError, FetchError, ScrapeError, StoreError};
pub use traits::{
    fetcher::Fetcher,
    sink::{EventKind, LogEvent, LogSink},
    store::CollectionStore,
};
pub use types::{
    config::{ReplaceStrategy, ScrapeConfig},
    outcome::InvocationResult,
    record::Record,
};

pub use pipeline::{
    extract, InvocationPhase, MemorySink, Replacer, Reporter, ScrapeJob, StderrSink,
};

pub use fetchers::{HttpFetcher, MockFetcher};
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
