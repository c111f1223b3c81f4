//! Seams between the pipeline and the outside world.
//!
//! Applications inject implementations of these at job construction:
//! how the document is fetched, where records are stored, and where the
//! outcome event goes.

pub mod fetcher;
pub mod sink;
pub mod store;
