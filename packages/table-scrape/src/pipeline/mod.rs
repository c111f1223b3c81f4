//! Extract-and-replace pipeline.
//!
//! ```text
//! Fetcher ──► extract() ──► Replacer ──► Reporter
//!   bytes      Vec<Record>    row count    InvocationResult + LogEvent
//! ```
//!
//! [`ScrapeJob`] wires the stages together; each stage is also usable on
//! its own.

pub mod extract;
pub mod job;
pub mod phase;
pub mod replace;
pub mod report;

pub use extract::extract;
pub use job::{PhaseObserver, ScrapeJob};
pub use phase::InvocationPhase;
pub use replace::Replacer;
pub use report::{MemorySink, Reporter, StderrSink};
