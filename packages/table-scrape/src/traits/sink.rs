//! Destination for outcome events.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity tag of an outcome event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventKind {
    Info,
    Error,
}

/// One structured outcome event: `{"tipo", "log_datos", "ts"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEvent {
    #[serde(rename = "tipo")]
    pub kind: EventKind,

    #[serde(rename = "log_datos")]
    pub data: Map<String, Value>,

    /// RFC 3339 UTC timestamp.
    pub ts: String,
}

/// Receives outcome events. Emitting must not fail the invocation.
pub trait LogSink: Send + Sync {
    fn emit(&self, event: &LogEvent);
}
