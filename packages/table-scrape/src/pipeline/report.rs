//! Outcome reporting.
//!
//! Each invocation ends with exactly one [`LogEvent`] and one
//! [`InvocationResult`]. Reporting never fails.

use std::io::Write;
use std::sync::{Arc, Mutex};

use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};

use crate::error::{error_chain, ScrapeError};
use crate::traits::sink::{EventKind, LogEvent, LogSink};
use crate::types::outcome::InvocationResult;
use crate::types::record::Record;

/// Writes each event as one JSON line on stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StderrSink;

impl LogSink for StderrSink {
    fn emit(&self, event: &LogEvent) {
        match serde_json::to_string(event) {
            Ok(line) => {
                let mut stderr = std::io::stderr().lock();
                let _ = writeln!(stderr, "{}", line);
            }
            Err(e) => tracing::error!(error = %e, "Failed to serialize outcome event"),
        }
    }
}

/// Keeps events in memory. Clones share the buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<LogEvent>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, event: &LogEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

/// Turns an invocation outcome into an event and a result descriptor.
#[derive(Debug, Clone, Default)]
pub struct Reporter<L> {
    sink: L,
}

impl<L: LogSink> Reporter<L> {
    pub fn new(sink: L) -> Self {
        Self { sink }
    }

    pub fn sink(&self) -> &L {
        &self.sink
    }

    /// Report a completed replacement of `records`.
    pub fn report_success(&self, records: Vec<Record>) -> InvocationResult {
        tracing::info!(total = records.len(), "Scrape succeeded");
        self.emit(
            EventKind::Info,
            json!({
                "msg": "Scraping exitoso",
                "total_filas": records.len(),
            }),
        );
        InvocationResult::success(records)
    }

    /// Report a failed invocation, including the error's cause chain.
    pub fn report_failure(&self, error: &ScrapeError) -> InvocationResult {
        let message = error.to_string();
        let trace = error_chain(error);
        tracing::error!(error = %message, "Scrape failed");
        self.emit(
            EventKind::Error,
            json!({
                "mensaje": message,
                "traceback": trace,
            }),
        );
        InvocationResult::failure(message)
    }

    fn emit(&self, kind: EventKind, data: Value) {
        let data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        self.sink.emit(&LogEvent {
            kind,
            data,
            ts: Utc::now().to_rfc3339_opts(SecondsFormat::Micros, false),
        });
    }
}
