//! One invocation of the extract-and-replace pipeline.

use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::error::Result;
use crate::pipeline::extract::extract;
use crate::pipeline::phase::InvocationPhase;
use crate::pipeline::replace::Replacer;
use crate::pipeline::report::Reporter;
use crate::traits::{fetcher::Fetcher, sink::LogSink, store::CollectionStore};
use crate::types::config::ScrapeConfig;
use crate::types::outcome::InvocationResult;
use crate::types::record::Record;

/// The scrape job with its collaborators injected.
///
/// Construct once per process and call [`ScrapeJob::invoke`] per trigger.
/// Invocations do not coordinate with each other; two overlapping runs
/// against the same collection can interleave.
///
/// # Example
///
/// ```rust,ignore
/// use table_scrape::{HttpFetcher, MemoryStore, ScrapeJob, StderrSink};
///
/// let job = ScrapeJob::new(HttpFetcher::new()?, MemoryStore::new(), StderrSink);
/// let result = job.invoke(&serde_json::Value::Null).await;
/// println!("{}", serde_json::to_string(&result)?);
/// ```
pub struct ScrapeJob<F, S, L> {
    fetcher: F,
    store: S,
    reporter: Reporter<L>,
    phase_observer: Option<PhaseObserver>,
}

/// Called with every phase an invocation enters, `Start` included.
pub type PhaseObserver = Arc<dyn Fn(InvocationPhase) + Send + Sync>;

impl<F, S, L> ScrapeJob<F, S, L>
where
    F: Fetcher,
    S: CollectionStore,
    L: LogSink,
{
    pub fn new(fetcher: F, store: S, sink: L) -> Self {
        Self {
            fetcher,
            store,
            reporter: Reporter::new(sink),
            phase_observer: None,
        }
    }

    /// Notify `observer` of each phase transition.
    pub fn with_phase_observer(
        mut self,
        observer: impl Fn(InvocationPhase) + Send + Sync + 'static,
    ) -> Self {
        self.phase_observer = Some(Arc::new(observer));
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run once with configuration from the process environment.
    pub async fn invoke(&self, event: &Value) -> InvocationResult {
        self.invoke_with_env(event, |key| std::env::var(key).ok())
            .await
    }

    /// Run once with configuration resolved through `lookup`.
    ///
    /// Never fails: every error becomes a 500 result plus one error event.
    /// The invocation always ends in [`InvocationPhase::Reported`].
    pub async fn invoke_with_env<E>(&self, event: &Value, lookup: E) -> InvocationResult
    where
        E: Fn(&str) -> Option<String>,
    {
        let invocation_id = Uuid::new_v4();
        let span = info_span!("scrape_invocation", %invocation_id);

        async {
            debug!(event = %event, "Invocation triggered");
            let mut phase = self.enter_start();
            let outcome = match ScrapeConfig::from_lookup(lookup) {
                Ok(config) => self.run_from_start(&config, &mut phase).await,
                Err(e) => Err(e.into()),
            };

            let result = match outcome {
                Ok(records) => self.reporter.report_success(records),
                Err(e) => self.reporter.report_failure(&e),
            };
            self.advance(&mut phase, InvocationPhase::Reported);
            result
        }
        .instrument(span)
        .await
    }

    /// Run the pipeline with an already-resolved configuration.
    ///
    /// Unlike [`invoke_with_env`](Self::invoke_with_env), errors are returned
    /// as-is, nothing is reported and the run stops short of `Reported`.
    pub async fn run(&self, config: &ScrapeConfig) -> Result<Vec<Record>> {
        let mut phase = self.enter_start();
        self.run_from_start(config, &mut phase).await
    }

    async fn run_from_start(
        &self,
        config: &ScrapeConfig,
        phase: &mut InvocationPhase,
    ) -> Result<Vec<Record>> {
        info!(
            url = %config.source_url,
            selector = %config.selector,
            collection = %config.collection,
            fetcher = self.fetcher.name(),
            "Scraping starting"
        );

        let result = self.run_phases(config, phase).await;
        if let Err(e) = &result {
            warn!(phase = %phase, error = %e, "Invocation aborted");
        }
        result
    }

    async fn run_phases(
        &self,
        config: &ScrapeConfig,
        phase: &mut InvocationPhase,
    ) -> Result<Vec<Record>> {
        let document = self
            .fetcher
            .fetch(&config.source_url, &config.user_agent, config.fetch_timeout)
            .await?;
        self.advance(phase, InvocationPhase::Fetched);

        let records = extract(&document, &config.selector, &config.field_names)?;
        self.advance(phase, InvocationPhase::Extracted);

        Replacer::from_config(config)
            .replace(&self.store, &config.collection, &records, |next| {
                self.advance(phase, next)
            })
            .await?;

        Ok(records)
    }

    fn enter_start(&self) -> InvocationPhase {
        let phase = InvocationPhase::Start;
        debug!(phase = %phase, "Invocation starting");
        self.notify(phase);
        phase
    }

    fn advance(&self, phase: &mut InvocationPhase, next: InvocationPhase) {
        debug!(from = %phase, to = %next, "Phase transition");
        *phase = next;
        self.notify(next);
    }

    fn notify(&self, phase: InvocationPhase) {
        if let Some(observer) = &self.phase_observer {
            observer(phase);
        }
    }
}
