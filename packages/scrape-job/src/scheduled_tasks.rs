//! Timer trigger using tokio-cron-scheduler.
//!
//! ```text
//! Scheduler (cron expression)
//!     │
//!     └─► ScrapeJob::invoke()
//!             └─► fetch → extract → replace → report
//! ```
//!
//! Firings are not serialized: if one invocation outlives the interval, the
//! next one starts anyway and both touch the same collection.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::json;
use table_scrape::{CollectionStore, Fetcher, LogSink, ScrapeJob};
use tokio_cron_scheduler::{Job, JobScheduler};

/// Register the scrape job on `schedule` and start the scheduler.
pub async fn start_scheduler<F, S, L>(job: Arc<ScrapeJob<F, S, L>>, schedule: &str) -> Result<JobScheduler>
where
    F: Fetcher + 'static,
    S: CollectionStore + 'static,
    L: LogSink + 'static,
{
    let scheduler = JobScheduler::new().await?;

    let scrape_job = Job::new_async(schedule, move |uuid, _lock| {
        let job = job.clone();
        Box::pin(async move {
            let event = json!({ "trigger": "schedule", "job_id": uuid.to_string() });
            let result = job.invoke(&event).await;
            if !result.is_success() {
                tracing::warn!(job_id = %uuid, "Scheduled scrape reported failure");
            }
        })
    })
    .with_context(|| format!("invalid schedule `{}`", schedule))?;

    scheduler.add(scrape_job).await?;
    scheduler.start().await?;

    tracing::info!(schedule = %schedule, "Scheduled scrape started");
    Ok(scheduler)
}
