//! Scrape job entry point.
//!
//! `scrape-job run` performs one invocation and prints the result
//! descriptor; `scrape-job schedule` keeps running and invokes on a cron.

mod config;
mod scheduled_tasks;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Value;
use table_scrape::{HttpFetcher, PostgresStore, ScrapeJob, StderrSink};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "scrape-job", about = "Replace a collection with the rows of an HTML table")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a single invocation and print its result as JSON
    Run {
        /// Event payload passed to the invocation
        #[arg(long, default_value = "{}")]
        event: String,
    },
    /// Invoke on a cron schedule until interrupted
    Schedule {
        /// Six-field cron expression (overrides SCRAPE_SCHEDULE)
        #[arg(long)]
        cron: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (stderr, so stdout only carries results)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,table_scrape=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    let store = PostgresStore::connect_lazy(&config.database_url)
        .context("Failed to create database pool")?;
    let fetcher = HttpFetcher::new().context("Failed to create HTTP client")?;
    let job = Arc::new(ScrapeJob::new(fetcher, store, StderrSink));

    match cli.command {
        Command::Run { event } => {
            let event: Value =
                serde_json::from_str(&event).context("--event must be valid JSON")?;
            let result = job.invoke(&event).await;
            println!("{}", serde_json::to_string(&result)?);
            if !result.is_success() {
                std::process::exit(1);
            }
        }
        Command::Schedule { cron } => {
            let schedule = cron.unwrap_or(config.schedule);
            let mut scheduler = scheduled_tasks::start_scheduler(job, &schedule).await?;

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for shutdown signal")?;
            tracing::info!("Shutting down scheduler");
            scheduler.shutdown().await?;
        }
    }

    Ok(())
}
