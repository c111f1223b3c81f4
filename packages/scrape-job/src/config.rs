use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Default schedule: every 15 minutes, on the minute.
pub const DEFAULT_SCHEDULE: &str = "0 */15 * * * *";

/// Process-level configuration loaded from environment variables.
///
/// Per-invocation settings (source URL, selector, collection, ...) are not
/// here; each invocation reads those itself.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub schedule: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            schedule: env::var("SCRAPE_SCHEDULE")
                .unwrap_or_else(|_| DEFAULT_SCHEDULE.to_string()),
        })
    }
}
