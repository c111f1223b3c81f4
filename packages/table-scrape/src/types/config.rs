//! Per-invocation configuration.

use std::collections::HashSet;
use std::time::Duration;

use crate::error::ConfigError;

/// Environment variable holding the page to scrape.
pub const SOURCE_URL_VAR: &str = "SOURCE_URL";
/// Environment variable holding the target collection (required).
pub const TARGET_COLLECTION_VAR: &str = "TARGET_COLLECTION_NAME";
/// Environment variable holding the CSS selector of the table.
pub const SELECTOR_VAR: &str = "STRUCTURAL_SELECTOR";
/// Comma-separated column names.
pub const FIELD_NAMES_VAR: &str = "FIELD_NAMES";
/// Client identification sent as `User-Agent`.
pub const USER_AGENT_VAR: &str = "USER_AGENT";
/// Fetch timeout in whole seconds.
pub const FETCH_TIMEOUT_VAR: &str = "FETCH_TIMEOUT_SECS";
/// Items per store batch.
pub const BATCH_SIZE_VAR: &str = "BATCH_SIZE";
/// `drain-then-load` or `load-then-prune`.
pub const REPLACE_STRATEGY_VAR: &str = "REPLACE_STRATEGY";

pub const DEFAULT_SOURCE_URL: &str = "https://sgonorte.bomberosperu.gob.pe/24horas/?criterio=/";
pub const DEFAULT_SELECTOR: &str = "table.table.table-hover.table-bordered";
pub const DEFAULT_FIELD_NAMES: [&str; 3] = ["ubicacion", "fecha_hora", "magnitud"];
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; LambdaScraper/1.0; +https://example.com)";
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Matches the batch limit of key-value stores with batched writes.
pub const DEFAULT_BATCH_SIZE: usize = 25;

/// How the Replacer orders removal of old rows and insertion of new ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplaceStrategy {
    /// Delete every existing item, then insert the new ones.
    ///
    /// Readers can observe an empty collection between the two phases.
    #[default]
    DrainThenLoad,

    /// Snapshot existing ids, insert the new items, then delete the snapshot.
    ///
    /// The collection is never empty between phases; it briefly holds both
    /// generations instead.
    LoadThenPrune,
}

impl ReplaceStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DrainThenLoad => "drain-then-load",
            Self::LoadThenPrune => "load-then-prune",
        }
    }
}

impl std::str::FromStr for ReplaceStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "drain-then-load" => Ok(Self::DrainThenLoad),
            "load-then-prune" => Ok(Self::LoadThenPrune),
            other => Err(format!(
                "expected `drain-then-load` or `load-then-prune`, got `{}`",
                other
            )),
        }
    }
}

/// Everything one invocation needs, read once at its start.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    /// Page holding the table.
    pub source_url: String,

    /// CSS selector for the table element. The first match wins.
    pub selector: String,

    /// Collection whose contents are replaced.
    pub collection: String,

    /// Names assigned positionally to each row's cells.
    pub field_names: Vec<String>,

    /// Sent as `User-Agent` on the fetch.
    pub user_agent: String,

    /// Upper bound on the whole fetch.
    pub fetch_timeout: Duration,

    /// Items per delete/put batch.
    pub batch_size: usize,

    pub replace_strategy: ReplaceStrategy,
}

impl ScrapeConfig {
    /// Create a config for `collection` with every other value defaulted.
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            selector: DEFAULT_SELECTOR.to_string(),
            collection: collection.into(),
            field_names: DEFAULT_FIELD_NAMES.iter().map(|f| f.to_string()).collect(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            batch_size: DEFAULT_BATCH_SIZE,
            replace_strategy: ReplaceStrategy::default(),
        }
    }

    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Only `TARGET_COLLECTION_NAME` is required. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let collection = get(TARGET_COLLECTION_VAR)
            .ok_or(ConfigError::MissingVar(TARGET_COLLECTION_VAR))?;
        let mut config = Self::new(collection.trim());

        if let Some(url) = get(SOURCE_URL_VAR) {
            config.source_url = url;
        }
        if let Some(selector) = get(SELECTOR_VAR) {
            config.selector = selector;
        }
        if let Some(names) = get(FIELD_NAMES_VAR) {
            config.field_names = parse_field_names(&names).map_err(|reason| {
                ConfigError::InvalidVar {
                    var: FIELD_NAMES_VAR,
                    reason,
                }
            })?;
        }
        if let Some(agent) = get(USER_AGENT_VAR) {
            config.user_agent = agent;
        }
        if let Some(secs) = get(FETCH_TIMEOUT_VAR) {
            let secs = secs.trim().parse::<u64>().map_err(|e| ConfigError::InvalidVar {
                var: FETCH_TIMEOUT_VAR,
                reason: format!("{}", e),
            })?;
            if secs == 0 {
                return Err(ConfigError::InvalidVar {
                    var: FETCH_TIMEOUT_VAR,
                    reason: "timeout must be positive".to_string(),
                });
            }
            config.fetch_timeout = Duration::from_secs(secs);
        }
        if let Some(size) = get(BATCH_SIZE_VAR) {
            let size = size.trim().parse::<usize>().map_err(|e| ConfigError::InvalidVar {
                var: BATCH_SIZE_VAR,
                reason: format!("{}", e),
            })?;
            if size == 0 {
                return Err(ConfigError::InvalidVar {
                    var: BATCH_SIZE_VAR,
                    reason: "batch size must be positive".to_string(),
                });
            }
            config.batch_size = size;
        }
        if let Some(strategy) = get(REPLACE_STRATEGY_VAR) {
            config.replace_strategy = strategy
                .parse::<ReplaceStrategy>()
                .map_err(|reason| ConfigError::InvalidVar {
                    var: REPLACE_STRATEGY_VAR,
                    reason,
                })?;
        }

        Ok(config)
    }

    /// Set the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    /// Set the table selector.
    pub fn with_selector(mut self, selector: impl Into<String>) -> Self {
        self.selector = selector.into();
        self
    }

    /// Set the positional field names.
    pub fn with_field_names(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.field_names = names.into_iter().map(|n| n.into()).collect();
        self
    }

    /// Set the identification header.
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set the fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Set the store batch size. Zero is clamped to one.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size.max(1);
        self
    }

    /// Set the replace strategy.
    pub fn with_replace_strategy(mut self, strategy: ReplaceStrategy) -> Self {
        self.replace_strategy = strategy;
        self
    }
}

/// Field names share a record with its `id`, so `id` is reserved and every
/// name must be distinct.
fn parse_field_names(raw: &str) -> Result<Vec<String>, String> {
    let names: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .collect();

    if names.is_empty() {
        return Err("no field names given".to_string());
    }

    let mut seen = HashSet::new();
    for name in &names {
        if name == "id" {
            return Err("`id` is reserved for the record identifier".to_string());
        }
        if !seen.insert(name.as_str()) {
            return Err(format!("field `{}` is listed more than once", name));
        }
    }

    Ok(names)
}
