//! Replacement of a collection's contents.
//!
//! Two phases, neither transactional with the other:
//!
//! ```text
//! drain-then-load:  list ids ─► delete (batched) ─► put (batched)
//! load-then-prune:  list ids ─► put (batched)    ─► delete listed ids (batched)
//! ```
//!
//! A failure aborts whatever is left. Deleted items are not restored and
//! written items are not rolled back.

use tracing::{debug, info, warn};

use crate::error::{StoreError, StoreResult};
use crate::pipeline::phase::InvocationPhase;
use crate::traits::store::CollectionStore;
use crate::types::config::{ReplaceStrategy, ScrapeConfig, DEFAULT_BATCH_SIZE};
use crate::types::record::Record;

/// Replaces everything in a collection with a new record set.
#[derive(Debug, Clone, Copy)]
pub struct Replacer {
    batch_size: usize,
    strategy: ReplaceStrategy,
}

impl Default for Replacer {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE, ReplaceStrategy::default())
    }
}

impl Replacer {
    /// Create a replacer. A zero batch size is treated as one.
    pub fn new(batch_size: usize, strategy: ReplaceStrategy) -> Self {
        Self {
            batch_size: batch_size.max(1),
            strategy,
        }
    }

    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self::new(config.batch_size, config.replace_strategy)
    }

    pub fn strategy(&self) -> ReplaceStrategy {
        self.strategy
    }

    /// Make `collection` hold exactly `records` and return how many were
    /// written.
    ///
    /// `on_phase` is told when the drain and load phases complete, in the
    /// order they happen.
    pub async fn replace<S, F>(
        &self,
        store: &S,
        collection: &str,
        records: &[Record],
        mut on_phase: F,
    ) -> StoreResult<usize>
    where
        S: CollectionStore + ?Sized,
        F: FnMut(InvocationPhase) + Send,
    {
        if records.is_empty() {
            return Err(StoreError::EmptyReplacement(collection.to_string()));
        }

        info!(
            collection = %collection,
            store = store.name(),
            strategy = self.strategy.as_str(),
            new_records = records.len(),
            "Replacing collection contents"
        );

        let existing = store.list_ids(collection).await?;
        debug!(collection = %collection, existing = existing.len(), "Listed existing ids");

        let (deleted, inserted) = match self.strategy {
            ReplaceStrategy::DrainThenLoad => {
                let deleted = self.delete_all(store, collection, &existing).await?;
                on_phase(InvocationPhase::Drained);
                let inserted = self.load(store, collection, records).await?;
                on_phase(InvocationPhase::Loaded);
                (deleted, inserted)
            }
            ReplaceStrategy::LoadThenPrune => {
                let inserted = self.load(store, collection, records).await?;
                on_phase(InvocationPhase::Loaded);
                let deleted = self.delete_all(store, collection, &existing).await?;
                on_phase(InvocationPhase::Drained);
                (deleted, inserted)
            }
        };

        info!(collection = %collection, deleted, inserted, "Collection replaced");
        Ok(inserted)
    }

    async fn delete_all<S>(&self, store: &S, collection: &str, ids: &[String]) -> StoreResult<usize>
    where
        S: CollectionStore + ?Sized,
    {
        let mut deleted = 0;
        for batch in ids.chunks(self.batch_size) {
            store.delete_batch(collection, batch).await.map_err(|e| {
                warn!(collection = %collection, deleted_so_far = deleted, error = %e, "Delete batch failed");
                e
            })?;
            deleted += batch.len();
        }
        Ok(deleted)
    }

    async fn load<S>(&self, store: &S, collection: &str, records: &[Record]) -> StoreResult<usize>
    where
        S: CollectionStore + ?Sized,
    {
        let mut inserted = 0;
        for batch in records.chunks(self.batch_size) {
            store.put_batch(collection, batch).await.map_err(|e| {
                warn!(collection = %collection, inserted_so_far = inserted, error = %e, "Put batch failed");
                e
            })?;
            inserted += batch.len();
        }
        Ok(inserted)
    }
}
