//! In-memory storage implementation for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::error::{StoreError, StoreResult};
use crate::traits::store::CollectionStore;
use crate::types::record::Record;

/// Operation kinds, used for call tracking and failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    List,
    Delete,
    Put,
}

/// One call made against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    pub collection: String,
    /// Ids or records in the batch (zero for listings).
    pub batch_len: usize,
    /// Items in the collection once the call finished.
    pub size_after: usize,
    pub failed: bool,
}

#[derive(Debug)]
struct InjectedFailure {
    op: StoreOp,
    remaining_successes: usize,
}

/// In-memory collections of records.
///
/// Clones share state. Useful for tests and dry runs; data is lost on
/// restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, HashMap<String, Record>>>>,
    calls: Arc<RwLock<Vec<StoreCall>>>,
    failure: Arc<RwLock<Option<InjectedFailure>>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Put records directly, bypassing call tracking.
    pub fn seed(&self, collection: &str, records: impl IntoIterator<Item = Record>) {
        let mut collections = self.collections.write().unwrap();
        let items = collections.entry(collection.to_string()).or_default();
        for record in records {
            items.insert(record.id.clone(), record);
        }
    }

    /// Let `successes` calls of `op` through, then fail the next one.
    ///
    /// The failure fires once; later calls succeed again.
    pub fn fail_after(&self, op: StoreOp, successes: usize) {
        *self.failure.write().unwrap() = Some(InjectedFailure {
            op,
            remaining_successes: successes,
        });
    }

    /// Every record in `collection`, in no particular order.
    pub fn records(&self, collection: &str) -> Vec<Record> {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .map(|items| items.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of items in `collection`.
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .unwrap()
            .get(collection)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Every call made so far.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of calls of a given kind.
    pub fn call_count(&self, op: StoreOp) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| c.op == op)
            .count()
    }

    fn should_fail(&self, op: StoreOp) -> bool {
        let mut failure = self.failure.write().unwrap();
        match failure.as_mut() {
            Some(f) if f.op == op => {
                if f.remaining_successes == 0 {
                    *failure = None;
                    true
                } else {
                    f.remaining_successes -= 1;
                    false
                }
            }
            _ => false,
        }
    }

    fn track(&self, op: StoreOp, collection: &str, batch_len: usize, failed: bool) {
        let size_after = self.len(collection);
        self.calls.write().unwrap().push(StoreCall {
            op,
            collection: collection.to_string(),
            batch_len,
            size_after,
            failed,
        });
    }
}

fn injected(op: StoreOp) -> Box<dyn std::error::Error + Send + Sync> {
    format!("injected {:?} failure", op).into()
}

#[async_trait]
impl CollectionStore for MemoryStore {
    async fn list_ids(&self, collection: &str) -> StoreResult<Vec<String>> {
        if self.should_fail(StoreOp::List) {
            self.track(StoreOp::List, collection, 0, true);
            return Err(StoreError::List {
                collection: collection.to_string(),
                source: injected(StoreOp::List),
            });
        }

        let ids = self
            .collections
            .read()
            .unwrap()
            .get(collection)
            .map(|items| items.keys().cloned().collect())
            .unwrap_or_default();
        self.track(StoreOp::List, collection, 0, false);
        Ok(ids)
    }

    async fn delete_batch(&self, collection: &str, ids: &[String]) -> StoreResult<()> {
        if self.should_fail(StoreOp::Delete) {
            self.track(StoreOp::Delete, collection, ids.len(), true);
            return Err(StoreError::Delete {
                collection: collection.to_string(),
                count: ids.len(),
                source: injected(StoreOp::Delete),
            });
        }

        if let Some(items) = self.collections.write().unwrap().get_mut(collection) {
            for id in ids {
                items.remove(id);
            }
        }
        self.track(StoreOp::Delete, collection, ids.len(), false);
        Ok(())
    }

    async fn put_batch(&self, collection: &str, records: &[Record]) -> StoreResult<()> {
        if self.should_fail(StoreOp::Put) {
            self.track(StoreOp::Put, collection, records.len(), true);
            return Err(StoreError::Put {
                collection: collection.to_string(),
                count: records.len(),
                source: injected(StoreOp::Put),
            });
        }

        {
            let mut collections = self.collections.write().unwrap();
            let items = collections.entry(collection.to_string()).or_default();
            for record in records {
                items.insert(record.id.clone(), record.clone());
            }
        }
        self.track(StoreOp::Put, collection, records.len(), false);
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
