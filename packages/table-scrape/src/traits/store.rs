//! Storage trait for the replaced collection.
//!
//! The Replacer only needs three primitives: a projection-only listing of
//! ids, a batched delete by id, and a batched put. Nothing here is
//! transactional across calls.

use async_trait::async_trait;

use crate::error::StoreResult;
use crate::types::record::Record;

/// A keyed collection of records, addressed by collection name.
#[async_trait]
pub trait CollectionStore: Send + Sync {
    /// List every id currently stored in `collection`.
    ///
    /// A collection that does not exist yet lists as empty.
    async fn list_ids(&self, collection: &str) -> StoreResult<Vec<String>>;

    /// Delete the items with the given ids. Unknown ids are ignored.
    async fn delete_batch(&self, collection: &str, ids: &[String]) -> StoreResult<()>;

    /// Insert the given records, overwriting any item with the same id.
    async fn put_batch(&self, collection: &str, records: &[Record]) -> StoreResult<()>;

    /// Name of this backend (for logging).
    fn name(&self) -> &str;
}
