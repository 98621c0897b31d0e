pub mod sqlite_store;

use serde_json::Value;

use crate::document::{Document, Snapshot};
use crate::error::StoreResult;

/// Primitives the backing document database offers, scoped by collection.
///
/// Implementations give document-level atomicity only. Callers get no
/// transactions and concurrent writers to one key race (last write wins).
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document. `Ok(None)` when the key does not exist.
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>>;

    /// Overwrite the document at `key`. Never merges with the previous body.
    async fn set(&self, collection: &str, key: &str, document: &Document) -> StoreResult<()>;

    /// Remove the document at `key`. Removing a missing key succeeds.
    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()>;

    /// Documents whose top-level `field` equals `value`, ordered by key.
    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Snapshot>>;
}
