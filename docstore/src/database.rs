use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;
use tracing::{info, instrument};

use crate::config::DbConfig;
use crate::document::{Document, Snapshot, validate_field, validate_key};
use crate::error::StoreResult;
use crate::store::DocumentStore;
use crate::store::sqlite_store::SqliteDocumentStore;

/// Authenticated handle on the document database.
///
/// Build it once when the process starts and clone it into each store. Clones
/// share the underlying connection pool and hold no other state.
#[derive(Clone)]
pub struct Database {
    store: Arc<dyn DocumentStore>,
}

impl Database {
    /// Connect the SQLite backend described by `config`.
    pub async fn connect(config: &DbConfig) -> anyhow::Result<Self> {
        let store = SqliteDocumentStore::connect(config)
            .await
            .context("failed to open document database")?;

        info!(
            target: "docstore",
            max_connections = config.max_connections,
            "document database ready"
        );

        Ok(Self::from_store(Arc::new(store)))
    }

    /// Use an already constructed backend.
    pub fn from_store(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn collection(&self, name: &str) -> Collection {
        Collection {
            name: Arc::from(name),
            store: Arc::clone(&self.store),
        }
    }
}

/// A named collection bound to the shared backend.
#[derive(Clone)]
pub struct Collection {
    name: Arc<str>,
    store: Arc<dyn DocumentStore>,
}

impl Collection {
    pub fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip(self), target = "docstore", fields(collection = %self.name))]
    pub async fn doc_get(&self, key: &str) -> StoreResult<Option<Document>> {
        validate_key(key)?;
        self.store.get(&self.name, key).await
    }

    #[instrument(skip(self, document), target = "docstore", fields(collection = %self.name))]
    pub async fn doc_set(&self, key: &str, document: &Document) -> StoreResult<()> {
        validate_key(key)?;
        self.store.set(&self.name, key, document).await
    }

    #[instrument(skip(self), target = "docstore", fields(collection = %self.name))]
    pub async fn doc_delete(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.store.delete(&self.name, key).await
    }

    /// Exact-match query on a top-level field. No ranges, no pagination.
    #[instrument(skip(self), target = "docstore", fields(collection = %self.name))]
    pub async fn where_eq(&self, field: &str, value: &Value) -> StoreResult<Vec<Snapshot>> {
        validate_field(field)?;
        self.store.find_by_field(&self.name, field, value).await
    }
}
