//! SqliteDocumentStore
//! --------------------
//! SQLite-backed implementation of `DocumentStore`. Every collection shares
//! one table; a document is a `(collection, key)` row holding the JSON body
//! as text. Field queries go through SQLite's JSON functions, so no schema
//! beyond the table itself is needed.
use async_trait::async_trait;
use serde_json::Value;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;

use super::DocumentStore;
use crate::config::DbConfig;
use crate::document::{Document, Snapshot, decode_body};
use crate::error::StoreResult;

pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Wrap an existing pool. Call [`SqliteDocumentStore::migrate`] before use
    /// unless the table is known to exist.
    pub fn from_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool per `config` and make sure the documents table exists.
    pub async fn connect(config: &DbConfig) -> StoreResult<Self> {
        let mut options = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout);

        // An in-memory database disappears with its last connection.
        if is_in_memory(&config.database_url) {
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options.connect(&config.database_url).await?;
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    /// Create the documents table if it does not exist.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                collection TEXT NOT NULL,
                key TEXT NOT NULL,
                body TEXT NOT NULL,
                updated_at_ms INTEGER NOT NULL,
                PRIMARY KEY (collection, key)
            );
        "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn row_to_snapshot(collection: &str, row: &SqliteRow) -> StoreResult<Snapshot> {
    let key: String = row.try_get("key")?;
    let body: String = row.try_get("body")?;
    let data = decode_body(collection, &key, &body)?;
    Ok(Snapshot { key, data })
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn get(&self, collection: &str, key: &str) -> StoreResult<Option<Document>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ? AND key = ?")
            .bind(collection)
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(r) => {
                let body: String = r.try_get("body")?;
                Ok(Some(decode_body(collection, key, &body)?))
            }
            None => Ok(None),
        }
    }

    /// Upsert that replaces the whole body.
    async fn set(&self, collection: &str, key: &str, document: &Document) -> StoreResult<()> {
        let body = serde_json::to_string(document)?;
        let now_ms = chrono::Utc::now().timestamp_millis();

        sqlx::query(
            r#"
            INSERT INTO documents (collection, key, body, updated_at_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(collection, key) DO UPDATE SET
                body = excluded.body,
                updated_at_ms = excluded.updated_at_ms;
        "#,
        )
        .bind(collection)
        .bind(key)
        .bind(body)
        .bind(now_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> StoreResult<()> {
        sqlx::query("DELETE FROM documents WHERE collection = ? AND key = ?")
            .bind(collection)
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> StoreResult<Vec<Snapshot>> {
        let path = format!("$.{field}");

        // Strings compare as SQL text so that a numeric field never matches
        // its string spelling. Everything else compares as minified JSON.
        let rows = match value {
            Value::String(s) => {
                sqlx::query(
                    r#"
                    SELECT key, body FROM documents
                    WHERE collection = ?
                      AND json_type(body, ?) = 'text'
                      AND json_extract(body, ?) = ?
                    ORDER BY key;
                "#,
                )
                .bind(collection)
                .bind(&path)
                .bind(&path)
                .bind(s)
                .fetch_all(&self.pool)
                .await?
            }
            other => {
                sqlx::query(
                    r#"
                    SELECT key, body FROM documents
                    WHERE collection = ? AND (body -> ?) = ?
                    ORDER BY key;
                "#,
                )
                .bind(collection)
                .bind(&path)
                .bind(serde_json::to_string(other)?)
                .fetch_all(&self.pool)
                .await?
            }
        };

        rows.iter().map(|r| row_to_snapshot(collection, r)).collect()
    }
}
