//! DocumentSessionStorage
//! -----------------------
//! `SessionStorage` over the `session` collection of the document database.
//! One document per session, keyed by the session id, holding the flattened
//! session fields. Each trait method wraps a `try_*` method that keeps the
//! error kind; the wrapper logs it and returns the documented default.
use async_trait::async_trait;
use futures::{StreamExt, future, stream};
use serde_json::Value;
use tracing::{Instrument, debug, instrument, warn};

use common::logger::{TraceId, child_span, root_span};
use docstore::{Collection, Database, DbConfig};

use super::SessionStorage;
use crate::error::SessionStorageError;
use crate::model::Session;

pub const SESSION_COLLECTION: &str = "session";

#[derive(Clone)]
pub struct DocumentSessionStorage {
    sessions: Collection,
    delete_concurrency: usize,
}

impl DocumentSessionStorage {
    pub fn new(db: &Database) -> Self {
        Self {
            sessions: db.collection(SESSION_COLLECTION),
            delete_concurrency: DbConfig::DEFAULT_DELETE_CONCURRENCY,
        }
    }

    pub fn from_config(db: &Database, config: &DbConfig) -> Self {
        Self::new(db).with_delete_concurrency(config.delete_concurrency)
    }

    /// Cap on deletes in flight during `delete_sessions`. Clamped to at least 1.
    pub fn with_delete_concurrency(mut self, limit: usize) -> Self {
        self.delete_concurrency = limit.max(1);
        self
    }

    pub async fn try_store_session(&self, session: &Session) -> Result<(), SessionStorageError> {
        if session.id.is_empty() {
            return Err(SessionStorageError::InvalidSession(
                "session id is empty".to_string(),
            ));
        }

        let doc = session.to_document()?;
        self.sessions.doc_set(&session.id, &doc).await?;
        Ok(())
    }

    pub async fn try_load_session(&self, id: &str) -> Result<Option<Session>, SessionStorageError> {
        let Some(doc) = self.sessions.doc_get(id).await? else {
            return Ok(None);
        };

        let session = Session::from_document(doc)?;
        if session.id != id {
            warn!(
                target: "session",
                key = id,
                session_id = %session.id,
                "session document key does not match its id"
            );
        }
        Ok(Some(session))
    }

    pub async fn try_delete_session(&self, id: &str) -> Result<(), SessionStorageError> {
        self.sessions.doc_delete(id).await?;
        Ok(())
    }

    /// Fan out one delete per id, at most `delete_concurrency` at a time.
    ///
    /// Every id is attempted even after a failure. Nothing is rolled back.
    pub async fn try_delete_sessions(&self, ids: &[String]) -> Result<(), SessionStorageError> {
        if ids.is_empty() {
            return Ok(());
        }

        let trace_id = TraceId::default();
        let sessions = &self.sessions;

        let failed = async {
            let failures: Vec<(String, SessionStorageError)> = stream::iter(ids.to_vec())
                .map(move |id: String| async move {
                    let span = child_span("delete_session", &id);
                    match sessions.doc_delete(&id).instrument(span).await {
                        Ok(()) => None,
                        Err(e) => Some((id, SessionStorageError::from(e))),
                    }
                })
                .buffer_unordered(self.delete_concurrency)
                .filter_map(future::ready)
                .collect()
                .await;

            for (id, e) in &failures {
                warn!(target: "session", session_id = %id, error = %e, "session delete failed");
            }
            debug!(target: "session", total = ids.len(), failed = failures.len(), "batch delete done");

            failures.len()
        }
        .instrument(root_span("delete_sessions", &trace_id))
        .await;

        if failed == 0 {
            Ok(())
        } else {
            Err(SessionStorageError::PartialDelete {
                failed,
                total: ids.len(),
            })
        }
    }

    /// Sessions whose `shop` field matches exactly. One document that no
    /// longer decodes fails the whole lookup.
    pub async fn try_find_sessions_by_shop(
        &self,
        shop: &str,
    ) -> Result<Vec<Session>, SessionStorageError> {
        let hits = self
            .sessions
            .where_eq("shop", &Value::String(shop.to_string()))
            .await?;

        hits.into_iter()
            .map(|hit| Session::from_document(hit.data))
            .collect()
    }
}

#[async_trait]
impl SessionStorage for DocumentSessionStorage {
    #[instrument(skip(self, session), target = "session", fields(session_id = %session.id))]
    async fn store_session(&self, session: &Session) -> bool {
        match self.try_store_session(session).await {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "session", error = %e, "session store failed");
                false
            }
        }
    }

    #[instrument(skip(self), target = "session")]
    async fn load_session(&self, id: &str) -> Option<Session> {
        match self.try_load_session(id).await {
            Ok(found) => found,
            Err(e) => {
                warn!(target: "session", error = %e, "session load failed");
                None
            }
        }
    }

    #[instrument(skip(self), target = "session")]
    async fn delete_session(&self, id: &str) -> bool {
        match self.try_delete_session(id).await {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "session", error = %e, "session delete failed");
                false
            }
        }
    }

    #[instrument(skip(self, ids), target = "session", fields(count = ids.len()))]
    async fn delete_sessions(&self, ids: &[String]) -> bool {
        match self.try_delete_sessions(ids).await {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "session", error = %e, "batch session delete failed");
                false
            }
        }
    }

    #[instrument(skip(self), target = "session")]
    async fn find_sessions_by_shop(&self, shop: &str) -> Vec<Session> {
        match self.try_find_sessions_by_shop(shop).await {
            Ok(found) => found,
            Err(e) => {
                warn!(target: "session", error = %e, "session lookup by shop failed");
                Vec::new()
            }
        }
    }
}
