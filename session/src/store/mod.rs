pub mod document_store;

use crate::model::Session;

/// Pluggable session persistence.
///
/// Every method reports failure through its return value only: `false`,
/// `None` or an empty list. A missing session and an unreachable backend are
/// indistinguishable here.
#[async_trait::async_trait]
pub trait SessionStorage: Send + Sync {
    /// Overwrite the stored copy of `session`, keyed by its id.
    async fn store_session(&self, session: &Session) -> bool;

    async fn load_session(&self, id: &str) -> Option<Session>;

    async fn delete_session(&self, id: &str) -> bool;

    /// Delete every id concurrently. `false` if any single delete failed;
    /// the ones that succeeded stay deleted.
    async fn delete_sessions(&self, ids: &[String]) -> bool;

    /// All sessions whose `shop` equals `shop` exactly.
    async fn find_sessions_by_shop(&self, shop: &str) -> Vec<Session>;
}
