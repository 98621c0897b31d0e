pub mod error;
pub mod model;
pub mod scopes;
pub mod store;

pub use error::SessionStorageError;
pub use model::{AssociatedUser, OnlineAccessInfo, Session, SessionId};
pub use scopes::AuthScopes;
pub use store::SessionStorage;
pub use store::document_store::{DocumentSessionStorage, SESSION_COLLECTION};
