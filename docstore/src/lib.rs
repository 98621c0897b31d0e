//! Document database handle shared by the shop and session stores.
//!
//! The backing store is addressed the way a hosted document database is:
//! named collections of JSON objects, each keyed by a string id. `Database`
//! is built once at startup and cloned into every store that needs it.

pub mod config;
pub mod database;
pub mod document;
pub mod error;
pub mod store;

pub use config::DbConfig;
pub use database::{Collection, Database};
pub use document::{Document, Snapshot};
pub use error::{StoreError, StoreResult};
pub use store::DocumentStore;
pub use store::sqlite_store::SqliteDocumentStore;
