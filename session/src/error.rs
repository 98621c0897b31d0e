use docstore::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionStorageError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("session encoding failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored session does not decode: {0}")]
    Decode(String),

    #[error("invalid session: {0}")]
    InvalidSession(String),

    /// Some deletes of a batch failed. The others were not rolled back.
    #[error("{failed} of {total} session deletes failed")]
    PartialDelete { failed: usize, total: usize },
}
