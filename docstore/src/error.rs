use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("invalid document key: {0:?}")]
    InvalidKey(String),

    #[error("invalid field name: {0:?}")]
    InvalidField(String),

    #[error("stored document {collection}/{key} is not a JSON object")]
    NotAnObject { collection: String, key: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Backend-specific failure for stores that are not sqlx-based.
    #[error("backend unavailable: {0}")]
    Unavailable(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
