use serde_json::{Map, Value};

use crate::error::{StoreError, StoreResult};

/// Untyped document body. No schema is enforced at this layer.
pub type Document = Map<String, Value>;

/// One query hit: the document key and its decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub key: String,
    pub data: Document,
}

/// Keys are opaque ids but may not be empty or contain a path separator.
pub fn validate_key(key: &str) -> StoreResult<()> {
    if key.is_empty() || key.contains('/') {
        return Err(StoreError::InvalidKey(key.to_string()));
    }
    Ok(())
}

/// Only plain top-level identifiers are queryable. They end up inside a
/// JSON path expression, so anything else is rejected.
pub fn validate_field(field: &str) -> StoreResult<()> {
    let mut chars = field.chars();
    let head_ok = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_');
    if !head_ok || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(StoreError::InvalidField(field.to_string()));
    }
    Ok(())
}

/// Decode a stored body, insisting on a JSON object.
pub(crate) fn decode_body(collection: &str, key: &str, body: &str) -> StoreResult<Document> {
    match serde_json::from_str::<Value>(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject {
            collection: collection.to_string(),
            key: key.to_string(),
        }),
    }
}
