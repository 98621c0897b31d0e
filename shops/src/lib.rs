//! Per-shop configuration documents.
//!
//! One untyped document per shop in the `shops` collection, read and written
//! wholesale. The plain `get`/`set` calls never fail: storage errors are
//! logged and collapse to `None`/`false`, so "missing" and "broken" look the
//! same to the caller. Use `try_get`/`try_set` when the difference matters.

use docstore::{Collection, Database, Document, StoreResult};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{instrument, warn};

pub const SHOPS_COLLECTION: &str = "shops";

#[derive(Clone)]
pub struct ShopRecordStore {
    shops: Collection,
}

impl ShopRecordStore {
    pub fn new(db: &Database) -> Self {
        Self {
            shops: db.collection(SHOPS_COLLECTION),
        }
    }

    pub async fn try_get(&self, shop: &str) -> StoreResult<Option<Document>> {
        self.shops.doc_get(shop).await
    }

    pub async fn try_set(&self, shop: &str, data: &Document) -> StoreResult<()> {
        self.shops.doc_set(shop, data).await
    }

    /// The shop's document, or `None` when it is absent or could not be read.
    #[instrument(skip(self), target = "shops")]
    pub async fn get(&self, shop: &str) -> Option<Document> {
        match self.try_get(shop).await {
            Ok(found) => found,
            Err(e) => {
                warn!(target: "shops", error = %e, "shop data read failed");
                None
            }
        }
    }

    /// Replace the shop's document with `data`. `false` on any failure.
    #[instrument(skip(self, data), target = "shops")]
    pub async fn set(&self, shop: &str, data: &Document) -> bool {
        match self.try_set(shop, data).await {
            Ok(()) => true,
            Err(e) => {
                warn!(target: "shops", error = %e, "shop data write failed");
                false
            }
        }
    }

    /// Typed read. A document that does not decode as `T` counts as absent.
    pub async fn get_as<T: DeserializeOwned>(&self, shop: &str) -> Option<T> {
        let doc = self.get(shop).await?;
        match serde_json::from_value(Value::Object(doc)) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(target: "shops", shop, error = %e, "shop data has unexpected shape");
                None
            }
        }
    }

    /// Typed write. `value` must serialize to a JSON object.
    pub async fn set_as<T: Serialize>(&self, shop: &str, value: &T) -> bool {
        match serde_json::to_value(value) {
            Ok(Value::Object(doc)) => self.set(shop, &doc).await,
            Ok(_) => {
                warn!(target: "shops", shop, "shop data must serialize to an object");
                false
            }
            Err(e) => {
                warn!(target: "shops", shop, error = %e, "shop data serialization failed");
                false
            }
        }
    }
}
