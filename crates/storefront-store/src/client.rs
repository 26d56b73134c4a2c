//! # Item Store Client
//!
//! The CRUD contract every backend implements.
//!
//! ## Backends
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Arc<dyn ItemStore>                                 │
//! │                             │                                           │
//! │          ┌──────────────────┼───────────────────────┐                   │
//! │          ▼                  ▼                       ▼                   │
//! │   HttpItemStore      Timestamped<SqliteItemStore>   test doubles        │
//! │   (remote REST)      (local, stamps createdAt /                         │
//! │                       updatedAt before persisting)                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Records travel as `serde_json::Value`; [`ItemStoreExt`] adds typed
//! wrappers. A failed call never applies partially.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{StoreError, StoreResult};
use crate::path::{Query, ResourcePath};

/// CRUD access to an item store.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Fetches a record (item path) or a list of records (collection or
    /// nested path).
    async fn get(&self, path: &ResourcePath, query: &Query) -> StoreResult<Value>;

    /// Creates a record in the collection at `path`; returns it with its id.
    async fn create(&self, path: &ResourcePath, record: Value) -> StoreResult<Value>;

    /// Partially updates the record at `path`; returns the merged record.
    async fn update(&self, path: &ResourcePath, patch: Value) -> StoreResult<Value>;
}

/// Typed convenience methods for item stores.
#[async_trait]
pub trait ItemStoreExt: ItemStore {
    async fn get_as<T>(&self, path: &ResourcePath, query: &Query) -> StoreResult<T>
    where
        T: DeserializeOwned + Send,
    {
        decode(self.get(path, query).await?)
    }

    async fn create_as<R, T>(&self, path: &ResourcePath, record: &R) -> StoreResult<T>
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        decode(self.create(path, encode(record)?).await?)
    }

    async fn update_as<R, T>(&self, path: &ResourcePath, patch: &R) -> StoreResult<T>
    where
        R: Serialize + Sync,
        T: DeserializeOwned + Send,
    {
        decode(self.update(path, encode(patch)?).await?)
    }
}

impl<S: ItemStore + ?Sized> ItemStoreExt for S {}

/// Deserializes a record returned by the store.
pub fn decode<T: DeserializeOwned>(value: Value) -> StoreResult<T> {
    serde_json::from_value(value).map_err(StoreError::from)
}

/// Serializes a record into an object body.
pub fn encode<R: Serialize + ?Sized>(record: &R) -> StoreResult<Value> {
    let value = serde_json::to_value(record)?;
    if !value.is_object() {
        return Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            value
        )));
    }
    Ok(value)
}
