//! # SQLite Item Store
//!
//! A local [`ItemStore`] with the observable contract of a REST item store.
//!
//! ## Storage Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  items                                                                  │
//! │  ┌──────────────┬──────┬──────────────────────────────────────────────┐ │
//! │  │ collection   │ id   │ body (JSON)                                  │ │
//! │  ├──────────────┼──────┼──────────────────────────────────────────────┤ │
//! │  │ products     │ 1    │ {"id":1,"name":"Scale","price":10000,...}    │ │
//! │  │ orders       │ 1    │ {"id":1,"userId":1,"totalAmounts":2,...}     │ │
//! │  │ orderItems   │ 1    │ {"id":1,"orderId":1,"productId":1,...}       │ │
//! │  └──────────────┴──────┴──────────────────────────────────────────────┘ │
//! │                                                                         │
//! │  GET orders/1/orderItems  → body.orderId = 1                           │
//! │  ?_expand=product         → body.product = products/{body.productId}   │
//! │  POST                     → id = max(id) + 1 (or the given id)         │
//! │  PATCH                    → shallow merge, id is kept                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Timestamps are not stamped here; wrap the store in
//! [`Timestamped`](crate::middleware::Timestamped) (see [`open_local`]).

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

use crate::client::ItemStore;
use crate::error::{StoreError, StoreResult};
use crate::middleware::Timestamped;
use crate::migrations;
use crate::path::{foreign_key, plural, Query, ResourcePath};

const MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// Database configuration.
///
/// ## Example
/// ```rust,ignore
/// let config = DbConfig::new("./storefront.db")
///     .max_connections(5)
///     .min_connections(1);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Connection timeout duration.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection. `None` keeps connections.
    /// Default: 10 minutes
    pub idle_timeout: Option<Duration>,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for an on-disk database (created if missing).
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory database configuration (for testing).
    ///
    /// The database lives as long as its single connection, so the pool
    /// never lets that connection expire.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: None,
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == MEMORY_PATH
    }

    fn connect_options(&self) -> StoreResult<SqliteConnectOptions> {
        if self.is_in_memory() {
            return SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| StoreError::ConnectionFailed(e.to_string()));
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.database_path)
            // WAL mode: readers don't block writers
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .create_if_missing(true);
        Ok(options)
    }
}

// =============================================================================
// Store
// =============================================================================

/// SQLite-backed item store.
#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Opens the database and runs migrations (if enabled).
    ///
    /// ## Example
    /// ```rust,ignore
    /// let store = SqliteItemStore::open(DbConfig::new("./storefront.db")).await?;
    /// ```
    pub async fn open(config: DbConfig) -> StoreResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Opening local item store"
        );

        let options = config.connect_options()?;
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .max_lifetime(if config.is_in_memory() {
                None
            } else {
                Some(Duration::from_secs(30 * 60))
            })
            .connect_with(options)
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;

        info!(max_connections = config.max_connections, "Item store pool created");

        let store = SqliteItemStore { pool };
        if config.run_migrations {
            store.run_migrations().await?;
        }
        Ok(store)
    }

    /// Applies pending migrations. Idempotent.
    pub async fn run_migrations(&self) -> StoreResult<()> {
        migrations::run_migrations(&self.pool).await
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        info!("Closing local item store");
        self.pool.close().await;
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Number of records in a collection.
    pub async fn count(&self, collection: &str) -> StoreResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE collection = ?")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    async fn fetch_item(&self, collection: &str, id: i64) -> StoreResult<Option<Value>> {
        let row = sqlx::query("SELECT body FROM items WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| parse_body(&r.try_get::<String, _>("body")?))
            .transpose()
    }

    async fn fetch_list(
        &self,
        collection: &str,
        filter: Option<(&str, i64)>,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Value>> {
        // LIMIT -1 means no limit in SQLite
        let limit = limit.map(|l| l as i64).unwrap_or(-1);

        let rows = match filter {
            Some((field, value)) => {
                sqlx::query(
                    "SELECT body FROM items \
                     WHERE collection = ? AND json_extract(body, ?) = ? \
                     ORDER BY id LIMIT ?",
                )
                .bind(collection)
                .bind(format!("$.{}", field))
                .bind(value)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query("SELECT body FROM items WHERE collection = ? ORDER BY id LIMIT ?")
                    .bind(collection)
                    .bind(limit)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        rows.iter()
            .map(|r| parse_body(&r.try_get::<String, _>("body")?))
            .collect()
    }

    /// Embeds `<entity>` from `<plural(entity)>/<record.<entity>Id>`.
    ///
    /// Dangling references are left unexpanded.
    async fn expand(&self, record: &mut Value, expand: &[String]) -> StoreResult<()> {
        for entity in expand {
            let key = format!("{}Id", entity);
            let Some(related_id) = record.get(&key).and_then(Value::as_i64) else {
                continue;
            };
            if let Some(related) = self.fetch_item(&plural(entity), related_id).await? {
                if let Some(object) = record.as_object_mut() {
                    object.insert(entity.clone(), related);
                }
            }
        }
        Ok(())
    }
}

fn parse_body(body: &str) -> StoreResult<Value> {
    serde_json::from_str(body).map_err(StoreError::from)
}

fn into_object(record: Value) -> StoreResult<Map<String, Value>> {
    match record {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::InvalidRecord(format!(
            "expected a JSON object, got {}",
            other
        ))),
    }
}

#[async_trait]
impl ItemStore for SqliteItemStore {
    async fn get(&self, path: &ResourcePath, query: &Query) -> StoreResult<Value> {
        debug!(path = %path, query = %query, "Local store get");

        match path {
            ResourcePath::Item { collection, id } => {
                let mut record = self
                    .fetch_item(collection, *id)
                    .await?
                    .ok_or_else(|| StoreError::not_found(collection, id))?;
                self.expand(&mut record, &query.expand).await?;
                Ok(record)
            }
            ResourcePath::Collection(collection) => {
                let mut records = self.fetch_list(collection, None, query.limit).await?;
                for record in records.iter_mut() {
                    self.expand(record, &query.expand).await?;
                }
                Ok(Value::Array(records))
            }
            ResourcePath::Nested {
                parent,
                parent_id,
                child,
            } => {
                let key = foreign_key(parent);
                let mut records = self
                    .fetch_list(child, Some((key.as_str(), *parent_id)), query.limit)
                    .await?;
                for record in records.iter_mut() {
                    self.expand(record, &query.expand).await?;
                }
                Ok(Value::Array(records))
            }
        }
    }

    async fn create(&self, path: &ResourcePath, record: Value) -> StoreResult<Value> {
        let mut object = into_object(record)?;

        let collection = match path {
            ResourcePath::Collection(collection) => collection.clone(),
            ResourcePath::Nested {
                parent,
                parent_id,
                child,
            } => {
                object.insert(foreign_key(parent), Value::from(*parent_id));
                child.clone()
            }
            ResourcePath::Item { .. } => {
                return Err(StoreError::invalid_path(path, "create needs a collection path"));
            }
        };

        let mut tx = self.pool.begin().await?;

        let id = match object.get("id").and_then(Value::as_i64) {
            Some(id) => {
                let exists: i64 = sqlx::query_scalar(
                    "SELECT COUNT(*) FROM items WHERE collection = ? AND id = ?",
                )
                .bind(&collection)
                .bind(id)
                .fetch_one(&mut *tx)
                .await?;
                if exists > 0 {
                    return Err(StoreError::Conflict { collection, id });
                }
                id
            }
            None => {
                sqlx::query_scalar::<_, i64>(
                    "SELECT COALESCE(MAX(id), 0) + 1 FROM items WHERE collection = ?",
                )
                .bind(&collection)
                .fetch_one(&mut *tx)
                .await?
            }
        };
        object.insert("id".to_string(), Value::from(id));

        let record = Value::Object(object);
        sqlx::query("INSERT INTO items (collection, id, body) VALUES (?, ?, ?)")
            .bind(&collection)
            .bind(id)
            .bind(record.to_string())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(collection = %collection, id, "Local store create");
        Ok(record)
    }

    async fn update(&self, path: &ResourcePath, patch: Value) -> StoreResult<Value> {
        let ResourcePath::Item { collection, id } = path else {
            return Err(StoreError::invalid_path(path, "update needs an item path"));
        };
        let patch = into_object(patch)?;

        let mut tx = self.pool.begin().await?;

        let row = sqlx::query("SELECT body FROM items WHERE collection = ? AND id = ?")
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        let mut current = into_object(parse_body(&row.try_get::<String, _>("body")?)?)?;

        for (key, value) in patch {
            current.insert(key, value);
        }
        current.insert("id".to_string(), Value::from(*id));

        let record = Value::Object(current);
        sqlx::query("UPDATE items SET body = ? WHERE collection = ? AND id = ?")
            .bind(record.to_string())
            .bind(collection)
            .bind(id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        debug!(collection = %collection, id, "Local store update");
        Ok(record)
    }
}

/// Opens a local store with the timestamp middleware in front of it.
pub async fn open_local(config: DbConfig) -> StoreResult<Timestamped<SqliteItemStore>> {
    Ok(Timestamped::new(SqliteItemStore::open(config).await?))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::ManualClock;
    use serde_json::json;
    use std::sync::Arc;

    async fn store() -> SqliteItemStore {
        SqliteItemStore::open(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = store().await;
        assert!(store.health_check().await);
        assert_eq!(store.count("products").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_config_builder() {
        let config = DbConfig::new("/tmp/test.db")
            .max_connections(10)
            .min_connections(2);

        assert_eq!(config.max_connections, 10);
        assert_eq!(config.min_connections, 2);
        assert!(!config.is_in_memory());
        assert!(DbConfig::in_memory().is_in_memory());
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids() {
        let store = store().await;
        let path = ResourcePath::collection("categories");

        let a = store.create(&path, json!({ "name": "Coffee" })).await.unwrap();
        let b = store.create(&path, json!({ "name": "Tea" })).await.unwrap();
        assert_eq!(a["id"], 1);
        assert_eq!(b["id"], 2);

        let explicit = store.create(&path, json!({ "id": 10, "name": "Milk" })).await.unwrap();
        assert_eq!(explicit["id"], 10);
        let err = store
            .create(&path, json!({ "id": 10, "name": "Dup" }))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { id: 10, .. }));
    }

    #[tokio::test]
    async fn test_get_missing_item_is_not_found() {
        let store = store().await;
        let err = store
            .get(&ResourcePath::item("orders", 99), &Query::new())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_nested_list_with_expand() {
        let store = store().await;
        store
            .create(
                &ResourcePath::collection("products"),
                json!({ "name": "Scale", "price": 10000 }),
            )
            .await
            .unwrap();
        store
            .create(&ResourcePath::collection("orders"), json!({ "totalAmounts": 1 }))
            .await
            .unwrap();
        store
            .create(
                &ResourcePath::nested("orders", 1, "orderItems"),
                json!({ "productId": 1, "amount": 2, "subTotal": 20000 }),
            )
            .await
            .unwrap();
        store
            .create(
                &ResourcePath::collection("orderItems"),
                json!({ "orderId": 2, "productId": 1, "amount": 1, "subTotal": 10000 }),
            )
            .await
            .unwrap();

        let items = store
            .get(
                &ResourcePath::nested("orders", 1, "orderItems"),
                &Query::new().expand("product"),
            )
            .await
            .unwrap();

        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["orderId"], 1);
        assert_eq!(items[0]["product"]["name"], "Scale");
    }

    #[tokio::test]
    async fn test_limit_and_dangling_expand() {
        let store = store().await;
        let path = ResourcePath::collection("products");
        for i in 0..8 {
            store
                .create(&path, json!({ "name": format!("P{}", i), "categoryId": 42 }))
                .await
                .unwrap();
        }

        let list = store
            .get(&path, &Query::new().limit(6).expand("category"))
            .await
            .unwrap();
        let list = list.as_array().unwrap();
        assert_eq!(list.len(), 6);
        assert!(list[0].get("category").is_none());
    }

    #[tokio::test]
    async fn test_update_merges_and_keeps_id() {
        let store = store().await;
        let path = ResourcePath::collection("orders");
        store
            .create(&path, json!({ "userId": 1, "totalAmounts": 2, "address": "" }))
            .await
            .unwrap();

        let item = ResourcePath::item("orders", 1);
        let updated = store
            .update(&item, json!({ "id": 77, "address": "Jl. Braga 5", "status": "submitted" }))
            .await
            .unwrap();
        assert_eq!(updated["id"], 1);
        assert_eq!(updated["address"], "Jl. Braga 5");
        assert_eq!(updated["totalAmounts"], 2);

        let err = store
            .update(&ResourcePath::item("orders", 5), json!({ "address": "x" }))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_invalid_paths_rejected() {
        let store = store().await;
        assert!(matches!(
            store.create(&ResourcePath::item("orders", 1), json!({})).await,
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.update(&ResourcePath::collection("orders"), json!({})).await,
            Err(StoreError::InvalidPath { .. })
        ));
        assert!(matches!(
            store.create(&ResourcePath::collection("orders"), json!([1])).await,
            Err(StoreError::InvalidRecord(_))
        ));
    }

    #[tokio::test]
    async fn test_timestamps_applied_on_every_write() {
        let clock = Arc::new(ManualClock::new(1_000));
        let store = Timestamped::with_clock(store().await, clock.clone());
        let path = ResourcePath::collection("cartItems");

        let created = store
            .create(&path, json!({ "cartId": 1, "productId": 1, "amount": 2 }))
            .await
            .unwrap();
        assert_eq!(created["createdAt"], 1_000);
        assert!(created.get("updatedAt").is_none());

        clock.advance(500);
        let updated = store
            .update(&ResourcePath::item("cartItems", 1), json!({ "amount": 3 }))
            .await
            .unwrap();
        assert_eq!(updated["createdAt"], 1_000);
        assert_eq!(updated["updatedAt"], 1_500);

        let stored = store
            .get(&ResourcePath::item("cartItems", 1), &Query::new())
            .await
            .unwrap();
        assert_eq!(stored["updatedAt"], 1_500);
    }
}
