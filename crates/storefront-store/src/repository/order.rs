//! # Order Repository
//!
//! Orders and their line items.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::client::{ItemStore, ItemStoreExt};
use crate::error::StoreResult;
use crate::path::{collections, Query, ResourcePath};
use storefront_core::{Money, Order, OrderItem, OrderStatus};

/// Body of a new order line (id assigned by the store).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderItem {
    pub product_id: i64,
    pub amount: i64,
    pub sub_total: Money,
}

/// Body of a new order (id assigned by the store).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub user_id: i64,
    pub total_amounts: i64,
    pub total_price: Money,
    pub status: OrderStatus,
}

/// Repository for orders.
///
/// ## Usage
/// ```rust,ignore
/// let repo = OrderRepository::new(store.clone());
///
/// let order = repo.get(1).await?;
/// let items = repo.items(1).await?;   // each with `product` embedded
/// let saved = repo.update(&submitted).await?;
/// ```
#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn ItemStore>,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        OrderRepository { store }
    }

    pub async fn get(&self, id: i64) -> StoreResult<Order> {
        debug!(order_id = id, "Fetching order");
        self.store
            .get_as(&ResourcePath::item(collections::ORDERS, id), &Query::new())
            .await
    }

    /// Lines of an order with `_expand=product`.
    pub async fn items(&self, order_id: i64) -> StoreResult<Vec<OrderItem>> {
        debug!(order_id, "Fetching order items");
        self.store
            .get_as(
                &ResourcePath::nested(collections::ORDERS, order_id, collections::ORDER_ITEMS),
                &Query::new().expand("product"),
            )
            .await
    }

    /// Persists the order record. Not retried on failure.
    pub async fn update(&self, order: &Order) -> StoreResult<Order> {
        info!(order_id = order.id, status = ?order.status, "Updating order");
        self.store
            .update_as(&ResourcePath::item(collections::ORDERS, order.id), order)
            .await
    }

    pub async fn create(&self, order: &Order) -> StoreResult<Order> {
        self.store
            .create_as(&ResourcePath::collection(collections::ORDERS), order)
            .await
    }

    /// Creates an order and lets the store assign its id.
    pub async fn open(&self, order: &NewOrder) -> StoreResult<Order> {
        let created: Order = self
            .store
            .create_as(&ResourcePath::collection(collections::ORDERS), order)
            .await?;
        info!(order_id = created.id, total_amounts = order.total_amounts, "Order opened");
        Ok(created)
    }

    pub async fn add_item(&self, order_id: i64, item: &NewOrderItem) -> StoreResult<OrderItem> {
        self.store
            .create_as(
                &ResourcePath::nested(collections::ORDERS, order_id, collections::ORDER_ITEMS),
                item,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::middleware::ManualClock;
    use crate::middleware::Timestamped;
    use crate::pool::{DbConfig, SqliteItemStore};
    use serde_json::json;
    use storefront_core::ShippingMethod;

    async fn repo() -> (OrderRepository, Arc<dyn ItemStore>) {
        let sqlite = SqliteItemStore::open(DbConfig::in_memory()).await.unwrap();
        let store: Arc<dyn ItemStore> = Arc::new(Timestamped::with_clock(
            sqlite,
            Arc::new(ManualClock::new(5_000)),
        ));
        (OrderRepository::new(store.clone()), store)
    }

    fn draft_order() -> Order {
        Order {
            id: 1,
            user_id: 1,
            total_amounts: 1,
            total_price: Money::from_minor(20_000),
            shipping: None,
            payment: None,
            address: None,
            phone: None,
            insurance: false,
            status: OrderStatus::Pending,
            created_at: None,
            updated_at: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_get_order() {
        let (repo, _) = repo().await;
        let created = repo.create(&draft_order()).await.unwrap();
        assert_eq!(created.created_at, Some(5_000));

        let fetched = repo.get(1).await.unwrap();
        assert_eq!(fetched.total_amounts, 1);
        assert!(repo.get(2).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_open_assigns_next_id() {
        let (repo, _) = repo().await;
        repo.create(&draft_order()).await.unwrap();

        let opened = repo
            .open(&NewOrder {
                user_id: 1,
                total_amounts: 1,
                total_price: Money::from_minor(40_000),
                status: OrderStatus::Pending,
            })
            .await
            .unwrap();

        assert_eq!(opened.id, 2);
        assert_eq!(opened.created_at, Some(5_000));
        assert_eq!(opened.shipping, None);
        assert_eq!(repo.get(2).await.unwrap().total_price.minor(), 40_000);
    }

    #[tokio::test]
    async fn test_items_embed_product() {
        let (repo, store) = repo().await;
        store
            .create(
                &ResourcePath::collection(collections::PRODUCTS),
                json!({ "name": "Timemore Scale", "price": 10000, "minOrder": 2 }),
            )
            .await
            .unwrap();
        repo.create(&draft_order()).await.unwrap();
        repo.add_item(
            1,
            &NewOrderItem {
                product_id: 1,
                amount: 2,
                sub_total: Money::from_minor(20_000),
            },
        )
        .await
        .unwrap();

        let items = repo.items(1).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].order_id, 1);
        assert_eq!(
            items[0].product.as_ref().map(|p| p.name.as_str()),
            Some("Timemore Scale")
        );
        assert!(repo.items(2).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_stamps_updated_at() {
        let (repo, _) = repo().await;
        repo.create(&draft_order()).await.unwrap();

        let mut order = repo.get(1).await.unwrap();
        order.shipping = Some(ShippingMethod::Express);
        order.status = OrderStatus::Submitted;
        let saved = repo.update(&order).await.unwrap();

        assert_eq!(saved.shipping, Some(ShippingMethod::Express));
        assert_eq!(saved.status, OrderStatus::Submitted);
        assert_eq!(saved.created_at, Some(5_000));
        assert_eq!(saved.updated_at, Some(5_000));
    }
}
