//! # Cart Repository
//!
//! Persisted cart lines, scoped by `cartId`.

use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use crate::client::{ItemStore, ItemStoreExt};
use crate::error::StoreResult;
use crate::path::{collections, Query, ResourcePath};
use storefront_core::{CartItem, Money};

#[derive(Clone)]
pub struct CartRepository {
    store: Arc<dyn ItemStore>,
}

impl CartRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        CartRepository { store }
    }

    /// Lines of one cart (`carts/{cartId}/cartItems`).
    pub async fn list(&self, cart_id: i64) -> StoreResult<Vec<CartItem>> {
        self.store
            .get_as(
                &ResourcePath::nested(collections::CARTS, cart_id, collections::CART_ITEMS),
                &Query::new(),
            )
            .await
    }

    pub async fn create(&self, item: &CartItem) -> StoreResult<CartItem> {
        debug!(cart_id = item.cart_id, product_id = item.product_id, "Creating cart item");
        self.store
            .create_as(&ResourcePath::collection(collections::CART_ITEMS), item)
            .await
    }

    /// Rewrites amount and subtotal of an existing line.
    pub async fn update_amount(
        &self,
        id: i64,
        amount: i64,
        sub_total: Money,
    ) -> StoreResult<CartItem> {
        debug!(cart_item_id = id, amount, "Updating cart item");
        self.store
            .update_as(
                &ResourcePath::item(collections::CART_ITEMS, id),
                &json!({ "amount": amount, "subTotal": sub_total }),
            )
            .await
    }
}
