//! # Product Repository
//!
//! Catalog reads (product detail, related products) and catalog writes for
//! seeding.

use std::sync::Arc;
use tracing::debug;

use crate::client::{ItemStore, ItemStoreExt};
use crate::error::StoreResult;
use crate::path::{collections, Query, ResourcePath};
use storefront_core::{Category, Product};

/// Repository for products and categories.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(store.clone());
///
/// // Product page: product with its category embedded
/// let product = repo.get(1).await?;
///
/// // "You may also like"
/// let related = repo.related(product.id, 6).await?;
/// ```
#[derive(Clone)]
pub struct ProductRepository {
    store: Arc<dyn ItemStore>,
}

impl ProductRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        ProductRepository { store }
    }

    /// Fetches a product with `_expand=category`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product found
    /// * `Err(StoreError::NotFound)` - No product with this id
    pub async fn get(&self, id: i64) -> StoreResult<Product> {
        debug!(product_id = id, "Fetching product");
        self.store
            .get_as(
                &ResourcePath::item(collections::PRODUCTS, id),
                &Query::new().expand("category"),
            )
            .await
    }

    /// Lists products, optionally limited.
    pub async fn list(&self, limit: Option<usize>) -> StoreResult<Vec<Product>> {
        let mut query = Query::new();
        if let Some(limit) = limit {
            query = query.limit(limit);
        }
        self.store
            .get_as(&ResourcePath::collection(collections::PRODUCTS), &query)
            .await
    }

    /// Products to show next to `product_id`: the first `limit` products of
    /// the catalog minus the current one.
    pub async fn related(&self, product_id: i64, limit: usize) -> StoreResult<Vec<Product>> {
        let products = self.list(Some(limit)).await?;
        Ok(products
            .into_iter()
            .filter(|p| p.id != product_id)
            .collect())
    }

    pub async fn insert(&self, product: &Product) -> StoreResult<Product> {
        let mut record = product.clone();
        // embedded category is a read-side expansion
        record.category = None;
        self.store
            .create_as(&ResourcePath::collection(collections::PRODUCTS), &record)
            .await
    }

    pub async fn insert_category(&self, category: &Category) -> StoreResult<Category> {
        self.store
            .create_as(&ResourcePath::collection(collections::CATEGORIES), category)
            .await
    }
}
