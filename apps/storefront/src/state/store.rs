//! # Store State
//!
//! Shared handle to the item store, with typed repositories built on demand.
//!
//! ## Thread Safety
//! Both backends are thread-safe (reqwest client, sqlx pool), so the handle
//! is an `Arc<dyn ItemStore>` with no extra locking.

use std::sync::Arc;

use storefront_store::{CartRepository, ItemStore, OrderRepository, ProductRepository};

/// Item store handle shared by every page and state container.
#[derive(Clone)]
pub struct StoreState {
    store: Arc<dyn ItemStore>,
}

impl StoreState {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        StoreState { store }
    }

    /// The raw store, for callers that need paths the repositories lack.
    pub fn inner(&self) -> Arc<dyn ItemStore> {
        self.store.clone()
    }

    pub fn products(&self) -> ProductRepository {
        ProductRepository::new(self.store.clone())
    }

    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.store.clone())
    }

    pub fn carts(&self) -> CartRepository {
        CartRepository::new(self.store.clone())
    }
}

impl std::fmt::Debug for StoreState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreState").finish_non_exhaustive()
    }
}
