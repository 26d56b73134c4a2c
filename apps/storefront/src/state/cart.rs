//! # Cart State
//!
//! The session cart: local lines mirrored to the persisted `cartItems`
//! collection of one `cartId`.
//!
//! ## Add Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add(snapshot)                                                          │
//! │      │                                                                  │
//! │      ▼   first add only: GET carts/{cartId}/cartItems, restore lines    │
//! │      │                                                                  │
//! │      ▼   lock                                                           │
//! │  plan() ── Duplicate ──────────────────────────────► Ok(Duplicate)      │
//! │      │   mark product in flight                                         │
//! │      ▼   unlock                                                         │
//! │  persist ── Insert: POST cartItems                                      │
//! │      │      Update: PATCH cartItems/{recordId}                          │
//! │      │                                                                  │
//! │      ├── Err ──► lock, clear in-flight, local lines untouched ──► Err   │
//! │      ▼                                                                  │
//! │  lock, commit(plan), remember recordId ───────────► Ok(Inserted|Merged) │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The lock is never held across the store call. A second add for a product
//! whose write is still in flight is refused rather than merged against a
//! stale line. The in-flight mark is released on drop, so a cancelled add
//! does not block the product.

use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use ts_rs::TS;

use storefront_core::draft::LineItemSnapshot;
use storefront_core::handoff::{LineItem, LineItems, MergeOutcome, MergePlan};
use storefront_core::{CartItem, Money};
use storefront_store::CartRepository;

use crate::error::{ApiError, ApiResult};

#[derive(Debug, Default)]
struct Cart {
    lines: LineItems,
    /// productId -> id of its persisted cart item
    records: HashMap<i64, i64>,
    in_flight: HashSet<i64>,
    /// Stored lines have been read back.
    loaded: bool,
}

impl Cart {
    fn restore(&mut self, stored: Vec<CartItem>) {
        for item in stored {
            if let Some(id) = item.id {
                self.records.entry(item.product_id).or_insert(id);
            }
            self.lines
                .restore(LineItem::stored(item.product_id, item.amount, item.sub_total));
        }
        self.loaded = true;
    }
}

/// Clears a product's in-flight mark when dropped.
struct InFlight<'a> {
    cart: &'a Mutex<Cart>,
    product_id: i64,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.cart
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .in_flight
            .remove(&self.product_id);
    }
}

/// Cart totals for display.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartSummary {
    pub cart_id: i64,
    pub items: Vec<LineItem>,
    pub total_amounts: usize,
    pub total_units: i64,
    pub total_price: Money,
}

/// Thread-safe session cart.
#[derive(Clone)]
pub struct CartState {
    cart_id: i64,
    repo: CartRepository,
    cart: Arc<Mutex<Cart>>,
}

impl CartState {
    pub fn new(cart_id: i64, repo: CartRepository) -> Self {
        CartState {
            cart_id,
            repo,
            cart: Arc::new(Mutex::new(Cart::default())),
        }
    }

    pub fn cart_id(&self) -> i64 {
        self.cart_id
    }

    fn lock(&self) -> MutexGuard<'_, Cart> {
        self.cart.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends or merges `snapshot` into the persisted cart.
    ///
    /// ## Returns
    /// * `Ok(Inserted | Merged)` - Stored and applied locally
    /// * `Ok(Duplicate)` - This snapshot was already applied; nothing sent
    /// * `Err(_)` - Rejected or the store failed; local cart unchanged
    pub async fn add(&self, snapshot: &LineItemSnapshot) -> ApiResult<MergeOutcome> {
        if snapshot.cart_id != self.cart_id {
            return Err(ApiError::validation(format!(
                "Line item belongs to cart {}, not {}",
                snapshot.cart_id, self.cart_id
            )));
        }

        self.ensure_loaded().await?;

        let (plan, record_id) = {
            let mut cart = self.lock();
            if cart.in_flight.contains(&snapshot.product_id) {
                return Err(ApiError::invalid_state(format!(
                    "Product {} is already being added to the cart",
                    snapshot.product_id
                )));
            }
            let plan = cart.lines.plan(snapshot)?;
            if plan.is_duplicate() {
                debug!(product_id = snapshot.product_id, "Snapshot already in cart");
                return Ok(MergeOutcome::Duplicate);
            }
            cart.in_flight.insert(snapshot.product_id);
            (plan, cart.records.get(&snapshot.product_id).copied())
        };
        let _in_flight = InFlight {
            cart: &self.cart,
            product_id: snapshot.product_id,
        };

        let persisted = self.persist(snapshot, &plan, record_id).await;

        let mut cart = self.lock();
        match persisted {
            Ok(id) => {
                cart.records.insert(snapshot.product_id, id);
                let outcome = cart.lines.commit(plan);
                info!(
                    cart_id = self.cart_id,
                    product_id = snapshot.product_id,
                    record_id = id,
                    ?outcome,
                    "Cart updated"
                );
                Ok(outcome)
            }
            Err(err) => {
                warn!(
                    cart_id = self.cart_id,
                    product_id = snapshot.product_id,
                    "Add to cart failed, snapshot discarded: {}",
                    err
                );
                Err(err)
            }
        }
    }

    /// Reads the stored lines of this cart once per session.
    pub async fn load(&self) -> ApiResult<CartSummary> {
        self.ensure_loaded().await?;
        Ok(self.summary())
    }

    async fn ensure_loaded(&self) -> ApiResult<()> {
        let loaded = self.lock().loaded;
        if loaded {
            return Ok(());
        }
        let stored = self.repo.list(self.cart_id).await?;
        let mut cart = self.lock();
        if !cart.loaded {
            debug!(cart_id = self.cart_id, lines = stored.len(), "Stored cart restored");
            cart.restore(stored);
        }
        Ok(())
    }

    async fn persist(
        &self,
        snapshot: &LineItemSnapshot,
        plan: &MergePlan,
        record_id: Option<i64>,
    ) -> ApiResult<i64> {
        match (plan, record_id) {
            (MergePlan::Update { line, .. }, Some(id)) => {
                self.repo
                    .update_amount(id, line.amount, line.sub_total)
                    .await?;
                Ok(id)
            }
            (MergePlan::Insert { .. }, _) | (MergePlan::Update { .. }, None) => {
                let mut record = snapshot.to_cart_item();
                if let Some(line) = plan.line() {
                    record.amount = line.amount;
                    record.sub_total = line.sub_total;
                }
                let created = self.repo.create(&record).await?;
                created
                    .id
                    .ok_or_else(|| ApiError::internal("Store returned a cart item without an id"))
            }
            (MergePlan::Duplicate, _) => Err(ApiError::internal("Nothing to persist")),
        }
    }

    pub fn summary(&self) -> CartSummary {
        let cart = self.lock();
        CartSummary {
            cart_id: self.cart_id,
            items: cart.lines.lines().to_vec(),
            total_amounts: cart.lines.len(),
            total_units: cart.lines.total_units(),
            total_price: cart.lines.total_price(),
        }
    }

    pub fn line(&self, product_id: i64) -> Option<LineItem> {
        self.lock().lines.get(product_id).cloned()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().lines.is_empty()
    }
}

impl std::fmt::Debug for CartState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartState")
            .field("cart_id", &self.cart_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::test_support::{FailingStore, RecordingStore};
    use storefront_core::draft::LineItemDraft;
    use storefront_core::quantity::QuantityBounds;
    use std::time::Duration;
    use storefront_store::{open_local, DbConfig, ItemStore};

    fn scale_draft() -> LineItemDraft {
        let bounds = QuantityBounds::new(2, 8).unwrap();
        LineItemDraft::new(1, 1, Money::from_minor(10_000), bounds)
    }

    async fn local_cart() -> (CartState, CartRepository) {
        let store: Arc<dyn ItemStore> =
            Arc::new(open_local(DbConfig::in_memory()).await.unwrap());
        let repo = CartRepository::new(store);
        (CartState::new(1, repo.clone()), repo)
    }

    #[tokio::test]
    async fn test_add_persists_line() {
        let (cart, repo) = local_cart().await;
        let draft = scale_draft();

        let outcome = cart.add(&draft.snapshot()).await.unwrap();
        assert_eq!(outcome, MergeOutcome::Inserted);

        let stored = repo.list(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount, 2);
        assert_eq!(stored[0].sub_total.minor(), 20_000);
        assert_eq!(cart.summary().total_price.minor(), 20_000);
    }

    #[tokio::test]
    async fn test_same_snapshot_is_applied_once() {
        let (cart, repo) = local_cart().await;
        let snapshot = scale_draft().snapshot();

        cart.add(&snapshot).await.unwrap();
        let again = cart.add(&snapshot).await.unwrap();

        assert_eq!(again, MergeOutcome::Duplicate);
        assert_eq!(repo.list(1).await.unwrap().len(), 1);
        assert_eq!(cart.line(1).map(|l| l.amount), Some(2));
    }

    #[tokio::test]
    async fn test_new_revision_merges_into_same_record() {
        let (cart, repo) = local_cart().await;
        let mut draft = scale_draft();

        cart.add(&draft.snapshot()).await.unwrap();
        draft.increment();
        let outcome = cart.add(&draft.snapshot()).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Merged);
        let stored = repo.list(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount, 5);
        assert_eq!(stored[0].sub_total.minor(), 50_000);
    }

    #[tokio::test]
    async fn test_merge_above_max_order_rejected() {
        let (cart, repo) = local_cart().await;
        let mut draft = scale_draft();
        draft.set_quantity(6);
        cart.add(&draft.snapshot()).await.unwrap();

        draft.decrement();
        let err = cart.add(&draft.snapshot()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(repo.list(1).await.unwrap()[0].amount, 6);
        assert_eq!(cart.line(1).map(|l| l.amount), Some(6));
    }

    #[tokio::test]
    async fn test_store_failure_leaves_cart_unchanged() {
        let cart = CartState::new(1, CartRepository::new(Arc::new(FailingStore)));

        let err = cart.add(&scale_draft().snapshot()).await.unwrap_err();

        assert!(err.is_transport());
        assert!(cart.is_empty());
    }

    #[tokio::test]
    async fn test_failed_snapshot_can_be_retried() {
        let store = Arc::new(RecordingStore::local().await);
        store.fail_writes(true);
        let cart = CartState::new(1, CartRepository::new(store.clone()));
        let snapshot = scale_draft().snapshot();

        assert!(cart.add(&snapshot).await.is_err());
        assert!(cart.is_empty());

        store.fail_writes(false);
        assert_eq!(cart.add(&snapshot).await.unwrap(), MergeOutcome::Inserted);
        // one refused attempt, one stored
        assert_eq!(store.creates(), 2);
        assert_eq!(cart.line(1).map(|l| l.amount), Some(2));
    }

    #[tokio::test]
    async fn test_stored_lines_are_merged_across_sessions() {
        let (first, repo) = local_cart().await;
        first.add(&scale_draft().snapshot()).await.unwrap();

        let second = CartState::new(1, repo.clone());
        let outcome = second.add(&scale_draft().snapshot()).await.unwrap();

        assert_eq!(outcome, MergeOutcome::Merged);
        let stored = repo.list(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount, 4);
        assert_eq!(second.summary().total_price.minor(), 40_000);
    }

    #[tokio::test]
    async fn test_stored_lines_bound_a_new_session() {
        let (first, repo) = local_cart().await;
        let mut draft = scale_draft();
        draft.set_quantity(8);
        first.add(&draft.snapshot()).await.unwrap();

        let second = CartState::new(1, repo.clone());
        let mut other = scale_draft();
        other.set_quantity(8);
        let err = second.add(&other.snapshot()).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InsufficientStock);
        let stored = repo.list(1).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].amount, 8);
    }

    #[tokio::test]
    async fn test_load_restores_stored_cart() {
        let (first, repo) = local_cart().await;
        first.add(&scale_draft().snapshot()).await.unwrap();

        let second = CartState::new(1, repo);
        assert!(second.is_empty());
        let summary = second.load().await.unwrap();
        assert_eq!(summary.total_units, 2);
        assert_eq!(second.line(1).map(|l| l.sub_total.minor()), Some(20_000));
    }

    #[tokio::test]
    async fn test_cancelled_add_releases_product() {
        let store = Arc::new(RecordingStore::local().await);
        let cart = CartState::new(1, CartRepository::new(store.clone()));
        let snapshot = scale_draft().snapshot();

        store.delay_writes(Duration::from_millis(200));
        let timed_out =
            tokio::time::timeout(Duration::from_millis(20), cart.add(&snapshot)).await;
        assert!(timed_out.is_err());
        assert!(cart.is_empty());

        store.delay_writes(Duration::ZERO);
        assert_eq!(cart.add(&snapshot).await.unwrap(), MergeOutcome::Inserted);
        assert_eq!(cart.line(1).map(|l| l.amount), Some(2));
    }

    #[tokio::test]
    async fn test_foreign_cart_rejected() {
        let (cart, _) = local_cart().await;
        let bounds = QuantityBounds::new(1, 3).unwrap();
        let other = LineItemDraft::new(1, 9, Money::from_minor(500), bounds);

        let err = cart.add(&other.snapshot()).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
