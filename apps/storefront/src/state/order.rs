//! # Order State
//!
//! The order-in-progress that "Buy Now" fills before handing off to
//! checkout. Nothing here touches the item store.
//!
//! ## Lifecycle
//! ```text
//! buy_now ──► lines (version + 1) ──► OrderDraft ──► CheckoutPage::from_draft
//!                                                          │ submit
//!                                      attach_order(id) ◄──┤ order stored
//!                                                          │
//!                              finish(id, version) ◄───────┘ Success
//! ```
//!
//! `finish` empties the lines only when the submitted order is the attached
//! one and no buy-now happened after the checkout page took its draft. A
//! buy-now that changes the lines detaches the stored order, so the next
//! checkout stores a fresh one.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};
use ts_rs::TS;

use storefront_core::draft::LineItemSnapshot;
use storefront_core::handoff::{LineItem, LineItems, MergeOutcome};
use storefront_core::Money;

use crate::error::ApiResult;

#[derive(Debug, Default)]
struct OrderInProgress {
    lines: LineItems,
    order_id: Option<i64>,
    /// Bumped by every buy-now that changed the lines.
    version: u64,
}

/// What the checkout page receives from a hand-off.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    /// Persisted order to check out, once one is attached.
    pub order_id: Option<i64>,
    pub items: Vec<LineItem>,
    pub total_amounts: usize,
    pub total_price: Money,
    /// Version of the order-in-progress this draft was taken from.
    pub version: u64,
}

/// Thread-safe order-in-progress.
#[derive(Debug, Clone, Default)]
pub struct OrderState {
    order: Arc<Mutex<OrderInProgress>>,
}

impl OrderState {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, OrderInProgress> {
        self.order.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds `snapshot` to the order-in-progress. Same merge rules as the
    /// cart, applied immediately.
    pub fn buy_now(&self, snapshot: &LineItemSnapshot) -> ApiResult<(MergeOutcome, OrderDraft)> {
        let mut order = self.lock();
        let outcome = order.lines.apply(snapshot)?;
        if outcome != MergeOutcome::Duplicate {
            order.version += 1;
            if let Some(order_id) = order.order_id.take() {
                warn!(order_id, "Order-in-progress changed, stored order detached");
            }
        }
        info!(
            product_id = snapshot.product_id,
            amount = snapshot.amount,
            ?outcome,
            "Buy now"
        );
        Ok((outcome, Self::draft_of(&order)))
    }

    pub fn draft(&self) -> OrderDraft {
        Self::draft_of(&self.lock())
    }

    /// Records the stored order that holds these lines.
    pub fn attach_order(&self, order_id: i64) {
        debug!(order_id, "Order-in-progress attached");
        self.lock().order_id = Some(order_id);
    }

    pub fn order_id(&self) -> Option<i64> {
        self.lock().order_id
    }

    /// Called after `order_id` was submitted from a draft of `version`.
    ///
    /// Returns whether the lines were emptied. Lines added after the draft
    /// was taken are kept; the order is detached either way.
    pub fn finish(&self, order_id: i64, version: u64) -> bool {
        let mut order = self.lock();
        if order.order_id != Some(order_id) {
            return false;
        }
        order.order_id = None;
        if order.version != version {
            warn!(
                order_id,
                "Order-in-progress changed during checkout, keeping its lines"
            );
            return false;
        }
        order.lines.clear();
        info!(order_id, "Order-in-progress checked out");
        true
    }

    fn draft_of(order: &OrderInProgress) -> OrderDraft {
        OrderDraft {
            order_id: order.order_id,
            items: order.lines.lines().to_vec(),
            total_amounts: order.lines.len(),
            total_price: order.lines.total_price(),
            version: order.version,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use storefront_core::draft::LineItemDraft;
    use storefront_core::quantity::QuantityBounds;

    fn scale_draft() -> LineItemDraft {
        let bounds = QuantityBounds::new(2, 8).unwrap();
        LineItemDraft::new(1, 1, Money::from_minor(10_000), bounds)
    }

    #[test]
    fn test_buy_now_exposes_one_item() {
        let state = OrderState::new();
        let mut draft = scale_draft();
        draft.increment();
        draft.increment();

        let (outcome, order) = state.buy_now(&draft.snapshot()).unwrap();

        assert_eq!(outcome, MergeOutcome::Inserted);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].amount, 4);
        assert_eq!(order.total_price.minor(), 40_000);
    }

    #[test]
    fn test_buy_now_twice_is_applied_once() {
        let state = OrderState::new();
        let snapshot = scale_draft().snapshot();

        state.buy_now(&snapshot).unwrap();
        let (outcome, order) = state.buy_now(&snapshot).unwrap();

        assert_eq!(outcome, MergeOutcome::Duplicate);
        assert_eq!(order.items[0].amount, 2);
    }

    #[test]
    fn test_merge_above_max_rejected() {
        let state = OrderState::new();
        let mut draft = scale_draft();
        draft.set_quantity(8);
        state.buy_now(&draft.snapshot()).unwrap();

        draft.decrement();
        let err = state.buy_now(&draft.snapshot()).unwrap_err();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(state.draft().items[0].amount, 8);
    }

    #[test]
    fn test_finish_empties_attached_order() {
        let state = OrderState::new();
        let snapshot = scale_draft().snapshot();
        let (_, draft) = state.buy_now(&snapshot).unwrap();
        state.attach_order(3);

        assert!(state.finish(3, draft.version));
        assert!(state.draft().items.is_empty());
        assert_eq!(state.order_id(), None);

        let (outcome, _) = state.buy_now(&snapshot).unwrap();
        assert_eq!(outcome, MergeOutcome::Duplicate);
    }

    #[test]
    fn test_finish_ignores_other_orders() {
        let state = OrderState::new();
        let (_, draft) = state.buy_now(&scale_draft().snapshot()).unwrap();

        assert!(!state.finish(1, draft.version));
        assert_eq!(state.draft().items.len(), 1);
    }

    #[test]
    fn test_finish_keeps_lines_added_after_draft() {
        let state = OrderState::new();
        let (_, draft) = state.buy_now(&scale_draft().snapshot()).unwrap();

        let bounds = QuantityBounds::new(1, 4).unwrap();
        let dripper = LineItemDraft::new(2, 1, Money::from_minor(85_000), bounds);
        state.buy_now(&dripper.snapshot()).unwrap();
        state.attach_order(3);

        assert!(!state.finish(3, draft.version));
        assert_eq!(state.draft().items.len(), 2);
        assert_eq!(state.order_id(), None);
    }

    #[test]
    fn test_changed_lines_detach_stored_order() {
        let state = OrderState::new();
        let mut draft = scale_draft();
        state.buy_now(&draft.snapshot()).unwrap();
        state.attach_order(3);

        state.buy_now(&draft.snapshot()).unwrap();
        assert_eq!(state.order_id(), Some(3));

        draft.increment();
        state.buy_now(&draft.snapshot()).unwrap();
        assert_eq!(state.order_id(), None);
        assert_eq!(state.draft().order_id, None);
    }
}
