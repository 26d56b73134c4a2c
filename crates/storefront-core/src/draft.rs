//! # Line-Item Draft
//!
//! The in-progress line item of a product page.
//!
//! ## Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   amount ─────┐                                                         │
//! │  (clamped)    ├──►  subTotal = amount × unitPrice                       │
//! │   unitPrice ──┘     (never set directly)                                │
//! │                                                                         │
//! │   every effective change bumps `revision`                               │
//! │   snapshot() ──► LineItemSnapshot { draftId, revision, ... }            │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `subTotal` is only written when the derived value differs from the stored
//! one, so re-applying the same input is a no-op.

use serde::Serialize;
use ts_rs::TS;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::money::Money;
use crate::quantity::QuantityBounds;
use crate::types::{CartItem, Product};

/// Identity of one draft state: the draft id plus its revision.
///
/// Hand-off sinks record applied keys so an unchanged snapshot is never
/// applied twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DraftKey {
    pub draft_id: Uuid,
    pub revision: u64,
}

// =============================================================================
// Draft
// =============================================================================

/// A line item being edited on a product page.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItemDraft {
    id: Uuid,
    revision: u64,
    product_id: i64,
    cart_id: i64,
    unit_price: Money,
    bounds: QuantityBounds,
    amount: i64,
    sub_total: Money,
}

impl LineItemDraft {
    /// Starts a draft at the minimum order quantity.
    pub fn new(product_id: i64, cart_id: i64, unit_price: Money, bounds: QuantityBounds) -> Self {
        let amount = bounds.min();
        LineItemDraft {
            id: Uuid::new_v4(),
            revision: 0,
            product_id,
            cart_id,
            unit_price,
            bounds,
            amount,
            sub_total: unit_price.multiply_quantity(amount),
        }
    }

    /// Starts a draft for a loaded product.
    pub fn for_product(product: &Product, cart_id: i64) -> CoreResult<Self> {
        let bounds = QuantityBounds::for_product(product)?;
        Ok(LineItemDraft::new(product.id, cart_id, product.price, bounds))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn key(&self) -> DraftKey {
        DraftKey {
            draft_id: self.id,
            revision: self.revision,
        }
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn cart_id(&self) -> i64 {
        self.cart_id
    }

    pub fn amount(&self) -> i64 {
        self.amount
    }

    pub fn sub_total(&self) -> Money {
        self.sub_total
    }

    pub fn unit_price(&self) -> Money {
        self.unit_price
    }

    pub fn bounds(&self) -> QuantityBounds {
        self.bounds
    }

    pub fn can_increment(&self) -> bool {
        self.bounds.can_increment(self.amount)
    }

    pub fn can_decrement(&self) -> bool {
        self.bounds.can_decrement(self.amount)
    }

    // -------------------------------------------------------------------------
    // Mutations (each returns whether anything changed)
    // -------------------------------------------------------------------------

    /// Applies raw text from the quantity input.
    pub fn set_amount(&mut self, raw: &str) -> bool {
        let next = self.bounds.clamp_input(raw);
        self.apply_amount(next)
    }

    /// Applies a numeric quantity (clamped).
    pub fn set_quantity(&mut self, amount: i64) -> bool {
        let next = self.bounds.clamp(amount);
        self.apply_amount(next)
    }

    pub fn increment(&mut self) -> bool {
        let next = self.bounds.increment(self.amount);
        self.apply_amount(next)
    }

    pub fn decrement(&mut self) -> bool {
        let next = self.bounds.decrement(self.amount);
        self.apply_amount(next)
    }

    /// Follows a price change of the referenced product.
    pub fn reprice(&mut self, unit_price: Money) -> bool {
        if unit_price == self.unit_price {
            return false;
        }
        self.unit_price = unit_price;
        self.derive_sub_total();
        self.revision += 1;
        true
    }

    /// Follows a stock change of the referenced product, re-clamping the
    /// current amount into the new range.
    pub fn rebound(&mut self, bounds: QuantityBounds) -> bool {
        if bounds == self.bounds {
            return false;
        }
        self.bounds = bounds;
        let next = bounds.clamp(self.amount);
        if !self.apply_amount(next) {
            self.revision += 1;
        }
        true
    }

    fn apply_amount(&mut self, next: i64) -> bool {
        if next == self.amount {
            return false;
        }
        self.amount = next;
        self.derive_sub_total();
        self.revision += 1;
        true
    }

    fn derive_sub_total(&mut self) -> bool {
        let derived = self.unit_price.multiply_quantity(self.amount);
        if derived == self.sub_total {
            return false;
        }
        self.sub_total = derived;
        true
    }

    /// Read-only copy handed to the cart or order sink.
    pub fn snapshot(&self) -> LineItemSnapshot {
        LineItemSnapshot {
            draft_id: self.id,
            revision: self.revision,
            product_id: self.product_id,
            cart_id: self.cart_id,
            amount: self.amount,
            sub_total: self.sub_total,
            unit_price: self.unit_price,
            max_order: self.bounds.max(),
        }
    }
}

// =============================================================================
// Snapshot
// =============================================================================

/// Immutable view of a draft at one revision.
///
/// Serializes to the store's line-item shape
/// `{ productId, cartId, amount, subTotal }`.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItemSnapshot {
    #[serde(skip)]
    #[ts(skip)]
    pub draft_id: Uuid,

    #[serde(skip)]
    #[ts(skip)]
    pub revision: u64,

    pub product_id: i64,
    pub cart_id: i64,
    pub amount: i64,
    pub sub_total: Money,

    #[serde(skip)]
    #[ts(skip)]
    pub unit_price: Money,

    #[serde(skip)]
    #[ts(skip)]
    pub max_order: i64,
}

impl LineItemSnapshot {
    pub fn key(&self) -> DraftKey {
        DraftKey {
            draft_id: self.draft_id,
            revision: self.revision,
        }
    }

    /// New cart record for this snapshot (id assigned by the store).
    pub fn to_cart_item(&self) -> CartItem {
        CartItem {
            id: None,
            cart_id: self.cart_id,
            product_id: self.product_id,
            amount: self.amount,
            sub_total: self.sub_total,
            created_at: None,
            updated_at: None,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scale_draft() -> LineItemDraft {
        let bounds = QuantityBounds::new(2, 8).unwrap();
        LineItemDraft::new(1, 1, Money::from_minor(10_000), bounds)
    }

    fn assert_derived(draft: &LineItemDraft) {
        assert_eq!(
            draft.sub_total(),
            draft.unit_price().multiply_quantity(draft.amount())
        );
        assert!(draft.bounds().contains(draft.amount()));
    }

    #[test]
    fn test_walkthrough_increment_then_decrement() {
        let mut draft = scale_draft();
        assert_eq!((draft.amount(), draft.sub_total().minor()), (2, 20_000));

        draft.increment();
        draft.increment();
        assert_eq!((draft.amount(), draft.sub_total().minor()), (4, 40_000));

        for _ in 0..6 {
            draft.decrement();
            assert!(draft.amount() >= 2);
            assert_derived(&draft);
        }
        assert_eq!((draft.amount(), draft.sub_total().minor()), (2, 20_000));
    }

    #[test]
    fn test_invariant_holds_after_every_mutation() {
        let mut draft = scale_draft();
        for raw in ["5", "x", "100", "-3", "7.5", ""] {
            draft.set_amount(raw);
            assert_derived(&draft);
        }
        draft.reprice(Money::from_minor(12_500));
        assert_derived(&draft);
        draft.set_quantity(3);
        assert_derived(&draft);
        assert_eq!(draft.sub_total().minor(), 37_500);
    }

    #[test]
    fn test_noop_changes_keep_revision() {
        let mut draft = scale_draft();
        let before = draft.key();

        assert!(!draft.decrement());
        assert!(!draft.set_amount("2"));
        assert!(!draft.reprice(Money::from_minor(10_000)));
        assert_eq!(draft.key(), before);

        assert!(draft.increment());
        assert_ne!(draft.key(), before);
        assert_eq!(draft.revision(), 1);
    }

    #[test]
    fn test_increment_at_max_is_noop() {
        let mut draft = scale_draft();
        draft.set_amount("8");
        assert!(!draft.can_increment());
        let revision = draft.revision();
        assert!(!draft.increment());
        assert_eq!(draft.amount(), 8);
        assert_eq!(draft.revision(), revision);
    }

    #[test]
    fn test_rebound_reclamps_amount() {
        let mut draft = scale_draft();
        draft.set_amount("8");
        assert!(draft.rebound(QuantityBounds::new(2, 5).unwrap()));
        assert_eq!(draft.amount(), 5);
        assert_eq!(draft.sub_total().minor(), 50_000);

        let revision = draft.revision();
        assert!(draft.rebound(QuantityBounds::new(1, 5).unwrap()));
        assert_eq!(draft.amount(), 5);
        assert!(draft.revision() > revision);
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let mut draft = scale_draft();
        draft.increment();
        let snapshot = draft.snapshot();

        assert_eq!(snapshot.key(), draft.key());
        assert_eq!(snapshot.max_order, 8);
        assert_eq!(
            serde_json::to_value(&snapshot).unwrap(),
            serde_json::json!({
                "productId": 1,
                "cartId": 1,
                "amount": 3,
                "subTotal": 30000
            })
        );

        let item = snapshot.to_cart_item();
        assert_eq!(item.id, None);
        assert_eq!(item.amount, 3);
    }

    #[test]
    fn test_distinct_drafts_have_distinct_ids() {
        assert_ne!(scale_draft().id(), scale_draft().id());
    }
}
