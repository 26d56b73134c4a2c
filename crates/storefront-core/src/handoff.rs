//! # Hand-off Collections
//!
//! Merge rules shared by the cart and the order-in-progress.
//!
//! ## Merge Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  LineItemSnapshot                                                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  plan()  ── key already applied? ──► Duplicate (nothing to do)          │
//! │        │                                                                │
//! │        ├── product already present ──► Update { amount: a + b }         │
//! │        │        (a + b > maxOrder → QuantityTooLarge)                   │
//! │        │                                                                │
//! │        └── new product ──► Insert                                       │
//! │                 (more than MAX_LINE_ITEMS → TooManyLineItems)           │
//! │        │                                                                │
//! │        ▼                                                                │
//! │  commit(plan)  ── records the key, writes the line                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Planning and committing are split so a persisted sink (the cart) can
//! write to the store between the two and leave the collection untouched
//! when the write fails.

use serde::Serialize;
use std::collections::HashSet;
use ts_rs::TS;

use crate::draft::{DraftKey, LineItemSnapshot};
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::MAX_LINE_ITEMS;

/// One product line of a cart or order-in-progress.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: i64,
    pub amount: i64,
    pub unit_price: Money,
    pub sub_total: Money,
    pub max_order: i64,
}

impl LineItem {
    fn from_snapshot(snapshot: &LineItemSnapshot) -> Self {
        LineItem {
            product_id: snapshot.product_id,
            amount: snapshot.amount,
            unit_price: snapshot.unit_price,
            sub_total: snapshot.sub_total,
            max_order: snapshot.max_order,
        }
    }

    /// A line read back from the store.
    ///
    /// The stored record carries no stock figure, so `max_order` starts at
    /// the stored amount and is replaced by the next merged snapshot.
    pub fn stored(product_id: i64, amount: i64, sub_total: Money) -> Self {
        let unit_price = if amount > 0 {
            Money::from_minor(sub_total.minor() / amount)
        } else {
            sub_total
        };
        LineItem {
            product_id,
            amount,
            unit_price,
            sub_total,
            max_order: amount,
        }
    }
}

/// What committing a snapshot will do.
#[derive(Debug, Clone, PartialEq)]
pub enum MergePlan {
    /// The snapshot (same draft, same revision) was already applied.
    Duplicate,
    /// The product is new to the collection.
    Insert { key: DraftKey, line: LineItem },
    /// The product is present; `line` holds the summed amount.
    Update { key: DraftKey, line: LineItem },
}

impl MergePlan {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, MergePlan::Duplicate)
    }

    /// The line as it will look after commit.
    pub fn line(&self) -> Option<&LineItem> {
        match self {
            MergePlan::Duplicate => None,
            MergePlan::Insert { line, .. } | MergePlan::Update { line, .. } => Some(line),
        }
    }
}

/// Result reported to the caller of a hand-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum MergeOutcome {
    Inserted,
    Merged,
    Duplicate,
}

// =============================================================================
// Collection
// =============================================================================

/// Ordered product lines with at-most-once application of snapshots.
#[derive(Debug, Clone, Default)]
pub struct LineItems {
    lines: Vec<LineItem>,
    applied: HashSet<DraftKey>,
}

impl LineItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decides how `snapshot` would merge, without changing anything.
    pub fn plan(&self, snapshot: &LineItemSnapshot) -> CoreResult<MergePlan> {
        let key = snapshot.key();
        if self.has_applied(&key) {
            return Ok(MergePlan::Duplicate);
        }

        match self.get(snapshot.product_id) {
            Some(existing) => {
                let requested = existing.amount.saturating_add(snapshot.amount);
                if requested > snapshot.max_order {
                    return Err(CoreError::QuantityTooLarge {
                        product_id: snapshot.product_id,
                        requested,
                        max: snapshot.max_order,
                    });
                }
                let line = LineItem {
                    product_id: snapshot.product_id,
                    amount: requested,
                    unit_price: snapshot.unit_price,
                    sub_total: snapshot.unit_price.multiply_quantity(requested),
                    max_order: snapshot.max_order,
                };
                Ok(MergePlan::Update { key, line })
            }
            None => {
                if self.lines.len() >= MAX_LINE_ITEMS {
                    return Err(CoreError::TooManyLineItems {
                        max: MAX_LINE_ITEMS,
                    });
                }
                Ok(MergePlan::Insert {
                    key,
                    line: LineItem::from_snapshot(snapshot),
                })
            }
        }
    }

    /// Applies a plan produced by [`LineItems::plan`].
    pub fn commit(&mut self, plan: MergePlan) -> MergeOutcome {
        match plan {
            MergePlan::Duplicate => MergeOutcome::Duplicate,
            MergePlan::Insert { key, line } | MergePlan::Update { key, line } => {
                self.applied.insert(key);
                match self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
                    Some(existing) => {
                        *existing = line;
                        MergeOutcome::Merged
                    }
                    None => {
                        self.lines.push(line);
                        MergeOutcome::Inserted
                    }
                }
            }
        }
    }

    /// Plans and commits in one step (for sinks with no persistence).
    pub fn apply(&mut self, snapshot: &LineItemSnapshot) -> CoreResult<MergeOutcome> {
        let plan = self.plan(snapshot)?;
        Ok(self.commit(plan))
    }

    pub fn has_applied(&self, key: &DraftKey) -> bool {
        self.applied.contains(key)
    }

    pub fn get(&self, product_id: i64) -> Option<&LineItem> {
        self.lines.iter().find(|l| l.product_id == product_id)
    }

    pub fn lines(&self) -> &[LineItem] {
        &self.lines
    }

    /// Number of distinct products (the order's `totalAmounts`).
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_price(&self) -> Money {
        self.lines.iter().map(|l| l.sub_total).sum()
    }

    pub fn total_units(&self) -> i64 {
        self.lines.iter().map(|l| l.amount).sum()
    }

    /// Adds a line that already exists in the store, summing it into any
    /// line of the same product. No snapshot key is recorded.
    pub fn restore(&mut self, line: LineItem) {
        match self.lines.iter_mut().find(|l| l.product_id == line.product_id) {
            Some(existing) => {
                existing.amount = existing.amount.saturating_add(line.amount);
                existing.sub_total += line.sub_total;
                existing.max_order = existing.max_order.max(existing.amount);
            }
            None => self.lines.push(line),
        }
    }

    /// Empties the lines. Applied keys are kept so a stale snapshot cannot
    /// sneak back in.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::LineItemDraft;
    use crate::quantity::QuantityBounds;

    fn draft(product_id: i64, price: i64, max: i64) -> LineItemDraft {
        let bounds = QuantityBounds::new(2, max).unwrap();
        LineItemDraft::new(product_id, 1, Money::from_minor(price), bounds)
    }

    #[test]
    fn test_resubmitted_snapshot_applies_once() {
        let mut items = LineItems::new();
        let mut scale = draft(1, 10_000, 8);
        scale.increment();
        scale.increment();

        let snapshot = scale.snapshot();
        assert_eq!(items.apply(&snapshot), Ok(MergeOutcome::Inserted));
        assert_eq!(items.apply(&snapshot), Ok(MergeOutcome::Duplicate));
        assert_eq!(items.get(1).map(|l| l.amount), Some(4));
        assert!(items.has_applied(&snapshot.key()));
    }

    #[test]
    fn test_changed_draft_merges_amounts() {
        let mut items = LineItems::new();
        let mut scale = draft(1, 10_000, 8);

        items.apply(&scale.snapshot()).unwrap();
        scale.increment();
        assert_eq!(items.apply(&scale.snapshot()), Ok(MergeOutcome::Merged));

        let line = items.get(1).unwrap();
        assert_eq!(line.amount, 5);
        assert_eq!(line.sub_total.minor(), 50_000);
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_merge_above_max_order_rejected() {
        let mut items = LineItems::new();
        let mut scale = draft(1, 10_000, 8);
        scale.set_quantity(6);
        items.apply(&scale.snapshot()).unwrap();

        scale.set_quantity(4);
        let err = items.apply(&scale.snapshot()).unwrap_err();
        assert_eq!(
            err,
            CoreError::QuantityTooLarge {
                product_id: 1,
                requested: 10,
                max: 8,
            }
        );
        assert_eq!(items.get(1).map(|l| l.amount), Some(6));
        assert!(!items.has_applied(&scale.snapshot().key()));
    }

    #[test]
    fn test_plan_does_not_mutate() {
        let items = LineItems::new();
        let snapshot = draft(3, 500, 10).snapshot();
        let plan = items.plan(&snapshot).unwrap();

        assert!(matches!(plan, MergePlan::Insert { .. }));
        assert_eq!(plan.line().map(|l| l.amount), Some(2));
        assert!(items.is_empty());
        assert!(!items.has_applied(&snapshot.key()));
    }

    #[test]
    fn test_totals() {
        let mut items = LineItems::new();
        items.apply(&draft(1, 10_000, 8).snapshot()).unwrap();
        items.apply(&draft(2, 2_500, 8).snapshot()).unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items.total_units(), 4);
        assert_eq!(items.total_price().minor(), 25_000);
    }

    #[test]
    fn test_line_item_cap() {
        let mut items = LineItems::new();
        for product_id in 0..MAX_LINE_ITEMS as i64 {
            items.apply(&draft(product_id, 100, 5).snapshot()).unwrap();
        }
        let overflow = items.apply(&draft(10_000, 100, 5).snapshot());
        assert_eq!(
            overflow,
            Err(CoreError::TooManyLineItems { max: MAX_LINE_ITEMS })
        );
    }

    #[test]
    fn test_restored_line_bounds_later_merges() {
        let mut items = LineItems::new();
        items.restore(LineItem::stored(1, 6, Money::from_minor(60_000)));
        assert_eq!(items.get(1).map(|l| l.unit_price.minor()), Some(10_000));

        let mut scale = draft(1, 10_000, 8);
        scale.set_quantity(3);
        assert_eq!(
            items.apply(&scale.snapshot()),
            Err(CoreError::QuantityTooLarge {
                product_id: 1,
                requested: 9,
                max: 8,
            })
        );

        scale.set_quantity(2);
        assert_eq!(items.apply(&scale.snapshot()), Ok(MergeOutcome::Merged));
        assert_eq!(items.get(1).map(|l| (l.amount, l.max_order)), Some((8, 8)));
    }

    #[test]
    fn test_restore_sums_same_product() {
        let mut items = LineItems::new();
        items.restore(LineItem::stored(1, 2, Money::from_minor(20_000)));
        items.restore(LineItem::stored(1, 3, Money::from_minor(30_000)));

        assert_eq!(items.len(), 1);
        assert_eq!(items.total_units(), 5);
        assert_eq!(items.total_price().minor(), 50_000);
    }

    #[test]
    fn test_clear_keeps_applied_keys() {
        let mut items = LineItems::new();
        let snapshot = draft(1, 100, 5).snapshot();
        items.apply(&snapshot).unwrap();
        items.clear();

        assert!(items.is_empty());
        assert_eq!(items.apply(&snapshot), Ok(MergeOutcome::Duplicate));
    }
}
