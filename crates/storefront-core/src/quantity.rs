//! # Quantity Controller
//!
//! Derives a valid ordered amount from user input.
//!
//! ## Bounds
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  minOrder = product.minOrder                                            │
//! │  maxOrder = Σ product.stocks[i].total                                   │
//! │                                                                         │
//! │        [-]   2 ─────────────────────────────── 8   [+]                 │
//! │     disabled at min                      disabled at max                │
//! │                                                                         │
//! │  Typed input is coerced, never rejected:                                │
//! │    "4"    → 4        "abc" → minOrder      "12" → maxOrder              │
//! │    "3.9"  → 3        ""    → minOrder      "-1" → minOrder              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here is pure: it returns the new amount and leaves
//! storing it to the caller.

use serde::Serialize;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::types::Product;

/// Inclusive quantity range `[min, max]` with `1 <= min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuantityBounds {
    min_order: i64,
    max_order: i64,
}

impl QuantityBounds {
    /// Builds a range, rejecting empty ranges and minimums below one.
    pub fn new(min: i64, max: i64) -> CoreResult<Self> {
        if min < 1 || max < min {
            return Err(CoreError::InvalidRange { min, max });
        }
        Ok(QuantityBounds {
            min_order: min,
            max_order: max,
        })
    }

    /// Bounds for a product page.
    ///
    /// A product whose total stock cannot cover its minimum order is not
    /// purchasable at all, so no draft is ever created for it.
    pub fn for_product(product: &Product) -> CoreResult<Self> {
        let available = product.max_order();
        let min_order = product.min_order.max(1);
        if available < min_order {
            return Err(CoreError::InsufficientStock {
                product_id: product.id,
                min_order,
                available,
            });
        }
        QuantityBounds::new(min_order, available)
    }

    #[inline]
    pub const fn min(&self) -> i64 {
        self.min_order
    }

    #[inline]
    pub const fn max(&self) -> i64 {
        self.max_order
    }

    #[inline]
    pub const fn contains(&self, amount: i64) -> bool {
        amount >= self.min_order && amount <= self.max_order
    }

    /// Clamps a numeric amount into the range.
    #[inline]
    pub fn clamp(&self, amount: i64) -> i64 {
        amount.clamp(self.min_order, self.max_order)
    }

    /// Clamps raw text from the quantity input.
    ///
    /// Integers are taken as-is, finite decimals are truncated toward zero,
    /// anything else falls back to the minimum.
    pub fn clamp_input(&self, raw: &str) -> i64 {
        match parse_amount(raw) {
            Some(amount) => self.clamp(amount),
            None => self.min_order,
        }
    }

    /// Amount after pressing `+`. No-op at the maximum.
    pub fn increment(&self, current: i64) -> i64 {
        self.clamp(current.saturating_add(1))
    }

    /// Amount after pressing `-`. No-op at the minimum.
    pub fn decrement(&self, current: i64) -> i64 {
        self.clamp(current.saturating_sub(1))
    }

    /// Whether the `+` button is enabled.
    pub const fn can_increment(&self, current: i64) -> bool {
        current < self.max_order
    }

    /// Whether the `-` button is enabled.
    pub const fn can_decrement(&self, current: i64) -> bool {
        current > self.min_order
    }
}

fn parse_amount(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(n);
    }
    match trimmed.parse::<f64>() {
        // `as` saturates for out-of-range floats
        Ok(f) if f.is_finite() => Some(f.trunc() as i64),
        _ => None,
    }
}

/// `clamp(rawValue, minOrder, maxOrder)` as a single call.
///
/// ## Example
/// ```rust
/// use storefront_core::quantity::clamp;
///
/// assert_eq!(clamp("5", 2, 8).unwrap(), 5);
/// assert_eq!(clamp("abc", 2, 8).unwrap(), 2);
/// assert_eq!(clamp("9", 2, 8).unwrap(), 8);
/// ```
pub fn clamp(raw: &str, min_order: i64, max_order: i64) -> CoreResult<i64> {
    Ok(QuantityBounds::new(min_order, max_order)?.clamp_input(raw))
}

// =============================================================================
// Unit Tests
// =============================================================================
