//! # Money Module
//!
//! Provides the `Money` type for prices and subtotals.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Prices arrive from the item store as integers in the smallest         │
//! │  currency unit (Rupiah has no minor unit in practice).                 │
//! │                                                                         │
//! │    price 10000  × amount 4  = subTotal 40000                           │
//! │                                                                         │
//! │  Every subtotal is exact integer arithmetic; formatting to             │
//! │  "Rp 40.000" happens only at display time.                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::money::Money;
//!
//! let price = Money::from_minor(10_000);
//! let sub_total = price.multiply_quantity(4);
//! assert_eq!(sub_total.minor(), 40_000);
//! assert_eq!(sub_total.to_string(), "Rp 40.000");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};
use ts_rs::TS;

/// Symbol used by `Display`.
pub const DEFAULT_SYMBOL: &str = "Rp";

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// Serializes as a bare integer so it matches the `price`, `subTotal` and
/// `totalPrice` fields of store records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from the smallest currency unit.
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Returns the value in the smallest currency unit.
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// Saturates instead of wrapping; a saturated subtotal is still larger
    /// than anything a real stock level can produce.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// let unit_price = Money::from_minor(10_000);
    /// assert_eq!(unit_price.multiply_quantity(2).minor(), 20_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Formats with a currency symbol, grouping thousands with `.` and
    /// showing no fraction digits.
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::money::Money;
    ///
    /// assert_eq!(Money::from_minor(1_250_000).format_with("IDR"), "IDR 1.250.000");
    /// ```
    pub fn format_with(&self, symbol: &str) -> String {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{} {}", sign, symbol, grouped)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Formats as Indonesian Rupiah: `Rp 1.250.000`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_with(DEFAULT_SYMBOL))
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::from_minor(0).to_string(), "Rp 0");
        assert_eq!(Money::from_minor(999).to_string(), "Rp 999");
        assert_eq!(Money::from_minor(10_000).to_string(), "Rp 10.000");
        assert_eq!(Money::from_minor(1_250_000).to_string(), "Rp 1.250.000");
        assert_eq!(Money::from_minor(-5_500).to_string(), "-Rp 5.500");
    }

    #[test]
    fn test_format_with_symbol() {
        assert_eq!(Money::from_minor(40_000).format_with("IDR"), "IDR 40.000");
        assert_eq!(Money::from_minor(-999).format_with("$"), "-$ 999");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a * 3).minor(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 2000);
    }

    #[test]
    fn test_multiply_quantity_saturates() {
        let price = Money::from_minor(i64::MAX / 2);
        assert_eq!(price.multiply_quantity(3).minor(), i64::MAX);
    }

    #[test]
    fn test_serializes_as_bare_integer() {
        let json = serde_json::to_string(&Money::from_minor(20_000)).unwrap();
        assert_eq!(json, "20000");

        let back: Money = serde_json::from_str("40000").unwrap();
        assert_eq!(back, Money::from_minor(40_000));
    }
}
