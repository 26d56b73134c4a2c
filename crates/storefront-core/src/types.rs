//! # Domain Types
//!
//! Records exchanged with the item store.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Order      │   │   OrderItem     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id             │   │  orderId (FK)   │       │
//! │  │  price          │   │  totalAmounts   │   │  productId (FK) │       │
//! │  │  minOrder       │   │  totalPrice     │   │  amount         │       │
//! │  │  stocks[]       │   │  shipping/pay   │   │  subTotal       │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    CartItem     │   │ ShippingMethod  │   │ PaymentMethod   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  cartId         │   │  same-day       │   │ cash-on-delivery│       │
//! │  │  productId      │   │  express        │   │ bank-transfer   │       │
//! │  │  amount         │   │  regular        │   │ paylater        │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Field names follow the store's camelCase JSON (`minOrder`, `subTotal`).
//! Ids are the store's numeric ids.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// Units of a product held at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Stock {
    pub location: String,
    pub total: i64,
}

/// Product category (embedded with `_expand=category`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

fn default_min_order() -> i64 {
    1
}

/// A product listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,

    pub name: String,

    #[serde(default)]
    pub sku: String,

    #[serde(default)]
    pub brand: String,

    /// Unit price in the smallest currency unit.
    pub price: Money,

    /// Smallest purchasable quantity.
    #[serde(default = "default_min_order")]
    pub min_order: i64,

    #[serde(default)]
    pub stocks: Vec<Stock>,

    #[serde(default)]
    pub category_id: Option<i64>,

    /// Present only when fetched with `_expand=category`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,

    /// Image URIs, first one is the thumbnail.
    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub ratings: f64,

    #[serde(default)]
    pub total_reviews: i64,

    #[serde(default)]
    pub promos: Vec<String>,
}

impl Product {
    /// Largest purchasable quantity: the sum of stock over all locations.
    ///
    /// Negative totals (data entry mistakes) count as zero.
    pub fn max_order(&self) -> i64 {
        self.stocks
            .iter()
            .map(|s| s.total.max(0))
            .fold(0i64, |acc, t| acc.saturating_add(t))
    }
}

// =============================================================================
// Shipping / Payment Methods
// =============================================================================

/// Delivery options offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ShippingMethod {
    SameDay,
    Express,
    Regular,
}

impl ShippingMethod {
    pub const ALL: [ShippingMethod; 3] = [
        ShippingMethod::SameDay,
        ShippingMethod::Express,
        ShippingMethod::Regular,
    ];

    /// Wire value, as stored in the order record.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ShippingMethod::SameDay => "same-day",
            ShippingMethod::Express => "express",
            ShippingMethod::Regular => "regular",
        }
    }

    /// Label shown in the select input.
    pub const fn label(&self) -> &'static str {
        match self {
            ShippingMethod::SameDay => "Same-Day",
            ShippingMethod::Express => "Express",
            ShippingMethod::Regular => "Regular",
        }
    }
}

impl fmt::Display for ShippingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShippingMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ShippingMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "shipping".to_string(),
                allowed: ShippingMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

/// Payment options offered at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum PaymentMethod {
    CashOnDelivery,
    BankTransfer,
    Paylater,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [
        PaymentMethod::CashOnDelivery,
        PaymentMethod::BankTransfer,
        PaymentMethod::Paylater,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "cash-on-delivery",
            PaymentMethod::BankTransfer => "bank-transfer",
            PaymentMethod::Paylater => "paylater",
        }
    }

    pub const fn label(&self) -> &'static str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::Paylater => "Paylater",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|m| m.as_str() == s.trim())
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

/// Reads `""` and `null` as `None`.
///
/// Draft orders are created with blank select values, so a stored `""`
/// means "not chosen yet" rather than a malformed record.
fn blank_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => value.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

// =============================================================================
// Order
// =============================================================================

/// Lifecycle of an order record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Created, shipping/payment not chosen yet.
    #[default]
    Pending,
    /// Checkout submitted. Terminal.
    Submitted,
}

/// An order record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,

    #[serde(default)]
    pub user_id: i64,

    /// Number of line items in the order.
    #[serde(default)]
    pub total_amounts: i64,

    #[serde(default)]
    pub total_price: Money,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub shipping: Option<ShippingMethod>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub payment: Option<PaymentMethod>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub address: Option<String>,

    #[serde(default, deserialize_with = "blank_as_none")]
    pub phone: Option<String>,

    #[serde(default)]
    pub insurance: bool,

    #[serde(default)]
    pub status: OrderStatus,

    /// Epoch milliseconds, stamped by the store on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    /// Epoch milliseconds, stamped by the store on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

impl Order {
    pub fn is_empty(&self) -> bool {
        self.total_amounts <= 0
    }
}

/// A line of an order, usually fetched with `_expand=product`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub amount: i64,
    pub sub_total: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<Product>,
}

// =============================================================================
// Cart Item
// =============================================================================

/// A persisted cart line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Assigned by the store on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    pub cart_id: i64,
    pub product_id: i64,
    pub amount: i64,
    pub sub_total: Money,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<i64>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_max_order_sums_stock() {
        let product: Product = serde_json::from_value(json!({
            "id": 1,
            "name": "Timemore Scale",
            "price": 10000,
            "minOrder": 2,
            "stocks": [
                { "location": "jakarta", "total": 3 },
                { "location": "bandung", "total": 5 },
                { "location": "surabaya", "total": 0 }
            ]
        }))
        .unwrap();

        assert_eq!(product.max_order(), 8);
    }

    #[test]
    fn test_product_defaults() {
        let product: Product =
            serde_json::from_value(json!({ "id": 3, "name": "Filter", "price": 500 })).unwrap();
        assert_eq!(product.min_order, 1);
        assert_eq!(product.max_order(), 0);
        assert!(product.category.is_none());
    }

    #[test]
    fn test_method_wire_values() {
        assert_eq!(
            serde_json::to_value(ShippingMethod::SameDay).unwrap(),
            json!("same-day")
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::CashOnDelivery).unwrap(),
            json!("cash-on-delivery")
        );
        assert_eq!(
            serde_json::to_value(PaymentMethod::Paylater).unwrap(),
            json!("paylater")
        );
        assert_eq!("express".parse::<ShippingMethod>(), Ok(ShippingMethod::Express));
        assert!("teleport".parse::<ShippingMethod>().is_err());
        assert_eq!(
            "bank-transfer".parse::<PaymentMethod>(),
            Ok(PaymentMethod::BankTransfer)
        );
    }

    #[test]
    fn test_order_reads_blank_form_fields_as_none() {
        let order: Order = serde_json::from_value(json!({
            "id": 1,
            "userId": 1,
            "totalAmounts": 2,
            "totalPrice": 45000,
            "shipping": "",
            "payment": null,
            "address": "",
            "insurance": false
        }))
        .unwrap();

        assert_eq!(order.shipping, None);
        assert_eq!(order.payment, None);
        assert_eq!(order.address, None);
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.is_empty());
    }

    #[test]
    fn test_order_rejects_unknown_shipping() {
        let result: Result<Order, _> =
            serde_json::from_value(json!({ "id": 1, "shipping": "teleport" }));
        assert!(result.is_err());
    }
}
