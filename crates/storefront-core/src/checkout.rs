//! # Checkout
//!
//! Checkout form, phases and the merge of a validated form into an order.
//!
//! ## Phases
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │              ┌──────────► Empty   (bad id / not found / 0 items)        │
//! │              │                                                          │
//! │   Loading ───┼──────────► Error   (transport failure)                   │
//! │              │                                                          │
//! │              └──────────► Ready ──► Submitting ──┬──► Success (final)   │
//! │                             ▲                    │                      │
//! │                             │                    └──► Error             │
//! │                  field errors stay in Ready           (may resubmit)    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::fmt;
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, FieldErrors};
use crate::money::Money;
use crate::types::{Order, OrderStatus, PaymentMethod, ShippingMethod};
use crate::validation::{evaluate, FormFields, CHECKOUT_SCHEMA};

// =============================================================================
// Phases
// =============================================================================

/// Why the checkout shows the empty state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub enum EmptyReason {
    /// No order id, or a non-positive one.
    NoOrderId,
    /// The store has no order with this id.
    NotFound,
    /// The order has `totalAmounts == 0`.
    NoItems,
}

/// Where a checkout session currently is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(tag = "phase", content = "detail", rename_all = "camelCase")]
pub enum CheckoutPhase {
    Loading,
    Empty(EmptyReason),
    Error(String),
    Ready,
    Submitting,
    Success,
}

impl CheckoutPhase {
    pub const fn name(&self) -> &'static str {
        match self {
            CheckoutPhase::Loading => "loading",
            CheckoutPhase::Empty(_) => "empty",
            CheckoutPhase::Error(_) => "error",
            CheckoutPhase::Ready => "ready",
            CheckoutPhase::Submitting => "submitting",
            CheckoutPhase::Success => "success",
        }
    }

    /// Ready, or a failed attempt the user may resubmit.
    pub const fn accepts_submit(&self) -> bool {
        matches!(self, CheckoutPhase::Ready | CheckoutPhase::Error(_))
    }

    /// Error for an action the phase does not allow.
    pub fn reject(&self, action: &str) -> CoreError {
        CoreError::InvalidTransition {
            phase: self.name().to_string(),
            action: action.to_string(),
        }
    }
}

impl fmt::Display for CheckoutPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Form
// =============================================================================

/// The checkout form as the user fills it.
///
/// Totals come from the loaded order; the text fields start blank and
/// `insurance` starts unchecked.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    pub id: i64,
    pub user_id: i64,
    pub total_amounts: i64,
    pub total_price: Money,

    pub address: String,
    pub phone: String,
    pub shipping: String,
    pub payment: String,
    pub insurance: bool,
}

impl CheckoutForm {
    /// Form pre-populated from an order, with every input reset.
    pub fn from_order(order: &Order) -> Self {
        CheckoutForm {
            id: order.id,
            user_id: order.user_id,
            total_amounts: order.total_amounts,
            total_price: order.total_price,
            address: String::new(),
            phone: String::new(),
            shipping: String::new(),
            payment: String::new(),
            insurance: false,
        }
    }

    /// Checks the form against the checkout schema.
    pub fn validate(&self) -> Result<CheckoutDetails, FieldErrors> {
        let errors = evaluate(CHECKOUT_SCHEMA, self);
        if !errors.is_empty() {
            return Err(errors);
        }

        // Schema guarantees both parse; keep the error path anyway.
        let mut errors = FieldErrors::new();
        let shipping = self.shipping.parse::<ShippingMethod>().ok();
        if shipping.is_none() {
            errors.push("shipping", "Invalid shipping method");
        }
        let payment = self.payment.parse::<PaymentMethod>().ok();
        if payment.is_none() {
            errors.push("payment", "Invalid payment method");
        }

        match (shipping, payment) {
            (Some(shipping), Some(payment)) => Ok(CheckoutDetails {
                address: self.address.trim().to_string(),
                phone: self.phone.trim().to_string(),
                shipping,
                payment,
                insurance: self.insurance,
            }),
            _ => Err(errors),
        }
    }
}

impl FormFields for CheckoutForm {
    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "address" => Some(&self.address),
            "phone" => Some(&self.phone),
            "shipping" => Some(&self.shipping),
            "payment" => Some(&self.payment),
            _ => None,
        }
    }
}

/// A form that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutDetails {
    pub address: String,
    pub phone: String,
    pub shipping: ShippingMethod,
    pub payment: PaymentMethod,
    pub insurance: bool,
}

/// Merges validated details into the order and marks it submitted.
///
/// Refuses orders that were already submitted.
pub fn apply_to_order(order: &Order, details: &CheckoutDetails) -> CoreResult<Order> {
    if order.status == OrderStatus::Submitted {
        return Err(CoreError::InvalidTransition {
            phase: "submitted".to_string(),
            action: "submit".to_string(),
        });
    }
    Ok(Order {
        shipping: Some(details.shipping),
        payment: Some(details.payment),
        address: Some(details.address.clone()),
        phone: Some(details.phone.clone()),
        insurance: details.insurance,
        status: OrderStatus::Submitted,
        ..order.clone()
    })
}

/// One choice of a select input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

pub fn shipping_options() -> Vec<SelectOption> {
    ShippingMethod::ALL
        .iter()
        .map(|m| SelectOption {
            value: m.as_str().to_string(),
            label: m.label().to_string(),
        })
        .collect()
}

pub fn payment_options() -> Vec<SelectOption> {
    PaymentMethod::ALL
        .iter()
        .map(|m| SelectOption {
            value: m.as_str().to_string(),
            label: m.label().to_string(),
        })
        .collect()
}

/// Summary label of an order: "1 product" / "N products".
pub fn amount_label(total_amounts: i64) -> String {
    if total_amounts == 1 {
        "1 product".to_string()
    } else {
        format!("{} products", total_amounts)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
