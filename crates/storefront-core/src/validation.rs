//! # Validation Module
//!
//! Declarative field schemas and single-value validators.
//!
//! ## Schema Evaluation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Schema = [ FieldRule { field, rule, message } ]                        │
//! │                                                                         │
//! │   address  ── Required ───────────────────────── "Required"             │
//! │   phone    ── Required ───────────────────────── "Required"             │
//! │   shipping ── Required ─► OneOf(same-day, ...) ─ "Required" / "Invalid" │
//! │   payment  ── Required ─► OneOf(cash-on-...)   ─ "Required" / "Invalid" │
//! │                                                                         │
//! │  Evaluated top to bottom before any store call. The first failing      │
//! │  rule of a field wins; every failing field is reported.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use storefront_core::validation::{evaluate, FormFields, CHECKOUT_SCHEMA};
//!
//! struct Blank;
//! impl FormFields for Blank {
//!     fn field(&self, _name: &str) -> Option<&str> {
//!         None
//!     }
//! }
//!
//! let errors = evaluate(CHECKOUT_SCHEMA, &Blank);
//! assert_eq!(errors.get("address"), Some("Required"));
//! assert_eq!(errors.len(), 4);
//! ```

use crate::error::{FieldErrors, ValidationError};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Schema
// =============================================================================

/// A constraint on one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Present and not blank after trimming.
    Required,
    /// One of a fixed set of wire values. Blank values pass (pair with
    /// `Required` when the field is mandatory).
    OneOf(&'static [&'static str]),
}

impl Rule {
    fn check(&self, value: Option<&str>) -> bool {
        let value = value.map(str::trim).unwrap_or("");
        match self {
            Rule::Required => !value.is_empty(),
            Rule::OneOf(allowed) => value.is_empty() || allowed.contains(&value),
        }
    }
}

/// `field -> rule -> message`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRule {
    pub field: &'static str,
    pub rule: Rule,
    pub message: &'static str,
}

/// Read access to the raw text of a form, by field name.
pub trait FormFields {
    fn field(&self, name: &str) -> Option<&str>;
}

/// Wire values accepted for `shipping`.
pub const SHIPPING_VALUES: &[&str] = &["same-day", "express", "regular"];

/// Wire values accepted for `payment`.
pub const PAYMENT_VALUES: &[&str] = &["cash-on-delivery", "bank-transfer", "paylater"];

pub const REQUIRED_MESSAGE: &str = "Required";

/// The checkout form schema. `insurance` is an optional boolean and has no
/// text rule.
pub const CHECKOUT_SCHEMA: &[FieldRule] = &[
    FieldRule {
        field: "address",
        rule: Rule::Required,
        message: REQUIRED_MESSAGE,
    },
    FieldRule {
        field: "phone",
        rule: Rule::Required,
        message: REQUIRED_MESSAGE,
    },
    FieldRule {
        field: "shipping",
        rule: Rule::Required,
        message: REQUIRED_MESSAGE,
    },
    FieldRule {
        field: "shipping",
        rule: Rule::OneOf(SHIPPING_VALUES),
        message: "Invalid shipping method",
    },
    FieldRule {
        field: "payment",
        rule: Rule::Required,
        message: REQUIRED_MESSAGE,
    },
    FieldRule {
        field: "payment",
        rule: Rule::OneOf(PAYMENT_VALUES),
        message: "Invalid payment method",
    },
];

/// Runs `schema` against `form`, collecting one message per failing field.
pub fn evaluate(schema: &[FieldRule], form: &impl FormFields) -> FieldErrors {
    let mut errors = FieldErrors::new();
    for rule in schema {
        if errors.get(rule.field).is_some() {
            continue;
        }
        if !rule.rule.check(form.field(rule.field)) {
            errors.push(rule.field, rule.message);
        }
    }
    errors
}

// =============================================================================
// Single-Value Validators
// =============================================================================

/// Validates the order id a checkout was opened with.
///
/// ## Rules
/// - Must be present
/// - Must be positive (`-1` is the "no order" sentinel)
///
/// ## Example
/// ```rust
/// use storefront_core::validation::validate_order_id;
///
/// assert_eq!(validate_order_id(Some(3)), Ok(3));
/// assert!(validate_order_id(Some(-1)).is_err());
/// assert!(validate_order_id(None).is_err());
/// ```
pub fn validate_order_id(order_id: Option<i64>) -> ValidationResult<i64> {
    match order_id {
        None => Err(ValidationError::Required {
            field: "orderId".to_string(),
        }),
        Some(id) if id <= 0 => Err(ValidationError::MustBePositive {
            field: "orderId".to_string(),
        }),
        Some(id) => Ok(id),
    }
}

/// Validates a configured page size (related products limit).
pub fn validate_limit(field: &str, limit: i64, max: i64) -> ValidationResult<i64> {
    if limit < 1 || limit > max {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 1,
            max,
        });
    }
    Ok(limit)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PaymentMethod, ShippingMethod};
    use std::collections::HashMap;

    struct Form(HashMap<&'static str, &'static str>);

    impl FormFields for Form {
        fn field(&self, name: &str) -> Option<&str> {
            self.0.get(name).copied()
        }
    }

    fn form(pairs: &[(&'static str, &'static str)]) -> Form {
        Form(pairs.iter().copied().collect())
    }

    #[test]
    fn test_valid_form_has_no_errors() {
        let f = form(&[
            ("address", "Jl. Sudirman 1"),
            ("phone", "08123456789"),
            ("shipping", "express"),
            ("payment", "paylater"),
        ]);
        assert!(evaluate(CHECKOUT_SCHEMA, &f).is_empty());
    }

    #[test]
    fn test_missing_address_reported() {
        let f = form(&[
            ("address", "   "),
            ("phone", "08123456789"),
            ("shipping", "regular"),
            ("payment", "bank-transfer"),
        ]);
        let errors = evaluate(CHECKOUT_SCHEMA, &f);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.get("address"), Some("Required"));
    }

    #[test]
    fn test_one_message_per_field() {
        let f = form(&[("shipping", ""), ("payment", "crypto")]);
        let errors = evaluate(CHECKOUT_SCHEMA, &f);

        assert_eq!(errors.get("shipping"), Some("Required"));
        assert_eq!(errors.get("payment"), Some("Invalid payment method"));
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["address", "phone", "shipping", "payment"]);
    }

    #[test]
    fn test_wire_values_match_enums() {
        let shipping: Vec<&str> = ShippingMethod::ALL.iter().map(|m| m.as_str()).collect();
        let payment: Vec<&str> = PaymentMethod::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(shipping, SHIPPING_VALUES);
        assert_eq!(payment, PAYMENT_VALUES);
    }

    #[test]
    fn test_validate_limit() {
        assert_eq!(validate_limit("relatedLimit", 6, 50), Ok(6));
        assert!(validate_limit("relatedLimit", 0, 50).is_err());
        assert!(validate_limit("relatedLimit", 51, 50).is_err());
    }
}
