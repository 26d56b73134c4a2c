//! # Error Types
//!
//! Domain-specific error types for storefront-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  storefront-core errors (this file)                                    │
//! │  ├── CoreError        - Business rule violations                       │
//! │  ├── ValidationError  - Single input check failures                    │
//! │  └── FieldErrors      - Field-scoped form errors (checkout schema)     │
//! │                                                                         │
//! │  storefront-store errors (separate crate)                              │
//! │  └── StoreError       - NotFound / Transport failures                  │
//! │                                                                         │
//! │  app errors                                                            │
//! │  └── ApiError         - What the page layer surfaces                   │
//! │                                                                         │
//! │  Flow: FieldErrors → CoreError → ApiError ← StoreError                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use ts_rs::TS;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// The product's stock cannot cover even its minimum order quantity.
    ///
    /// ## When This Occurs
    /// - Every stock location is empty
    /// - `sum(stocks.total) < minOrder`
    #[error("Product {product_id} cannot be ordered: minimum {min_order}, available {available}")]
    InsufficientStock {
        product_id: i64,
        min_order: i64,
        available: i64,
    },

    /// The quantity range `[min, max]` is empty or starts below one.
    #[error("Invalid quantity range [{min}, {max}]")]
    InvalidRange { min: i64, max: i64 },

    /// Merging a snapshot would push a line above the product's stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart holds 6 × Scale (maxOrder 8)
    ///      │
    ///      ▼
    /// Add to Cart (amount 4)
    ///      │
    ///      ▼
    /// QuantityTooLarge { requested: 10, max: 8 }
    ///      │
    ///      ▼
    /// Cart unchanged, UI shows "Only 8 available"
    /// ```
    #[error("Quantity {requested} for product {product_id} exceeds maximum allowed ({max})")]
    QuantityTooLarge {
        product_id: i64,
        requested: i64,
        max: i64,
    },

    /// The collection already holds the maximum number of distinct products.
    #[error("Cannot hold more than {max} products")]
    TooManyLineItems { max: usize },

    /// Operation is not allowed in the current checkout phase.
    #[error("Cannot {action} while checkout is {phase}")]
    InvalidTransition { phase: String, action: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors for a single value.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Field Errors
// =============================================================================

/// One field-scoped message, shown next to the form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

/// All field errors of one form submission, in schema order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldErrors(Vec<FieldError>);

impl FieldErrors {
    pub fn new() -> Self {
        FieldErrors(Vec::new())
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.push(FieldError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Returns the message reported for `field`, if any.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<FieldError> {
        self.0
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
