//! # storefront-core: Pure Order-State Logic
//!
//! This crate holds every rule of the storefront order workflow as pure
//! functions and plain data. Nothing in here talks to the item store.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/storefront                              │   │
//! │  │    ProductPage ──► CartState / OrderState ──► CheckoutPage      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ storefront-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │ quantity  │  │   draft   │  │  handoff  │  │ checkout  │  │   │
//! │  │   │  clamp    │  │ subTotal  │  │ LineItems │  │  schema   │  │   │
//! │  │   │  bounds   │  │ snapshot  │  │  merge    │  │  phases   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO STORE • NO NETWORK • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                storefront-store (Item Store Client)             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Records exchanged with the item store (Product, Order, ...)
//! - [`money`] - Integer money in the smallest currency unit
//! - [`quantity`] - Quantity Controller (`[minOrder, maxOrder]` clamping)
//! - [`draft`] - Line-item draft with derived subtotal
//! - [`handoff`] - Merge rules for cart and order-in-progress collections
//! - [`checkout`] - Checkout form, phases and order merge
//! - [`validation`] - Declarative field schema for the checkout form
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use storefront_core::draft::LineItemDraft;
//! use storefront_core::money::Money;
//! use storefront_core::quantity::QuantityBounds;
//!
//! let bounds = QuantityBounds::new(2, 8).unwrap();
//! let mut draft = LineItemDraft::new(1, 1, Money::from_minor(10_000), bounds);
//! assert_eq!(draft.sub_total().minor(), 20_000);
//!
//! draft.increment();
//! draft.increment();
//! assert_eq!(draft.amount(), 4);
//! assert_eq!(draft.sub_total().minor(), 40_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod checkout;
pub mod draft;
pub mod error;
pub mod handoff;
pub mod money;
pub mod quantity;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, FieldError, FieldErrors, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Identity of the signed-in user when nothing else is configured.
///
/// The storefront runs a single demo account; the id matches the seeded
/// `users/1` record of the item store.
pub const DEFAULT_USER_ID: i64 = 1;

/// Maximum distinct products held by one cart or order-in-progress.
pub const MAX_LINE_ITEMS: usize = 100;
