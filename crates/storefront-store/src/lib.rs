//! # storefront-store: Item Store Client
//!
//! Every call the storefront makes to its item store goes through this
//! crate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Storefront Data Flow                             │
//! │                                                                         │
//! │  ProductPage / CartState / CheckoutPage                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                storefront-store (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │ Repositories  │    │  ItemStore    │    │  Middleware  │  │   │
//! │  │   │               │    │  (client.rs)  │    │              │  │   │
//! │  │   │ ProductRepo   │───►│ get           │    │ createdAt    │  │   │
//! │  │   │ OrderRepo     │    │ create        │◄───│ updatedAt    │  │   │
//! │  │   │ CartRepo      │    │ update        │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │                                │   │
//! │  └────────────────────────────────┼────────────────────────────────┘   │
//! │                  ┌────────────────┴────────────────┐                    │
//! │                  ▼                                 ▼                    │
//! │  ┌───────────────────────────┐      ┌───────────────────────────┐      │
//! │  │  REST backend (http.rs)   │      │  SQLite store (pool.rs)   │      │
//! │  └───────────────────────────┘      └───────────────────────────┘      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`client`] - The `ItemStore` trait and typed helpers
//! - [`path`] - Resource paths and `_expand` / `_limit` queries
//! - [`http`] - REST backend over reqwest
//! - [`pool`] - Local SQLite backend
//! - [`middleware`] - createdAt / updatedAt stamping
//! - [`migrations`] - Embedded migrations for the local backend
//! - [`repository`] - Typed repositories
//! - [`seed`] - Demo catalog for development and tests
//! - [`error`] - Store error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use storefront_store::{open_local, DbConfig, OrderRepository};
//!
//! let store = Arc::new(open_local(DbConfig::new("./storefront.db")).await?);
//! let orders = OrderRepository::new(store);
//! let order = orders.get(1).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod client;
pub mod error;
pub mod http;
pub mod middleware;
pub mod migrations;
pub mod path;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use client::{ItemStore, ItemStoreExt};
pub use error::{StoreError, StoreResult};
pub use http::{HttpConfig, HttpItemStore};
pub use middleware::{Clock, ManualClock, SystemClock, Timestamped};
pub use path::{collections, Query, ResourcePath};
pub use pool::{open_local, DbConfig, SqliteItemStore};

// Repository re-exports for convenience
pub use repository::cart::CartRepository;
pub use repository::order::{NewOrder, NewOrderItem, OrderRepository};
pub use repository::product::ProductRepository;
pub use seed::{seed_demo, SeedSummary};
