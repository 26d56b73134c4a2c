//! # State Module
//!
//! State containers created with the [`AppContext`](crate::AppContext) and
//! injected into pages.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                        AppContext                               │   │
//! │  │  config, store, cart, order, auth                               │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │       ┌──────────────┬───────┴──────┬──────────────┐                    │
//! │       ▼              ▼              ▼              ▼                    │
//! │  ┌──────────┐  ┌──────────┐  ┌────────────┐  ┌──────────┐              │
//! │  │StoreState│  │CartState │  │ OrderState │  │AuthState │              │
//! │  │          │  │          │  │            │  │          │              │
//! │  │ Arc<dyn  │  │ Arc<Mutex│  │ Arc<Mutex< │  │ Arc<Mutex│              │
//! │  │ItemStore>│  │  <Cart>> │  │ LineItems>>│  │<Session>>│              │
//! │  └──────────┘  └──────────┘  └────────────┘  └──────────┘              │
//! │                                                                         │
//! │  No lock is held across an await point.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod auth;
mod cart;
mod config;
mod order;
mod store;

pub use auth::{AuthState, Session};
pub use cart::{CartState, CartSummary};
pub use config::{
    AppConfig, Backend, CatalogSettings, ConfigError, SessionSettings, StoreSettings,
    MAX_RELATED_LIMIT,
};
pub use order::{OrderDraft, OrderState};
pub use store::StoreState;
