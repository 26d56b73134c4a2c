//! # Storefront Application Layer
//!
//! Session state and page workflows on top of the item store.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Storefront Application                            │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    UI (web / terminal demo)                      │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  pages/   ProductPage    quantity, add to cart, buy now          │  │
//! │  │           CheckoutPage   Loading → Empty / Error / Ready → ...   │  │
//! │  │                                                                  │  │
//! │  │  state/   AppConfig, StoreState, CartState, OrderState,          │  │
//! │  │           AuthState  (owned by AppContext)                       │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  storefront-store   HttpItemStore | Timestamped<SqliteItemStore> │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,ignore
//! let ctx = AppContext::connect(AppConfig::load(None)?).await?;
//!
//! let mut page = ProductPage::open(&ctx, 1).await;
//! page.increment()?;
//! page.add_to_cart().await?;
//!
//! let mut checkout = CheckoutPage::open(&ctx, Some(1)).await;
//! checkout.form_mut()?.address = "Jl. Sudirman 1".into();
//! checkout.submit().await?;
//! ```

pub mod error;
pub mod pages;
pub mod state;

#[cfg(test)]
mod test_support;

use std::sync::Arc;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

use storefront_store::{open_local, DbConfig, HttpConfig, HttpItemStore, ItemStore};

pub use error::{ApiError, ApiResult, ErrorCode};
pub use pages::{CheckoutPage, Loadable, ProductPage};
pub use state::{AppConfig, AuthState, Backend, CartState, OrderState, StoreState};

/// Everything a page needs, created once per session.
#[derive(Debug, Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub store: StoreState,
    pub cart: CartState,
    pub order: OrderState,
    pub auth: AuthState,
}

impl AppContext {
    /// Opens the configured backend and builds the state containers.
    pub async fn connect(config: AppConfig) -> ApiResult<Self> {
        let store: Arc<dyn ItemStore> = match config.store.backend {
            Backend::Http => {
                let http = HttpConfig::new(config.store.base_url.clone())
                    .timeout(config.store.timeout());
                info!(base_url = %config.store.base_url, "Using REST item store");
                Arc::new(HttpItemStore::new(http)?)
            }
            Backend::Sqlite => {
                let path = config.store.resolved_db_path();
                info!(?path, "Using local item store");
                let local =
                    open_local(DbConfig::new(path).connect_timeout(config.store.timeout())).await?;
                if !local.inner().health_check().await {
                    warn!("Local item store did not answer the health check");
                }
                Arc::new(local)
            }
        };
        Ok(Self::from_store(config, store))
    }

    /// Builds the state containers over an existing store.
    pub fn from_store(config: AppConfig, store: Arc<dyn ItemStore>) -> Self {
        let store = StoreState::new(store);
        let auth = AuthState::signed_in(config.session.user_id, config.session.role.clone());
        let cart = CartState::new(config.cart_id(), store.carts());
        AppContext {
            config,
            store,
            cart,
            order: OrderState::new(),
            auth,
        }
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_store=trace` - Trace store calls only
/// - Default: `info,storefront=debug,sqlx=warn`
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::TRACE)
        .init();
}
