//! # Product Page
//!
//! Product detail with its quantity draft, plus the related products list.
//!
//! ## Fetches
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open(product_id)                                                       │
//! │      │                                                                  │
//! │      ├──► spawn: products?_limit=N  ──► related (own slot, may fail)    │
//! │      │                                                                  │
//! │      └──► await: products/{id}?_expand=category                         │
//! │               │                                                         │
//! │               ├── Ok  ──► Loaded + LineItemDraft at minOrder            │
//! │               │           (no draft if stock < minOrder)                │
//! │               └── Err ──► Failed                                        │
//! │                                                                         │
//! │  drop(page) ──► related task aborted                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use ts_rs::TS;

use storefront_core::draft::LineItemDraft;
use storefront_core::handoff::MergeOutcome;
use storefront_core::quantity::QuantityBounds;
use storefront_core::{Money, Product};
use storefront_store::ProductRepository;

use super::Loadable;
use crate::error::{ApiError, ApiResult};
use crate::state::{CartState, CatalogSettings, OrderDraft, OrderState};
use crate::AppContext;

/// Quantity controls as the UI renders them.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QuantityView {
    pub amount: i64,
    pub sub_total: Money,
    pub sub_total_label: String,
    pub min_order: i64,
    pub max_order: i64,
    pub can_increment: bool,
    pub can_decrement: bool,
}

impl QuantityView {
    fn new(draft: &LineItemDraft, catalog: &CatalogSettings) -> Self {
        QuantityView {
            amount: draft.amount(),
            sub_total: draft.sub_total(),
            sub_total_label: catalog.format_price(draft.sub_total()),
            min_order: draft.bounds().min(),
            max_order: draft.bounds().max(),
            can_increment: draft.can_increment(),
            can_decrement: draft.can_decrement(),
        }
    }
}

type RelatedSlot = Arc<Mutex<Loadable<Vec<Product>>>>;

/// One open product page.
pub struct ProductPage {
    product_id: i64,
    product: Loadable<Product>,
    draft: Option<LineItemDraft>,
    unavailable: Option<ApiError>,
    related: RelatedSlot,
    related_task: Option<JoinHandle<()>>,
    products: ProductRepository,
    cart: CartState,
    order: OrderState,
    catalog: CatalogSettings,
}

impl ProductPage {
    /// Opens the page: starts the related fetch, then waits for the product.
    pub async fn open(ctx: &AppContext, product_id: i64) -> Self {
        let repo = ctx.store.products();
        let mut page = ProductPage {
            product_id,
            product: Loadable::Loading,
            draft: None,
            unavailable: None,
            related: Arc::new(Mutex::new(Loadable::Loading)),
            related_task: None,
            products: repo.clone(),
            cart: ctx.cart.clone(),
            order: ctx.order.clone(),
            catalog: ctx.config.catalog.clone(),
        };

        if product_id <= 0 {
            page.product =
                Loadable::Failed(ApiError::not_found("products", &product_id.to_string()));
            *page.related.lock().unwrap_or_else(PoisonError::into_inner) =
                Loadable::Loaded(Vec::new());
            return page;
        }

        page.related_task = Some(spawn_related(
            repo.clone(),
            product_id,
            ctx.config.catalog.related_limit,
            page.related.clone(),
        ));

        match repo.get(product_id).await {
            Ok(product) => page.loaded(product, ctx.cart.cart_id()),
            Err(err) => {
                warn!(product_id, "Product fetch failed: {}", err);
                page.product = Loadable::Failed(err.into());
            }
        }
        page
    }

    fn loaded(&mut self, product: Product, cart_id: i64) {
        match LineItemDraft::for_product(&product, cart_id) {
            Ok(draft) => {
                debug!(
                    product_id = product.id,
                    amount = draft.amount(),
                    max_order = draft.bounds().max(),
                    "Draft started"
                );
                self.draft = Some(draft);
            }
            Err(err) => {
                info!(product_id = product.id, "Product not purchasable: {}", err);
                self.unavailable = Some(err.into());
            }
        }
        self.product = Loadable::Loaded(product);
    }

    /// Re-reads the product and carries price and stock changes into the
    /// draft. The typed amount survives, clamped into the new range.
    pub async fn refresh(&mut self) -> ApiResult<Option<QuantityView>> {
        if self.product_id <= 0 {
            return Err(ApiError::not_found("products", &self.product_id.to_string()));
        }
        let product = self.products.get(self.product_id).await?;
        if self.draft.is_none() {
            self.unavailable = None;
            let cart_id = self.cart.cart_id();
            self.loaded(product, cart_id);
            return Ok(self.quantity());
        }
        let Some(draft) = self.draft.as_mut() else {
            return Ok(None);
        };

        draft.reprice(product.price);
        match QuantityBounds::for_product(&product) {
            Ok(bounds) => {
                draft.rebound(bounds);
                self.unavailable = None;
            }
            Err(err) => {
                info!(product_id = product.id, "Product no longer purchasable: {}", err);
                self.unavailable = Some(err.into());
            }
        }
        debug!(
            product_id = product.id,
            amount = draft.amount(),
            revision = draft.revision(),
            "Draft refreshed"
        );
        self.product = Loadable::Loaded(product);
        Ok(self.quantity())
    }

    pub fn product_id(&self) -> i64 {
        self.product_id
    }

    pub fn product(&self) -> &Loadable<Product> {
        &self.product
    }

    /// Unit price with the configured currency symbol.
    pub fn price_label(&self) -> Option<String> {
        self.product
            .loaded()
            .map(|product| self.catalog.format_price(product.price))
    }

    pub fn related(&self) -> Loadable<Vec<Product>> {
        self.related
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Waits until the related products fetch has finished.
    pub async fn related_settled(&mut self) -> Loadable<Vec<Product>> {
        if let Some(task) = self.related_task.take() {
            if let Err(err) = task.await {
                warn!(product_id = self.product_id, "Related products task ended: {}", err);
            }
        }
        self.related()
    }

    pub fn draft(&self) -> Option<&LineItemDraft> {
        self.draft.as_ref()
    }

    pub fn quantity(&self) -> Option<QuantityView> {
        self.draft
            .as_ref()
            .map(|draft| QuantityView::new(draft, &self.catalog))
    }

    // -------------------------------------------------------------------------
    // Quantity controls
    // -------------------------------------------------------------------------

    fn current_quantity(&self) -> ApiResult<QuantityView> {
        self.quantity()
            .ok_or_else(|| ApiError::invalid_state("Product is not loaded"))
    }

    fn draft_mut(&mut self) -> ApiResult<&mut LineItemDraft> {
        if let Some(reason) = &self.unavailable {
            return Err(reason.clone());
        }
        self.draft
            .as_mut()
            .ok_or_else(|| ApiError::invalid_state("Product is not loaded"))
    }

    pub fn increment(&mut self) -> ApiResult<QuantityView> {
        self.draft_mut()?.increment();
        self.current_quantity()
    }

    pub fn decrement(&mut self) -> ApiResult<QuantityView> {
        self.draft_mut()?.decrement();
        self.current_quantity()
    }

    /// Applies raw text typed into the quantity input.
    pub fn set_amount(&mut self, raw: &str) -> ApiResult<QuantityView> {
        self.draft_mut()?.set_amount(raw);
        self.current_quantity()
    }

    // -------------------------------------------------------------------------
    // Hand-off
    // -------------------------------------------------------------------------

    /// Sends the current draft to the persisted cart.
    pub async fn add_to_cart(&mut self) -> ApiResult<MergeOutcome> {
        let snapshot = self.draft_mut()?.snapshot();
        self.cart.add(&snapshot).await
    }

    /// Puts the current draft in the order-in-progress for checkout.
    pub fn buy_now(&mut self) -> ApiResult<OrderDraft> {
        let snapshot = self.draft_mut()?.snapshot();
        let (_, order) = self.order.buy_now(&snapshot)?;
        Ok(order)
    }
}

impl Drop for ProductPage {
    fn drop(&mut self) {
        if let Some(task) = self.related_task.take() {
            task.abort();
        }
    }
}

fn spawn_related(
    repo: ProductRepository,
    product_id: i64,
    limit: usize,
    slot: RelatedSlot,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let loaded = match repo.related(product_id, limit).await {
            Ok(products) => Loadable::Loaded(products),
            Err(err) => {
                warn!(product_id, "Related products fetch failed: {}", err);
                Loadable::Failed(err.into())
            }
        };
        *slot.lock().unwrap_or_else(PoisonError::into_inner) = loaded;
    })
}
