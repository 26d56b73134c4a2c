//! # Checkout Page
//!
//! Loads an order, collects the checkout form and submits it once.
//!
//! ## Session
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  open(order_id)                                                         │
//! │      │                                                                  │
//! │      ├── id absent or ≤ 0 ──────────────► Empty(noOrderId), no fetch    │
//! │      │                                                                  │
//! │      ▼   join!(orders/{id}, orders/{id}/orderItems?_expand=product)     │
//! │      ├── order NotFound ────────────────► Empty(notFound)               │
//! │      ├── order transport error ─────────► Error                         │
//! │      ├── totalAmounts == 0 ─────────────► Empty(noItems)                │
//! │      └── order loaded ──────────────────► Ready                         │
//! │           (items failure only marks the items list Failed)              │
//! │                                                                         │
//! │  from_draft(buy-now draft), no fetch                                    │
//! │      ├── no lines ──────────────────────► Empty(noItems)                │
//! │      └── lines ─────────────────────────► Ready                         │
//! │                                                                         │
//! │  submit()                                                               │
//! │      ├── not Ready / Error ─────────────► InvalidTransition             │
//! │      ├── form invalid ──────────────────► field errors, no store call   │
//! │      ▼                                                                  │
//! │  Submitting                                                             │
//! │      │   order-in-progress only: POST orders, POST orderItems           │
//! │      ▼                                                                  │
//! │  PATCH orders/{id} ──┬── Ok  ──► Success (final)                        │
//! │                      └── Err ──► Error (resubmit allowed)               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `submit` takes `&mut self`, so a session can never have two submissions
//! in flight. A submit future dropped while `Submitting` leaves the page in
//! `Error`, from which it may be submitted again.

use serde::Serialize;
use tracing::{debug, info, warn};

use storefront_core::checkout::{
    amount_label, apply_to_order, payment_options, shipping_options, CheckoutDetails,
    CheckoutForm, CheckoutPhase, EmptyReason, SelectOption,
};
use storefront_core::validation::validate_order_id;
use storefront_core::{FieldErrors, Money, Order, OrderItem, OrderStatus};
use storefront_store::{NewOrder, NewOrderItem, OrderRepository};

use super::Loadable;
use crate::error::{ApiError, ApiResult};
use crate::state::{CatalogSettings, OrderDraft, OrderState};
use crate::AppContext;

const INTERRUPTED: &str = "Submission was interrupted";

/// Summary the checkout UI renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
    pub phase: CheckoutPhase,
    pub form: Option<CheckoutForm>,
    pub items: Loadable<Vec<OrderItem>>,
    pub amount_label: Option<String>,
    pub total_price: Option<Money>,
    pub total_label: Option<String>,
    pub shipping_options: Vec<SelectOption>,
    pub payment_options: Vec<SelectOption>,
    pub field_errors: FieldErrors,
}

/// One checkout session for one order.
pub struct CheckoutPage {
    phase: CheckoutPhase,
    order: Option<Order>,
    items: Loadable<Vec<OrderItem>>,
    form: Option<CheckoutForm>,
    field_errors: FieldErrors,
    /// Buy-now lines not stored with their order yet.
    unsaved_items: Vec<NewOrderItem>,
    /// Version of the order-in-progress this session checks out.
    draft_version: Option<u64>,
    orders: OrderRepository,
    order_state: OrderState,
    catalog: CatalogSettings,
}

impl CheckoutPage {
    fn blank(ctx: &AppContext) -> Self {
        CheckoutPage {
            phase: CheckoutPhase::Loading,
            order: None,
            items: Loadable::Loading,
            form: None,
            field_errors: FieldErrors::new(),
            unsaved_items: Vec::new(),
            draft_version: None,
            orders: ctx.store.orders(),
            order_state: ctx.order.clone(),
            catalog: ctx.config.catalog.clone(),
        }
    }

    /// Opens checkout for `order_id` and loads it.
    pub async fn open(ctx: &AppContext, order_id: Option<i64>) -> Self {
        let mut page = Self::blank(ctx);

        let order_id = match validate_order_id(order_id) {
            Ok(id) => id,
            Err(err) => {
                debug!(?order_id, "No order to check out: {}", err);
                page.items = Loadable::Loaded(Vec::new());
                page.transition(CheckoutPhase::Empty(EmptyReason::NoOrderId));
                return page;
            }
        };
        if ctx.order.order_id() == Some(order_id) {
            page.draft_version = Some(ctx.order.draft().version);
        }

        let (order, items) = tokio::join!(page.orders.get(order_id), page.orders.items(order_id));

        page.items = match items {
            Ok(items) => Loadable::Loaded(items),
            Err(err) => {
                warn!(order_id, "Order items fetch failed: {}", err);
                Loadable::Failed(err.into())
            }
        };

        match order {
            Ok(order) if order.is_empty() => {
                page.order = Some(order);
                page.transition(CheckoutPhase::Empty(EmptyReason::NoItems));
            }
            Ok(order) => {
                let mut form = CheckoutForm::from_order(&order);
                if form.user_id <= 0 {
                    if let Some(user_id) = ctx.auth.user_id() {
                        form.user_id = user_id;
                    }
                }
                page.form = Some(form);
                page.order = Some(order);
                page.transition(CheckoutPhase::Ready);
            }
            Err(err) if err.is_not_found() => {
                page.transition(CheckoutPhase::Empty(EmptyReason::NotFound));
            }
            Err(err) => {
                let err = ApiError::from(err);
                page.transition(CheckoutPhase::Error(err.message));
            }
        }
        page
    }

    /// Opens checkout for the order-in-progress a buy-now produced.
    ///
    /// Nothing is fetched. The order and its lines are stored on submit,
    /// unless the draft already names a stored order.
    pub fn from_draft(ctx: &AppContext, draft: OrderDraft) -> Self {
        let mut page = Self::blank(ctx);
        page.draft_version = Some(draft.version);

        if draft.items.is_empty() {
            page.items = Loadable::Loaded(Vec::new());
            page.transition(CheckoutPhase::Empty(EmptyReason::NoItems));
            return page;
        }

        let order_id = draft.order_id.unwrap_or(0);
        let order = Order {
            id: order_id,
            user_id: ctx.auth.user_id().unwrap_or(ctx.config.session.user_id),
            total_amounts: draft.items.len() as i64,
            total_price: draft.total_price,
            shipping: None,
            payment: None,
            address: None,
            phone: None,
            insurance: false,
            status: OrderStatus::Pending,
            created_at: None,
            updated_at: None,
        };
        page.items = Loadable::Loaded(
            draft
                .items
                .iter()
                .map(|line| OrderItem {
                    id: 0,
                    order_id,
                    product_id: line.product_id,
                    amount: line.amount,
                    sub_total: line.sub_total,
                    product: None,
                })
                .collect(),
        );
        if draft.order_id.is_none() {
            page.unsaved_items = draft
                .items
                .iter()
                .map(|line| NewOrderItem {
                    product_id: line.product_id,
                    amount: line.amount,
                    sub_total: line.sub_total,
                })
                .collect();
        }
        debug!(
            order_id = ?draft.order_id,
            lines = draft.items.len(),
            "Checkout opened from order-in-progress"
        );
        page.form = Some(CheckoutForm::from_order(&order));
        page.order = Some(order);
        page.transition(CheckoutPhase::Ready);
        page
    }

    fn transition(&mut self, next: CheckoutPhase) {
        info!(from = %self.phase, to = %next, "Checkout phase");
        self.phase = next;
    }

    pub fn phase(&self) -> &CheckoutPhase {
        &self.phase
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn items(&self) -> &Loadable<Vec<OrderItem>> {
        &self.items
    }

    pub fn form(&self) -> Option<&CheckoutForm> {
        self.form.as_ref()
    }

    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Editable form, while the session still accepts a submit.
    pub fn form_mut(&mut self) -> ApiResult<&mut CheckoutForm> {
        if !self.phase.accepts_submit() {
            return Err(self.phase.reject("edit").into());
        }
        self.form
            .as_mut()
            .ok_or_else(|| ApiError::invalid_state("No order loaded"))
    }

    pub fn view(&self) -> CheckoutView {
        CheckoutView {
            phase: self.phase.clone(),
            form: self.form.clone(),
            items: self.items.clone(),
            amount_label: self.order.as_ref().map(|o| amount_label(o.total_amounts)),
            total_price: self.order.as_ref().map(|o| o.total_price),
            total_label: self
                .order
                .as_ref()
                .map(|o| self.catalog.format_price(o.total_price)),
            shipping_options: shipping_options(),
            payment_options: payment_options(),
            field_errors: self.field_errors.clone(),
        }
    }

    /// Validates the form and persists it into the order.
    ///
    /// ## Returns
    /// * `Ok(Order)` - The saved order; the session is now `Success`
    /// * `Err(VALIDATION_ERROR)` - Field errors; nothing was sent
    /// * `Err(TRANSPORT_ERROR)` - A store call failed; the session is `Error`
    ///   and may be submitted again
    /// * `Err(INVALID_STATE)` - The session does not accept a submit
    pub async fn submit(&mut self) -> ApiResult<Order> {
        if !self.phase.accepts_submit() {
            return Err(self.phase.reject("submit").into());
        }
        let (order, form) = match (&self.order, &self.form) {
            (Some(order), Some(form)) => (order, form),
            _ => return Err(self.phase.reject("submit").into()),
        };

        let details = match form.validate() {
            Ok(details) => details,
            Err(errors) => {
                debug!(order_id = order.id, fields = errors.len(), "Checkout form invalid");
                self.field_errors = errors.clone();
                return Err(ApiError::fields(errors));
            }
        };
        self.field_errors = FieldErrors::new();

        apply_to_order(order, &details)?;
        self.transition(CheckoutPhase::Submitting);

        let mut guard = SubmitGuard {
            phase: &mut self.phase,
            settled: false,
        };
        let result = save(
            &self.orders,
            self.draft_version.is_some().then_some(&self.order_state),
            &mut self.order,
            &mut self.unsaved_items,
            &details,
        )
        .await;
        guard.settled = true;
        drop(guard);

        if let (Some(form), Some(order)) = (self.form.as_mut(), self.order.as_ref()) {
            form.id = order.id;
        }
        match result {
            Ok(saved) => {
                info!(order_id = saved.id, "Order submitted");
                if let Some(version) = self.draft_version {
                    self.order_state.finish(saved.id, version);
                }
                self.order = Some(saved.clone());
                self.transition(CheckoutPhase::Success);
                Ok(saved)
            }
            Err(err) => {
                warn!(
                    order_id = ?self.order.as_ref().map(|o| o.id),
                    "Order submit failed: {}",
                    err
                );
                self.transition(CheckoutPhase::Error(err.message.clone()));
                Err(err)
            }
        }
    }
}

/// Moves a `Submitting` phase to `Error` when dropped unsettled.
struct SubmitGuard<'a> {
    phase: &'a mut CheckoutPhase,
    settled: bool,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        if !self.settled {
            warn!("Checkout submit dropped before the store answered");
            *self.phase = CheckoutPhase::Error(INTERRUPTED.to_string());
        }
    }
}

/// Stores an order-in-progress and its lines when needed, then persists the
/// checkout details with an update.
///
/// Progress is written back into `order` and `unsaved_items` after each
/// store call, so a later attempt resumes instead of creating duplicates.
async fn save(
    orders: &OrderRepository,
    order_state: Option<&OrderState>,
    order: &mut Option<Order>,
    unsaved_items: &mut Vec<NewOrderItem>,
    details: &CheckoutDetails,
) -> ApiResult<Order> {
    let current = order
        .as_mut()
        .ok_or_else(|| ApiError::invalid_state("No order loaded"))?;

    if current.id <= 0 {
        *current = orders
            .open(&NewOrder {
                user_id: current.user_id,
                total_amounts: current.total_amounts,
                total_price: current.total_price,
                status: OrderStatus::Pending,
            })
            .await?;
    }
    while let Some(item) = unsaved_items.first() {
        orders.add_item(current.id, item).await?;
        unsaved_items.remove(0);
    }
    if let Some(order_state) = order_state {
        order_state.attach_order(current.id);
    }

    let submitted = apply_to_order(current, details)?;
    Ok(orders.update(&submitted).await?)
}
