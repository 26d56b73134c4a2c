//! # Pages
//!
//! Page workflows the UI drives. Each page owns its fetched data and its
//! drafts; shared state lives in the containers of [`crate::state`].
//!
//! - [`product`] - Product detail, quantity draft, add to cart, buy now
//! - [`checkout`] - Checkout form and submission

pub mod checkout;
pub mod product;

pub use checkout::{CheckoutPage, CheckoutView};
pub use product::{ProductPage, QuantityView};

use serde::Serialize;

use crate::error::ApiError;

/// State of one independently fetched piece of a page.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "camelCase")]
pub enum Loadable<T> {
    Loading,
    Loaded(T),
    Failed(ApiError),
}

impl<T> Loadable<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Loadable::Loaded(value) => Some(value),
            _ => None,
        }
    }
}
