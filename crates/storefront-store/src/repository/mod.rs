//! # Repositories
//!
//! Typed access to the item store, one repository per aggregate.
//!
//! ```text
//! ProductRepository  products, categories    (product page, seed)
//! OrderRepository    orders, orderItems      (checkout, seed)
//! CartRepository     cartItems               (add to cart)
//! ```
//!
//! Each repository holds an `Arc<dyn ItemStore>`, so the same code runs
//! against the REST backend, the local store, or a test double.

pub mod cart;
pub mod order;
pub mod product;
