//! # Demo Catalog
//!
//! A small catalog and two orders, used by the `seed` binary, the demo
//! walkthrough and page tests.
//!
//! ## Generated Records
//! - 2 categories
//! - 8 products (product 1: minOrder 2, stock 3 + 5, price 10.000;
//!   product 8: minOrder 2, no stock)
//! - order 1: two line items, ready for checkout
//! - order 2: no line items (renders the empty checkout)

use std::sync::Arc;
use tracing::info;

use storefront_core::{Category, Money, Order, OrderStatus, Product, Stock, DEFAULT_USER_ID};

use crate::client::ItemStore;
use crate::error::StoreResult;
use crate::repository::order::{NewOrderItem, OrderRepository};
use crate::repository::product::ProductRepository;

/// (name, brand, price, minOrder, stock per location, categoryId)
const PRODUCTS: &[(&str, &str, i64, i64, &[i64], i64)] = &[
    ("Timemore Black Mirror Scale", "Timemore", 10_000, 2, &[3, 5], 1),
    ("Hario V60 Dripper 02", "Hario", 85_000, 1, &[12, 4], 2),
    ("Kalita Wave 185 Filter", "Kalita", 45_000, 3, &[40], 1),
    ("Fellow Stagg EKG Kettle", "Fellow", 2_350_000, 1, &[2, 1], 2),
    ("Comandante C40 Grinder", "Comandante", 4_100_000, 1, &[1], 2),
    ("AeroPress Original", "AeroPress", 650_000, 1, &[6, 6], 2),
    ("Hario Range Server 600ml", "Hario", 210_000, 1, &[0, 9], 1),
    ("Chemex Bonded Filters", "Chemex", 175_000, 2, &[0], 1),
];

const CATEGORIES: &[(i64, &str)] = &[(1, "Coffee Tools"), (2, "Brewers")];

const LOCATIONS: &[&str] = &["Jakarta", "Bandung"];

/// Order with line items.
pub const READY_ORDER_ID: i64 = 1;

/// Order with `totalAmounts == 0`.
pub const EMPTY_ORDER_ID: i64 = 2;

/// What [`seed_demo`] wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub categories: usize,
    pub products: usize,
    pub order_items: usize,
    pub ready_total: Money,
}

/// Writes the demo catalog and orders into an empty store.
pub async fn seed_demo(store: Arc<dyn ItemStore>) -> StoreResult<SeedSummary> {
    let products = ProductRepository::new(store.clone());
    let orders = OrderRepository::new(store);

    for (id, name) in CATEGORIES {
        products
            .insert_category(&Category {
                id: *id,
                name: name.to_string(),
            })
            .await?;
    }

    let mut catalog = Vec::with_capacity(PRODUCTS.len());
    for (index, row) in PRODUCTS.iter().enumerate() {
        let product = products.insert(&build_product(index as i64 + 1, row)).await?;
        catalog.push(product);
    }

    let lines: Vec<NewOrderItem> = catalog
        .iter()
        .take(2)
        .map(|p| NewOrderItem {
            product_id: p.id,
            amount: p.min_order,
            sub_total: p.price.multiply_quantity(p.min_order),
        })
        .collect();
    let ready_total: Money = lines.iter().map(|l| l.sub_total).sum();

    orders
        .create(&blank_order(READY_ORDER_ID, lines.len() as i64, ready_total))
        .await?;
    for line in &lines {
        orders.add_item(READY_ORDER_ID, line).await?;
    }
    orders
        .create(&blank_order(EMPTY_ORDER_ID, 0, Money::zero()))
        .await?;

    let summary = SeedSummary {
        categories: CATEGORIES.len(),
        products: catalog.len(),
        order_items: lines.len(),
        ready_total,
    };
    info!(?summary, "Demo catalog seeded");
    Ok(summary)
}

fn build_product(id: i64, row: &(&str, &str, i64, i64, &[i64], i64)) -> Product {
    let (name, brand, price, min_order, stocks, category_id) = *row;
    Product {
        id,
        name: name.to_string(),
        sku: format!("{}-{:03}", brand.to_uppercase().replace(' ', ""), id),
        brand: brand.to_string(),
        price: Money::from_minor(price),
        min_order,
        stocks: stocks
            .iter()
            .zip(LOCATIONS.iter())
            .map(|(total, location)| Stock {
                location: location.to_string(),
                total: *total,
            })
            .collect(),
        category_id: Some(category_id),
        category: None,
        images: vec![format!("https://picsum.photos/seed/product-{}/600/600", id)],
        ratings: 4.0 + (id % 10) as f64 / 10.0,
        total_reviews: id * 7,
        promos: vec![],
    }
}

fn blank_order(id: i64, total_amounts: i64, total_price: Money) -> Order {
    Order {
        id,
        user_id: DEFAULT_USER_ID,
        total_amounts,
        total_price,
        shipping: None,
        payment: None,
        address: None,
        phone: None,
        insurance: false,
        status: OrderStatus::Pending,
        created_at: None,
        updated_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::collections;
    use crate::pool::{open_local, DbConfig, SqliteItemStore};

    #[tokio::test]
    async fn test_seed_demo() {
        let sqlite = SqliteItemStore::open(DbConfig::in_memory()).await.unwrap();
        let store: Arc<dyn ItemStore> = Arc::new(crate::middleware::Timestamped::new(sqlite));

        let summary = seed_demo(store.clone()).await.unwrap();
        assert_eq!(summary.products, 8);
        assert_eq!(summary.ready_total.minor(), 20_000 + 85_000);

        let orders = OrderRepository::new(store.clone());
        assert_eq!(orders.items(READY_ORDER_ID).await.unwrap().len(), 2);
        assert!(orders.get(EMPTY_ORDER_ID).await.unwrap().is_empty());

        let scale = ProductRepository::new(store).get(1).await.unwrap();
        assert_eq!(scale.max_order(), 8);
        assert_eq!(scale.min_order, 2);
    }

    #[tokio::test]
    async fn test_seeded_records_are_counted() {
        let store = open_local(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(store);
        seed_demo(store.clone()).await.unwrap();
        assert_eq!(store.inner().count(collections::PRODUCTS).await.unwrap(), 8);
    }
}
