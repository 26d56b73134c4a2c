//! # Seed Data Generator
//!
//! Populates a local item store with the demo catalog and two orders.
//!
//! ## Usage
//! ```bash
//! # Seed ./storefront_dev.db
//! cargo run -p storefront-store --bin seed
//!
//! # Specify database path
//! cargo run -p storefront-store --bin seed -- --db ./data/storefront.db
//! ```

use std::env;
use std::sync::Arc;
use storefront_store::path::collections;
use storefront_store::{seed_demo, DbConfig, ItemStore, SqliteItemStore, Timestamped};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./storefront_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Storefront Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let sqlite = SqliteItemStore::open(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = sqlite.count(collections::PRODUCTS).await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let store = Arc::new(Timestamped::new(sqlite));
    let summary = seed_demo(store.clone() as Arc<dyn ItemStore>).await?;
    store.inner().close().await;

    println!("✓ Inserted {} categories", summary.categories);
    println!("✓ Inserted {} products", summary.products);
    println!(
        "✓ Order 1: {} items, total {}",
        summary.order_items, summary.ready_total
    );
    println!("✓ Order 2: empty");
    println!();
    println!("✓ Seed complete!");

    Ok(())
}
