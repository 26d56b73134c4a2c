//! # Storefront Demo Entry Point
//!
//! Walks one session through the order-state workflow against the
//! configured item store.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (defaults → storefront.toml → STOREFRONT_* env)
//! 3. Open the item store (REST or local SQLite)
//! 4. Seed the demo catalog if a local store is empty
//! 5. Restore the stored cart
//! 6. Product page: quantity, add to cart, buy now
//! 7. Checkout the buy-now order, then stored order 1
//!
//! ## Usage
//! ```bash
//! cargo run -p storefront
//! cargo run -p storefront -- --config ./storefront.toml
//! STOREFRONT_DB_PATH=./demo.db cargo run -p storefront
//! ```

use std::env;
use std::path::PathBuf;

use storefront::{init_tracing, AppConfig, AppContext, Backend, CheckoutPage, ProductPage};
use storefront_core::checkout::amount_label;
use storefront_store::seed::READY_ORDER_ID;
use storefront_store::seed_demo;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let mut config_path: Option<PathBuf> = None;
    let args: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                if i + 1 < args.len() {
                    config_path = Some(PathBuf::from(&args[i + 1]));
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: storefront [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --config <PATH>    Config file (default: platform config dir)");
                println!("  -h, --help             Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    let config = AppConfig::load(config_path)?;
    let ctx = AppContext::connect(config).await?;

    if ctx.config.store.backend == Backend::Sqlite
        && ctx.store.products().list(Some(1)).await?.is_empty()
    {
        let summary = seed_demo(ctx.store.inner()).await?;
        println!("Seeded {} products", summary.products);
    }

    let catalog = ctx.config.catalog.clone();
    let cart = ctx.cart.load().await?;
    println!(
        "Cart {} holds {} units ({})",
        cart.cart_id,
        cart.total_units,
        catalog.format_price(cart.total_price)
    );

    // Product page
    let mut page = ProductPage::open(&ctx, 1).await;
    if let (Some(product), Some(price)) = (page.product().loaded(), page.price_label()) {
        println!("{} ({})", product.name, price);
    }
    page.increment()?;
    let quantity = page.increment()?;
    println!(
        "Quantity {} of {}, subtotal {}",
        quantity.amount, quantity.max_order, quantity.sub_total_label
    );

    match page.add_to_cart().await {
        Ok(outcome) => {
            let cart = ctx.cart.summary();
            println!(
                "Add to cart: {:?}, cart holds {} units ({})",
                outcome,
                cart.total_units,
                catalog.format_price(cart.total_price)
            );
        }
        Err(err) => println!("Add to cart refused: {}", err),
    }

    let order = page.buy_now()?;
    println!(
        "Buy now: {} in progress, total {}",
        amount_label(order.total_amounts as i64),
        catalog.format_price(order.total_price)
    );

    if let Some(related) = page.related_settled().await.loaded() {
        println!("Related: {} products", related.len());
    }
    drop(page);

    // Checkout of the order-in-progress
    let mut checkout = CheckoutPage::from_draft(&ctx, order);
    println!("Checkout (buy now): {}", checkout.phase());
    submit_demo_form(&mut checkout, "Jl. Asia Afrika No. 8, Bandung").await?;

    // Checkout of a stored order
    let mut checkout = CheckoutPage::open(&ctx, Some(READY_ORDER_ID)).await;
    println!("Checkout {}: {}", READY_ORDER_ID, checkout.phase());
    submit_demo_form(&mut checkout, "Jl. Jend. Sudirman No. 1, Jakarta").await?;
    println!("{}", serde_json::to_string_pretty(&checkout.view())?);

    Ok(())
}

async fn submit_demo_form(
    checkout: &mut CheckoutPage,
    address: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if !checkout.phase().accepts_submit() {
        return Ok(());
    }
    let form = checkout.form_mut()?;
    form.address = address.to_string();
    form.phone = "081234567890".to_string();
    form.shipping = "regular".to_string();
    form.payment = "cash-on-delivery".to_string();

    match checkout.submit().await {
        Ok(saved) => println!("Order {} submitted ({:?})", saved.id, saved.status),
        Err(err) => println!("Checkout failed: {}", err),
    }
    Ok(())
}
