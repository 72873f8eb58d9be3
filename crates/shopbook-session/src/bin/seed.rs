//! # Seed Data Generator
//!
//! Populates a database with a demo shop for development: a small
//! catalog, a few recorded sales, and a credit book with ledgers.
//!
//! ## Usage
//! ```bash
//! # Seed the default database file
//! cargo run -p shopbook-session --bin seed
//!
//! # Specify database path and owner
//! cargo run -p shopbook-session --bin seed -- --db ./data/shopbook.db
//! cargo run -p shopbook-session --bin seed -- --owner my-owner-id
//! ```
//!
//! Everything goes through the real session engine, so the seeded data
//! satisfies the same invariants as live data - the run finishes by
//! verifying that no balance drifted from its ledger.

use std::env;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use shopbook_core::Money;
use shopbook_session::Session;
use shopbook_store::collections::PRODUCTS;
use shopbook_store::{StaticIdentity, Store, StoreConfig};

/// Demo catalog: (name, cost, price, qty). Prices in cents; a zero
/// price means "typed in at the counter".
const CATALOG: &[(&str, i64, i64, i64)] = &[
    ("Bag of Rice 5kg", 650_000, 780_000, 40),
    ("Bag of Rice 25kg", 3_100_000, 3_500_000, 12),
    ("Beans (Oloyin) 1kg", 120_000, 150_000, 80),
    ("Garri Ijebu 1kg", 60_000, 80_000, 100),
    ("Palm Oil 1L", 180_000, 220_000, 35),
    ("Groundnut Oil 1L", 250_000, 300_000, 30),
    ("Semovita 2kg", 280_000, 330_000, 25),
    ("Spaghetti 500g", 65_000, 85_000, 120),
    ("Tomato Paste 400g", 90_000, 110_000, 60),
    ("Sugar 1kg", 110_000, 140_000, 50),
    ("Milo 500g Tin", 290_000, 350_000, 20),
    ("Peak Milk Tin", 38_000, 50_000, 144),
    ("Bottled Water 75cl", 15_000, 25_000, 200),
    ("Soft Drink 50cl", 25_000, 40_000, 150),
    ("Detergent 900g", 140_000, 170_000, 45),
    ("Bath Soap", 45_000, 60_000, 90),
    ("Candle Pack", 50_000, 0, 30),
    ("Matches (Carton)", 95_000, 120_000, 15),
    ("Exercise Book 80lv", 35_000, 50_000, 200),
    ("Biro (Pack of 10)", 40_000, 60_000, 40),
];

/// Sales to record: (catalog index, qty, unit price in cents).
const SALES: &[(usize, i64, i64)] = &[
    (0, 2, 780_000),
    (2, 5, 150_000),
    (3, 10, 80_000),
    (4, 1, 220_000),
    (7, 12, 85_000),
    (11, 24, 50_000),
    (12, 30, 25_000),
    (13, 18, 40_000),
    (16, 4, 70_000), // counter-priced
    (18, 20, 50_000),
];

/// Credit book: (name, phone, opening balance, grants, payments).
const CREDIT_BOOK: &[(&str, &str, i64, &[(i64, &str)], &[i64])] = &[
    (
        "Mrs. Adeyemi",
        "0801-234-5678",
        50_000,
        &[(250_000, "provisions for the month"), (70_000, "soap and detergent")],
        &[150_000],
    ),
    (
        "Tunde Balogun",
        "0803-987-6543",
        0,
        &[(500_000, "building materials deposit")],
        &[200_000, 100_000],
    ),
    ("Chika's Kitchen", "0705-555-0123", 120_000, &[], &[120_000]),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,shopbook=debug,sqlx=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./shopbook_dev.db");
    let mut owner = String::from("demo-owner");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--owner" | "-o" => {
                if i + 1 < args.len() {
                    owner = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("ShopBook Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>     Database file path (default: ./shopbook_dev.db)");
                println!("  -o, --owner <ID>    Owner identity to seed (default: demo-owner)");
                println!("  -h, --help          Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 ShopBook Seed Data Generator");
    println!("===============================");
    println!("Database: {}", db_path);
    println!("Owner:    {}", owner);
    println!();

    let store = Arc::new(Store::new(StoreConfig::new(&db_path)).await?);

    println!("✓ Connected to store");
    println!("✓ Migrations applied");

    // Check existing data
    let existing = store.count(PRODUCTS, &owner).await?;
    if existing > 0 {
        println!("⚠ Owner already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let identity = StaticIdentity::new(owner);
    let mut session = Session::open(store, &identity).await?;

    // Catalog
    println!();
    println!("Seeding catalog...");
    let mut product_ids = Vec::with_capacity(CATALOG.len());
    for (name, cost, price, qty) in CATALOG {
        let product = session
            .add_product(name, Money::from_cents(*cost), Money::from_cents(*price), *qty)
            .await?;
        product_ids.push(product.id);
    }
    println!("  {} products", product_ids.len());

    // Sales
    println!("Recording sales...");
    for (index, qty, price) in SALES {
        session
            .sell(&product_ids[*index], *qty, Money::from_cents(*price))
            .await?;
    }
    println!("  {} sales", SALES.len());

    // Credit book
    println!("Writing credit book...");
    let mut entry_count = 0;
    for (name, phone, seed, grants, payments) in CREDIT_BOOK {
        let customer = session
            .add_customer(name, phone, Money::from_cents(*seed))
            .await?;
        if *seed > 0 {
            entry_count += 1;
        }

        for (amount, description) in *grants {
            session
                .grant_credit(&customer.id, Money::from_cents(*amount), description)
                .await?;
            entry_count += 1;
        }
        for amount in *payments {
            session
                .record_payment(&customer.id, Money::from_cents(*amount), "part payment")
                .await?;
            entry_count += 1;
        }
    }
    println!("  {} customers, {} ledger entries", CREDIT_BOOK.len(), entry_count);

    // Verify: every balance must equal its ledger fold
    println!();
    println!("Verifying ledger invariant...");
    let repaired = session.repair_balances().await?;
    if repaired.is_empty() {
        println!("  ✓ All balances match their ledgers");
    } else {
        println!("  ⚠ Repaired {} drifted balances (unexpected!)", repaired.len());
    }

    // Summary
    let dash = session.dashboard();
    let credit = session.credit_summary();

    println!();
    println!("✓ Seed complete!");
    println!();
    println!("Dashboard:");
    println!("  Products:        {}", dash.product_count);
    println!("  Units in stock:  {}", dash.stock_count);
    println!("  Stock value:     {}", dash.stock_sell_value);
    println!("  Stock cost:      {}", dash.stock_cost_value);
    println!("  Profit to date:  {}", dash.profit_to_date);
    println!("  Sales this week: {}", dash.sales_this_week);
    println!();
    println!("Credit book:");
    println!("  Customers:       {}", credit.customer_count);
    println!("  Outstanding:     {}", credit.total_outstanding);

    Ok(())
}
