//! # Seed Data Generator
//!
//! Populates a development database with a small reseller program.
//!
//! ## Usage
//! ```bash
//! # Seed ./sedekat_dev.db with 40 orders (default)
//! cargo run -p sedekat-db --bin seed
//!
//! # Custom amount and path
//! cargo run -p sedekat-db --bin seed -- --orders 200 --db ./data/sedekat.db
//! ```
//!
//! ## Generated Data
//! - Products with commission and points values
//! - Three resellers with catalog tokens, one deactivated after taking orders
//! - Orders spread over the last 60 days, most of them completed
//! - A price and commission change after those orders, one product taken off
//!   sale and one deleted, so the dashboards show snapshots diverging from the
//!   catalog
//! - Commission and points rewards
//! - One approved and one pending redemption

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::env;
use uuid::Uuid;

use sedekat_core::checkout::{DraftLine, OrderBuilder, OrderDraft};
use sedekat_core::money::Money;
use sedekat_core::{
    DeliveryMethod, OrderStatus, Product, Reseller, RewardCatalogEntry, RewardType,
};
use sedekat_db::{Database, DbConfig};

/// (name, price in rupiah, commission per unit in rupiah, points per unit)
const PRODUCTS: &[(&str, i64, Option<i64>, Option<i64>)] = &[
    ("Kopi Bubuk 250g", 35_000, Some(3_500), Some(2)),
    ("Teh Celup Melati", 12_000, Some(1_000), Some(1)),
    ("Gula Aren Cair", 28_000, Some(2_500), None),
    ("Keripik Singkong Balado", 15_000, None, Some(1)),
    ("Sambal Bawang Botol", 22_000, Some(2_000), Some(1)),
    ("Madu Hutan 500ml", 95_000, Some(10_000), Some(5)),
];

/// (id, name, token)
const RESELLERS: &[(&str, &str, &str)] = &[
    ("mitra-sari", "Sari Wulandari", "sari-01"),
    ("mitra-budi", "Budi Hartono", "budi-02"),
    ("mitra-dewi", "Dewi Lestari", "dewi-03"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut order_count: usize = 40;
    let mut db_path = String::from("./sedekat_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--orders" | "-o" => {
                if i + 1 < args.len() {
                    order_count = args[i + 1].parse().unwrap_or(40);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("SEDEKAT Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -o, --orders <N>   Number of orders to generate (default: 40)");
                println!("  -d, --db <PATH>    Database file path (default: ./sedekat_dev.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 SEDEKAT Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!("Orders:   {}", order_count);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let now = Utc::now();

    // Products
    let mut catalog: HashMap<String, Product> = HashMap::new();
    for (idx, (name, price, commission, points)) in PRODUCTS.iter().enumerate() {
        let product = Product {
            id: format!("prod-{:03}", idx + 1),
            name: name.to_string(),
            price_sen: Money::from_rupiah(*price).sen(),
            commission_value_sen: commission.map(|c| Money::from_rupiah(c).sen()),
            points_value: *points,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await?;
        catalog.insert(product.id.clone(), product);
    }
    println!("✓ Inserted {} products", catalog.len());

    // Resellers
    for (id, name, token) in RESELLERS {
        db.resellers()
            .insert(&Reseller {
                id: id.to_string(),
                name: name.to_string(),
                phone: "081234567890".to_string(),
                address: Some("Yogyakarta".to_string()),
                branch_id: Some("cabang-jogja".to_string()),
                commission_rate_bps: 1_000,
                is_active: true,
                catalog_token: token.to_string(),
                created_at: now - Duration::days(90),
            })
            .await?;
    }
    println!("✓ Inserted {} resellers", RESELLERS.len());

    // Orders
    let product_ids: Vec<String> = {
        let mut ids: Vec<String> = catalog.keys().cloned().collect();
        ids.sort();
        ids
    };
    let mut completed = 0;
    for n in 0..order_count {
        let token = match n % 5 {
            0 | 1 => Some(RESELLERS[0].2.to_string()),
            2 => Some(RESELLERS[1].2.to_string()),
            3 => Some(RESELLERS[2].2.to_string()),
            _ => None,
        };
        let draft = OrderDraft {
            customer_name: format!("Pelanggan {}", n + 1),
            customer_phone: format!("0813{:08}", n),
            catalog_token: token,
            delivery_method: if n % 3 == 0 {
                DeliveryMethod::Delivery
            } else {
                DeliveryMethod::Pickup
            },
            lines: vec![
                DraftLine {
                    product_id: product_ids[n % product_ids.len()].clone(),
                    quantity: (n % 3) as i64 + 1,
                },
                DraftLine {
                    product_id: product_ids[(n * 7 + 1) % product_ids.len()].clone(),
                    quantity: 1,
                },
            ],
        };

        let placed_at = now - Duration::days((n % 60) as i64);
        let order = OrderBuilder::new(draft).build(&catalog, placed_at)?;
        db.orders().create_order(&order).await?;

        if n % 7 != 6 {
            db.orders()
                .update_status_if(&order.order.id, OrderStatus::Pending, OrderStatus::Completed)
                .await?;
            completed += 1;
        }
    }
    println!("✓ Inserted {} orders ({} completed)", order_count, completed);

    // Catalog changes after the fact. Placed orders keep their snapshots.
    let (_, price, commission, points) = PRODUCTS[0];
    db.products()
        .update_pricing(
            "prod-001",
            Money::from_rupiah(price + 5_000).sen(),
            commission.map(|c| Money::from_rupiah(c + 1_500).sen()),
            points,
        )
        .await?;
    let retired = format!("prod-{:03}", PRODUCTS.len() - 1);
    db.products().set_active(&retired, false).await?;
    let deleted = format!("prod-{:03}", PRODUCTS.len());
    db.products().delete(&deleted).await?;
    println!("✓ Repriced prod-001, took {} off sale, deleted {}", retired, deleted);

    // Dewi leaves the program; her orders stop counting as hers.
    db.resellers().set_active(RESELLERS[2].0, false).await?;
    println!("✓ Deactivated {}", RESELLERS[2].0);

    // Rewards
    let rewards = [
        ("Voucher Belanja Rp10.000", RewardType::Commission, Money::from_rupiah(10_000).sen()),
        ("Pulsa Rp25.000", RewardType::Commission, Money::from_rupiah(25_000).sen()),
        ("Tumbler SEDEKAT", RewardType::Points, 20),
        ("Kaos Mitra", RewardType::Points, 50),
    ];
    let mut first_reward = None;
    for (name, reward_type, cost) in rewards {
        let entry = RewardCatalogEntry {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            reward_type,
            cost,
            is_active: true,
        };
        db.rewards().insert(&entry).await?;
        first_reward.get_or_insert(entry);
    }
    println!("✓ Inserted {} rewards", rewards.len());

    // Redemptions
    if let Some(voucher) = first_reward {
        let approved = db
            .redemptions()
            .insert_pending(RESELLERS[0].0, &voucher, now - Duration::days(3))
            .await?;
        db.redemptions().approve(&approved.id, now).await?;
        db.redemptions()
            .insert_pending(RESELLERS[0].0, &voucher, now)
            .await?;
        println!("✓ Inserted 2 redemptions (1 approved, 1 pending)");
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
