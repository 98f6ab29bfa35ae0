//! # Seed Data Generator
//!
//! Populates an empty database with the demo catalog.
//!
//! ## Usage
//! ```bash
//! cargo run -p gestpro-db --bin seed
//!
//! # Specify database path
//! cargo run -p gestpro-db --bin seed -- --db ./data/gestpro.db
//!
//! # Also ring up a few demo sales
//! cargo run -p gestpro-db --bin seed -- --sales 20
//! ```
//!
//! Suppliers get fresh ids on insert; products are linked to them through
//! the demo keys (`s1`..`s3`) below.

use std::collections::HashMap;
use std::env;

use gestpro_core::settlement::new_transaction_id;
use gestpro_core::{CartItem, CommitRequest, Product, StoreSettings, StoreStatus, Supplier};
use gestpro_db::{Database, DbConfig, DEFAULT_COMMIT_ATTEMPTS};

/// (key, name, contact, email, phone)
const SUPPLIERS: &[(&str, &str, &str, &str, &str)] = &[
    ("s1", "TechGlobal Inc.", "John Smith", "contact@techglobal.com", "+1 555 0123"),
    ("s2", "Office Comfort Ltd.", "Sarah Connor", "sales@officecomfort.com", "+1 555 0987"),
    ("s3", "Home Essentials", "Mike Ross", "mike@homeessentials.com", "+1 555 4567"),
];

struct DemoProduct {
    name: &'static str,
    category: &'static str,
    price_cents: i64,
    purchase_cents: i64,
    stock: i64,
    sku: &'static str,
    description: &'static str,
    image: u32,
    supplier: &'static str,
}

const PRODUCTS: &[DemoProduct] = &[
    DemoProduct {
        name: "Premium Headphones",
        category: "Electronics",
        price_cents: 19999,
        purchase_cents: 12000,
        stock: 45,
        sku: "EL-001",
        description: "High fidelity noise cancelling headphones with 20h battery life.",
        image: 1,
        supplier: "s1",
    },
    DemoProduct {
        name: "Wireless Mouse",
        category: "Accessories",
        price_cents: 4999,
        purchase_cents: 2500,
        stock: 120,
        sku: "AC-002",
        description: "Ergonomic wireless mouse.",
        image: 2,
        supplier: "s1",
    },
    DemoProduct {
        name: "Mechanical Keyboard",
        category: "Electronics",
        price_cents: 12950,
        purchase_cents: 8000,
        stock: 8,
        sku: "EL-003",
        description: "RGB mechanical keyboard with blue switches.",
        image: 3,
        supplier: "s1",
    },
    DemoProduct {
        name: "Coffee Maker",
        category: "Home",
        price_cents: 8999,
        purchase_cents: 5500,
        stock: 15,
        sku: "HM-004",
        description: "Programmable coffee maker.",
        image: 4,
        supplier: "s3",
    },
    DemoProduct {
        name: "Office Chair",
        category: "Furniture",
        price_cents: 25000,
        purchase_cents: 15000,
        stock: 3,
        sku: "FR-005",
        description: "Ergonomic mesh office chair.",
        image: 5,
        supplier: "s2",
    },
    DemoProduct {
        name: "Smartphone Stand",
        category: "Accessories",
        price_cents: 1599,
        purchase_cents: 500,
        stock: 200,
        sku: "AC-006",
        description: "Aluminum phone stand.",
        image: 6,
        supplier: "s1",
    },
];

/// Cashier the demo sales are booked under.
const DEMO_CASHIER: &str = "u2";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./gestpro_dev.db");
    let mut sales: usize = 0;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--sales" | "-s" => {
                if i + 1 < args.len() {
                    sales = args[i + 1].parse().unwrap_or(0);
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("GestPro Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./gestpro_dev.db)");
                println!("  -s, --sales <N>    Demo sales to commit after seeding (default: 0)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 GestPro Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Run `gestpro-admin wipe --yes` or delete the file to regenerate.");
        return Ok(());
    }

    if db.settings().status().await? == StoreStatus::NeedsInitialization {
        db.settings().upsert(&StoreSettings::default()).await?;
        println!("✓ Store settings initialized");
    }

    let mut supplier_ids = HashMap::new();
    for (key, name, contact, email, phone) in SUPPLIERS {
        let stored = db
            .suppliers()
            .insert(&Supplier {
                id: String::new(),
                name: name.to_string(),
                contact_name: Some(contact.to_string()),
                email: Some(email.to_string()),
                phone: Some(phone.to_string()),
            })
            .await?;
        supplier_ids.insert(*key, stored.id);
    }
    println!("✓ Inserted {} suppliers", supplier_ids.len());

    let mut catalog = Vec::with_capacity(PRODUCTS.len());
    for demo in PRODUCTS {
        let product = Product {
            id: String::new(),
            name: demo.name.to_string(),
            category: demo.category.to_string(),
            selling_price_cents: demo.price_cents,
            purchase_price_cents: demo.purchase_cents,
            stock: demo.stock,
            sku: demo.sku.to_string(),
            supplier_id: supplier_ids.get(demo.supplier).cloned(),
            description: Some(demo.description.to_string()),
            image_url: Some(format!("https://picsum.photos/id/{}/300/300", demo.image)),
        };
        match db.products().insert(&product).await {
            Ok(stored) => catalog.push(stored),
            Err(e) => eprintln!("Failed to insert {}: {}", product.sku, e),
        }
    }
    println!("✓ Inserted {} products", catalog.len());

    if sales > 0 && catalog.len() >= 2 {
        let engine = db.settlement(DEFAULT_COMMIT_ATTEMPTS);
        let mut committed = 0;
        for _ in 0..sales {
            let items = vec![
                CartItem {
                    product: catalog[0].clone(),
                    quantity: 1,
                },
                CartItem {
                    product: catalog[1].clone(),
                    quantity: 2,
                },
            ];
            let request = CommitRequest::new(new_transaction_id(), DEMO_CASHIER, items)?;
            match engine.commit(&request).await {
                Ok(_) => committed += 1,
                Err(e) => {
                    eprintln!("Stopped demo sales: {}", e);
                    break;
                }
            }
        }
        println!("✓ Committed {} demo sales", committed);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}
