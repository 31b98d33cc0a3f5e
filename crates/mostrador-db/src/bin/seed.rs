//! # Seed Data Generator
//!
//! Populates a development database with a colmado-style catalog.
//!
//! ## Usage
//! ```bash
//! # Seed the default catalog
//! cargo run -p mostrador-db --bin seed
//!
//! # Specify database path
//! cargo run -p mostrador-db --bin seed -- --db ./data/mostrador.db
//!
//! # Also ring a few paid sales for today so the register screen has data
//! cargo run -p mostrador-db --bin seed -- --demo-sales
//! ```
//!
//! Staples (rice, beans, eggs, milk) are ITBIS-exempt; everything else
//! carries 18%. Stock is 0-100 per product.

use chrono::Utc;
use mostrador_core::{
    BusinessClock, NewProduct, NewSale, NewSaleLine, PaymentMethod, Product, FREE_SALE_PRODUCT_ID,
};
use mostrador_db::{Database, DbConfig};
use std::env;

/// (SKU prefix, exempt from ITBIS, products as (name, price in pesos))
const CATEGORIES: &[(&str, bool, &[(&str, i64)])] = &[
    (
        "BEB",
        false,
        &[
            ("Refresco Rojo 2L", 95),
            ("Country Club Merengue 20oz", 45),
            ("Agua Planeta Azul 20oz", 25),
            ("Jugo Rica Naranja 1L", 110),
            ("Malta Morena 12oz", 60),
            ("Cerveza Presidente Grande", 200),
            ("Ron Brugal Extra Viejo 700ml", 725),
            ("Café Santo Domingo 1lb", 330),
        ],
    ),
    (
        "ABA",
        true,
        &[
            ("Arroz Campos 5lb", 210),
            ("Habichuelas Rojas 1lb", 95),
            ("Huevos (cartón 30)", 300),
            ("Leche Rica Entera 1L", 85),
            ("Harina de Maíz 1lb", 55),
            ("Plátanos (unidad)", 20),
            ("Azúcar Crema 2lb", 75),
            ("Sal Marina 1lb", 25),
        ],
    ),
    (
        "DUL",
        false,
        &[
            ("Galletas Club Social", 35),
            ("Chocolate Embajador", 40),
            ("Dulce de Leche Cortado", 50),
            ("Palomitas Pop Kornitos", 30),
            ("Cacao en Polvo 250g", 140),
        ],
    ),
    (
        "LIM",
        false,
        &[
            ("Jabón de Cuaba", 45),
            ("Detergente Ace 500g", 95),
            ("Cloro Mistolín 1gal", 150),
            ("Papel Higiénico 4 rollos", 120),
            ("Suavizante 1L", 115),
        ],
    ),
    (
        "PRE",
        false,
        &[
            ("Recarga Claro RD$100", 100),
            ("Recarga Altice RD$100", 100),
            ("Gas Propano (libra)", 148),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./mostrador_dev.db");
    let mut demo_sales = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--demo-sales" => demo_sales = true,
            "--help" | "-h" => {
                println!("Mostrador POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./mostrador_dev.db)");
                println!("      --demo-sales   Ring sample paid sales for today");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Mostrador POS Seed Data Generator");
    println!("===================================");
    println!("Database: {}", db_path);
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

    println!();
    println!("Inserting catalog...");

    let start = std::time::Instant::now();
    let now = Utc::now();
    let mut inserted = Vec::new();

    for (category_idx, (prefix, exempt, products)) in CATEGORIES.iter().enumerate() {
        for (product_idx, (name, pesos)) in products.iter().enumerate() {
            let seed = category_idx * 100 + product_idx;
            let product = new_product(prefix, *exempt, name, *pesos, seed);

            match db.products().insert(&product, now).await {
                Ok(product) => inserted.push(product),
                Err(e) => eprintln!("Failed to insert {}: {}", product.sku, e),
            }
        }
    }

    println!("✓ Inserted {} products in {:?}", inserted.len(), start.elapsed());

    println!();
    println!("Verifying search...");
    let results = db.products().search("arroz", 10).await?;
    println!("  Search 'arroz': {} results", results.len());
    let results = db.products().search("BEB", 10).await?;
    println!("  Search 'BEB': {} results", results.len());
    if let Some(first) = inserted.first() {
        let found = db.products().get_by_sku(&first.sku).await?.is_some();
        println!("  Lookup SKU {}: {}", first.sku, if found { "found" } else { "missing" });
    }

    if demo_sales {
        println!();
        println!("Ringing demo sales...");
        let rung = ring_demo_sales(&db, &inserted).await?;
        println!("✓ Rang {} paid sales", rung);
    }

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

fn new_product(prefix: &str, exempt: bool, name: &str, pesos: i64, seed: usize) -> NewProduct {
    // Recharges and gas are sold by amount, never out of stock
    let tracked = prefix != "PRE";

    NewProduct {
        sku: format!("{}-{:03}", prefix, seed),
        // EAN-13 shape with the Dominican prefix, checksum not computed
        barcode: Some(format!("746{:010}", seed)),
        name: name.to_string(),
        price_cents: pesos * 100,
        tax_rate_bps: if exempt { 0 } else { 1800 },
        track_inventory: tracked,
        allow_negative_stock: false,
        initial_stock: tracked.then(|| (seed % 101) as i64),
    }
}

/// Rings one sale per payment method plus a free sale, all for today.
async fn ring_demo_sales(
    db: &Database,
    products: &[Product],
) -> Result<usize, Box<dyn std::error::Error>> {
    let clock = BusinessClock::default();
    let methods = [
        PaymentMethod::Cash,
        PaymentMethod::Card,
        PaymentMethod::Transfer,
        PaymentMethod::Other("paypal".to_string()),
    ];

    let in_stock: Vec<&Product> = products
        .iter()
        .filter(|p| !p.track_inventory || p.current_stock.unwrap_or(0) > 0)
        .collect();

    let mut rung = 0;
    for (idx, method) in methods.into_iter().enumerate() {
        let Some(product) = in_stock.get(idx * 3) else {
            break;
        };
        let sale = NewSale {
            seller_id: "seed".to_string(),
            payment_method: method,
            status: None,
            discount_cents: 0,
            customer_info: None,
            notes: Some("demo".to_string()),
            lines: vec![NewSaleLine {
                product_id: product.id.clone(),
                quantity: 1,
                unit_price_cents: None,
            }],
        };
        let created = db.sales().create(&sale, &clock, Utc::now()).await?;
        println!("  {} {}", created.sale.invoice_number, created.sale.total_cents);
        rung += 1;
    }

    let free_sale = NewSale {
        seller_id: "seed".to_string(),
        payment_method: PaymentMethod::Cash,
        status: None,
        discount_cents: 0,
        customer_info: None,
        notes: Some("demo venta libre".to_string()),
        lines: vec![NewSaleLine {
            product_id: FREE_SALE_PRODUCT_ID.to_string(),
            quantity: 1,
            unit_price_cents: Some(75_000),
        }],
    };
    let created = db.sales().create(&free_sale, &clock, Utc::now()).await?;
    println!("  {} {}", created.sale.invoice_number, created.sale.total_cents);

    Ok(rung + 1)
}
