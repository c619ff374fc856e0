//! Seed data script - populates the database with a small jewellery catalog
//!
//! Run with: cargo run --bin seed-data
//!
//! This creates:
//! - one active GST setting
//! - making-cost percentages for 22K Gold, 18K Gold and Silver
//! - 6 products, priced from weight, metal rate and the making-cost table

use chrono::Utc;
use clap::Parser;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::info;

use storefront_api::{
    db::{establish_connection, run_migrations},
    entities::{gst_setting, making_cost, product},
    services::pricing::{catalog_unit_price, making_charge},
};

#[derive(Parser, Debug)]
#[command(name = "seed-data", about = "Seed the storefront database with demo catalog data")]
struct Args {
    /// Database URL; falls back to DATABASE_URL, then a local SQLite file
    #[arg(long)]
    database_url: Option<String>,

    /// GST percentage stored as the active setting
    #[arg(long, default_value_t = 3.0)]
    gst_percentage: f64,
}

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    weight: f64,
    metal_type: &'static str,
    metal_rate: f64,
    fixed_price: f64,
}

const MAKING_COSTS: &[(&str, f64)] = &[("22K Gold", 12.0), ("18K Gold", 14.0), ("Silver", 8.0)];

const PRODUCTS: &[SeedProduct] = &[
    SeedProduct {
        name: "Temple Necklace",
        description: "Hand-finished temple work necklace",
        category: "Necklaces",
        weight: 42.5,
        metal_type: "22K Gold",
        metal_rate: 6_850.0,
        fixed_price: 0.0,
    },
    SeedProduct {
        name: "Classic Bangle Pair",
        description: "Plain polished bangles, sold as a pair",
        category: "Bangles",
        weight: 24.0,
        metal_type: "22K Gold",
        metal_rate: 6_850.0,
        fixed_price: 0.0,
    },
    SeedProduct {
        name: "Solitaire Ring",
        description: "Four-prong solitaire setting",
        category: "Rings",
        weight: 3.2,
        metal_type: "18K Gold",
        metal_rate: 5_600.0,
        fixed_price: 0.0,
    },
    SeedProduct {
        name: "Jhumka Earrings",
        description: "Bell-shaped drop earrings",
        category: "Earrings",
        weight: 8.75,
        metal_type: "22K Gold",
        metal_rate: 6_850.0,
        fixed_price: 0.0,
    },
    SeedProduct {
        name: "Anklet Chain",
        description: "Silver anklet with ghungroo",
        category: "Anklets",
        weight: 35.0,
        metal_type: "Silver",
        metal_rate: 92.0,
        fixed_price: 0.0,
    },
    SeedProduct {
        name: "Gift Box",
        description: "Velvet presentation box",
        category: "Accessories",
        weight: 0.0,
        metal_type: "None",
        metal_rate: 0.0,
        fixed_price: 450.0,
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let args = Args::parse();

    info!("=== Storefront Seed Data ===");

    let database_url = args
        .database_url
        .or_else(|| std::env::var("DATABASE_URL").ok())
        .unwrap_or_else(|| "sqlite://storefront.db?mode=rwc".to_string());

    info!("Connecting to database: {}", database_url);
    let db = establish_connection(&database_url).await?;
    run_migrations(&db).await?;

    info!("Creating GST setting...");
    create_gst_setting(&db, args.gst_percentage).await?;

    info!("Creating making costs...");
    let table = create_making_costs(&db).await?;
    info!("  Created {} making-cost rows", table.len());

    info!("Creating products...");
    let products = create_products(&db, &table).await?;
    for p in &products {
        info!("  #{} {} -> {:.2}", p.id, p.name, p.price);
    }

    info!("=== Seed Data Complete ===");
    info!("Try: curl http://localhost:8080/api/v1/products/1/price");

    Ok(())
}

async fn create_gst_setting(
    db: &DatabaseConnection,
    percentage: f64,
) -> anyhow::Result<gst_setting::Model> {
    let now = Utc::now();
    let setting = gst_setting::ActiveModel {
        percentage: Set(percentage),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    Ok(setting.insert(db).await?)
}

async fn create_making_costs(db: &DatabaseConnection) -> anyhow::Result<Vec<making_cost::Model>> {
    let now = Utc::now();
    let mut table = Vec::with_capacity(MAKING_COSTS.len());
    for (metal_type, percentage) in MAKING_COSTS {
        let row = making_cost::ActiveModel {
            metal_type: Set((*metal_type).to_string()),
            percentage: Set(*percentage),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        table.push(row.insert(db).await?);
    }
    Ok(table)
}

async fn create_products(
    db: &DatabaseConnection,
    table: &[making_cost::Model],
) -> anyhow::Result<Vec<product::Model>> {
    let now = Utc::now();
    let mut created = Vec::with_capacity(PRODUCTS.len());

    for seed in PRODUCTS {
        let quote = making_charge(seed.weight, seed.metal_type, seed.metal_rate, table);
        // Orders charge this stored price as is
        let draft = product::Model {
            id: 0,
            name: seed.name.to_string(),
            description: Some(seed.description.to_string()),
            category: Some(seed.category.to_string()),
            weight: seed.weight,
            metal_type: seed.metal_type.to_string(),
            metal_rate: seed.metal_rate,
            making_charge: quote.making_charge,
            price: seed.fixed_price,
            image_url: None,
            in_stock: true,
            created_at: now,
            updated_at: now,
        };
        let price = catalog_unit_price(&draft, table);

        let active = product::ActiveModel {
            name: Set(draft.name),
            description: Set(draft.description),
            category: Set(draft.category),
            weight: Set(draft.weight),
            metal_type: Set(draft.metal_type),
            metal_rate: Set(draft.metal_rate),
            making_charge: Set(draft.making_charge),
            price: Set(price),
            image_url: Set(None),
            in_stock: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        created.push(active.insert(db).await?);
    }

    Ok(created)
}
