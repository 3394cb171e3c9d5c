//! Seed the catalog with sample products.
//!
//! Intended for development and demo environments. The command is a no-op
//! when the catalog already has rows, so it is safe to run repeatedly.

use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tracing::info;

use super::migrate::{MigrationError, database_url};

struct SeedProduct {
    name: &'static str,
    description: &'static str,
    category: &'static str,
    price: Decimal,
    image_url: &'static str,
    stock: i32,
}

fn sample_products() -> Vec<SeedProduct> {
    vec![
        SeedProduct {
            name: "Stoneware Mug",
            description: "A hand-glazed 12 oz stoneware mug that keeps coffee warm.",
            category: "Kitchen",
            price: Decimal::new(1800, 2),
            image_url: "https://images.sundry.example/stoneware-mug.jpg",
            stock: 40,
        },
        SeedProduct {
            name: "Linen Tea Towel",
            description: "Washed European linen, woven loop for hanging.",
            category: "Kitchen",
            price: Decimal::new(1250, 2),
            image_url: "https://images.sundry.example/linen-tea-towel.jpg",
            stock: 75,
        },
        SeedProduct {
            name: "Beeswax Candle",
            description: "Pure beeswax pillar candle with a 40-hour burn time.",
            category: "Home",
            price: Decimal::new(2200, 2),
            image_url: "https://images.sundry.example/beeswax-candle.jpg",
            stock: 30,
        },
        SeedProduct {
            name: "Field Notebook",
            description: "Pocket notebook with dot grid pages and a stitched spine.",
            category: "Stationery",
            price: Decimal::new(950, 2),
            image_url: "https://images.sundry.example/field-notebook.jpg",
            stock: 120,
        },
        SeedProduct {
            name: "Walnut Serving Board",
            description: "Solid walnut board, oiled and ready for the table.",
            category: "Kitchen",
            price: Decimal::new(4800, 2),
            image_url: "https://images.sundry.example/walnut-board.jpg",
            stock: 12,
        },
        SeedProduct {
            name: "Wool Throw Blanket",
            description: "Lambswool throw in a herringbone weave.",
            category: "Home",
            price: Decimal::new(9500, 2),
            image_url: "https://images.sundry.example/wool-throw.jpg",
            stock: 0,
        },
    ]
}

/// Insert sample products if the catalog is empty.
///
/// # Errors
///
/// Returns `MigrationError` if the connection or an insert fails.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let database_url = database_url()?;
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    let existing = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM shop.products")
        .fetch_one(&pool)
        .await?;

    if existing > 0 {
        info!("Catalog already has {existing} products, nothing to seed");
        return Ok(());
    }

    let products = sample_products();
    for product in &products {
        sqlx::query(
            r"
            INSERT INTO shop.products (name, description, category, price, image_url, stock)
            VALUES ($1, $2, $3, $4, $5, $6)
            ",
        )
        .bind(product.name)
        .bind(product.description)
        .bind(product.category)
        .bind(product.price)
        .bind(product.image_url)
        .bind(product.stock)
        .execute(&pool)
        .await?;
    }

    info!("Seeded {} products", products.len());
    Ok(())
}
