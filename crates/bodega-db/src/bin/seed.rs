//! Seeds a database with demo data for manual testing.
//!
//! ```text
//! cargo run --bin seed -- [path/to/bodega.db]
//! ```
//!
//! Defaults to `./bodega.db`. Every run generates fresh UUIDs, so
//! re-running simply adds another batch of demo rows.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use bodega_core::{Cart, Customer, PaymentMethod, Product, Supplier};
use bodega_db::{Database, DbConfig, DbResult};

fn demo_product(
    name: &str,
    category: &str,
    purchase_cents: i64,
    sale_cents: i64,
    stock: i64,
    min_stock: i64,
    favorite: bool,
) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4().to_string(),
        barcode: None,
        name: name.to_string(),
        description: None,
        purchase_price_cents: purchase_cents,
        sale_price_cents: sale_cents,
        stock,
        min_stock,
        category: Some(category.to_string()),
        unit: "pieza".to_string(),
        is_active: true,
        is_favorite: favorite,
        created_at: now,
        updated_at: now,
    }
}

fn demo_customer(name: &str, phone: &str, credit_limit_cents: i64) -> Customer {
    let now = Utc::now();
    Customer {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        phone: Some(phone.to_string()),
        address: None,
        credit_limit_cents,
        current_debt_cents: 0,
        notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./bodega.db".to_string());

    info!(path = %path, "Seeding demo database");

    let db = Database::new(DbConfig::new(&path)).await?;

    let products = vec![
        demo_product("Coca-Cola 600ml", "Bebidas", 1200, 1800, 48, 12, true),
        demo_product("Sabritas Original", "Botanas", 900, 1400, 30, 10, true),
        demo_product("Leche Entera 1L", "Lacteos", 2100, 2800, 24, 8, true),
        demo_product("Pan Blanco", "Panaderia", 2800, 4000, 10, 4, false),
        demo_product("Huevo 12pz", "Abarrotes", 3200, 4500, 15, 5, true),
        demo_product("Azucar 1kg", "Abarrotes", 2200, 3000, 3, 5, false),
        demo_product("Jabon de Barra", "Limpieza", 1100, 1700, 20, 6, false),
    ];
    for product in &products {
        db.products().insert(product).await?;
    }
    info!(count = products.len(), "Products seeded");

    let mari = demo_customer("Doña Mari", "555-0101", 100000);
    let pepe = demo_customer("Don Pepe", "555-0102", 0);
    db.customers().insert(&mari).await?;
    db.customers().insert(&pepe).await?;
    info!("Customers seeded");

    let now = Utc::now();
    let supplier = Supplier {
        id: Uuid::new_v4().to_string(),
        name: "Abarrotera del Norte".to_string(),
        contact_person: Some("Ing. Laura Soto".to_string()),
        phone: Some("555-0200".to_string()),
        email: Some("ventas@abarroteranorte.example".to_string()),
        address: None,
        products_supplied: Some("Abarrotes y botanas".to_string()),
        notes: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.suppliers().insert(&supplier).await?;
    info!("Supplier seeded");

    // A cash sale and a fiado sale so the dashboard has something to show.
    let mut cart = Cart::new();
    cart.add_item(&products[0], 2).map_err(bodega_db::DbError::from)?;
    cart.add_item(&products[1], 1).map_err(bodega_db::DbError::from)?;
    db.sales()
        .checkout(&cart, PaymentMethod::Efectivo, None, None)
        .await?;

    let mut fiado_cart = Cart::new();
    fiado_cart
        .add_item(&products[2], 2)
        .map_err(bodega_db::DbError::from)?;
    db.sales()
        .checkout(&fiado_cart, PaymentMethod::Fiado, Some(&mari.id), None)
        .await?;
    info!("Demo sales recorded");

    // Flag the low-stock item on the shopping list.
    for product in db.products().list_low_stock().await? {
        db.shopping().suggest_restock(&product).await?;
    }
    info!("Restock suggestions added");

    db.close().await;
    info!("Seed complete");
    Ok(())
}
