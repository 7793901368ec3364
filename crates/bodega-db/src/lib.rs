//! # bodega-db: Database Layer for Bodega POS
//!
//! SQLite persistence for the Bodega POS domain: connection pooling,
//! embedded migrations, and one repository per aggregate.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bodega POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  bodega-core (Pure Logic)                       │   │
//! │  │          Cart, Money, report aggregation, validation            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bodega-db (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐  ┌────────────┐  ┌─────────────────────────┐   │   │
//! │  │   │   pool   │  │ migrations │  │      repository/        │   │   │
//! │  │   │ Database │  │  embedded  │  │ product customer sale   │   │   │
//! │  │   │ DbConfig │  │    SQL     │  │ credit expense supplier │   │   │
//! │  │   └──────────┘  └────────────┘  │ shopping                │   │   │
//! │  │                                  └─────────────────────────┘   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │                          SQLite (WAL mode)                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//! ```rust,ignore
//! use bodega_db::{Database, DbConfig};
//! use bodega_core::{Cart, PaymentMethod};
//!
//! let db = Database::new(DbConfig::new("./bodega.db")).await?;
//!
//! let products = db.products().list_active().await?;
//! let mut cart = Cart::new();
//! cart.add_item(&products[0], 2)?;
//!
//! let sale = db.sales()
//!     .checkout(&cart, PaymentMethod::Efectivo, None, None)
//!     .await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::credit::CreditRepository;
pub use repository::customer::CustomerRepository;
pub use repository::expense::ExpenseRepository;
pub use repository::product::ProductRepository;
pub use repository::sale::SaleRepository;
pub use repository::shopping::ShoppingListRepository;
pub use repository::supplier::SupplierRepository;
