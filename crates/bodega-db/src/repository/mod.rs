//! # Repository Layer
//!
//! One repository per aggregate, each owning its SQL. Repositories are
//! cheap handles over the shared pool; clone them freely.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Repository Layout                                │
//! │                                                                         │
//! │  Database ──┬── products()  → ProductRepository    catalog CRUD         │
//! │             ├── customers() → CustomerRepository   fiado ledger         │
//! │             ├── sales()     → SaleRepository       checkout + history   │
//! │             ├── credit()    → CreditRepository     debt payments        │
//! │             ├── expenses()  → ExpenseRepository    expense log          │
//! │             ├── suppliers() → SupplierRepository   supplier directory   │
//! │             └── shopping()  → ShoppingListRepository restock list       │
//! │                                                                         │
//! │  SaleRepository::checkout and CreditRepository::record_payment are      │
//! │  the only multi-statement writers; both run inside one transaction.     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod credit;
pub mod customer;
pub mod expense;
pub mod product;
pub mod sale;
pub mod shopping;
pub mod supplier;

/// Shared fixtures for repository tests.
#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use uuid::Uuid;

    use bodega_core::{Customer, Product};

    pub fn sample_product(name: &str, price_cents: i64, stock: i64) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4().to_string(),
            barcode: None,
            name: name.to_string(),
            description: None,
            purchase_price_cents: price_cents / 2,
            sale_price_cents: price_cents,
            stock,
            min_stock: 2,
            category: None,
            unit: "pieza".to_string(),
            is_active: true,
            is_favorite: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn sample_customer(name: &str) -> Customer {
        let now = Utc::now();
        Customer {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            phone: None,
            address: None,
            credit_limit_cents: 0,
            current_debt_cents: 0,
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}
