//! # Domain Types
//!
//! Core domain types used throughout Bodega POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │      Sale       │   │    Customer     │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  barcode        │   │  sale_number    │   │  credit_limit   │       │
//! │  │  sale_price     │   │  payment_method │   │  current_debt   │       │
//! │  │  stock          │   │  payment_status │   └─────────────────┘       │
//! │  └─────────────────┘   └─────────────────┘                             │
//! │                                                                         │
//! │  SaleItem, CreditPayment, Expense, Supplier, ShoppingListItem          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Sales have two identifiers:
//! - `id`: UUID v4 - immutable, used for database relations
//! - `sale_number`: human-readable, generated from the checkout timestamp

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::money::Money;

// =============================================================================
// Payment Method
// =============================================================================

/// How a sale (or expense, or credit payment) was paid.
///
/// `Fiado` is the store-credit method: the customer takes the goods and
/// the total is added to their ledger debt instead of being collected.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Physical cash payment.
    Efectivo,
    /// Card payment on external terminal.
    Tarjeta,
    /// Bank transfer.
    Transferencia,
    /// Store credit - total goes to the customer's debt.
    Fiado,
}

impl PaymentMethod {
    /// The payment status a fresh sale gets for this method.
    ///
    /// Fiado sales start `pendiente` (owed); everything else is
    /// collected on the spot and starts `pagado`.
    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Fiado => PaymentStatus::Pendiente,
            _ => PaymentStatus::Pagado,
        }
    }

    /// Whether this method requires a customer to be selected.
    pub fn requires_customer(&self) -> bool {
        matches!(self, PaymentMethod::Fiado)
    }
}

// =============================================================================
// Payment Status
// =============================================================================

/// Whether a sale has been collected.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    /// Paid in full at checkout.
    Pagado,
    /// Owed by a customer (fiado).
    Pendiente,
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Barcode (EAN-13, UPC-A, etc.), if the product has one.
    pub barcode: Option<String>,

    /// Display name shown at the register and on line-item snapshots.
    pub name: String,

    /// Optional description for product details.
    pub description: Option<String>,

    /// What the store pays per unit, in centavos.
    pub purchase_price_cents: i64,

    /// What the customer pays per unit, in centavos.
    pub sale_price_cents: i64,

    /// Current stock level. Decremented at checkout, never below zero.
    pub stock: i64,

    /// Restock threshold; `stock <= min_stock` flags the product as low.
    pub min_stock: i64,

    /// Free-form category for grouping.
    pub category: Option<String>,

    /// Sale unit ("pieza", "kg", "litro", ...).
    pub unit: String,

    /// Whether product is active (soft delete).
    pub is_active: bool,

    /// Favorites are pinned on the register's quick grid.
    pub is_favorite: bool,

    /// When the product was created.
    pub created_at: DateTime<Utc>,

    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the sale price as a Money type.
    #[inline]
    pub fn sale_price(&self) -> Money {
        Money::from_cents(self.sale_price_cents)
    }

    /// Returns the purchase price as a Money type.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Profit per unit (sale price minus purchase price).
    #[inline]
    pub fn margin(&self) -> Money {
        self.sale_price() - self.purchase_price()
    }

    /// Checks if the requested quantity can be sold from current stock.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.is_active && quantity > 0 && self.stock >= quantity
    }

    /// Whether the product is at or below its restock threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

// =============================================================================
// Customer
// =============================================================================

/// A customer with a fiado (store credit) ledger.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,

    /// How much credit the store is willing to extend, in centavos.
    /// Zero means no limit is configured.
    pub credit_limit_cents: i64,

    /// Outstanding debt in centavos. Raised by fiado checkouts,
    /// lowered by credit payments.
    pub current_debt_cents: i64,

    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    /// Returns the current debt as Money.
    #[inline]
    pub fn current_debt(&self) -> Money {
        Money::from_cents(self.current_debt_cents)
    }

    /// Whether the customer owes anything.
    #[inline]
    pub fn has_debt(&self) -> bool {
        self.current_debt_cents > 0
    }

    /// Whether the customer's debt exceeds a configured limit.
    ///
    /// A zero limit means "no limit", matching how the register
    /// treats unconfigured customers.
    pub fn is_over_limit(&self) -> bool {
        self.credit_limit_cents > 0 && self.current_debt_cents > self.credit_limit_cents
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A recorded sale.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,

    /// Human-readable identifier generated at checkout time
    /// (`V-<unix-millis>`).
    pub sale_number: String,

    /// Customer the sale is assigned to. Required for fiado.
    pub customer_id: Option<String>,

    /// Grand total in centavos: Σ(unit_price × quantity) over items.
    pub total_cents: i64,

    pub payment_method: PaymentMethod,

    /// `pendiente` iff payment_method is `fiado`.
    pub payment_status: PaymentStatus,

    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Whether the sale is still owed (fiado, unpaid).
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.payment_status == PaymentStatus::Pendiente
    }
}

// =============================================================================
// Sale Item
// =============================================================================

/// A line item in a sale.
///
/// Uses snapshot pattern to freeze product data at time of sale:
/// `product_name` and `unit_price_cents` are copied from the product so
/// the sale history survives later renames, repricing and deletion.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,

    /// Product reference; NULL if the product was later hard-removed.
    pub product_id: Option<String>,

    /// Product name at time of sale (frozen).
    pub product_name: String,

    /// Quantity sold.
    pub quantity: i64,

    /// Unit price in centavos at time of sale (frozen).
    pub unit_price_cents: i64,

    /// Line total: quantity × unit_price.
    pub subtotal_cents: i64,

    pub created_at: DateTime<Utc>,
}

impl SaleItem {
    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    /// Returns the line subtotal as Money.
    #[inline]
    pub fn subtotal(&self) -> Money {
        Money::from_cents(self.subtotal_cents)
    }
}

/// A sale joined with its line items, as loaded for reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleWithItems {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

// =============================================================================
// Credit Payment
// =============================================================================

/// A payment against a customer's fiado debt.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditPayment {
    pub id: String,
    pub customer_id: String,

    /// Sale this payment settles, when the customer pays off a
    /// specific ticket. Usually NULL (payments go against the ledger).
    pub sale_id: Option<String>,

    /// Amount paid in centavos. Always 0 < amount <= debt at the time
    /// the payment was recorded.
    pub amount_cents: i64,

    pub payment_method: PaymentMethod,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl CreditPayment {
    /// Returns the payment amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Expense
// =============================================================================

/// A business expense (rent, stock purchases, utilities, ...).
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: String,
    pub description: String,
    pub category: String,

    /// Amount spent in centavos.
    pub amount_cents: i64,

    pub payment_method: PaymentMethod,
    pub notes: Option<String>,

    /// The day the expense applies to (not when it was captured).
    pub expense_date: NaiveDate,

    pub created_at: DateTime<Utc>,
}

impl Expense {
    /// Returns the amount as Money.
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier the store buys from.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,

    /// Free-form description of what this supplier provides.
    pub products_supplied: Option<String>,

    pub notes: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Shopping List
// =============================================================================

/// Urgency of a shopping-list entry.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Alta,
    Normal,
    Baja,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

/// An entry in the manually curated restock list.
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShoppingListItem {
    pub id: String,

    /// Product reference when the entry was seeded from the catalog.
    pub product_id: Option<String>,

    pub product_name: String,
    pub quantity: i64,
    pub priority: Priority,
    pub notes: Option<String>,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn test_product() -> Product {
        Product {
            id: "p1".to_string(),
            barcode: None,
            name: "Coca-Cola 600ml".to_string(),
            description: None,
            purchase_price_cents: 1200,
            sale_price_cents: 1800,
            stock: 10,
            min_stock: 5,
            category: Some("Bebidas".to_string()),
            unit: "pieza".to_string(),
            is_active: true,
            is_favorite: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_payment_method_initial_status() {
        assert_eq!(
            PaymentMethod::Fiado.initial_status(),
            PaymentStatus::Pendiente
        );
        assert_eq!(
            PaymentMethod::Efectivo.initial_status(),
            PaymentStatus::Pagado
        );
        assert_eq!(
            PaymentMethod::Tarjeta.initial_status(),
            PaymentStatus::Pagado
        );
        assert_eq!(
            PaymentMethod::Transferencia.initial_status(),
            PaymentStatus::Pagado
        );
    }

    #[test]
    fn test_only_fiado_requires_customer() {
        assert!(PaymentMethod::Fiado.requires_customer());
        assert!(!PaymentMethod::Efectivo.requires_customer());
    }

    #[test]
    fn test_product_can_sell() {
        let product = test_product();
        assert!(product.can_sell(10));
        assert!(!product.can_sell(11));
        assert!(!product.can_sell(0));

        let mut inactive = test_product();
        inactive.is_active = false;
        assert!(!inactive.can_sell(1));
    }

    #[test]
    fn test_product_low_stock() {
        let mut product = test_product();
        assert!(!product.is_low_stock());
        product.stock = 5;
        assert!(product.is_low_stock());
        product.stock = 0;
        assert!(product.is_low_stock());
    }

    #[test]
    fn test_product_margin() {
        let product = test_product();
        assert_eq!(product.margin().cents(), 600);
    }

    #[test]
    fn test_customer_over_limit() {
        let mut customer = Customer {
            id: "c1".to_string(),
            name: "Doña Mari".to_string(),
            phone: None,
            address: None,
            credit_limit_cents: 50000,
            current_debt_cents: 60000,
            notes: None,
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(customer.is_over_limit());
        assert!(customer.has_debt());

        // Zero limit means no limit configured.
        customer.credit_limit_cents = 0;
        assert!(!customer.is_over_limit());
    }

    #[test]
    fn test_serde_wire_values() {
        assert_eq!(
            serde_json::to_string(&PaymentMethod::Fiado).unwrap(),
            "\"fiado\""
        );
        assert_eq!(
            serde_json::to_string(&PaymentStatus::Pendiente).unwrap(),
            "\"pendiente\""
        );
        assert_eq!(serde_json::to_string(&Priority::Alta).unwrap(), "\"alta\"");
    }
}
