//! # Sale Repository
//!
//! Checkout and sale history.
//!
//! ## Checkout Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Checkout (one transaction)                         │
//! │                                                                         │
//! │  validate cart + payment method                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ──► insert sale header (V-<millis>, total, method, status)       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  per item: UPDATE products SET stock = stock - qty                      │
//! │            WHERE id = ? AND is_active = 1 AND stock >= qty              │
//! │       │         │                                                       │
//! │       │         └── 0 rows ──► ROLLBACK, return the stock error         │
//! │       ▼                                                                 │
//! │  insert sale_items (name + price snapshots from the cart)               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  fiado? ──► UPDATE customers SET current_debt += total                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ──► Sale                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guarded decrement makes the stock check and the write one atomic
//! statement, so two registers selling the last unit can't both succeed:
//! the loser's UPDATE matches zero rows and its transaction rolls back.

use chrono::{DateTime, Utc};
use sqlx::{Sqlite, SqlitePool, Transaction};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use bodega_core::{Cart, CoreError, PaymentMethod, Sale, SaleItem, SaleWithItems};

const SALE_COLUMNS: &str = "\
    id, sale_number, customer_id, total_cents, \
    payment_method, payment_status, notes, created_at";

const ITEM_COLUMNS: &str = "\
    id, sale_id, product_id, product_name, \
    quantity, unit_price_cents, subtotal_cents, created_at";

/// Repository for sales, including the checkout sequence.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    /// Creates a new SaleRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale from the cart, atomically.
    ///
    /// Either every effect lands (sale header, line items, stock
    /// decrements, fiado debt) or none do.
    ///
    /// ## Errors
    /// - `CoreError::EmptyCart` for an empty cart
    /// - `CoreError::CustomerRequired` for fiado without a customer
    /// - `CoreError::InsufficientStock` when any line can't be covered
    ///   by *current* stock (the cart may be stale)
    /// - `CoreError::CustomerNotFound` for an unknown customer ID
    pub async fn checkout(
        &self,
        cart: &Cart,
        payment_method: PaymentMethod,
        customer_id: Option<&str>,
        notes: Option<String>,
    ) -> DbResult<Sale> {
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        if payment_method.requires_customer() && customer_id.is_none() {
            return Err(CoreError::CustomerRequired.into());
        }

        let now = Utc::now();
        let sale = Sale {
            id: Uuid::new_v4().to_string(),
            sale_number: format!("V-{}", now.timestamp_millis()),
            customer_id: customer_id.map(String::from),
            total_cents: cart.total_cents(),
            payment_method,
            payment_status: payment_method.initial_status(),
            notes,
            created_at: now,
        };

        debug!(
            sale_number = %sale.sale_number,
            total_cents = sale.total_cents,
            items = cart.item_count(),
            method = ?payment_method,
            "Starting checkout"
        );

        let mut tx = self.pool.begin().await?;

        if let Some(cid) = customer_id {
            let exists: Option<i64> =
                sqlx::query_scalar("SELECT 1 FROM customers WHERE id = ?1 AND is_active = 1")
                    .bind(cid)
                    .fetch_optional(&mut *tx)
                    .await?;
            if exists.is_none() {
                return Err(CoreError::CustomerNotFound(cid.to_string()).into());
            }
        }

        sqlx::query(
            "INSERT INTO sales (
                id, sale_number, customer_id, total_cents,
                payment_method, payment_status, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&sale.id)
        .bind(&sale.sale_number)
        .bind(&sale.customer_id)
        .bind(sale.total_cents)
        .bind(sale.payment_method)
        .bind(sale.payment_status)
        .bind(&sale.notes)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        for item in &cart.items {
            // Check-and-decrement in one statement. The cart's observed
            // stock may be stale; current stock decides.
            let result = sqlx::query(
                "UPDATE products
                 SET stock = stock - ?2, updated_at = ?3
                 WHERE id = ?1 AND is_active = 1 AND stock >= ?2",
            )
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() == 0 {
                // Dropping the transaction rolls it back; fetch outside
                // any lock-sensitive path to name the failure precisely.
                let err = self.stock_failure(&mut tx, item).await?;
                warn!(
                    sale_number = %sale.sale_number,
                    product = %item.name,
                    "Checkout aborted: {err}"
                );
                return Err(err.into());
            }

            sqlx::query(
                "INSERT INTO sale_items (
                    id, sale_id, product_id, product_name,
                    quantity, unit_price_cents, subtotal_cents, created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .bind(Uuid::new_v4().to_string())
            .bind(&sale.id)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.subtotal_cents())
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        if payment_method == PaymentMethod::Fiado {
            // customer_id presence was validated above.
            if let Some(cid) = &sale.customer_id {
                sqlx::query(
                    "UPDATE customers
                     SET current_debt_cents = current_debt_cents + ?2, updated_at = ?3
                     WHERE id = ?1",
                )
                .bind(cid)
                .bind(sale.total_cents)
                .bind(now)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;

        info!(
            sale_number = %sale.sale_number,
            total_cents = sale.total_cents,
            status = ?sale.payment_status,
            "Checkout complete"
        );

        Ok(sale)
    }

    /// Resolves why a guarded stock decrement matched zero rows.
    async fn stock_failure(
        &self,
        tx: &mut Transaction<'_, Sqlite>,
        item: &bodega_core::CartItem,
    ) -> DbResult<CoreError> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1 AND is_active = 1")
                .bind(&item.product_id)
                .fetch_optional(&mut **tx)
                .await?;

        Ok(match stock {
            Some(available) => CoreError::InsufficientStock {
                name: item.name.clone(),
                available,
                requested: item.quantity,
            },
            None => CoreError::ProductNotFound(item.product_id.clone()),
        })
    }

    /// Gets a sale by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1");
        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Gets the line items of a sale, in insertion order.
    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let sql = format!(
            "SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = ?1 ORDER BY rowid"
        );
        let items = sqlx::query_as::<_, SaleItem>(&sql)
            .bind(sale_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Gets a sale together with its items.
    pub async fn get_with_items(&self, id: &str) -> DbResult<Option<SaleWithItems>> {
        let Some(sale) = self.get_by_id(id).await? else {
            return Ok(None);
        };
        let items = self.get_items(&sale.id).await?;
        Ok(Some(SaleWithItems { sale, items }))
    }

    /// Lists the most recent sales, newest first.
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales ORDER BY created_at DESC LIMIT ?1"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }

    /// Lists all sales created at or after `since`, with their items.
    ///
    /// This is the reporting feed: the pure aggregation functions take
    /// the loaded rows and do the rest.
    pub async fn list_with_items_since(
        &self,
        since: DateTime<Utc>,
    ) -> DbResult<Vec<SaleWithItems>> {
        let sale_sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE created_at >= ?1 ORDER BY created_at"
        );
        let sales = sqlx::query_as::<_, Sale>(&sale_sql)
            .bind(since)
            .fetch_all(&self.pool)
            .await?;

        let mut out = Vec::with_capacity(sales.len());
        for sale in sales {
            let items = self.get_items(&sale.id).await?;
            out.push(SaleWithItems { sale, items });
        }

        debug!(count = out.len(), "Loaded sales for reporting");
        Ok(out)
    }

    /// Lists pending (fiado, unpaid) sales for a customer, newest first.
    pub async fn list_pending_for_customer(&self, customer_id: &str) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales \
             WHERE customer_id = ?1 AND payment_status = 'pendiente' \
             ORDER BY created_at DESC"
        );
        let sales = sqlx::query_as::<_, Sale>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(sales)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::{sample_customer, sample_product};
    use bodega_core::PaymentStatus;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_checkout_efectivo() {
        let db = test_db().await;

        let coke = sample_product("Coca-Cola 600ml", 1000, 10);
        let chips = sample_product("Sabritas", 500, 10);
        db.products().insert(&coke).await.unwrap();
        db.products().insert(&chips).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&coke, 2).unwrap();
        cart.add_item(&chips, 1).unwrap();

        let sale = db
            .sales()
            .checkout(&cart, PaymentMethod::Efectivo, None, None)
            .await
            .unwrap();

        assert_eq!(sale.total_cents, 2500);
        assert_eq!(sale.payment_status, PaymentStatus::Pagado);
        assert!(sale.sale_number.starts_with("V-"));

        // Stock decremented per line.
        let coke = db.products().get_by_id(&coke.id).await.unwrap().unwrap();
        let chips = db.products().get_by_id(&chips.id).await.unwrap().unwrap();
        assert_eq!(coke.stock, 8);
        assert_eq!(chips.stock, 9);

        // Items carry name and price snapshots.
        let items = db.sales().get_items(&sale.id).await.unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].product_name, "Coca-Cola 600ml");
        assert_eq!(items[0].subtotal_cents, 2000);
    }

    #[tokio::test]
    async fn test_checkout_fiado_raises_debt() {
        let db = test_db().await;

        let product = sample_product("Leche 1L", 2800, 5);
        db.products().insert(&product).await.unwrap();
        let customer = sample_customer("Doña Mari");
        db.customers().insert(&customer).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&product, 2).unwrap();

        let sale = db
            .sales()
            .checkout(&cart, PaymentMethod::Fiado, Some(&customer.id), None)
            .await
            .unwrap();

        assert_eq!(sale.payment_status, PaymentStatus::Pendiente);

        let customer = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.current_debt_cents, 5600);

        let pending = db
            .sales()
            .list_pending_for_customer(&customer.id)
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
    }

    #[tokio::test]
    async fn test_checkout_efectivo_leaves_debt_alone() {
        let db = test_db().await;

        let product = sample_product("Pan", 900, 5);
        db.products().insert(&product).await.unwrap();
        let customer = sample_customer("Don Pepe");
        db.customers().insert(&customer).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&product, 1).unwrap();

        db.sales()
            .checkout(&cart, PaymentMethod::Efectivo, Some(&customer.id), None)
            .await
            .unwrap();

        let customer = db
            .customers()
            .get_by_id(&customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.current_debt_cents, 0);
    }

    #[tokio::test]
    async fn test_checkout_fiado_requires_customer() {
        let db = test_db().await;

        let product = sample_product("Huevos", 4500, 5);
        db.products().insert(&product).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&product, 1).unwrap();

        let err = db
            .sales()
            .checkout(&cart, PaymentMethod::Fiado, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::CustomerRequired)));
    }

    #[tokio::test]
    async fn test_checkout_empty_cart_rejected() {
        let db = test_db().await;

        let err = db
            .sales()
            .checkout(&Cart::new(), PaymentMethod::Efectivo, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::EmptyCart)));
    }

    #[tokio::test]
    async fn test_stale_cart_rolls_back_everything() {
        let db = test_db().await;

        let first = sample_product("Agua 1L", 1200, 10);
        let mut second = sample_product("Cerveza", 2200, 5);
        db.products().insert(&first).await.unwrap();
        db.products().insert(&second).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&first, 2).unwrap();
        cart.add_item(&second, 3).unwrap();

        // Stock moved under the cart: another register sold 4 of them.
        second.stock = 1;
        db.products().update(&second).await.unwrap();

        let err = db
            .sales()
            .checkout(&cart, PaymentMethod::Efectivo, None, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::InsufficientStock {
                available: 1,
                requested: 3,
                ..
            })
        ));

        // Rollback restored the first product's decrement and no sale
        // or items were persisted.
        let first = db.products().get_by_id(&first.id).await.unwrap().unwrap();
        assert_eq!(first.stock, 10);
        assert!(db.sales().list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_checkout_unknown_customer_rejected() {
        let db = test_db().await;

        let product = sample_product("Cafe", 6000, 3);
        db.products().insert(&product).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&product, 1).unwrap();

        let err = db
            .sales()
            .checkout(&cart, PaymentMethod::Fiado, Some("missing"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Domain(CoreError::CustomerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_with_items_roundtrip() {
        let db = test_db().await;

        let product = sample_product("Galletas", 1500, 8);
        db.products().insert(&product).await.unwrap();

        let mut cart = Cart::new();
        cart.add_item(&product, 2).unwrap();

        let sale = db
            .sales()
            .checkout(&cart, PaymentMethod::Tarjeta, None, Some("ticket 12".into()))
            .await
            .unwrap();

        let loaded = db.sales().get_with_items(&sale.id).await.unwrap().unwrap();
        assert_eq!(loaded.sale.notes.as_deref(), Some("ticket 12"));
        assert_eq!(loaded.items.len(), 1);
        assert_eq!(loaded.items[0].quantity, 2);
    }
}
