//! # Product Repository
//!
//! Database operations for the product catalog.
//!
//! ## Key Operations
//! - CRUD with soft delete (is_active flag)
//! - Substring search by name or barcode
//! - Low-stock listing (feeds shopping-list suggestions)
//! - Restock (guarded increment, paired with the checkout decrement)

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bodega_core::{
    validate_name, validate_price_cents, validate_quantity, validate_search_query, CoreError,
    Product,
};

const SELECT_COLUMNS: &str = "\
    id, barcode, name, description, \
    purchase_price_cents, sale_price_cents, stock, min_stock, \
    category, unit, is_active, is_favorite, created_at, updated_at";

/// Repository for product database operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Field checks shared by insert and update.
    fn validate(product: &Product) -> DbResult<()> {
        validate_name("name", &product.name).map_err(CoreError::from)?;
        validate_price_cents(product.purchase_price_cents).map_err(CoreError::from)?;
        validate_price_cents(product.sale_price_cents).map_err(CoreError::from)?;
        Ok(())
    }

    /// Searches products by name or barcode substring.
    ///
    /// ## Behavior
    /// - Empty query returns all active products sorted by name
    /// - Over-long queries (> 100 chars) are rejected
    /// - Matching is case-insensitive on name, exact-substring on barcode
    pub async fn search(&self, query: &str) -> DbResult<Vec<Product>> {
        let query = validate_search_query(query).map_err(CoreError::from)?;

        debug!(query = %query, "Searching products");

        if query.is_empty() {
            return self.list_active().await;
        }

        let pattern = format!("%{}%", query);
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE is_active = 1 AND (name LIKE ?1 OR barcode LIKE ?1) \
             ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .bind(pattern)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = products.len(), "Search returned products");
        Ok(products)
    }

    /// Lists all active products sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products WHERE is_active = 1 ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists active favorite products (the register's quick grid).
    pub async fn list_favorites(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE is_active = 1 AND is_favorite = 1 \
             ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Lists active products at or below their restock threshold.
    ///
    /// Feeds the shopping list's restock suggestions.
    pub async fn list_low_stock(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM products \
             WHERE is_active = 1 AND stock <= min_stock \
             ORDER BY name"
        );
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(products)
    }

    /// Gets a product by its ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM products WHERE id = ?1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a new product.
    ///
    /// ## Errors
    /// Rejects blank names and negative prices before touching the
    /// database.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        Self::validate(product)?;

        debug!(name = %product.name, "Inserting product");

        sqlx::query(
            "INSERT INTO products (
                id, barcode, name, description,
                purchase_price_cents, sale_price_cents, stock, min_stock,
                category, unit, is_active, is_favorite, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.is_active)
        .bind(product.is_favorite)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing product.
    ///
    /// ## Errors
    /// `DbError::NotFound` if the product doesn't exist; blank names
    /// and negative prices are rejected as on insert.
    pub async fn update(&self, product: &Product) -> DbResult<()> {
        Self::validate(product)?;

        debug!(id = %product.id, "Updating product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET
                barcode = ?2,
                name = ?3,
                description = ?4,
                purchase_price_cents = ?5,
                sale_price_cents = ?6,
                stock = ?7,
                min_stock = ?8,
                category = ?9,
                unit = ?10,
                is_active = ?11,
                is_favorite = ?12,
                updated_at = ?13
            WHERE id = ?1",
        )
        .bind(&product.id)
        .bind(&product.barcode)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.purchase_price_cents)
        .bind(product.sale_price_cents)
        .bind(product.stock)
        .bind(product.min_stock)
        .bind(&product.category)
        .bind(&product.unit)
        .bind(product.is_active)
        .bind(product.is_favorite)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", &product.id));
        }

        Ok(())
    }

    /// Adds purchased units to stock.
    ///
    /// The decrement side lives in the checkout sequence, which guards
    /// against going below zero; restocking only ever adds.
    pub async fn restock(&self, id: &str, quantity: i64) -> DbResult<()> {
        validate_quantity(quantity).map_err(CoreError::from)?;

        debug!(id = %id, quantity = %quantity, "Restocking product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET stock = stock + ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(quantity)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Toggles the favorite flag.
    pub async fn set_favorite(&self, id: &str, is_favorite: bool) -> DbResult<()> {
        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_favorite = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(is_favorite)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product by setting is_active = false.
    ///
    /// ## Why Soft Delete?
    /// Historical sale items still reference this product, and it can
    /// be restored if deleted by mistake.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting product");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Counts active products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
