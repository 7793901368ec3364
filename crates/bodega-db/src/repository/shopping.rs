//! # Shopping List Repository
//!
//! The manually curated restock list. Entries can be typed in by hand
//! or seeded from low-stock products; completing an entry stamps
//! `completed_at` so the list doubles as a purchase log.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use bodega_core::{
    validate_name, validate_quantity, CoreError, Priority, Product, ShoppingListItem,
    MAX_ITEM_QUANTITY,
};

const SELECT_COLUMNS: &str = "\
    id, product_id, product_name, quantity, priority, \
    notes, is_completed, created_at, completed_at";

/// Repository for the shopping list.
#[derive(Debug, Clone)]
pub struct ShoppingListRepository {
    pool: SqlitePool,
}

impl ShoppingListRepository {
    /// Creates a new ShoppingListRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ShoppingListRepository { pool }
    }

    /// Lists pending entries, urgent first, then newest.
    pub async fn list_pending(&self) -> DbResult<Vec<ShoppingListItem>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM shopping_list \
             WHERE is_completed = 0 \
             ORDER BY CASE priority \
                 WHEN 'alta' THEN 0 WHEN 'normal' THEN 1 ELSE 2 END, \
                 created_at DESC"
        );
        let items = sqlx::query_as::<_, ShoppingListItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Lists completed entries, most recently completed first.
    pub async fn list_completed(&self) -> DbResult<Vec<ShoppingListItem>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM shopping_list \
             WHERE is_completed = 1 \
             ORDER BY completed_at DESC"
        );
        let items = sqlx::query_as::<_, ShoppingListItem>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(items)
    }

    /// Inserts a new entry.
    ///
    /// ## Errors
    /// Rejects blank names and non-positive quantities.
    pub async fn insert(&self, item: &ShoppingListItem) -> DbResult<()> {
        validate_name("product_name", &item.product_name).map_err(CoreError::from)?;
        validate_quantity(item.quantity).map_err(CoreError::from)?;

        debug!(name = %item.product_name, "Adding shopping list entry");

        sqlx::query(
            "INSERT INTO shopping_list (
                id, product_id, product_name, quantity, priority,
                notes, is_completed, created_at, completed_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        )
        .bind(&item.id)
        .bind(&item.product_id)
        .bind(&item.product_name)
        .bind(item.quantity)
        .bind(item.priority)
        .bind(&item.notes)
        .bind(item.is_completed)
        .bind(item.created_at)
        .bind(item.completed_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Adds a restock suggestion for a low-stock product.
    ///
    /// Suggested quantity refills to twice the restock threshold;
    /// priority is `alta` because the shelf is already running out.
    /// Skips products that already have a pending entry.
    pub async fn suggest_restock(&self, product: &Product) -> DbResult<Option<ShoppingListItem>> {
        let existing: Option<i64> = sqlx::query_scalar(
            "SELECT 1 FROM shopping_list WHERE product_id = ?1 AND is_completed = 0",
        )
        .bind(&product.id)
        .fetch_optional(&self.pool)
        .await?;

        if existing.is_some() {
            debug!(name = %product.name, "Restock already suggested, skipping");
            return Ok(None);
        }

        let quantity = (product.min_stock * 2).clamp(1, MAX_ITEM_QUANTITY);
        let item = ShoppingListItem {
            id: Uuid::new_v4().to_string(),
            product_id: Some(product.id.clone()),
            product_name: product.name.clone(),
            quantity,
            priority: Priority::Alta,
            notes: None,
            is_completed: false,
            created_at: Utc::now(),
            completed_at: None,
        };
        self.insert(&item).await?;

        info!(name = %product.name, quantity = quantity, "Restock suggested");
        Ok(Some(item))
    }

    /// Marks an entry completed or pending, stamping/clearing
    /// `completed_at` accordingly.
    pub async fn set_completed(&self, id: &str, completed: bool) -> DbResult<()> {
        debug!(id = %id, completed = completed, "Toggling shopping list entry");

        let completed_at = completed.then(Utc::now);

        let result = sqlx::query(
            "UPDATE shopping_list SET is_completed = ?2, completed_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(completed)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ShoppingListItem", id));
        }

        Ok(())
    }

    /// Deletes an entry.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let result = sqlx::query("DELETE FROM shopping_list WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("ShoppingListItem", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::sample_product;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn manual_entry(name: &str, priority: Priority) -> ShoppingListItem {
        ShoppingListItem {
            id: Uuid::new_v4().to_string(),
            product_id: None,
            product_name: name.to_string(),
            quantity: 1,
            priority,
            notes: None,
            is_completed: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_pending_sorted_by_priority() {
        let db = test_db().await;
        let repo = db.shopping();

        repo.insert(&manual_entry("Servilletas", Priority::Baja))
            .await
            .unwrap();
        repo.insert(&manual_entry("Bolsas", Priority::Normal))
            .await
            .unwrap();
        repo.insert(&manual_entry("Hielo", Priority::Alta))
            .await
            .unwrap();

        let pending = repo.list_pending().await.unwrap();
        assert_eq!(pending[0].product_name, "Hielo");
        assert_eq!(pending[2].product_name, "Servilletas");
    }

    #[tokio::test]
    async fn test_complete_stamps_timestamp() {
        let db = test_db().await;
        let repo = db.shopping();

        let entry = manual_entry("Escobas", Priority::Normal);
        repo.insert(&entry).await.unwrap();

        repo.set_completed(&entry.id, true).await.unwrap();
        let completed = repo.list_completed().await.unwrap();
        assert_eq!(completed.len(), 1);
        assert!(completed[0].completed_at.is_some());

        // Un-completing clears the stamp.
        repo.set_completed(&entry.id, false).await.unwrap();
        let pending = repo.list_pending().await.unwrap();
        assert!(pending[0].completed_at.is_none());
    }

    #[tokio::test]
    async fn test_suggest_restock_from_low_stock_product() {
        let db = test_db().await;

        let mut product = sample_product("Azucar 1kg", 3000, 1);
        product.min_stock = 5;
        db.products().insert(&product).await.unwrap();

        let item = db
            .shopping()
            .suggest_restock(&product)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.quantity, 10);
        assert_eq!(item.priority, Priority::Alta);
        assert_eq!(item.product_id.as_deref(), Some(product.id.as_str()));

        // Second suggestion for the same product is a no-op.
        let dup = db.shopping().suggest_restock(&product).await.unwrap();
        assert!(dup.is_none());
        assert_eq!(db.shopping().list_pending().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_insert_rejects_invalid_input() {
        let db = test_db().await;
        let repo = db.shopping();

        let mut blank = manual_entry("  ", Priority::Normal);
        blank.product_name = " ".to_string();
        let err = repo.insert(&blank).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        let mut zero = manual_entry("Velas", Priority::Normal);
        zero.quantity = 0;
        let err = repo.insert(&zero).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));

        assert!(repo.list_pending().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete() {
        let db = test_db().await;
        let repo = db.shopping();

        let entry = manual_entry("Trapos", Priority::Baja);
        repo.insert(&entry).await.unwrap();
        repo.delete(&entry.id).await.unwrap();
        assert!(repo.list_pending().await.unwrap().is_empty());

        let err = repo.delete(&entry.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
