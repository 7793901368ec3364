//! # Supplier Repository
//!
//! The supplier directory. Plain CRUD; suppliers are contact cards,
//! not transactional entities.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bodega_core::{validate_name, CoreError, Supplier};

const SELECT_COLUMNS: &str = "\
    id, name, contact_person, phone, email, address, \
    products_supplied, notes, is_active, created_at, updated_at";

/// Repository for supplier database operations.
#[derive(Debug, Clone)]
pub struct SupplierRepository {
    pool: SqlitePool,
}

impl SupplierRepository {
    /// Creates a new SupplierRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SupplierRepository { pool }
    }

    /// Lists active suppliers sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Supplier>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM suppliers WHERE is_active = 1 ORDER BY name"
        );
        let suppliers = sqlx::query_as::<_, Supplier>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(suppliers)
    }

    /// Gets a supplier by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Supplier>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM suppliers WHERE id = ?1");
        let supplier = sqlx::query_as::<_, Supplier>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(supplier)
    }

    /// Inserts a new supplier.
    pub async fn insert(&self, supplier: &Supplier) -> DbResult<()> {
        validate_name("name", &supplier.name).map_err(CoreError::from)?;

        debug!(name = %supplier.name, "Inserting supplier");

        sqlx::query(
            "INSERT INTO suppliers (
                id, name, contact_person, phone, email, address,
                products_supplied, notes, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.products_supplied)
        .bind(&supplier.notes)
        .bind(supplier.is_active)
        .bind(supplier.created_at)
        .bind(supplier.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates an existing supplier.
    pub async fn update(&self, supplier: &Supplier) -> DbResult<()> {
        validate_name("name", &supplier.name).map_err(CoreError::from)?;

        debug!(id = %supplier.id, "Updating supplier");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE suppliers SET
                name = ?2,
                contact_person = ?3,
                phone = ?4,
                email = ?5,
                address = ?6,
                products_supplied = ?7,
                notes = ?8,
                is_active = ?9,
                updated_at = ?10
            WHERE id = ?1",
        )
        .bind(&supplier.id)
        .bind(&supplier.name)
        .bind(&supplier.contact_person)
        .bind(&supplier.phone)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.products_supplied)
        .bind(&supplier.notes)
        .bind(supplier.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", &supplier.id));
        }

        Ok(())
    }

    /// Soft-deletes a supplier.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting supplier");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE suppliers SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Supplier", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn sample_supplier(name: &str) -> Supplier {
        let now = Utc::now();
        Supplier {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            contact_person: None,
            phone: None,
            email: None,
            address: None,
            products_supplied: Some("Abarrotes".to_string()),
            notes: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_crud_roundtrip() {
        let db = test_db().await;
        let repo = db.suppliers();

        let supplier = sample_supplier("Abarrotera del Norte");
        repo.insert(&supplier).await.unwrap();

        let mut loaded = repo.get_by_id(&supplier.id).await.unwrap().unwrap();
        assert_eq!(loaded.name, "Abarrotera del Norte");

        loaded.phone = Some("555-9876".to_string());
        repo.update(&loaded).await.unwrap();

        let loaded = repo.get_by_id(&supplier.id).await.unwrap().unwrap();
        assert_eq!(loaded.phone.as_deref(), Some("555-9876"));

        repo.soft_delete(&supplier.id).await.unwrap();
        assert!(repo.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = test_db().await;
        let repo = db.suppliers();

        let mut supplier = sample_supplier("x");
        supplier.name = "".to_string();
        let err = repo.insert(&supplier).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert!(repo.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_supplier_fails() {
        let db = test_db().await;
        let repo = db.suppliers();

        let supplier = sample_supplier("Fantasma");
        let err = repo.update(&supplier).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
