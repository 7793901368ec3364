//! # Customer Repository
//!
//! CRUD for the customer ledger. Debt movements never go through
//! `update`; they belong to the checkout and credit-payment sequences,
//! which adjust `current_debt_cents` with guarded increments inside
//! their own transactions.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bodega_core::{validate_name, CoreError, Customer};

const SELECT_COLUMNS: &str = "\
    id, name, phone, address, \
    credit_limit_cents, current_debt_cents, \
    notes, is_active, created_at, updated_at";

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists active customers sorted by name.
    pub async fn list_active(&self) -> DbResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM customers WHERE is_active = 1 ORDER BY name"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Lists active customers that currently owe money, largest debt first.
    pub async fn list_debtors(&self) -> DbResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM customers \
             WHERE is_active = 1 AND current_debt_cents > 0 \
             ORDER BY current_debt_cents DESC, name"
        );
        let customers = sqlx::query_as::<_, Customer>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql = format!("SELECT {SELECT_COLUMNS} FROM customers WHERE id = ?1");
        let customer = sqlx::query_as::<_, Customer>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(customer)
    }

    /// Inserts a new customer.
    ///
    /// The stored debt always starts at zero regardless of what the
    /// struct carries; debt only enters through fiado checkouts.
    pub async fn insert(&self, customer: &Customer) -> DbResult<()> {
        validate_name("name", &customer.name).map_err(CoreError::from)?;

        debug!(name = %customer.name, "Inserting customer");

        sqlx::query(
            "INSERT INTO customers (
                id, name, phone, address,
                credit_limit_cents, current_debt_cents,
                notes, is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6, ?7, ?8, ?9)",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.credit_limit_cents)
        .bind(&customer.notes)
        .bind(customer.is_active)
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Updates a customer's contact details and credit limit.
    ///
    /// `current_debt_cents` is deliberately not written here.
    pub async fn update(&self, customer: &Customer) -> DbResult<()> {
        validate_name("name", &customer.name).map_err(CoreError::from)?;

        debug!(id = %customer.id, "Updating customer");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET
                name = ?2,
                phone = ?3,
                address = ?4,
                credit_limit_cents = ?5,
                notes = ?6,
                is_active = ?7,
                updated_at = ?8
            WHERE id = ?1",
        )
        .bind(&customer.id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.address)
        .bind(customer.credit_limit_cents)
        .bind(&customer.notes)
        .bind(customer.is_active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", &customer.id));
        }

        Ok(())
    }

    /// Soft-deletes a customer.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Soft-deleting customer");

        let now = Utc::now();

        let result = sqlx::query(
            "UPDATE customers SET is_active = 0, updated_at = ?2 WHERE id = ?1",
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::repository::test_support::sample_customer;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_starts_debt_free() {
        let db = test_db().await;
        let repo = db.customers();

        let mut customer = sample_customer("Doña Mari");
        // Even a struct that claims debt gets stored clean.
        customer.current_debt_cents = 9999;
        repo.insert(&customer).await.unwrap();

        let loaded = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(loaded.current_debt_cents, 0);
        assert!(!loaded.has_debt());
    }

    #[tokio::test]
    async fn test_update_preserves_debt() {
        let db = test_db().await;
        let repo = db.customers();

        let customer = sample_customer("Don Pepe");
        repo.insert(&customer).await.unwrap();

        // Bump the debt directly, as a fiado checkout would.
        sqlx::query("UPDATE customers SET current_debt_cents = 5000 WHERE id = ?1")
            .bind(&customer.id)
            .execute(db.pool())
            .await
            .unwrap();

        let mut edited = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        edited.phone = Some("555-1234".to_string());
        edited.current_debt_cents = 0; // must be ignored
        repo.update(&edited).await.unwrap();

        let loaded = repo.get_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(loaded.phone.as_deref(), Some("555-1234"));
        assert_eq!(loaded.current_debt_cents, 5000);
    }

    #[tokio::test]
    async fn test_list_debtors_sorted_by_debt() {
        let db = test_db().await;
        let repo = db.customers();

        for (name, debt) in [("Ana", 1000), ("Beto", 8000), ("Carla", 0)] {
            let customer = sample_customer(name);
            repo.insert(&customer).await.unwrap();
            sqlx::query("UPDATE customers SET current_debt_cents = ?2 WHERE id = ?1")
                .bind(&customer.id)
                .bind(debt as i64)
                .execute(db.pool())
                .await
                .unwrap();
        }

        let debtors = repo.list_debtors().await.unwrap();
        assert_eq!(debtors.len(), 2);
        assert_eq!(debtors[0].name, "Beto");
        assert_eq!(debtors[1].name, "Ana");
    }

    #[tokio::test]
    async fn test_blank_name_rejected() {
        let db = test_db().await;
        let repo = db.customers();

        let mut customer = sample_customer("x");
        customer.name = "  ".to_string();
        let err = repo.insert(&customer).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert!(repo.list_active().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete() {
        let db = test_db().await;
        let repo = db.customers();

        let customer = sample_customer("Temporal");
        repo.insert(&customer).await.unwrap();
        repo.soft_delete(&customer.id).await.unwrap();

        assert!(repo.list_active().await.unwrap().is_empty());

        let err = repo.soft_delete("missing").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
