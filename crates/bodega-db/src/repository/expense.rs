//! # Expense Repository
//!
//! The expense log: rent, restocking trips, utilities. Expenses are
//! keyed to `expense_date` (the day they apply to), not the capture
//! timestamp, so the profit reports line up with the owner's notebook.

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bodega_core::{validate_amount_cents, validate_name, CoreError, Expense};

const SELECT_COLUMNS: &str = "\
    id, description, category, amount_cents, \
    payment_method, notes, expense_date, created_at";

/// Repository for expense database operations.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    pool: SqlitePool,
}

impl ExpenseRepository {
    /// Creates a new ExpenseRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ExpenseRepository { pool }
    }

    /// Inserts a new expense.
    ///
    /// ## Errors
    /// Rejects blank descriptions and non-positive amounts.
    pub async fn insert(&self, expense: &Expense) -> DbResult<()> {
        validate_name("description", &expense.description).map_err(CoreError::from)?;
        validate_amount_cents(expense.amount_cents).map_err(CoreError::from)?;

        debug!(
            description = %expense.description,
            amount_cents = expense.amount_cents,
            "Inserting expense"
        );

        sqlx::query(
            "INSERT INTO expenses (
                id, description, category, amount_cents,
                payment_method, notes, expense_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(&expense.id)
        .bind(&expense.description)
        .bind(&expense.category)
        .bind(expense.amount_cents)
        .bind(expense.payment_method)
        .bind(&expense.notes)
        .bind(expense.expense_date)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Lists all expenses, most recent date first.
    pub async fn list_all(&self) -> DbResult<Vec<Expense>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM expenses ORDER BY expense_date DESC, created_at DESC"
        );
        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .fetch_all(&self.pool)
            .await?;

        Ok(expenses)
    }

    /// Lists expenses within an inclusive date range.
    pub async fn list_between(&self, from: NaiveDate, to: NaiveDate) -> DbResult<Vec<Expense>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM expenses \
             WHERE expense_date >= ?1 AND expense_date <= ?2 \
             ORDER BY expense_date DESC, created_at DESC"
        );
        let expenses = sqlx::query_as::<_, Expense>(&sql)
            .bind(from)
            .bind(to)
            .fetch_all(&self.pool)
            .await?;

        Ok(expenses)
    }

    /// Deletes an expense.
    ///
    /// Hard delete: expenses have no dependents, and mistyped entries
    /// are simply removed and re-captured.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting expense");

        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Expense", id));
        }

        Ok(())
    }
}
