//! # Credit Payment Repository
//!
//! Payments against a customer's fiado debt.
//!
//! ## Payment Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                  Record Payment (one transaction)                       │
//! │                                                                         │
//! │  validate amount > 0                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN ──► UPDATE customers SET current_debt -= amount                  │
//! │       │    WHERE id = ? AND current_debt_cents >= amount                │
//! │       │         │                                                       │
//! │       │         └── 0 rows ──► ROLLBACK: overpayment or unknown         │
//! │       ▼                        customer                                 │
//! │  insert credit_payments row                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  COMMIT ──► CreditPayment                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The guard reads the debt in the same statement that lowers it, so a
//! payment racing another payment (or a fiado checkout) can never drive
//! the ledger negative.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::DbResult;
use bodega_core::{CoreError, CreditPayment, PaymentMethod};

const SELECT_COLUMNS: &str = "\
    id, customer_id, sale_id, amount_cents, \
    payment_method, notes, created_at";

/// Repository for credit (fiado) payments.
#[derive(Debug, Clone)]
pub struct CreditRepository {
    pool: SqlitePool,
}

impl CreditRepository {
    /// Creates a new CreditRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CreditRepository { pool }
    }

    /// Records a payment against a customer's debt, atomically.
    ///
    /// ## Errors
    /// - `CoreError::Validation` for a zero or negative amount
    /// - `CoreError::PaymentExceedsDebt` when the amount is more than
    ///   the customer currently owes
    /// - `CoreError::CustomerNotFound` for an unknown customer
    pub async fn record_payment(
        &self,
        customer_id: &str,
        amount_cents: i64,
        payment_method: PaymentMethod,
        notes: Option<String>,
    ) -> DbResult<CreditPayment> {
        bodega_core::validate_amount_cents(amount_cents).map_err(CoreError::from)?;

        debug!(
            customer_id = %customer_id,
            amount_cents = amount_cents,
            "Recording credit payment"
        );

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE customers
             SET current_debt_cents = current_debt_cents - ?2, updated_at = ?3
             WHERE id = ?1 AND current_debt_cents >= ?2",
        )
        .bind(customer_id)
        .bind(amount_cents)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            let debt: Option<i64> =
                sqlx::query_scalar("SELECT current_debt_cents FROM customers WHERE id = ?1")
                    .bind(customer_id)
                    .fetch_optional(&mut *tx)
                    .await?;

            let err = match debt {
                Some(debt_cents) => CoreError::PaymentExceedsDebt {
                    debt_cents,
                    amount_cents,
                },
                None => CoreError::CustomerNotFound(customer_id.to_string()),
            };
            warn!(customer_id = %customer_id, "Payment rejected: {err}");
            return Err(err.into());
        }

        let payment = CreditPayment {
            id: Uuid::new_v4().to_string(),
            customer_id: customer_id.to_string(),
            sale_id: None,
            amount_cents,
            payment_method,
            notes,
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO credit_payments (
                id, customer_id, sale_id, amount_cents,
                payment_method, notes, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )
        .bind(&payment.id)
        .bind(&payment.customer_id)
        .bind(&payment.sale_id)
        .bind(payment.amount_cents)
        .bind(payment.payment_method)
        .bind(&payment.notes)
        .bind(payment.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            customer_id = %customer_id,
            amount_cents = amount_cents,
            "Credit payment recorded"
        );

        Ok(payment)
    }

    /// Lists payments made by a customer, newest first.
    pub async fn list_for_customer(&self, customer_id: &str) -> DbResult<Vec<CreditPayment>> {
        let sql = format!(
            "SELECT {SELECT_COLUMNS} FROM credit_payments \
             WHERE customer_id = ?1 ORDER BY created_at DESC"
        );
        let payments = sqlx::query_as::<_, CreditPayment>(&sql)
            .bind(customer_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(payments)
    }
}
