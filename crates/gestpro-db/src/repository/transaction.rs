//! # Transaction Repository
//!
//! Read access to committed sales.
//!
//! Writes happen only inside the settlement commit (and restore), through
//! [`insert_row`] on an open SQLite transaction.
//!
//! ## Storage
//! ```text
//! transactions
//! ┌──────────┬──────────────────────┬────────────┬─────────────────────┬─────────────┐
//! │ id       │ date (RFC 3339)      │ cashier_id │ items (JSON array)  │ total_cents │
//! ├──────────┼──────────────────────┼────────────┼─────────────────────┼─────────────┤
//! │ 3f2a...  │ 2026-03-01T10:15:00Z │ u2         │ [{"id":"p1",...}]   │ 29997       │
//! └──────────┴──────────────────────┴────────────┴─────────────────────┴─────────────┘
//! ```
//! Lines are kept as the frozen product snapshot they were sold with.

use chrono::{DateTime, Utc};
use sqlx::{Executor, Sqlite, SqlitePool};

use crate::error::{DbError, DbResult};
use gestpro_core::{CartItem, Transaction};

const SELECT_TRANSACTION: &str =
    "SELECT id, date, cashier_id, items, total_cents FROM transactions";

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TransactionRow {
    id: String,
    date: DateTime<Utc>,
    cashier_id: String,
    items: String,
    total_cents: i64,
}

impl TryFrom<TransactionRow> for Transaction {
    type Error = DbError;

    fn try_from(row: TransactionRow) -> Result<Self, Self::Error> {
        let items: Vec<CartItem> =
            serde_json::from_str(&row.items).map_err(|e| DbError::Corrupt {
                entity: "Transaction".to_string(),
                id: row.id.clone(),
                reason: e.to_string(),
            })?;
        Ok(Transaction {
            id: row.id,
            date: row.date,
            cashier_id: row.cashier_id,
            items,
            total_cents: row.total_cents,
        })
    }
}

/// Inserts a sale record. Callers pass `&mut *tx`.
pub(crate) async fn insert_row<'e, E>(executor: E, transaction: &Transaction) -> DbResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let items = serde_json::to_string(&transaction.items).map_err(|e| DbError::Corrupt {
        entity: "Transaction".to_string(),
        id: transaction.id.clone(),
        reason: e.to_string(),
    })?;

    sqlx::query(
        "INSERT INTO transactions (id, date, cashier_id, items, total_cents) VALUES (?1, ?2, ?3, ?4, ?5)",
    )
    .bind(&transaction.id)
    .bind(transaction.date)
    .bind(&transaction.cashier_id)
    .bind(items)
    .bind(transaction.total_cents)
    .execute(executor)
    .await
    .map_err(|e| DbError::from(e).with_duplicate_value(&transaction.id))?;
    Ok(())
}

/// Loads one sale by id. Works on the pool or inside a transaction.
pub(crate) async fn fetch_by_id<'e, E>(executor: E, id: &str) -> DbResult<Option<Transaction>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row: Option<TransactionRow> = sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_TRANSACTION))
        .bind(id)
        .fetch_optional(executor)
        .await?;
    row.map(Transaction::try_from).transpose()
}

/// Read-only repository for committed sales.
#[derive(Debug, Clone)]
pub struct TransactionRepository {
    pool: SqlitePool,
}

impl TransactionRepository {
    pub fn new(pool: SqlitePool) -> Self {
        TransactionRepository { pool }
    }

    /// All sales, newest first.
    pub async fn list_all(&self) -> DbResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> =
            sqlx::query_as(&format!("{} ORDER BY date DESC", SELECT_TRANSACTION))
                .fetch_all(&self.pool)
                .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    /// One cashier's sales, newest first.
    pub async fn list_by_cashier(&self, cashier_id: &str) -> DbResult<Vec<Transaction>> {
        let rows: Vec<TransactionRow> = sqlx::query_as(&format!(
            "{} WHERE cashier_id = ?1 ORDER BY date DESC",
            SELECT_TRANSACTION
        ))
        .bind(cashier_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Transaction::try_from).collect()
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Transaction>> {
        fetch_by_id(&self.pool, id).await
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM transactions")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
