//! # Settlement Engine
//!
//! Commits a sale: stock checks, stock decrements and the transaction
//! insert run inside ONE SQLite transaction.
//!
//! ## One Attempt
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE                                                        │
//! │    │                                                                    │
//! │    ├── transaction id already stored? ──► ROLLBACK, return as replay    │
//! │    │                                                                    │
//! │    ├── for each line:                                                   │
//! │    │     SELECT stock            ──► check_line (vanished / short)      │
//! │    │     UPDATE products SET stock = stock - q                          │
//! │    │       WHERE id = ? AND stock >= q   (must touch exactly 1 row)     │
//! │    │                                                                    │
//! │    ├── INSERT INTO transactions (total computed here)                   │
//! │    │                                                                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Any early return drops the `sqlx::Transaction`, which rolls back.
//!
//! ## Write Conflicts
//! The attempt takes the write lock up front (`BEGIN IMMEDIATE`), so a
//! second writer waits in SQLite's busy handler (`DbConfig::busy_timeout`)
//! instead of failing on its first write after a read. Only when that wait
//! runs out does the attempt fail with [`DbError::Busy`]; the engine then
//! re-runs the whole attempt from the replay check, up to `max_attempts`
//! times.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{CommitError, DbError, DbResult};
use crate::repository::transaction;
use gestpro_core::settlement::check_line;
use gestpro_core::{CartItem, CommitRequest, CoreError, Settlement, StockLevel};

/// Attempts per commit when nothing else is configured.
pub const DEFAULT_COMMIT_ATTEMPTS: u32 = 3;

/// Runs sale commits against the store.
#[derive(Debug, Clone)]
pub struct SettlementEngine {
    pool: SqlitePool,
    max_attempts: u32,
}

impl SettlementEngine {
    pub fn new(pool: SqlitePool, max_attempts: u32) -> Self {
        SettlementEngine {
            pool,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Commits `request`, retrying on write conflicts.
    ///
    /// ## Returns
    /// * `Ok(Settlement)` - stored sale plus post-commit stock levels
    /// * `Err(CommitError::Rejected)` - empty cart, short stock, vanished product
    /// * `Err(CommitError::Persistence)` - storage failed, nothing written
    pub async fn commit(&self, request: &CommitRequest) -> Result<Settlement, CommitError> {
        if request.items.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        let mut attempt = 1;
        loop {
            match self.attempt(request).await {
                Err(CommitError::Persistence(err)) if err.is_busy() && attempt < self.max_attempts => {
                    warn!(
                        transaction_id = %request.transaction_id,
                        attempt = attempt,
                        error = %err,
                        "Commit hit a write conflict, retrying"
                    );
                    attempt += 1;
                    tokio::task::yield_now().await;
                }
                result => return result,
            }
        }
    }

    async fn attempt(&self, request: &CommitRequest) -> Result<Settlement, CommitError> {
        // write lock up front: a read-to-write upgrade fails busy without waiting
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        if let Some(existing) = transaction::fetch_by_id(&mut *tx, &request.transaction_id).await? {
            tx.rollback().await?;
            info!(transaction_id = %existing.id, "Commit replayed, sale already stored");
            let stock_levels = self.stock_levels(&existing.items).await?;
            return Ok(Settlement {
                transaction: existing,
                stock_levels,
                replayed: true,
            });
        }

        let mut stock_levels = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let current: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(item.product_id())
                .fetch_optional(&mut *tx)
                .await?;

            let remaining = check_line(item, current)?;

            let result = sqlx::query(
                "UPDATE products SET stock = stock - ?1 WHERE id = ?2 AND stock >= ?1",
            )
            .bind(item.quantity)
            .bind(item.product_id())
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() != 1 {
                return Err(CoreError::InsufficientStock {
                    product_name: item.product.name.clone(),
                    requested: item.quantity,
                    available: current.unwrap_or_default(),
                }
                .into());
            }

            debug!(product_id = %item.product_id(), stock = remaining, "Stock decremented");
            stock_levels.push(StockLevel {
                product_id: item.product_id().to_string(),
                stock: remaining,
            });
        }

        let sale = request.clone().into_transaction(Utc::now())?;
        transaction::insert_row(&mut *tx, &sale).await?;
        tx.commit().await?;

        info!(
            transaction_id = %sale.id,
            cashier_id = %sale.cashier_id,
            total_cents = sale.total_cents,
            lines = sale.items.len(),
            "Sale committed"
        );

        Ok(Settlement {
            transaction: sale,
            stock_levels,
            replayed: false,
        })
    }

    /// Current stock of the products a replayed sale touched.
    async fn stock_levels(&self, items: &[CartItem]) -> DbResult<Vec<StockLevel>> {
        let mut levels = Vec::with_capacity(items.len());
        for item in items {
            let stock: Option<i64> = sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                .bind(item.product_id())
                .fetch_optional(&self.pool)
                .await
                .map_err(DbError::from)?;
            if let Some(stock) = stock {
                levels.push(StockLevel {
                    product_id: item.product_id().to_string(),
                    stock,
                });
            }
        }
        Ok(levels)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use gestpro_core::Product;

    async fn stocked(db: &Database, sku: &str, price: i64, stock: i64) -> Product {
        db.products()
            .insert(&Product {
                id: String::new(),
                name: format!("Item {sku}"),
                category: "General".to_string(),
                selling_price_cents: price,
                purchase_price_cents: price / 2,
                stock,
                sku: sku.to_string(),
                supplier_id: None,
                description: None,
                image_url: None,
            })
            .await
            .unwrap()
    }

    fn line(product: &Product, quantity: i64) -> CartItem {
        CartItem {
            product: product.clone(),
            quantity,
        }
    }

    #[tokio::test]
    async fn test_sell_out_then_reject() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let engine = db.settlement(DEFAULT_COMMIT_ATTEMPTS);
        let product = stocked(&db, "FR-005", 25000, 5).await;

        let first = CommitRequest::new("t1", "u1", vec![line(&product, 5)]).unwrap();
        let settled = engine.commit(&first).await.unwrap();
        assert_eq!(
            settled.stock_levels,
            vec![StockLevel {
                product_id: product.id.clone(),
                stock: 0
            }]
        );

        let second = CommitRequest::new("t2", "u1", vec![line(&product, 1)]).unwrap();
        match engine.commit(&second).await.unwrap_err() {
            CommitError::Rejected(CoreError::InsufficientStock { requested, available, .. }) => {
                assert_eq!(requested, 1);
                assert_eq!(available, 0);
            }
            other => panic!("expected InsufficientStock, got {other:?}"),
        }
        assert_eq!(db.transactions().count().await.unwrap(), 1);
        assert!(db.transactions().get_by_id("t2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_short_line_rolls_back_whole_cart() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let engine = db.settlement(DEFAULT_COMMIT_ATTEMPTS);
        let mouse = stocked(&db, "AC-002", 4999, 120).await;
        let chair = stocked(&db, "FR-005", 25000, 3).await;

        let request = CommitRequest::new("t1", "u1", vec![line(&mouse, 2), line(&chair, 4)]).unwrap();
        assert!(matches!(
            engine.commit(&request).await,
            Err(CommitError::Rejected(CoreError::InsufficientStock { .. }))
        ));

        assert_eq!(db.products().get_stock(&mouse.id).await.unwrap(), Some(120));
        assert_eq!(db.products().get_stock(&chair.id).await.unwrap(), Some(3));
        assert_eq!(db.transactions().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_vanished_product() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let engine = db.settlement(DEFAULT_COMMIT_ATTEMPTS);
        let mouse = stocked(&db, "AC-002", 4999, 120).await;
        db.products().delete(&mouse.id).await.unwrap();

        let request = CommitRequest::new("t1", "u1", vec![line(&mouse, 1)]).unwrap();
        match engine.commit(&request).await.unwrap_err() {
            CommitError::Rejected(CoreError::ProductVanished { product_name }) => {
                assert_eq!(product_name, "Item AC-002");
            }
            other => panic!("expected ProductVanished, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replay_books_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let engine = db.settlement(DEFAULT_COMMIT_ATTEMPTS);
        let mouse = stocked(&db, "AC-002", 4999, 10).await;

        let request = CommitRequest::new("t1", "u1", vec![line(&mouse, 3)]).unwrap();
        let first = engine.commit(&request).await.unwrap();
        let again = engine.commit(&request).await.unwrap();

        assert!(!first.replayed);
        assert!(again.replayed);
        assert_eq!(again.transaction, first.transaction);
        assert_eq!(again.stock_levels, first.stock_levels);
        assert_eq!(db.products().get_stock(&mouse.id).await.unwrap(), Some(7));
        assert_eq!(db.transactions().count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_total_is_sum_of_lines() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let engine = db.settlement(DEFAULT_COMMIT_ATTEMPTS);
        let headphones = stocked(&db, "EL-001", 19999, 45).await;
        let stand = stocked(&db, "AC-006", 1599, 200).await;

        let request =
            CommitRequest::new("t1", "u2", vec![line(&headphones, 2), line(&stand, 3)]).unwrap();
        let settled = engine.commit(&request).await.unwrap();

        assert_eq!(settled.transaction.total_cents, 2 * 19999 + 3 * 1599);
        let stored = db.transactions().get_by_id("t1").await.unwrap().unwrap();
        assert_eq!(stored, settled.transaction);
        assert_eq!(stored.units(), 5);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_writers_on_one_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("race.db");
        let left = Database::new(DbConfig::new(&path)).await.unwrap();
        let right = Database::new(DbConfig::new(&path)).await.unwrap();
        let chair = stocked(&left, "FR-005", 25000, 5).await;

        let mut handles = Vec::new();
        for n in 0..20 {
            let db = if n % 2 == 0 { &left } else { &right };
            let engine = db.settlement(DEFAULT_COMMIT_ATTEMPTS);
            let request = CommitRequest::new(format!("t{n}"), "u1", vec![line(&chair, 1)]).unwrap();
            handles.push(tokio::spawn(async move { engine.commit(&request).await }));
        }

        let (mut sold, mut rejected) = (0, 0);
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => sold += 1,
                Err(CommitError::Rejected(CoreError::InsufficientStock { .. })) => rejected += 1,
                Err(other) => panic!("commit failed under contention: {other:?}"),
            }
        }

        assert_eq!((sold, rejected), (5, 15));
        assert_eq!(right.products().get_stock(&chair.id).await.unwrap(), Some(0));
        assert_eq!(right.transactions().count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_held_write_lock_is_busy_then_commits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.db");
        let holder = Database::new(DbConfig::new(&path)).await.unwrap();
        let waiter = Database::new(DbConfig::new(&path).busy_timeout(std::time::Duration::from_millis(50)))
            .await
            .unwrap();
        let mouse = stocked(&holder, "AC-002", 4999, 10).await;
        let request = CommitRequest::new("t1", "u1", vec![line(&mouse, 1)]).unwrap();

        let lock = holder.pool().begin_with("BEGIN IMMEDIATE").await.unwrap();
        match waiter.settlement(2).commit(&request).await.unwrap_err() {
            CommitError::Persistence(err) => assert!(err.is_busy(), "expected busy, got {err:?}"),
            other => panic!("expected a persistence error, got {other:?}"),
        }
        lock.rollback().await.unwrap();

        let settled = waiter.settlement(2).commit(&request).await.unwrap();
        assert!(!settled.replayed);
        assert_eq!(waiter.products().get_stock(&mouse.id).await.unwrap(), Some(9));
        assert_eq!(waiter.transactions().count().await.unwrap(), 1);
    }
}
