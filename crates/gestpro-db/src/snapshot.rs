//! # Snapshot Manager
//!
//! Whole-store restore and wipe, written in bounded chunks.
//!
//! ## Restore Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  1. store_settings   upsert, one transaction                           │
//! │         │             failure ──► RestoreError::Persistence             │
//! │         ▼             (nothing changed)                                 │
//! │  2. suppliers    ┐                                                      │
//! │  3. products     ├─ delete existing rows  (chunk per transaction)       │
//! │  4. transactions ┘  insert backup rows    (chunk per transaction)       │
//! │                       failure ──► RestoreError::Partial                 │
//! │                                   (earlier chunks stay committed)       │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ids are written exactly as they appear in the backup, so product to
//! supplier and transaction line to product references survive the trip.
//!
//! A restore is NOT atomic as a whole. Callers reload their in-memory view
//! after it returns, whether it succeeded or not.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult, RestoreError};
use crate::repository::{product, settings, supplier, transaction};
use gestpro_core::snapshot::chunk_count;
use gestpro_core::{BackupData, Collection, StoreSettings, StoreStatus, StoreView, MAX_CHUNK_SIZE};

/// Collections replaced by a restore, in write order.
const RESTORE_ORDER: [Collection; 3] = [
    Collection::Suppliers,
    Collection::Products,
    Collection::Transactions,
];

/// Collections emptied by a wipe, referencing rows first.
const WIPE_ORDER: [Collection; 3] = [
    Collection::Transactions,
    Collection::Products,
    Collection::Suppliers,
];

/// What a completed restore wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreReport {
    pub chunk_size: usize,
    pub suppliers: usize,
    pub products: usize,
    pub transactions: usize,
    /// Insert chunks committed across all collections.
    pub chunks: usize,
}

/// What a wipe deleted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WipeReport {
    pub suppliers: u64,
    pub products: u64,
    pub transactions: u64,
}

/// Restore, wipe and initialization of the whole store.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    pool: SqlitePool,
    chunk_size: usize,
}

impl SnapshotManager {
    /// `chunk_size` is clamped to `1..=400`.
    pub fn new(pool: SqlitePool, chunk_size: usize) -> Self {
        SnapshotManager {
            pool,
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// `Ready` once a settings row exists.
    pub async fn status(&self) -> DbResult<StoreStatus> {
        settings::SettingsRepository::new(self.pool.clone()).status().await
    }

    /// Writes the settings row, moving the store to `Ready`.
    pub async fn initialize(&self, store_settings: &StoreSettings) -> DbResult<()> {
        info!(name = %store_settings.name, "Initializing store");
        settings::upsert_row(&self.pool, store_settings).await
    }

    /// Reads every collection into a fresh [`StoreView`].
    pub async fn load_view(&self) -> DbResult<StoreView> {
        let products = product::ProductRepository::new(self.pool.clone()).list_all().await?;
        let suppliers = supplier::SupplierRepository::new(self.pool.clone()).list_all().await?;
        let transactions = transaction::TransactionRepository::new(self.pool.clone())
            .list_all()
            .await?;
        let store_settings = settings::SettingsRepository::new(self.pool.clone()).get().await?;
        Ok(StoreView::from_parts(products, suppliers, transactions, store_settings))
    }

    /// Backup of what is currently stored, stamped with `date`.
    pub async fn export(&self, date: DateTime<Utc>) -> DbResult<BackupData> {
        let view = self.load_view().await?;
        Ok(BackupData::capture(&view, date))
    }

    /// Replaces the store's content with `backup`.
    ///
    /// ## Errors
    /// * `RestoreError::Persistence` - settings write failed, store unchanged
    /// * `RestoreError::Partial` - a later chunk failed; see its fields for
    ///   how far the restore got
    pub async fn restore(&self, backup: &BackupData) -> Result<RestoreReport, RestoreError> {
        info!(
            version = %backup.version,
            records = backup.record_count(),
            chunk_size = self.chunk_size,
            "Starting restore"
        );

        let mut tx = self.pool.begin().await.map_err(DbError::from)?;
        settings::upsert_row(&mut *tx, &backup.store_settings).await?;
        tx.commit().await.map_err(DbError::from)?;

        let mut report = RestoreReport {
            chunk_size: self.chunk_size,
            ..RestoreReport::default()
        };
        let mut completed = vec![Collection::StoreSettings];

        for collection in RESTORE_ORDER {
            let mut committed_chunks = 0;
            let outcome = self
                .replace_collection(collection, backup, &mut committed_chunks)
                .await;

            if let Err(source) = outcome {
                warn!(
                    collection = %collection,
                    committed_chunks = committed_chunks,
                    error = %source,
                    "Restore stopped part way"
                );
                return Err(RestoreError::Partial {
                    collection,
                    committed_chunks,
                    completed,
                    source,
                });
            }

            let written = record_len(collection, backup);
            match collection {
                Collection::Suppliers => report.suppliers = written,
                Collection::Products => report.products = written,
                Collection::Transactions => report.transactions = written,
                Collection::StoreSettings => {}
            }
            report.chunks += committed_chunks;
            completed.push(collection);
        }

        info!(
            suppliers = report.suppliers,
            products = report.products,
            transactions = report.transactions,
            chunks = report.chunks,
            "Restore complete"
        );
        Ok(report)
    }

    /// Deletes every record and the settings row.
    ///
    /// The store ends in `NeedsInitialization`.
    pub async fn wipe(&self) -> DbResult<WipeReport> {
        info!("Wiping store");

        let mut report = WipeReport::default();
        for collection in WIPE_ORDER {
            let deleted = self.clear(collection).await?;
            match collection {
                Collection::Suppliers => report.suppliers = deleted,
                Collection::Products => report.products = deleted,
                Collection::Transactions => report.transactions = deleted,
                Collection::StoreSettings => {}
            }
        }

        sqlx::query("DELETE FROM store_settings")
            .execute(&self.pool)
            .await?;

        info!(
            suppliers = report.suppliers,
            products = report.products,
            transactions = report.transactions,
            "Store wiped"
        );
        Ok(report)
    }

    // =========================================================================
    // Chunked writes
    // =========================================================================

    async fn replace_collection(
        &self,
        collection: Collection,
        backup: &BackupData,
        committed_chunks: &mut usize,
    ) -> DbResult<()> {
        self.clear(collection).await?;

        let len = record_len(collection, backup);
        debug!(
            collection = %collection,
            records = len,
            chunks = chunk_count(len, self.chunk_size),
            "Writing collection"
        );

        let mut start = 0;
        while start < len {
            let end = (start + self.chunk_size).min(len);
            self.insert_chunk(collection, backup, start, end).await?;
            *committed_chunks += 1;
            start = end;
        }
        Ok(())
    }

    /// Inserts `backup[collection][start..end]` as one transaction.
    async fn insert_chunk(
        &self,
        collection: Collection,
        backup: &BackupData,
        start: usize,
        end: usize,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;
        match collection {
            Collection::Suppliers => {
                for record in &backup.suppliers[start..end] {
                    supplier::insert_row(&mut *tx, record).await?;
                }
            }
            Collection::Products => {
                for record in &backup.products[start..end] {
                    product::insert_row(&mut *tx, record).await?;
                }
            }
            Collection::Transactions => {
                for record in &backup.transactions[start..end] {
                    transaction::insert_row(&mut *tx, record).await?;
                }
            }
            Collection::StoreSettings => {
                settings::upsert_row(&mut *tx, &backup.store_settings).await?;
            }
        }
        tx.commit().await?;
        Ok(())
    }

    /// Deletes a collection `chunk_size` rows per transaction.
    async fn clear(&self, collection: Collection) -> DbResult<u64> {
        let table = collection.as_str();
        let statement = format!(
            "DELETE FROM {table} WHERE rowid IN (SELECT rowid FROM {table} LIMIT ?1)"
        );

        let mut deleted = 0;
        loop {
            let mut tx = self.pool.begin().await?;
            let result = sqlx::query(&statement)
                .bind(self.chunk_size as i64)
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            if result.rows_affected() == 0 {
                break;
            }
            deleted += result.rows_affected();
        }
        debug!(collection = %collection, deleted = deleted, "Collection cleared");
        Ok(deleted)
    }
}

fn record_len(collection: Collection, backup: &BackupData) -> usize {
    match collection {
        Collection::Suppliers => backup.suppliers.len(),
        Collection::Products => backup.products.len(),
        Collection::Transactions => backup.transactions.len(),
        Collection::StoreSettings => 1,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::TimeZone;
    use gestpro_core::{CartItem, Product, Supplier, Transaction};

    fn supplier(id: &str, name: &str) -> Supplier {
        Supplier {
            id: id.to_string(),
            name: name.to_string(),
            contact_name: None,
            email: None,
            phone: None,
        }
    }

    fn product(id: &str, sku: &str, supplier_id: &str) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {id}"),
            category: "Electronics".to_string(),
            selling_price_cents: 12950,
            purchase_price_cents: 8000,
            stock: 8,
            sku: sku.to_string(),
            supplier_id: Some(supplier_id.to_string()),
            description: None,
            image_url: None,
        }
    }

    fn backup() -> BackupData {
        let products = vec![
            product("p1", "EL-001", "s1"),
            product("p2", "AC-002", "s1"),
            product("p3", "EL-003", "s2"),
            product("p4", "HM-004", "s3"),
            product("p5", "FR-005", "s2"),
        ];
        let date = Utc.with_ymd_and_hms(2026, 3, 1, 10, 15, 0).unwrap();
        let transactions = vec![Transaction {
            id: "t1".to_string(),
            date,
            cashier_id: "u2".to_string(),
            items: vec![CartItem {
                product: products[0].clone(),
                quantity: 2,
            }],
            total_cents: 25900,
        }];
        BackupData {
            version: "1.0".to_string(),
            date,
            store_settings: StoreSettings::default(),
            products,
            suppliers: vec![
                supplier("s1", "TechGlobal Inc."),
                supplier("s2", "Office Comfort Ltd."),
                supplier("s3", "Home Essentials"),
            ],
            transactions,
        }
    }

    #[tokio::test]
    async fn test_multi_chunk_restore_writes_everything() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snapshots = db.snapshots(2);

        let report = snapshots.restore(&backup()).await.unwrap();
        assert_eq!(report.products, 5);
        assert_eq!(report.suppliers, 3);
        assert_eq!(report.transactions, 1);
        // 2 supplier chunks + 3 product chunks + 1 transaction chunk
        assert_eq!(report.chunks, 6);

        assert_eq!(db.products().count().await.unwrap(), 5);
        let p4 = db.products().get_by_id("p4").await.unwrap().unwrap();
        assert_eq!(p4.supplier_id.as_deref(), Some("s3"));
        assert_eq!(snapshots.status().await.unwrap(), StoreStatus::Ready);
    }

    #[tokio::test]
    async fn test_restore_replaces_existing_rows() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.products().insert(&product("old", "OLD-1", "s9")).await.unwrap();

        db.snapshots(400).restore(&backup()).await.unwrap();

        assert!(db.products().get_by_sku("OLD-1").await.unwrap().is_none());
        assert_eq!(db.products().count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_export_restore_round_trip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snapshots = db.snapshots(3);
        let original = backup();
        snapshots.restore(&original).await.unwrap();

        let exported = snapshots.export(original.date).await.unwrap();
        let fresh = Database::new(DbConfig::in_memory()).await.unwrap();
        fresh.snapshots(3).restore(&exported).await.unwrap();
        let again = fresh.snapshots(3).export(original.date).await.unwrap();

        assert_eq!(again, exported);
        assert_eq!(exported.store_settings, original.store_settings);
        assert_eq!(exported.transactions, original.transactions);

        let mut products = exported.products.clone();
        products.sort_by(|a, b| a.id.cmp(&b.id));
        assert_eq!(products, original.products);
    }

    #[tokio::test]
    async fn test_wipe_needs_initialization() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let snapshots = db.snapshots(2);
        snapshots.restore(&backup()).await.unwrap();

        let report = snapshots.wipe().await.unwrap();
        assert_eq!(
            report,
            WipeReport {
                suppliers: 3,
                products: 5,
                transactions: 1
            }
        );
        assert_eq!(snapshots.status().await.unwrap(), StoreStatus::NeedsInitialization);
        assert_eq!(db.products().count().await.unwrap(), 0);

        snapshots.initialize(&StoreSettings::default()).await.unwrap();
        assert_eq!(snapshots.status().await.unwrap(), StoreStatus::Ready);
    }

    #[tokio::test]
    async fn test_partial_restore_reports_progress() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let mut data = backup();
        data.products[3].sku = "el-001".to_string();

        let err = db.snapshots(2).restore(&data).await.unwrap_err();
        match err {
            RestoreError::Partial {
                collection,
                committed_chunks,
                completed,
                source,
            } => {
                assert_eq!(collection, Collection::Products);
                assert_eq!(committed_chunks, 1);
                assert_eq!(completed, vec![Collection::StoreSettings, Collection::Suppliers]);
                assert!(matches!(source, DbError::UniqueViolation { .. }));
            }
            other => panic!("expected Partial, got {other:?}"),
        }

        // First chunk stays, the failing chunk rolled back.
        assert_eq!(db.products().count().await.unwrap(), 2);
        assert_eq!(db.suppliers().list_all().await.unwrap().len(), 3);
    }
}
