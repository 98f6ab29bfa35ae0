//! # POS Terminal
//!
//! The facade a front end drives: one cashier session, one cart, an
//! in-memory view of the store, and the database behind it.
//!
//! ## Ownership
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PosTerminal (&mut self for every write)                                │
//! │                                                                         │
//! │   session ─────── cashier id stamped on every sale                      │
//! │   cart ────────── lines in scan order                                   │
//! │   view ────────── products / suppliers / sales / settings              │
//! │                   refreshed ONLY from what the database returned        │
//! │   pending id ──── minted on first commit attempt, reused on retry,     │
//! │                   dropped on success, rejection or cart change          │
//! │   state ───────── Open → Committing → Committed | Rejected             │
//! │                                                                         │
//! │   db ──────────── gestpro-db::Database                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use gestpro_core::report::{self, BestSeller, DailyRevenue, InventoryValue, RevenueSummary};
use gestpro_core::scan;
use gestpro_core::settlement::new_transaction_id;
use gestpro_core::snapshot::backup_file_name;
use gestpro_core::validation::{validate_product, validate_search_query, validate_stock, validate_supplier};
use gestpro_core::{
    BackupData, Cart, CartSummary, CommitRequest, Money, Product, Receipt, ScanDebouncer,
    ScanOutcome, Session, SettlementState, StockLevel, StoreSettings, StoreStatus, StoreView,
    Supplier, Transaction, ValidationError, MAX_CART_ITEMS, MAX_ITEM_QUANTITY,
};
use gestpro_db::{CommitError, Database, RestoreReport, WipeReport};

use crate::advisory::Advisor;
use crate::config::PosConfig;
use crate::error::{PosError, PosResult};

/// A checkout terminal bound to one cashier session.
#[derive(Debug)]
pub struct PosTerminal {
    db: Database,
    config: PosConfig,
    session: Session,
    view: StoreView,
    cart: Cart,
    debouncer: ScanDebouncer,
    pending_transaction_id: Option<String>,
    state: SettlementState,
    last_receipt: Option<Receipt>,
    advisor: Advisor,
}

impl PosTerminal {
    /// Opens the configured database and loads the store.
    pub async fn open(config: PosConfig, session: Session) -> PosResult<Self> {
        let db = Database::new(config.db_config()).await?;
        Self::with_database(db, config, session).await
    }

    /// Builds a terminal on an already opened database.
    pub async fn with_database(db: Database, config: PosConfig, session: Session) -> PosResult<Self> {
        let view = db.load_view().await?;
        info!(
            cashier_id = %session.cashier_id,
            products = view.products().len(),
            transactions = view.transactions().len(),
            "Terminal ready"
        );

        Ok(PosTerminal {
            db,
            debouncer: ScanDebouncer::new(config.checkout.scan_debounce_ms),
            config,
            session,
            view,
            cart: Cart::new(),
            pending_transaction_id: None,
            state: SettlementState::Open,
            last_receipt: None,
            advisor: Advisor::disabled(),
        })
    }

    /// Attaches a text generator for the advisory helpers.
    pub fn with_advisor(mut self, advisor: Advisor) -> Self {
        self.advisor = advisor;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &PosConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn view(&self) -> &StoreView {
        &self.view
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn cart_summary(&self) -> CartSummary {
        self.cart.summary()
    }

    pub fn settlement_state(&self) -> &SettlementState {
        &self.state
    }

    /// Id the next commit attempt will use, if one is pending a retry.
    pub fn pending_transaction_id(&self) -> Option<&str> {
        self.pending_transaction_id.as_deref()
    }

    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.last_receipt.as_ref()
    }

    /// Re-reads every collection from the database.
    pub async fn reload_view(&mut self) -> PosResult<()> {
        self.view = self.db.load_view().await?;
        debug!(products = self.view.products().len(), "View reloaded");
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Adds one unit of a product. Products with no stock left are refused.
    pub fn add_to_cart(&mut self, product_id: &str) -> PosResult<CartSummary> {
        let product = self
            .view
            .product(product_id)
            .ok_or_else(|| PosError::not_found("Product", product_id))?;
        if !product.in_stock() {
            return Err(PosError::validation(format!("{} is out of stock", product.name)));
        }

        let product = product.clone();
        if !self.cart.add(&product) {
            return Err(PosError::validation(format!(
                "Cart limit reached: at most {} lines of up to {} units",
                MAX_CART_ITEMS, MAX_ITEM_QUANTITY
            )));
        }
        self.cart_changed();
        Ok(self.cart.summary())
    }

    /// Removes a line. Unknown ids leave the cart as it was.
    pub fn remove_from_cart(&mut self, product_id: &str) -> PosResult<CartSummary> {
        if self.cart.remove(product_id) {
            self.cart_changed();
        }
        Ok(self.cart.summary())
    }

    /// Applies `delta` to a line's quantity, kept within `1..=MAX_ITEM_QUANTITY`.
    pub fn set_quantity(&mut self, product_id: &str, delta: i64) -> PosResult<CartSummary> {
        if self.cart.set_quantity(product_id, delta) {
            self.cart_changed();
        }
        Ok(self.cart.summary())
    }

    pub fn clear_cart(&mut self) -> PosResult<CartSummary> {
        if !self.cart.is_empty() {
            self.cart.clear();
            self.cart_changed();
        }
        Ok(self.cart.summary())
    }

    /// Keyboard-wedge input. Returns the added product id; on no match the
    /// buffer is left for the cashier to correct.
    pub fn submit_scan_input(&mut self, buffer: &mut String) -> PosResult<Option<String>> {
        let added = self.cart.scan_input(buffer, &self.view);
        if added.is_some() {
            self.cart_changed();
        }
        Ok(added)
    }

    /// A decoded camera frame, stamped with when it was read.
    pub fn camera_scan(&mut self, code: &str, at: DateTime<Utc>) -> PosResult<ScanOutcome> {
        let outcome = scan::camera_scan(&mut self.cart, &self.view, &mut self.debouncer, code, at);
        match &outcome {
            ScanOutcome::Added { product_id, .. } => {
                debug!(code = %code, product_id = %product_id, "Camera scan added");
                self.cart_changed();
            }
            ScanOutcome::OutOfStock { product_name } => {
                info!(code = %code, product = %product_name, "Scanned product is out of stock");
            }
            ScanOutcome::NotFound { .. } => {
                warn!(code = %code, "Scanned code matches no product");
            }
            ScanOutcome::LimitReached { product_name } => {
                info!(code = %code, product = %product_name, "Cart limit reached, scan ignored");
            }
            ScanOutcome::Debounced => {}
        }
        Ok(outcome)
    }

    fn cart_changed(&mut self) {
        if let Some(id) = self.pending_transaction_id.take() {
            debug!(transaction_id = %id, "Cart changed, dropping pending transaction id");
        }
        self.state = SettlementState::Open;
    }

    // =========================================================================
    // Commit
    // =========================================================================

    /// Commits the cart as one sale and returns its receipt.
    ///
    /// ## Outcomes
    /// - success: cart cleared, view refreshed from the stored stock levels
    /// - rejection (`EMPTY_CART`, `INSUFFICIENT_STOCK`, `PRODUCT_VANISHED`):
    ///   cart kept, nothing written
    /// - `PERSISTENCE_ERROR`: cart kept; calling again reuses the same
    ///   transaction id so the sale is booked at most once
    pub async fn commit_sale(&mut self) -> PosResult<Receipt> {
        if self.cart.is_empty() {
            return Err(gestpro_core::CoreError::EmptyCart.into());
        }

        let transaction_id = self
            .pending_transaction_id
            .get_or_insert_with(new_transaction_id)
            .clone();
        let request = CommitRequest::from_cart(transaction_id.clone(), &self.session, &self.cart)?;

        self.state = SettlementState::Committing;
        let engine = self.db.settlement(self.config.checkout.commit_attempts);

        match engine.commit(&request).await {
            Ok(settlement) => {
                self.view.apply_stock_levels(&settlement.stock_levels);
                self.view.record_transaction(settlement.transaction.clone());

                let receipt = Receipt::from_transaction(&settlement.transaction, &self.view.settings());
                self.cart.clear();
                self.pending_transaction_id = None;
                self.state = SettlementState::Committed { transaction_id };
                self.last_receipt = Some(receipt.clone());
                Ok(receipt)
            }
            Err(CommitError::Rejected(reason)) => {
                info!(transaction_id = %transaction_id, reason = %reason, "Sale rejected");
                self.pending_transaction_id = None;
                self.state = SettlementState::Rejected {
                    reason: reason.to_string(),
                };
                Err(reason.into())
            }
            Err(CommitError::Persistence(err)) => {
                warn!(transaction_id = %transaction_id, error = %err, "Sale not persisted, retry keeps the id");
                self.state = SettlementState::Open;
                Err(err.into())
            }
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    pub fn search_products(&self, query: &str) -> PosResult<Vec<Product>> {
        let query = validate_search_query(query)?;
        Ok(self.view.search(&query).into_iter().cloned().collect())
    }

    /// Supplier name shown next to a product (`"-"` / `"unknown"`).
    pub fn supplier_label(&self, product_id: &str) -> PosResult<String> {
        let product = self
            .view
            .product(product_id)
            .ok_or_else(|| PosError::not_found("Product", product_id))?;
        Ok(self.view.supplier_label(product).to_string())
    }

    /// Creates a product under a store-assigned id.
    pub async fn create_product(&mut self, draft: Product) -> PosResult<Product> {
        validate_product(&draft)?;
        if self.view.sku_taken(&draft.sku, None) {
            return Err(duplicate_sku(&draft.sku));
        }

        let stored = self.db.products().insert(&draft).await?;
        info!(id = %stored.id, sku = %stored.sku, "Product created");
        self.view.upsert_product(stored.clone());
        Ok(stored)
    }

    pub async fn update_product(&mut self, product: Product) -> PosResult<()> {
        validate_product(&product)?;
        if self.view.sku_taken(&product.sku, Some(&product.id)) {
            return Err(duplicate_sku(&product.sku));
        }

        self.db.products().update(&product).await?;
        self.view.upsert_product(product);
        Ok(())
    }

    /// Deletes a product. Past sales keep their copy of it.
    pub async fn delete_product(&mut self, product_id: &str) -> PosResult<()> {
        self.db.products().delete(product_id).await?;
        self.view.remove_product(product_id);
        Ok(())
    }

    /// Manual stock correction.
    pub async fn set_stock(&mut self, product_id: &str, stock: i64) -> PosResult<()> {
        validate_stock(stock)?;
        self.db.products().set_stock(product_id, stock).await?;
        self.view.apply_stock_levels(&[StockLevel {
            product_id: product_id.to_string(),
            stock,
        }]);
        Ok(())
    }

    pub async fn create_supplier(&mut self, draft: Supplier) -> PosResult<Supplier> {
        validate_supplier(&draft)?;
        let stored = self.db.suppliers().insert(&draft).await?;
        info!(id = %stored.id, name = %stored.name, "Supplier created");
        self.view.upsert_supplier(stored.clone());
        Ok(stored)
    }

    pub async fn update_supplier(&mut self, supplier: Supplier) -> PosResult<()> {
        validate_supplier(&supplier)?;
        self.db.suppliers().update(&supplier).await?;
        self.view.upsert_supplier(supplier);
        Ok(())
    }

    /// Deletes a supplier; its products stay and show as "unknown".
    pub async fn delete_supplier(&mut self, supplier_id: &str) -> PosResult<()> {
        self.db.suppliers().delete(supplier_id).await?;
        self.view.remove_supplier(supplier_id);
        Ok(())
    }

    // =========================================================================
    // Store settings
    // =========================================================================

    pub async fn store_status(&self) -> PosResult<StoreStatus> {
        Ok(self.db.settings().status().await?)
    }

    pub async fn update_settings(&mut self, settings: StoreSettings) -> PosResult<()> {
        if settings.name.trim().is_empty() {
            return Err(ValidationError::required("name").into());
        }
        self.db.settings().upsert(&settings).await?;
        self.view.set_settings(Some(settings));
        Ok(())
    }

    /// Leaves `NeedsInitialization` by writing the first settings row.
    pub async fn initialize_store(&mut self, settings: StoreSettings) -> PosResult<()> {
        if settings.name.trim().is_empty() {
            return Err(ValidationError::required("name").into());
        }
        self.snapshots().initialize(&settings).await?;
        self.view.set_settings(Some(settings));
        Ok(())
    }

    // =========================================================================
    // Backup / restore
    // =========================================================================

    /// Copy of the store as this terminal sees it.
    pub fn capture_backup(&self) -> BackupData {
        BackupData::capture(&self.view, Utc::now())
    }

    /// `(file name, pretty JSON)` ready to be written out.
    pub fn capture_backup_json(&self) -> PosResult<(String, String)> {
        let backup = self.capture_backup();
        let json = backup.to_json()?;
        Ok((backup_file_name(backup.date.date_naive()), json))
    }

    /// Replaces the store with `backup`, then reloads the view.
    ///
    /// The bundle is validated as a whole first; a bad record is a
    /// `VALIDATION_ERROR` and nothing is deleted. The view is reloaded even
    /// when the restore stops part way, so it shows the mixed state the
    /// store is actually in.
    pub async fn restore_backup(&mut self, backup: &BackupData) -> PosResult<RestoreReport> {
        backup.validate()?;

        let outcome = self.snapshots().restore(backup).await;
        self.pending_transaction_id = None;
        self.state = SettlementState::Open;

        let reload = self.reload_view().await;
        let report = outcome?;
        reload?;
        Ok(report)
    }

    pub async fn restore_backup_json(&mut self, json: &str) -> PosResult<RestoreReport> {
        let backup = BackupData::from_json(json)?;
        self.restore_backup(&backup).await
    }

    /// Deletes everything. The store needs initialization afterwards.
    pub async fn wipe_store(&mut self) -> PosResult<WipeReport> {
        let report = self.snapshots().wipe().await?;
        self.cart.clear();
        self.cart_changed();
        self.last_receipt = None;
        self.reload_view().await?;
        Ok(report)
    }

    fn snapshots(&self) -> gestpro_db::SnapshotManager {
        self.db.snapshots(self.config.snapshot.chunk_size)
    }

    // =========================================================================
    // Reports
    // =========================================================================

    pub fn revenue_summary(&self) -> RevenueSummary {
        report::revenue_summary(self.view.transactions())
    }

    pub fn total_margin(&self) -> Money {
        report::total_margin(&self.view)
    }

    pub fn inventory_value(&self) -> InventoryValue {
        report::inventory_value(self.view.products())
    }

    pub fn low_stock(&self) -> Vec<Product> {
        report::low_stock(self.view.products(), self.config.checkout.low_stock_threshold)
            .into_iter()
            .cloned()
            .collect()
    }

    pub fn best_sellers(&self) -> Vec<BestSeller> {
        report::best_sellers(self.view.transactions(), report::BEST_SELLER_COUNT)
    }

    pub fn daily_revenue(&self, today: DateTime<Utc>) -> Vec<DailyRevenue> {
        report::daily_revenue(self.view.transactions(), today, report::REVENUE_CHART_DAYS)
    }

    /// This session's cashier's sales, newest first.
    pub fn my_sales(&self) -> Vec<Transaction> {
        report::cashier_sales(self.view.transactions(), &self.session.cashier_id)
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn business_insight(&self, question: &str) -> String {
        self.advisor
            .business_insight(question, &self.view, self.config.checkout.low_stock_threshold)
            .await
    }

    pub async fn product_description(&self, name: &str, category: &str) -> String {
        self.advisor.product_description(name, category).await
    }
}

fn duplicate_sku(sku: &str) -> PosError {
    ValidationError::Duplicate {
        field: "sku".to_string(),
        value: sku.trim().to_string(),
    }
    .into()
}

// =============================================================================
// Unit Tests
// =============================================================================
