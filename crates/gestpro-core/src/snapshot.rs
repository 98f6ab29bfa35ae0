//! # Backup Bundle
//!
//! The full-store export format and its version rules.
//!
//! ## File Format
//! ```json
//! {
//!   "version": "1.0",
//!   "date": "2026-03-01T10:15:00Z",
//!   "storeSettings": { "name": "GestPro Boutique", ... },
//!   "products":     [ { "id": "...", "sku": "EL-001", "supplierId": "s1", ... } ],
//!   "suppliers":    [ { "id": "s1", "name": "TechGlobal Inc.", ... } ],
//!   "transactions": [ { "id": "...", "items": [ ... ], "totalCents": 19999 } ]
//! }
//! ```
//!
//! Record ids are kept verbatim on restore so `supplierId` and the product
//! ids inside transaction lines still resolve afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::types::{Product, StoreSettings, Supplier, Transaction};
use crate::validation::{validate_product, validate_supplier};
use crate::view::StoreView;

/// Version written by this build.
pub const BACKUP_VERSION: &str = "1.0";

/// Largest number of records written per restore/wipe transaction.
pub const MAX_CHUNK_SIZE: usize = 400;

/// The four persisted collections, in restore order after settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum Collection {
    Suppliers,
    Products,
    Transactions,
    StoreSettings,
}

impl Collection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Suppliers => "suppliers",
            Collection::Products => "products",
            Collection::Transactions => "transactions",
            Collection::StoreSettings => "store_settings",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether the store has been set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub enum StoreStatus {
    /// A settings row exists.
    Ready,
    /// No settings row (fresh database or after a wipe).
    NeedsInitialization,
}

/// A complete, self-contained copy of the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct BackupData {
    pub version: String,
    #[ts(as = "String")]
    pub date: DateTime<Utc>,
    pub store_settings: StoreSettings,
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub suppliers: Vec<Supplier>,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl BackupData {
    /// Copies the view into a bundle stamped with `date`. Pure read.
    pub fn capture(view: &StoreView, date: DateTime<Utc>) -> Self {
        BackupData {
            version: BACKUP_VERSION.to_string(),
            date,
            store_settings: view.settings(),
            products: view.products().to_vec(),
            suppliers: view.suppliers().to_vec(),
            transactions: view.transactions().to_vec(),
        }
    }

    /// Pretty JSON, as written to backup files.
    pub fn to_json(&self) -> Result<String, ValidationError> {
        serde_json::to_string_pretty(self).map_err(|e| ValidationError::invalid("backup", e.to_string()))
    }

    /// Parses and version-checks a backup file.
    pub fn from_json(json: &str) -> Result<Self, ValidationError> {
        let data: BackupData =
            serde_json::from_str(json).map_err(|e| ValidationError::invalid("backup", e.to_string()))?;
        data.check_version()?;
        Ok(data)
    }

    /// Accepts any `1.x` tag.
    pub fn check_version(&self) -> Result<(), ValidationError> {
        let major = BACKUP_VERSION.split('.').next().unwrap_or_default();
        match self.version.split('.').next() {
            Some(m) if m == major => Ok(()),
            _ => Err(ValidationError::invalid(
                "version",
                format!("unsupported backup version '{}'", self.version),
            )),
        }
    }

    /// Checks the whole bundle before anything is written.
    ///
    /// ## Rules
    /// - Version is `1.x`
    /// - Every product and supplier passes its field validation
    /// - No empty or repeated ids within a collection
    /// - No SKU repeated (ignoring case)
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.check_version()?;

        let mut supplier_ids = HashSet::new();
        for supplier in &self.suppliers {
            validate_supplier(supplier)?;
            unique_id("supplier id", &supplier.id, &mut supplier_ids)?;
        }

        let mut product_ids = HashSet::new();
        let mut skus = HashSet::new();
        for product in &self.products {
            validate_product(product)?;
            unique_id("product id", &product.id, &mut product_ids)?;
            if !skus.insert(product.sku.trim().to_ascii_uppercase()) {
                return Err(ValidationError::Duplicate {
                    field: "sku".to_string(),
                    value: product.sku.trim().to_string(),
                });
            }
        }

        let mut transaction_ids = HashSet::new();
        for transaction in &self.transactions {
            unique_id("transaction id", &transaction.id, &mut transaction_ids)?;
        }

        Ok(())
    }

    /// Total records across all collections.
    pub fn record_count(&self) -> usize {
        self.products.len() + self.suppliers.len() + self.transactions.len()
    }
}

fn unique_id<'a>(field: &str, id: &'a str, seen: &mut HashSet<&'a str>) -> Result<(), ValidationError> {
    if id.trim().is_empty() {
        return Err(ValidationError::required(field));
    }
    if !seen.insert(id) {
        return Err(ValidationError::Duplicate {
            field: field.to_string(),
            value: id.to_string(),
        });
    }
    Ok(())
}

/// `gestpro_backup_<YYYY-MM-DD>.json`
pub fn backup_file_name(date: NaiveDate) -> String {
    format!("gestpro_backup_{}.json", date.format("%Y-%m-%d"))
}

/// Number of chunks needed to write `len` records `chunk_size` at a time.
pub fn chunk_count(len: usize, chunk_size: usize) -> usize {
    let size = chunk_size.clamp(1, MAX_CHUNK_SIZE);
    len.div_ceil(size)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_view() -> StoreView {
        StoreView::from_parts(
            vec![Product {
                id: "p1".to_string(),
                name: "Premium Headphones".to_string(),
                category: "Electronics".to_string(),
                selling_price_cents: 19999,
                purchase_price_cents: 12000,
                stock: 45,
                sku: "EL-001".to_string(),
                supplier_id: Some("s1".to_string()),
                description: None,
                image_url: None,
            }],
            vec![Supplier {
                id: "s1".to_string(),
                name: "TechGlobal Inc.".to_string(),
                contact_name: Some("John Smith".to_string()),
                email: None,
                phone: None,
            }],
            vec![],
            Some(StoreSettings::default()),
        )
    }

    #[test]
    fn test_capture_then_parse_preserves_records() {
        let backup = BackupData::capture(&sample_view(), Utc::now());
        let json = backup.to_json().unwrap();
        assert!(json.contains("\"storeSettings\""));
        assert!(json.contains("\"supplierId\": \"s1\""));

        let parsed = BackupData::from_json(&json).unwrap();
        assert_eq!(parsed, backup);
        assert_eq!(parsed.record_count(), 2);
    }

    #[test]
    fn test_version_check() {
        let mut backup = BackupData::capture(&sample_view(), Utc::now());
        backup.version = "1.3".to_string();
        assert!(backup.check_version().is_ok());

        backup.version = "2.0".to_string();
        assert!(backup.check_version().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_bundles() {
        let good = BackupData::capture(&sample_view(), Utc::now());
        assert!(good.validate().is_ok());

        let mut dup_sku = good.clone();
        let mut twin = dup_sku.products[0].clone();
        twin.id = "p2".to_string();
        twin.sku = "el-001".to_string();
        dup_sku.products.push(twin);
        assert_eq!(
            dup_sku.validate(),
            Err(ValidationError::Duplicate {
                field: "sku".to_string(),
                value: "el-001".to_string(),
            })
        );

        let mut negative = good.clone();
        negative.products[0].stock = -1;
        assert!(matches!(negative.validate(), Err(ValidationError::OutOfRange { .. })));

        let mut dup_supplier = good.clone();
        dup_supplier.suppliers.push(dup_supplier.suppliers[0].clone());
        assert!(matches!(dup_supplier.validate(), Err(ValidationError::Duplicate { .. })));

        let mut nameless = good;
        nameless.suppliers[0].name = "  ".to_string();
        assert!(matches!(nameless.validate(), Err(ValidationError::Required { .. })));
    }

    #[test]
    fn test_malformed_json_is_validation_error() {
        let err = BackupData::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 400), 0);
        assert_eq!(chunk_count(400, 400), 1);
        assert_eq!(chunk_count(401, 400), 2);
        // oversized chunks are capped
        assert_eq!(chunk_count(900, 10_000), 3);
    }

    #[test]
    fn test_backup_file_name() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(backup_file_name(date), "gestpro_backup_2026-03-01.json");
    }
}
