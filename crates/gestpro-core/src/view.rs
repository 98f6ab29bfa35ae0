//! # Store View
//!
//! The terminal's in-memory copy of the persisted store.
//!
//! ## Who Writes Here
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   gestpro-db (source of truth)                                          │
//! │        │                                                                │
//! │        │ load / reload after restore                                    │
//! │        ▼                                                                │
//! │   ┌──────────────────────────┐                                          │
//! │   │        StoreView         │ ◄── upsert/remove only AFTER the         │
//! │   │  products  suppliers     │     database accepted the write          │
//! │   │  transactions  settings  │                                          │
//! │   └──────────────────────────┘ ◄── apply_stock_levels with the values   │
//! │        │                            returned by a committed sale        │
//! │        ▼                                                                │
//! │   Cart scans, reports, backup capture                                   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The view never derives stock on its own. A failed write leaves it
//! exactly as it was.

use crate::settlement::StockLevel;
use crate::types::{Product, StoreSettings, Supplier, Transaction};

/// Label shown for a product with no supplier.
pub const NO_SUPPLIER_LABEL: &str = "-";

/// Label shown for a supplier reference that no longer resolves.
pub const UNKNOWN_SUPPLIER_LABEL: &str = "unknown";

/// In-memory mirror of the four persisted collections.
#[derive(Debug, Clone, Default)]
pub struct StoreView {
    products: Vec<Product>,
    suppliers: Vec<Supplier>,
    /// Newest first.
    transactions: Vec<Transaction>,
    settings: Option<StoreSettings>,
}

impl StoreView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a view from freshly loaded collections.
    pub fn from_parts(
        products: Vec<Product>,
        suppliers: Vec<Supplier>,
        mut transactions: Vec<Transaction>,
        settings: Option<StoreSettings>,
    ) -> Self {
        transactions.sort_by(|a, b| b.date.cmp(&a.date));
        StoreView {
            products,
            suppliers,
            transactions,
            settings,
        }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn suppliers(&self) -> &[Supplier] {
        &self.suppliers
    }

    /// All sales, newest first.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    /// Persisted settings, if the store has been initialized.
    pub fn stored_settings(&self) -> Option<&StoreSettings> {
        self.settings.as_ref()
    }

    /// Settings for display, falling back to the defaults.
    pub fn settings(&self) -> StoreSettings {
        self.settings.clone().unwrap_or_default()
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn supplier(&self, id: &str) -> Option<&Supplier> {
        self.suppliers.iter().find(|s| s.id == id)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    /// Exact SKU match, ignoring case (keyboard-wedge scanners).
    pub fn find_by_sku(&self, sku: &str) -> Option<&Product> {
        let sku = sku.trim();
        self.products
            .iter()
            .find(|p| p.sku.eq_ignore_ascii_case(sku))
    }

    /// Exact match on SKU or product id (camera scanner payloads).
    pub fn find_by_code(&self, code: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.sku == code || p.id == code)
    }

    /// Case-insensitive substring search over name and SKU.
    ///
    /// An empty query returns every product.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.products.iter().collect();
        }
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle) || p.sku.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Whether another product already uses `sku` (case-insensitive).
    pub fn sku_taken(&self, sku: &str, except_id: Option<&str>) -> bool {
        let sku = sku.trim();
        self.products
            .iter()
            .any(|p| p.sku.eq_ignore_ascii_case(sku) && Some(p.id.as_str()) != except_id)
    }

    /// Supplier name for a product: `"-"` with no reference, `"unknown"` when
    /// the reference no longer resolves.
    pub fn supplier_label(&self, product: &Product) -> &str {
        match product.supplier_id.as_deref() {
            None => NO_SUPPLIER_LABEL,
            Some(id) => self
                .supplier(id)
                .map(|s| s.name.as_str())
                .unwrap_or(UNKNOWN_SUPPLIER_LABEL),
        }
    }

    // =========================================================================
    // Writes (call only after the store accepted the change)
    // =========================================================================

    /// Replaces the product with the same id, or appends it.
    pub fn upsert_product(&mut self, product: Product) {
        match self.products.iter_mut().find(|p| p.id == product.id) {
            Some(existing) => *existing = product,
            None => self.products.push(product),
        }
    }

    pub fn remove_product(&mut self, id: &str) -> Option<Product> {
        let idx = self.products.iter().position(|p| p.id == id)?;
        Some(self.products.remove(idx))
    }

    /// Replaces the supplier with the same id, or appends it.
    pub fn upsert_supplier(&mut self, supplier: Supplier) {
        match self.suppliers.iter_mut().find(|s| s.id == supplier.id) {
            Some(existing) => *existing = supplier,
            None => self.suppliers.push(supplier),
        }
    }

    /// Removes a supplier. Products pointing at it are left untouched.
    pub fn remove_supplier(&mut self, id: &str) -> Option<Supplier> {
        let idx = self.suppliers.iter().position(|s| s.id == id)?;
        Some(self.suppliers.remove(idx))
    }

    pub fn set_settings(&mut self, settings: Option<StoreSettings>) {
        self.settings = settings;
    }

    /// Overwrites stock with the levels a committed sale reported.
    pub fn apply_stock_levels(&mut self, levels: &[StockLevel]) {
        for level in levels {
            if let Some(product) = self.products.iter_mut().find(|p| p.id == level.product_id) {
                product.stock = level.stock;
            }
        }
    }

    /// Records a committed sale (ignored if already present).
    pub fn record_transaction(&mut self, transaction: Transaction) {
        if self.transaction(&transaction.id).is_some() {
            return;
        }
        let pos = self
            .transactions
            .iter()
            .position(|t| t.date <= transaction.date)
            .unwrap_or(self.transactions.len());
        self.transactions.insert(pos, transaction);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, sku: &str, supplier: Option<&str>) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Product {}", id),
            category: "General".to_string(),
            selling_price_cents: 1000,
            purchase_price_cents: 600,
            stock: 5,
            sku: sku.to_string(),
            supplier_id: supplier.map(str::to_string),
            description: None,
            image_url: None,
        }
    }

    fn supplier(id: &str, name: &str) -> Supplier {
        Supplier {
            id: id.to_string(),
            name: name.to_string(),
            contact_name: None,
            email: None,
            phone: None,
        }
    }

    #[test]
    fn test_find_by_sku_ignores_case() {
        let view = StoreView::from_parts(vec![product("p1", "EL-001", None)], vec![], vec![], None);
        assert_eq!(view.find_by_sku("el-001").map(|p| p.id.as_str()), Some("p1"));
        assert!(view.find_by_code("el-001").is_none());
        assert!(view.find_by_code("p1").is_some());
    }

    #[test]
    fn test_supplier_labels() {
        let mut view = StoreView::from_parts(
            vec![
                product("p1", "A-1", Some("s1")),
                product("p2", "A-2", None),
            ],
            vec![supplier("s1", "TechGlobal Inc.")],
            vec![],
            None,
        );
        assert_eq!(view.supplier_label(&view.products()[0].clone()), "TechGlobal Inc.");
        assert_eq!(view.supplier_label(&view.products()[1].clone()), NO_SUPPLIER_LABEL);

        view.remove_supplier("s1");
        let p1 = view.product("p1").cloned().unwrap();
        assert_eq!(p1.supplier_id.as_deref(), Some("s1"));
        assert_eq!(view.supplier_label(&p1), UNKNOWN_SUPPLIER_LABEL);
    }

    #[test]
    fn test_sku_taken_excludes_self() {
        let view = StoreView::from_parts(vec![product("p1", "EL-001", None)], vec![], vec![], None);
        assert!(view.sku_taken("EL-001", None));
        assert!(view.sku_taken("el-001", Some("p2")));
        assert!(!view.sku_taken("EL-001", Some("p1")));
    }

    #[test]
    fn test_search_matches_name_and_sku() {
        let view = StoreView::from_parts(
            vec![product("p1", "EL-001", None), product("p2", "FU-002", None)],
            vec![],
            vec![],
            None,
        );
        assert_eq!(view.search("fu-").len(), 1);
        assert_eq!(view.search("product").len(), 2);
        assert_eq!(view.search("").len(), 2);
    }

    #[test]
    fn test_apply_stock_levels() {
        let mut view = StoreView::from_parts(vec![product("p1", "EL-001", None)], vec![], vec![], None);
        view.apply_stock_levels(&[StockLevel {
            product_id: "p1".to_string(),
            stock: 2,
        }]);
        assert_eq!(view.product("p1").unwrap().stock, 2);
    }
}
