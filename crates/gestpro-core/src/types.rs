//! # Domain Types
//!
//! Core domain types used throughout GestPro.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    Supplier     │   │ StoreSettings   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄─┐│  id (UUID)      │   │  singleton      │       │
//! │  │  sku (unique)   │  ││  name           │   │  receipt header │       │
//! │  │  stock ≥ 0      │  ││  contact        │   │  + footer       │       │
//! │  │  supplier_id? ──┼──┼┘                 │   │                 │       │
//! │  └─────────────────┘  │└─────────────────┘   └─────────────────┘       │
//! │           ▲           │                                                 │
//! │           │ snapshot  │                                                 │
//! │  ┌────────┴────────┐  │┌─────────────────┐                             │
//! │  │    CartItem     │  ││  Transaction    │                             │
//! │  │  Product copy   │──┼►  items (frozen) │                             │
//! │  │  + quantity ≥ 1 │  ││  total (commit) │                             │
//! │  └─────────────────┘  │└─────────────────┘                             │
//! │                       └── may dangle after supplier delete              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All records serialize with camelCase keys; that is also the backup format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

/// Category given to products created without one.
pub const DEFAULT_CATEGORY: &str = "General";

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Store-assigned identifier (UUID v4).
    pub id: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    #[serde(default = "default_category")]
    pub category: String,

    /// Price charged at the till, in cents.
    pub selling_price_cents: i64,

    /// Price paid to the supplier, in cents (for margin reports).
    pub purchase_price_cents: i64,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Stock Keeping Unit, unique across the catalog (case-insensitive).
    pub sku: String,

    /// Supplier reference. May dangle after the supplier is deleted.
    #[serde(default)]
    pub supplier_id: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub image_url: Option<String>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.selling_price_cents)
    }

    /// Returns the purchase price as Money.
    #[inline]
    pub fn purchase_price(&self) -> Money {
        Money::from_cents(self.purchase_price_cents)
    }

    /// Whether at least one unit can be sold.
    #[inline]
    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

// =============================================================================
// Supplier
// =============================================================================

/// A supplier products can be bought from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

// =============================================================================
// Cart Item
// =============================================================================

/// A line in the cart.
///
/// Holds a full copy of the product taken when the line was first added, so
/// later catalog edits never change what the cashier sees or what gets sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartItem {
    /// Product snapshot (frozen at add time).
    #[serde(flatten)]
    pub product: Product,

    /// Units in the cart, always ≥ 1.
    pub quantity: i64,
}

impl CartItem {
    /// A new line with quantity 1.
    pub fn from_product(product: Product) -> Self {
        CartItem {
            product,
            quantity: 1,
        }
    }

    #[inline]
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.product.price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A committed sale. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Transaction {
    pub id: String,

    /// When the sale was committed.
    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// Who rang the sale up.
    pub cashier_id: String,

    /// Lines in scan order.
    pub items: Vec<CartItem>,

    /// Σ price × quantity, computed when the sale was committed.
    pub total_cents: i64,
}

impl Transaction {
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }

    /// Total units sold across all lines.
    pub fn units(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Store identity printed on receipts. One per store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StoreSettings {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub receipt_footer: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            name: "GestPro Boutique".to_string(),
            address: "123 Avenue de l'Innovation".to_string(),
            city: "75001 Paris, France".to_string(),
            phone: "01 23 45 67 89".to_string(),
            email: "contact@gestpro-boutique.com".to_string(),
            logo_url: None,
            receipt_footer: "Merci de votre visite ! À bientôt.".to_string(),
        }
    }
}

// =============================================================================
// Session
// =============================================================================

/// The cashier on shift, passed explicitly to every operation that records
/// who did what.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Session {
    pub cashier_id: String,
    pub cashier_name: String,
}

impl Session {
    pub fn new(cashier_id: impl Into<String>, cashier_name: impl Into<String>) -> Self {
        Session {
            cashier_id: cashier_id.into(),
            cashier_name: cashier_name.into(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn headphones() -> Product {
        Product {
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
        }
    }

    #[test]
    fn test_cart_item_line_total() {
        let mut item = CartItem::from_product(headphones());
        item.quantity = 3;
        assert_eq!(item.line_total().cents(), 59997);
    }

    #[test]
    fn test_cart_item_serializes_flat() {
        let item = CartItem::from_product(headphones());
        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["sku"], "EL-001");
        assert_eq!(json["sellingPriceCents"], 19999);
        assert_eq!(json["quantity"], 1);
    }

    #[test]
    fn test_product_category_defaults() {
        let json = r#"{
            "id": "p9", "name": "Mug", "sellingPriceCents": 500,
            "purchasePriceCents": 200, "stock": 3, "sku": "HM-009"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.category, DEFAULT_CATEGORY);
        assert_eq!(product.supplier_id, None);
    }

    #[test]
    fn test_default_settings() {
        let settings = StoreSettings::default();
        assert_eq!(settings.name, "GestPro Boutique");
        assert!(settings.receipt_footer.starts_with("Merci"));
    }
}
