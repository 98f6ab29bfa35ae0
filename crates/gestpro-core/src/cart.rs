//! # Cart Engine
//!
//! The order being rung up, before it becomes a sale.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  add(product) ─────────┐                                                │
//! │  scan_input(buffer) ───┼──► line exists? ── yes ──► quantity += 1       │
//! │                        │          │                                     │
//! │                        │          no                                    │
//! │                        │          ▼                                     │
//! │                        │    push snapshot, quantity = 1                 │
//! │                        │                                                │
//! │  set_quantity(id, Δ) ──┴──► quantity = clamp(quantity + Δ, 1, 999)      │
//! │  remove(id) ───────────────► line gone                                  │
//! │                                                                         │
//! │  total() = Σ price × quantity   (never cached)                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! None of these touch stock. Stock is only checked and decremented when the
//! cart is committed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{CartItem, Product};
use crate::view::StoreView;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY};

/// Summary shown under the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CartSummary {
    /// Distinct lines.
    pub line_count: usize,
    /// Units across all lines.
    pub total_quantity: i64,
    pub total_cents: i64,
}

/// Ordered cart lines, keyed by product id.
///
/// ## Invariants
/// - At most one line per product id
/// - Every quantity is ≥ 1
/// - Lines stay in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product_id() == product_id)
    }

    /// Adds one unit of `product`.
    ///
    /// A new line snapshots the product as it is now. An existing line keeps
    /// its original snapshot and only gains a unit.
    ///
    /// Returns `false` and leaves the cart unchanged when the line is already
    /// at [`MAX_ITEM_QUANTITY`] or a new line would exceed [`MAX_CART_ITEMS`].
    pub fn add(&mut self, product: &Product) -> bool {
        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            if item.quantity >= MAX_ITEM_QUANTITY {
                return false;
            }
            item.quantity += 1;
            return true;
        }

        if self.items.len() >= MAX_CART_ITEMS {
            return false;
        }
        self.items.push(CartItem::from_product(product.clone()));
        true
    }

    /// Shifts a line's quantity by `delta`, clamped to `1..=MAX_ITEM_QUANTITY`.
    ///
    /// Returns `false` (and does nothing) for an id not in the cart.
    pub fn set_quantity(&mut self, product_id: &str, delta: i64) -> bool {
        match self.items.iter_mut().find(|i| i.product.id == product_id) {
            Some(item) => {
                item.quantity = item.quantity.saturating_add(delta).clamp(1, MAX_ITEM_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Drops a line entirely. Returns whether a line was removed.
    pub fn remove(&mut self, product_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.product.id != product_id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Σ price × quantity over all lines.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Units across all lines.
    pub fn units(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    pub fn summary(&self) -> CartSummary {
        CartSummary {
            line_count: self.items.len(),
            total_quantity: self.units(),
            total_cents: self.total().cents(),
        }
    }

    /// Keyboard-wedge scan fast path.
    ///
    /// Looks for a product whose SKU equals the buffer (ignoring case) and
    /// that has stock left. On a match the product is added and the buffer
    /// cleared. With no match, or a line already at its limit, nothing
    /// changes and the buffer is kept so the cashier can fix a typo.
    pub fn scan_input(&mut self, buffer: &mut String, view: &StoreView) -> Option<String> {
        let product = view
            .find_by_sku(buffer.as_str())
            .filter(|p| p.in_stock())?
            .clone();
        if !self.add(&product) {
            return None;
        }
        buffer.clear();
        Some(product.id)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, sku: &str, price: i64, stock: i64) -> Product {
        Product {
            id: id.to_string(),
            name: format!("Item {}", sku),
            category: "General".to_string(),
            selling_price_cents: price,
            purchase_price_cents: price / 2,
            stock,
            sku: sku.to_string(),
            supplier_id: None,
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn test_repeated_add_merges_into_one_line() {
        let p = product("p1", "EL-001", 19999, 45);
        let mut cart = Cart::new();
        for _ in 0..4 {
            cart.add(&p);
        }
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 4);
        assert_eq!(cart.total().cents(), 79996);
    }

    #[test]
    fn test_lines_keep_first_seen_order() {
        let a = product("a", "A-1", 100, 5);
        let b = product("b", "B-1", 200, 5);
        let mut cart = Cart::new();
        cart.add(&a);
        cart.add(&b);
        cart.add(&a);
        let ids: Vec<_> = cart.items().iter().map(|i| i.product_id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[test]
    fn test_snapshot_is_frozen_at_first_add() {
        let mut p = product("p1", "EL-001", 1000, 5);
        let mut cart = Cart::new();
        cart.add(&p);
        p.selling_price_cents = 5000;
        cart.add(&p);
        assert_eq!(cart.items()[0].product.selling_price_cents, 1000);
        assert_eq!(cart.total().cents(), 2000);
    }

    #[test]
    fn test_set_quantity_clamps_to_one() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "EL-001", 1000, 5));
        assert!(cart.set_quantity("p1", 3));
        assert_eq!(cart.items()[0].quantity, 4);
        assert!(cart.set_quantity("p1", -10));
        assert_eq!(cart.items()[0].quantity, 1);
        assert!(!cart.set_quantity("missing", 1));
    }

    #[test]
    fn test_remove_line() {
        let mut cart = Cart::new();
        cart.add(&product("p1", "EL-001", 1000, 5));
        assert!(cart.remove("p1"));
        assert!(cart.is_empty());
        assert!(!cart.remove("p1"));
    }

    #[test]
    fn test_scan_input_matches_case_insensitively() {
        let view = StoreView::from_parts(
            vec![product("p1", "EL-001", 1000, 5)],
            vec![],
            vec![],
            None,
        );
        let mut cart = Cart::new();
        let mut buffer = "el-001".to_string();

        assert_eq!(cart.scan_input(&mut buffer, &view), Some("p1".to_string()));
        assert!(buffer.is_empty());
        assert_eq!(cart.units(), 1);
    }

    #[test]
    fn test_scan_input_skips_out_of_stock_and_keeps_buffer() {
        let view = StoreView::from_parts(
            vec![product("p1", "EL-001", 1000, 0)],
            vec![],
            vec![],
            None,
        );
        let mut cart = Cart::new();
        let mut buffer = "EL-001".to_string();

        assert_eq!(cart.scan_input(&mut buffer, &view), None);
        assert_eq!(buffer, "EL-001");
        assert!(cart.is_empty());

        let mut typo = "EL-00".to_string();
        assert_eq!(cart.scan_input(&mut typo, &view), None);
        assert_eq!(typo, "EL-00");
    }

    #[test]
    fn test_summary() {
        let mut cart = Cart::new();
        let a = product("a", "A-1", 250, 5);
        cart.add(&a);
        cart.add(&a);
        cart.add(&product("b", "B-1", 100, 5));
        let summary = cart.summary();
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.total_quantity, 3);
        assert_eq!(summary.total_cents, 600);
    }

    #[test]
    fn test_quantity_is_capped() {
        let p = product("p1", "EL-001", 1000, 5000);
        let mut cart = Cart::new();
        cart.add(&p);

        assert!(cart.set_quantity("p1", i64::MAX));
        assert_eq!(cart.items()[0].quantity, MAX_ITEM_QUANTITY);
        assert!(!cart.add(&p));
        assert_eq!(cart.items()[0].quantity, MAX_ITEM_QUANTITY);

        assert!(cart.set_quantity("p1", i64::MIN));
        assert_eq!(cart.items()[0].quantity, 1);
    }

    #[test]
    fn test_line_count_is_capped() {
        let mut cart = Cart::new();
        for n in 0..MAX_CART_ITEMS {
            assert!(cart.add(&product(&format!("p{}", n), &format!("SKU-{}", n), 100, 5)));
        }
        assert!(!cart.add(&product("extra", "SKU-X", 100, 5)));
        assert_eq!(cart.len(), MAX_CART_ITEMS);

        // an existing line can still grow
        assert!(cart.add(&product("p0", "SKU-0", 100, 5)));
        assert_eq!(cart.units(), MAX_CART_ITEMS as i64 + 1);
    }

    #[test]
    fn test_huge_prices_do_not_wrap() {
        let p = product("p1", "EL-001", i64::MAX / 2 + 1, 5);
        let mut cart = Cart::new();
        cart.add(&p);
        cart.add(&p);
        assert_eq!(cart.total().cents(), i64::MAX);
    }
}
