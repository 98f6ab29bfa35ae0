//! # Settlement Rules
//!
//! The pure half of committing a sale. The database layer runs these rules
//! inside a single SQLite transaction; nothing here performs I/O.
//!
//! ## Commit Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   ┌────────┐  commit_sale   ┌────────────┐                              │
//! │   │  Open  │ ─────────────► │ Committing │                              │
//! │   └────────┘                └─────┬──────┘                              │
//! │       ▲                           │                                     │
//! │       │            ┌──────────────┼────────────────┐                    │
//! │       │            ▼              ▼                ▼                    │
//! │       │   ┌──────────────┐ ┌─────────────┐ ┌──────────────────┐         │
//! │       │   │  Committed   │ │  Rejected   │ │ PersistenceError │         │
//! │       │   │ (txn id)     │ │ (reason)    │ │ (retry same id)  │         │
//! │       │   └──────┬───────┘ └──────┬──────┘ └────────┬─────────┘         │
//! │       └──────────┴────────────────┴─────────────────┘                   │
//! │                   next cart change / next sale                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-line Check
//! For every line the committing transaction reads the current stock and
//! calls [`check_line`]:
//!
//! | stock read | outcome                                   |
//! |------------|-------------------------------------------|
//! | none       | `ProductVanished`                         |
//! | < quantity | `InsufficientStock { requested, available }` |
//! | ≥ quantity | new stock = stock − quantity              |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::cart::Cart;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{CartItem, Session, Transaction};
use crate::validation::validate_quantity;
use crate::MAX_CART_ITEMS;

// =============================================================================
// State
// =============================================================================

/// Where the current cart is in its commit lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "state", rename_all = "camelCase")]
#[ts(export)]
pub enum SettlementState {
    #[default]
    Open,
    Committing,
    #[serde(rename_all = "camelCase")]
    Committed { transaction_id: String },
    Rejected { reason: String },
}

// =============================================================================
// Commit Request
// =============================================================================

/// Everything the database needs to commit one sale.
///
/// `transaction_id` is minted by the terminal before the first attempt and
/// reused on retry, which makes a retried commit idempotent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub transaction_id: String,
    pub cashier_id: String,
    /// Copy of the cart lines, in scan order.
    pub items: Vec<CartItem>,
}

impl CommitRequest {
    /// Builds a request from the cart, rejecting an empty one.
    pub fn from_cart(transaction_id: impl Into<String>, session: &Session, cart: &Cart) -> CoreResult<Self> {
        CommitRequest::new(transaction_id, &session.cashier_id, cart.items().to_vec())
    }

    /// Builds a request from raw lines.
    pub fn new(
        transaction_id: impl Into<String>,
        cashier_id: impl Into<String>,
        items: Vec<CartItem>,
    ) -> CoreResult<Self> {
        if items.is_empty() {
            return Err(CoreError::EmptyCart);
        }
        if items.len() > MAX_CART_ITEMS {
            return Err(ValidationError::OutOfRange {
                field: "cart lines".to_string(),
                min: 1,
                max: MAX_CART_ITEMS as i64,
            }
            .into());
        }
        for item in &items {
            validate_quantity(item.quantity)?;
        }

        let request = CommitRequest {
            transaction_id: transaction_id.into(),
            cashier_id: cashier_id.into(),
            items,
        };
        request.compute_total()?;
        Ok(request)
    }

    /// Σ price × quantity. This, never a caller-supplied figure, is what gets
    /// persisted.
    ///
    /// Fails with a validation error rather than wrapping when the total
    /// does not fit in an `i64` of cents.
    pub fn compute_total(&self) -> CoreResult<Money> {
        self.items.iter().try_fold(Money::zero(), |total, item| {
            item.product
                .price()
                .checked_multiply_quantity(item.quantity)
                .and_then(|line| total.checked_add(line))
                .ok_or_else(|| CoreError::from(ValidationError::invalid("total", "amount too large")))
        })
    }

    /// The immutable sale record for this request.
    pub fn into_transaction(self, date: DateTime<Utc>) -> CoreResult<Transaction> {
        let total_cents = self.compute_total()?.cents();
        Ok(Transaction {
            id: self.transaction_id,
            date,
            cashier_id: self.cashier_id,
            items: self.items,
            total_cents,
        })
    }
}

/// Mints a fresh transaction id.
pub fn new_transaction_id() -> String {
    Uuid::new_v4().to_string()
}

/// Applies one line against the stock read inside the commit.
///
/// Returns the stock level the product will have after this line.
pub fn check_line(item: &CartItem, current_stock: Option<i64>) -> CoreResult<i64> {
    let Some(available) = current_stock else {
        return Err(CoreError::ProductVanished {
            product_name: item.product.name.clone(),
        });
    };

    let remaining = available - item.quantity;
    if remaining < 0 {
        return Err(CoreError::InsufficientStock {
            product_name: item.product.name.clone(),
            requested: item.quantity,
            available,
        });
    }
    Ok(remaining)
}

// =============================================================================
// Commit Result
// =============================================================================

/// Post-commit stock level of one product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockLevel {
    pub product_id: String,
    pub stock: i64,
}

/// What a successful commit hands back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Settlement {
    /// The stored sale record.
    pub transaction: Transaction,
    /// Stock of every product the sale touched, as stored after commit.
    pub stock_levels: Vec<StockLevel>,
    /// `true` when this id was already committed and nothing was written.
    pub replayed: bool,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Product;
    use crate::MAX_ITEM_QUANTITY;

    fn item(name: &str, price: i64, quantity: i64) -> CartItem {
        CartItem {
            product: Product {
                id: format!("id-{}", name),
                name: name.to_string(),
                category: "General".to_string(),
                selling_price_cents: price,
                purchase_price_cents: 0,
                stock: 0,
                sku: name.to_uppercase(),
                supplier_id: None,
                description: None,
                image_url: None,
            },
            quantity,
        }
    }

    #[test]
    fn test_empty_cart_rejected() {
        let session = Session::new("c1", "Alice");
        let err = CommitRequest::from_cart("t1", &session, &Cart::new()).unwrap_err();
        assert_eq!(err, CoreError::EmptyCart);
    }

    #[test]
    fn test_total_is_sum_of_lines() {
        let request = CommitRequest::new(
            "t1",
            "c1",
            vec![item("mug", 1999, 3), item("pen", 150, 2)],
        )
        .unwrap();
        assert_eq!(request.compute_total().unwrap().cents(), 1999 * 3 + 150 * 2);

        let txn = request.into_transaction(Utc::now()).unwrap();
        let recomputed: i64 = txn.items.iter().map(|i| i.line_total().cents()).sum();
        assert_eq!(txn.total_cents, recomputed);
        assert_eq!(txn.id, "t1");
    }

    #[test]
    fn test_check_line_exact_stock_leaves_zero() {
        assert_eq!(check_line(&item("mug", 100, 5), Some(5)), Ok(0));
    }

    #[test]
    fn test_check_line_insufficient() {
        let err = check_line(&item("mug", 100, 1), Some(0)).unwrap_err();
        assert_eq!(
            err,
            CoreError::InsufficientStock {
                product_name: "mug".to_string(),
                requested: 1,
                available: 0,
            }
        );
    }

    #[test]
    fn test_check_line_vanished() {
        let err = check_line(&item("mug", 100, 1), None).unwrap_err();
        assert!(matches!(err, CoreError::ProductVanished { .. }));
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        let err = CommitRequest::new("t1", "c1", vec![item("mug", 100, 0)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn test_oversized_request_rejected() {
        let err = CommitRequest::new("t1", "c1", vec![item("mug", 100, MAX_ITEM_QUANTITY + 1)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));

        let lines = (0..=MAX_CART_ITEMS).map(|n| item(&format!("p{}", n), 100, 1)).collect();
        let err = CommitRequest::new("t1", "c1", lines).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn test_total_overflow_is_rejected_not_wrapped() {
        let half = i64::MAX / 2 + 1;
        let err = CommitRequest::new("t1", "c1", vec![item("gold", half, 2)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ValidationError::InvalidFormat { .. })));

        let err = CommitRequest::new("t1", "c1", vec![item("gold", half, 1), item("bar", half, 1)]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // fields are public, so the persisted total is checked again
        let request = CommitRequest {
            transaction_id: "t1".to_string(),
            cashier_id: "c1".to_string(),
            items: vec![item("gold", half, 2)],
        };
        assert!(request.into_transaction(Utc::now()).is_err());
    }
}
