//! # gestpro-core: Pure Business Logic for GestPro POS
//!
//! Every rule of checkout and stock settlement, as pure functions with zero
//! I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        GestPro Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 gestpro-pos (PosTerminal)                       │   │
//! │  │    add_to_cart, camera_scan, commit_sale, restore_backup ...    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ gestpro-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌────────────┐ ┌──────────┐           │   │
//! │  │   │  cart   │ │  scan   │ │ settlement │ │ snapshot │           │   │
//! │  │   │  Cart   │ │Debouncer│ │ check_line │ │BackupData│           │   │
//! │  │   └─────────┘ └─────────┘ └────────────┘ └──────────┘           │   │
//! │  │   ┌─────────┐ ┌─────────┐ ┌────────────┐ ┌──────────┐           │   │
//! │  │   │  types  │ │  money  │ │    view    │ │  report  │           │   │
//! │  │   └─────────┘ └─────────┘ └────────────┘ └──────────┘           │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 gestpro-db (Database Layer)                     │   │
//! │  │        SQLite, atomic commit, chunked restore and wipe          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Product, Supplier, CartItem, Transaction, StoreSettings, Session
//! - [`money`] - Integer money and the flat VAT rate
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules for catalog records
//! - [`cart`] - The cart engine and keyboard scan path
//! - [`scan`] - Camera scan debouncing
//! - [`settlement`] - Commit requests, per-line stock rule, commit results
//! - [`receipt`] - Tickets built from committed sales
//! - [`view`] - In-memory mirror of the persisted store
//! - [`snapshot`] - Backup bundle format
//! - [`report`] - Revenue, margin, stock and best-seller figures
//!
//! ## Example Usage
//!
//! ```rust
//! use gestpro_core::{Cart, CommitRequest, Product, Session};
//!
//! let mug = Product {
//!     id: "p1".into(),
//!     name: "Mug".into(),
//!     category: "Home".into(),
//!     selling_price_cents: 1250,
//!     purchase_price_cents: 500,
//!     stock: 10,
//!     sku: "HM-001".into(),
//!     supplier_id: None,
//!     description: None,
//!     image_url: None,
//! };
//!
//! let mut cart = Cart::new();
//! cart.add(&mug);
//! cart.add(&mug);
//!
//! let session = Session::new("cashier-1", "Alice");
//! let request = CommitRequest::from_cart("txn-1", &session, &cart).unwrap();
//! assert_eq!(request.compute_total().unwrap().cents(), 2500);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod receipt;
pub mod report;
pub mod scan;
pub mod settlement;
pub mod snapshot;
pub mod types;
pub mod validation;
pub mod view;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartSummary};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate, FLAT_VAT_RATE};
pub use receipt::Receipt;
pub use scan::{ScanDebouncer, ScanOutcome};
pub use settlement::{CommitRequest, Settlement, SettlementState, StockLevel};
pub use snapshot::{BackupData, Collection, StoreStatus, BACKUP_VERSION, MAX_CHUNK_SIZE};
pub use types::*;
pub use view::StoreView;

// =============================================================================
// Business Limits
// =============================================================================

/// Maximum distinct lines in a single cart.
///
/// ## Business Reason
/// Keeps a sale to a size one ticket can print and one commit can hold.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity on a single cart line.
///
/// ## Business Reason
/// Catches a slipped key (1000 typed for 10) before it reaches the stock.
pub const MAX_ITEM_QUANTITY: i64 = 999;
