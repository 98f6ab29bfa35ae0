//! # Repository Module
//!
//! Database repository implementations for GestPro.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PosTerminal                                                           │
//! │       │                                                                 │
//! │       │  db.products().insert(&draft)                                  │
//! │       ▼                                                                 │
//! │  ProductRepository / SupplierRepository / SettingsRepository           │
//! │  TransactionRepository (read-only)                                     │
//! │       │                                                                 │
//! │       │  SQL Query                                                      │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Each repository also exposes crate-private `insert_row`-style helpers │
//! │  generic over `sqlx::Executor`, so the settlement and snapshot code    │
//! │  can run the same statements inside their own transactions.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod product;
pub mod settings;
pub mod supplier;
pub mod transaction;
