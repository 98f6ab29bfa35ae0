//! # gestpro-db: Database Layer for GestPro
//!
//! SQLite persistence for the store: products, suppliers, committed sales
//! and the settings singleton, accessed asynchronously through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  PosTerminal (gestpro-pos)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   gestpro-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐  ┌──────────────┐  ┌─────────────────────────┐ │   │
//! │  │  │  Database  │  │ Repositories │  │ SettlementEngine        │ │   │
//! │  │  │ (pool.rs)  │  │ product      │  │  one txn per sale       │ │   │
//! │  │  │            │◄─│ supplier     │  ├─────────────────────────┤ │   │
//! │  │  │ SqlitePool │  │ transaction  │  │ SnapshotManager         │ │   │
//! │  │  │ migrations │  │ settings     │  │  chunked restore / wipe │ │   │
//! │  │  └────────────┘  └──────────────┘  └─────────────────────────┘ │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (WAL)                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gestpro_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("gestpro.db")).await?;
//! let settled = db.settlement(3).commit(&request).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod settlement;
pub mod snapshot;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{CommitError, DbError, DbResult, RestoreError};
pub use pool::{Database, DbConfig};
pub use settlement::{SettlementEngine, DEFAULT_COMMIT_ATTEMPTS};
pub use snapshot::{RestoreReport, SnapshotManager, WipeReport};

pub use repository::product::ProductRepository;
pub use repository::settings::SettingsRepository;
pub use repository::supplier::SupplierRepository;
pub use repository::transaction::TransactionRepository;
