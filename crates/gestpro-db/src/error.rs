//! # Database Error Types
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  SQLite Error (sqlx::Error)                                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds context and categorization               │
//! │       │                                                                 │
//! │       ├──► CommitError::Persistence   (sale commit)                    │
//! │       ├──► RestoreError::Partial      (restore after settings)         │
//! │       ▼                                                                 │
//! │  PosError (gestpro-pos) ← code + message for the front end             │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use gestpro_core::{Collection, CoreError};
use thiserror::Error;

/// SQLite primary result code for SQLITE_BUSY.
const SQLITE_BUSY: &str = "5";
/// SQLITE_BUSY_SNAPSHOT (WAL reader tried to upgrade after a concurrent commit).
const SQLITE_BUSY_SNAPSHOT: &str = "517";
/// SQLITE_LOCKED.
const SQLITE_LOCKED: &str = "6";

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Entity not found in database.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Unique constraint violation (duplicate SKU, duplicate id).
    #[error("Duplicate {field}: '{value}' already exists")]
    UniqueViolation { field: String, value: String },

    /// CHECK constraint violation (negative stock or price).
    #[error("Constraint violated: {0}")]
    CheckViolation(String),

    /// Another connection holds the write lock.
    ///
    /// ## When This Occurs
    /// - Two terminals commit against the same database file at once
    /// - A restore chunk is running while a sale commits
    ///
    /// The whole unit of work can be retried.
    #[error("Database is busy: {0}")]
    Busy(String),

    /// Database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// A stored JSON column could not be read back.
    #[error("Corrupt {entity} record {id}: {reason}")]
    Corrupt {
        entity: String,
        id: String,
        reason: String,
    },

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Internal database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Creates a UniqueViolation error.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether retrying the same unit of work may succeed.
    pub fn is_busy(&self) -> bool {
        matches!(self, DbError::Busy(_) | DbError::PoolExhausted)
    }

    /// Fills in the offending value of a unique violation.
    ///
    /// SQLite only names the column, so callers that know the value attach it.
    pub fn with_duplicate_value(self, value: &str) -> Self {
        match self {
            DbError::UniqueViolation { field, .. } => DbError::UniqueViolation {
                field,
                value: value.to_string(),
            },
            other => other,
        }
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound        → DbError::NotFound
/// sqlx::Error::Database (5/6/517) → DbError::Busy
/// sqlx::Error::Database (UNIQUE)  → DbError::UniqueViolation
/// sqlx::Error::Database (CHECK)   → DbError::CheckViolation
/// sqlx::Error::PoolTimedOut       → DbError::PoolExhausted
/// Other                           → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),

            sqlx::Error::Database(db_err) => {
                let msg = db_err.message().to_string();
                let code = db_err.code().map(|c| c.to_string());

                let busy = matches!(
                    code.as_deref(),
                    Some(SQLITE_BUSY) | Some(SQLITE_BUSY_SNAPSHOT) | Some(SQLITE_LOCKED)
                ) || msg.contains("database is locked");

                if busy {
                    DbError::Busy(msg)
                } else if msg.contains("UNIQUE constraint failed") {
                    // "UNIQUE constraint failed: products.sku"
                    let field = msg
                        .split("UNIQUE constraint failed: ")
                        .nth(1)
                        .and_then(|col| col.rsplit('.').next())
                        .unwrap_or("unknown")
                        .to_string();
                    DbError::UniqueViolation {
                        field,
                        value: "unknown".to_string(),
                    }
                } else if msg.contains("CHECK constraint failed") {
                    DbError::CheckViolation(msg)
                } else {
                    DbError::QueryFailed(msg)
                }
            }

            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,

            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),

            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

// =============================================================================
// Commit Error
// =============================================================================

/// Why a sale commit did not go through.
///
/// The split matters to the terminal: a rejection is final for this cart,
/// while a persistence failure is retried with the same transaction id.
#[derive(Debug, Error)]
pub enum CommitError {
    /// A business rule refused the sale. Nothing was written.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Storage failed. Nothing was written; safe to retry.
    #[error(transparent)]
    Persistence(#[from] DbError),
}

impl From<sqlx::Error> for CommitError {
    fn from(err: sqlx::Error) -> Self {
        CommitError::Persistence(err.into())
    }
}

// =============================================================================
// Restore Error
// =============================================================================

/// Why a restore stopped.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// Settings could not be written. The store is unchanged.
    #[error("Restore failed before any data was written: {0}")]
    Persistence(#[from] DbError),

    /// Failed after some chunks had committed. The store now holds a mix of
    /// restored and pre-restore data.
    #[error("Restore stopped in {collection} after {committed_chunks} committed chunk(s): {source}")]
    Partial {
        /// Collection being written when the failure hit.
        collection: Collection,
        /// Insert chunks of that collection already committed.
        committed_chunks: usize,
        /// Collections fully restored before it.
        completed: Vec<Collection>,
        source: DbError,
    },
}

// =============================================================================
// Unit Tests
// =============================================================================
