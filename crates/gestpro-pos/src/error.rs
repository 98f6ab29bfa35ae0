//! # Terminal Error Type
//!
//! Unified error type returned by every [`crate::PosTerminal`] operation.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ValidationError / CoreError ─────────┐                                │
//! │  DbError ─────────────────────────────┤                                │
//! │  CommitError (Rejected | Persistence) ├──► PosError { code, message }  │
//! │  RestoreError (Persistence | Partial) ┘                                │
//! │                                                                         │
//! │  Internal database details are logged here and replaced by a generic   │
//! │  message before they reach the cashier.                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Serialization
//! ```json
//! {
//!   "code": "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for Office Chair: available 3, requested 4"
//! }
//! ```

use gestpro_core::{CoreError, ValidationError};
use gestpro_db::{CommitError, DbError, RestoreError};
use serde::Serialize;

/// Error returned from terminal operations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes surfaced to the front end.
///
/// ## Usage in Frontend
/// ```typescript
/// switch (e.code) {
///   case 'INSUFFICIENT_STOCK': showStockDialog(e.message); break;
///   case 'PERSISTENCE_ERROR':  offerRetry(); break;
///   default:                   showError(e.message);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input rejected before any write.
    ValidationError,

    /// Commit with no lines.
    EmptyCart,

    /// A line asks for more than the store holds.
    InsufficientStock,

    /// A line's product was deleted.
    ProductVanished,

    /// Storage failed; retrying may succeed.
    PersistenceError,

    /// Restore stopped part way through.
    PartialRestore,

    /// Lookup found nothing.
    NotFound,
}

/// Result type for terminal operations.
pub type PosResult<T> = Result<T, PosError>;

impl PosError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        PosError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        PosError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PosError::new(ErrorCode::ValidationError, message)
    }

    pub fn persistence(message: impl Into<String>) -> Self {
        PosError::new(ErrorCode::PersistenceError, message)
    }

    /// True only for storage failures. Business rejections give the same
    /// answer on every retry.
    pub fn is_retryable(&self) -> bool {
        self.code == ErrorCode::PersistenceError
    }
}

impl From<DbError> for PosError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => PosError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => {
                PosError::validation(format!("{} '{}' already exists", field, value))
            }
            DbError::CheckViolation(msg) => PosError::validation(msg),
            DbError::Busy(e) => {
                tracing::warn!("Database busy: {}", e);
                PosError::persistence("The store is busy, please retry")
            }
            DbError::PoolExhausted => PosError::persistence("Database pool exhausted"),
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                PosError::persistence("Database connection failed")
            }
            DbError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                PosError::persistence("Database migration failed")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                tracing::error!("Database operation failed: {}", e);
                PosError::persistence("Database operation failed")
            }
            DbError::Corrupt { entity, id, reason } => {
                tracing::error!(entity = %entity, id = %id, "Corrupt record: {}", reason);
                PosError::persistence(format!("Stored {} {} could not be read", entity, id))
            }
        }
    }
}

impl From<CoreError> for PosError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        match err {
            CoreError::EmptyCart => PosError::new(ErrorCode::EmptyCart, message),
            CoreError::InsufficientStock { .. } => PosError::new(ErrorCode::InsufficientStock, message),
            CoreError::ProductVanished { .. } => PosError::new(ErrorCode::ProductVanished, message),
            CoreError::ProductNotFound(id) => PosError::not_found("Product", &id),
            CoreError::Validation(e) => e.into(),
        }
    }
}

impl From<ValidationError> for PosError {
    fn from(err: ValidationError) -> Self {
        PosError::validation(err.to_string())
    }
}

impl From<CommitError> for PosError {
    fn from(err: CommitError) -> Self {
        match err {
            CommitError::Rejected(e) => e.into(),
            CommitError::Persistence(e) => e.into(),
        }
    }
}

impl From<RestoreError> for PosError {
    fn from(err: RestoreError) -> Self {
        match err {
            RestoreError::Persistence(e) => e.into(),
            partial @ RestoreError::Partial { .. } => {
                tracing::error!("{}", partial);
                PosError::new(ErrorCode::PartialRestore, partial.to_string())
            }
        }
    }
}

impl std::fmt::Display for PosError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for PosError {}

#[cfg(test)]
mod tests {
    use super::*;
    use gestpro_core::Collection;

    #[test]
    fn test_codes_serialize_screaming() {
        let err = PosError::from(CoreError::EmptyCart);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "EMPTY_CART");
        assert_eq!(json["message"], "Cart is empty");
    }

    #[test]
    fn test_only_persistence_is_retryable() {
        let busy = PosError::from(CommitError::Persistence(DbError::Busy("locked".into())));
        assert!(busy.is_retryable());

        let short = PosError::from(CommitError::Rejected(CoreError::InsufficientStock {
            product_name: "Office Chair".into(),
            requested: 4,
            available: 3,
        }));
        assert_eq!(short.code, ErrorCode::InsufficientStock);
        assert!(!short.is_retryable());
    }

    #[test]
    fn test_duplicate_sku_is_validation() {
        let err = PosError::from(DbError::duplicate("sku", "EL-001"));
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "sku 'EL-001' already exists");
    }

    #[test]
    fn test_partial_restore_code() {
        let err = PosError::from(RestoreError::Partial {
            collection: Collection::Transactions,
            committed_chunks: 0,
            completed: vec![Collection::StoreSettings, Collection::Suppliers, Collection::Products],
            source: DbError::Internal("disk I/O error".into()),
        });
        assert_eq!(err.code, ErrorCode::PartialRestore);
        assert!(!err.is_retryable());
    }
}
