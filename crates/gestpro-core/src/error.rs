//! # Error Types
//!
//! Domain-specific error types for gestpro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  gestpro-core errors (this file)                                       │
//! │  ├── CoreError        - Settlement and catalog rule violations         │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  gestpro-db errors (separate crate)                                    │
//! │  ├── DbError          - Database operation failures                    │
//! │  ├── CommitError      - Rejected vs. persistence failure of a sale     │
//! │  └── RestoreError     - Partial restore after settings were written    │
//! │                                                                         │
//! │  gestpro-pos errors                                                    │
//! │  └── PosError         - What the front end sees (code + message)       │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → PosError → Front end    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business rule violations.
///
/// Every variant is a *rejection*: nothing was written when one of these is
/// returned, and retrying the same input yields the same answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Commit attempted with no lines in the cart.
    #[error("Cart is empty")]
    EmptyCart,

    /// A cart line asks for more units than the store holds.
    ///
    /// ## User Workflow
    /// ```text
    /// Cart: Premium Headphones × 5
    ///      │
    ///      ▼
    /// Commit reads stock inside the transaction: 3
    ///      │
    ///      ▼
    /// InsufficientStock { product_name: "Premium Headphones", requested: 5, available: 3 }
    ///      │
    ///      ▼
    /// Whole sale rolled back, cart kept as-is
    /// ```
    #[error("Insufficient stock for {product_name}: available {available}, requested {requested}")]
    InsufficientStock {
        product_name: String,
        requested: i64,
        available: i64,
    },

    /// A cart line refers to a product deleted since it was added.
    #[error("Product {product_name} no longer exists")]
    ProductVanished { product_name: String },

    /// Lookup by id found nothing.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any write is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (bad SKU characters, unreadable backup, etc.).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate SKU).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

impl ValidationError {
    /// Shorthand for a missing field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }

    /// Shorthand for a malformed value.
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_stock_message() {
        let err = CoreError::InsufficientStock {
            product_name: "Premium Headphones".to_string(),
            requested: 5,
            available: 3,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Premium Headphones: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(ValidationError::required("sku").to_string(), "sku is required");

        let err = ValidationError::Duplicate {
            field: "sku".to_string(),
            value: "EL-001".to_string(),
        };
        assert_eq!(err.to_string(), "sku 'EL-001' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("name").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
