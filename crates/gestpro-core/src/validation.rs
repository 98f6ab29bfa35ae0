//! # Validation Module
//!
//! Field rules for catalog records.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: THIS MODULE (pure)                                           │
//! │  ├── Required fields, lengths, SKU alphabet                            │
//! │  └── Non-negative prices and stock                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: StoreView (in memory)                                        │
//! │  └── SKU uniqueness against the loaded catalog                         │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                       │
//! │  ├── UNIQUE (sku COLLATE NOCASE)                                       │
//! │  └── CHECK (stock >= 0)                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::{Product, Supplier};
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest SKU accepted.
pub const MAX_SKU_LEN: usize = 50;

/// Longest product or supplier name accepted.
pub const MAX_NAME_LEN: usize = 200;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU.
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Letters, digits, hyphens and underscores only
///
/// ```rust
/// use gestpro_core::validation::validate_sku;
///
/// assert!(validate_sku("EL-001").is_ok());
/// assert!(validate_sku("").is_err());
/// assert!(validate_sku("EL 001").is_err());
/// ```
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::required("sku"));
    }

    if sku.chars().count() > MAX_SKU_LEN {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: MAX_SKU_LEN,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::invalid(
            "sku",
            "must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validates a display name (`field` names it in the error).
pub fn validate_name(field: &str, name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::required(field));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: MAX_NAME_LEN,
        });
    }

    Ok(())
}

/// Trims a search query and caps its length.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price in cents. Zero is allowed (free items).
pub fn validate_price_cents(field: &str, cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a stock level. Zero is allowed, negative never is.
pub fn validate_stock(stock: i64) -> ValidationResult<()> {
    if stock < 0 {
        return Err(ValidationError::OutOfRange {
            field: "stock".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a cart line quantity (1 to [`MAX_ITEM_QUANTITY`]).
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates every field of a product. Uniqueness is checked elsewhere.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    validate_name("name", &product.name)?;
    validate_sku(&product.sku)?;
    validate_price_cents("sellingPrice", product.selling_price_cents)?;
    validate_price_cents("purchasePrice", product.purchase_price_cents)?;
    validate_stock(product.stock)?;
    Ok(())
}

/// Validates a supplier (only the name is mandatory).
pub fn validate_supplier(supplier: &Supplier) -> ValidationResult<()> {
    validate_name("supplier name", &supplier.name)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: String::new(),
            name: "Ergonomic Chair".to_string(),
            category: "Furniture".to_string(),
            selling_price_cents: 24950,
            purchase_price_cents: 15000,
            stock: 12,
            sku: "FU-002".to_string(),
            supplier_id: None,
            description: None,
            image_url: None,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("EL-001").is_ok());
        assert!(validate_sku("abc_123").is_ok());

        assert!(validate_sku("").is_err());
        assert!(validate_sku("   ").is_err());
        assert!(validate_sku("has space").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&product()).is_ok());

        let mut p = product();
        p.name = "  ".to_string();
        assert_eq!(validate_product(&p), Err(ValidationError::required("name")));

        let mut p = product();
        p.stock = -1;
        assert!(validate_product(&p).is_err());

        let mut p = product();
        p.purchase_price_cents = -5;
        assert!(validate_product(&p).is_err());
    }

    #[test]
    fn test_validate_supplier_requires_name() {
        let supplier = Supplier {
            id: String::new(),
            name: String::new(),
            contact_name: Some("Jean".to_string()),
            email: None,
            phone: None,
        };
        assert!(validate_supplier(&supplier).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-3).is_err());
        assert!(validate_quantity(MAX_ITEM_QUANTITY).is_ok());
        assert_eq!(
            validate_quantity(MAX_ITEM_QUANTITY + 1),
            Err(ValidationError::OutOfRange {
                field: "quantity".to_string(),
                min: 1,
                max: MAX_ITEM_QUANTITY,
            })
        );
    }
}
