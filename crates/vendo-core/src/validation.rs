//! # Validation Module
//!
//! Input validation for Vendo B2B.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP handler (Rust)                                           │
//! │  ├── Type validation (serde deserialization)                            │
//! │  └── THIS MODULE: business rule validation                              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  ├── UNIQUE constraints (sku, barcode, email, order_number)             │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::error::ValidationError;
use crate::types::NewOrderItem;
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a SKU (Stock Keeping Unit).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    let sku = sku.trim();

    if sku.is_empty() {
        return Err(ValidationError::Required {
            field: "sku".to_string(),
        });
    }

    if sku.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "sku".to_string(),
            max: 50,
        });
    }

    if !sku
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "sku".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a barcode.
///
/// ## Rules
/// - Must not be empty
/// - At most 32 characters
/// - Digits only (EAN-8 through EAN-13, UPC-A, ITF-14 all fit)
pub fn validate_barcode(barcode: &str) -> ValidationResult<()> {
    let barcode = barcode.trim();

    if barcode.is_empty() {
        return Err(ValidationError::Required {
            field: "barcode".to_string(),
        });
    }

    if barcode.len() > 32 {
        return Err(ValidationError::TooLong {
            field: "barcode".to_string(),
            max: 32,
        });
    }

    if !barcode.chars().all(|c| c.is_ascii_digit()) {
        return Err(ValidationError::InvalidFormat {
            field: "barcode".to_string(),
            reason: "must contain only digits".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates an email address.
///
/// Deliberately shallow: one `@` with text either side. Deliverability is
/// the mail system's problem, uniqueness is the database's.
pub fn validate_email(email: &str) -> ValidationResult<()> {
    let email = email.trim();

    if email.is_empty() {
        return Err(ValidationError::Required {
            field: "email".to_string(),
        });
    }

    if email.len() > 254 {
        return Err(ValidationError::TooLong {
            field: "email".to_string(),
            max: 254,
        });
    }

    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "expected local@domain".to_string(),
        });
    }

    Ok(())
}

/// Validates a shipping address.
pub fn validate_shipping_address(address: &str) -> ValidationResult<()> {
    if address.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "shipping_address".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a sale or unit price in cents (> 0).
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "price".to_string(),
        });
    }
    Ok(())
}

/// Validates an optional cost price in cents (> 0 when present).
pub fn validate_cost_cents(cents: Option<i64>) -> ValidationResult<()> {
    if let Some(cents) = cents {
        if cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "cost".to_string(),
            });
        }
    }
    Ok(())
}

/// Validates a stock level (>= 0). Used for initial quantity and thresholds.
pub fn validate_stock_level(field: &str, quantity: i64) -> ValidationResult<()> {
    if quantity < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Validates an ordered quantity (> 0, bounded).
pub fn validate_order_quantity(qty: i64) -> ValidationResult<()> {
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
// Order Input Validation
// =============================================================================

/// Validates the full item set of an order-creation request.
///
/// Checks shape only (positivity, bounds); stock availability is checked
/// against the database inside the creation transaction.
pub fn validate_order_items(items: &[NewOrderItem]) -> ValidationResult<()> {
    if items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_ORDER_ITEMS,
        });
    }

    for item in items {
        validate_order_quantity(item.quantity)?;

        if item.unit_price_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "unit_price".to_string(),
            });
        }

        if item.subtotal_cents <= 0 {
            return Err(ValidationError::MustBePositive {
                field: "subtotal".to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, unit_price_cents: i64, subtotal_cents: i64) -> NewOrderItem {
        NewOrderItem {
            product_id: "p1".to_string(),
            quantity,
            unit_price_cents,
            subtotal_cents,
        }
    }

    #[test]
    fn test_validate_sku() {
        assert!(validate_sku("BOLT-M8-100").is_ok());
        assert!(validate_sku("").is_err());
        assert!(validate_sku("has spaces").is_err());
        assert!(validate_sku(&"A".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_barcode() {
        assert!(validate_barcode("4006381333931").is_ok());
        assert!(validate_barcode("").is_err());
        assert!(validate_barcode("ABC123").is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("buyer@store.example").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@nodomain.example").is_err());
        assert!(validate_email("nolocal@").is_err());
    }

    #[test]
    fn test_validate_prices() {
        assert!(validate_price_cents(1).is_ok());
        assert!(validate_price_cents(0).is_err());
        assert!(validate_price_cents(-100).is_err());

        assert!(validate_cost_cents(None).is_ok());
        assert!(validate_cost_cents(Some(500)).is_ok());
        assert!(validate_cost_cents(Some(0)).is_err());
    }

    #[test]
    fn test_validate_stock_level() {
        assert!(validate_stock_level("quantity", 0).is_ok());
        assert!(validate_stock_level("min_quantity", -1).is_err());
    }

    #[test]
    fn test_validate_order_items() {
        assert!(validate_order_items(&[item(2, 1000, 2000)]).is_ok());

        // Empty item set is rejected.
        assert!(validate_order_items(&[]).is_err());

        // First bad item fails the whole set.
        assert!(validate_order_items(&[item(2, 1000, 2000), item(0, 1000, 0)]).is_err());
        assert!(validate_order_items(&[item(1, 0, 100)]).is_err());
        assert!(validate_order_items(&[item(1, 100, -5)]).is_err());
    }
}
