//! # Error Types
//!
//! Domain-specific error types for shopbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  shopbook-core errors (this file)                                      │
//! │  ├── CoreError        - Business rule violations                       │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  shopbook-store errors (separate crate)                                │
//! │  └── StoreError       - Document store failures                        │
//! │                                                                         │
//! │  shopbook-session errors (separate crate)                              │
//! │  └── SessionError     - What the surrounding UI sees                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SessionError → user message       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (name, id, amounts)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. They abort the
/// operation that raised them with no partial state change.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Insufficient stock to complete a sale or sale edit.
    ///
    /// ## When This Occurs
    /// - Selling more units than the product has on hand
    /// - Editing a sale upward by more than the remaining stock
    ///
    /// The operation is rejected outright; stock is never clamped to zero.
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// A payment would drive a customer's outstanding balance negative.
    ///
    /// ## When This Occurs
    /// - `amount > customer.balance` on a payment
    ///
    /// Credit grants have no upper bound; only payments are capped.
    #[error("Payment of {requested} exceeds outstanding balance {outstanding} for {customer}")]
    ExceedsBalance {
        customer: String,
        outstanding: Money,
        requested: Money,
    },

    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Credit customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Sale transaction cannot be found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format (e.g., malformed money string).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
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
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Bag of Rice 5kg".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Bag of Rice 5kg: available 3, requested 5"
        );
    }

    #[test]
    fn test_exceeds_balance_message() {
        let err = CoreError::ExceedsBalance {
            customer: "Mrs. Adeyemi".to_string(),
            outstanding: Money::from_cents(20000),
            requested: Money::from_cents(60000),
        };
        assert_eq!(
            err.to_string(),
            "Payment of $600.00 exceeds outstanding balance $200.00 for Mrs. Adeyemi"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
