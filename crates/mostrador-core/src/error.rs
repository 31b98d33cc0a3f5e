//! # Error Types
//!
//! Domain-specific error types for mostrador-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  mostrador-core errors (this file)                                     │
//! │  ├── CoreError        - Declined operations, missing entities          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  mostrador-db errors (separate crate)                                  │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  API errors (apps/api)                                                 │
//! │  └── ApiError         - What the SPA sees (code + message + status)    │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// None of these are crashes: conflicts are declined operations with a
/// reason the cashier can read.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A register session is already open (sessions are global, one at a time).
    #[error("Cash register is already open (session {session_id})")]
    RegisterAlreadyOpen { session_id: String },

    /// Closing was requested but no session is open.
    #[error("No cash register session is open")]
    NoOpenRegister,

    /// Register session cannot be found.
    #[error("Register session not found: {0}")]
    SessionNotFound(String),

    /// Product cannot be found (or is inactive).
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Sale cannot be found.
    #[error("Sale not found: {0}")]
    SaleNotFound(String),

    /// Insufficient stock to complete sale.
    ///
    /// ## When This Occurs
    /// - Selling more than available stock
    /// - Product has track_inventory=true and allow_negative_stock=false
    #[error("Insufficient stock for {sku}: available {available}, requested {requested}")]
    InsufficientStock {
        sku: String,
        available: i64,
        requested: i64,
    },

    /// Sale status change is not one of the allowed transitions.
    #[error("Sale {sale_id} cannot move from {from} to {to}")]
    InvalidStatusTransition {
        sale_id: String,
        from: String,
        to: String,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for declined state transitions (open twice, close when closed, ...).
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            CoreError::RegisterAlreadyOpen { .. }
                | CoreError::NoOpenRegister
                | CoreError::InsufficientStock { .. }
                | CoreError::InvalidStatusTransition { .. }
        )
    }

    /// True when a referenced entity does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::SessionNotFound(_) | CoreError::ProductNotFound(_) | CoreError::SaleNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before anything is persisted.
#[derive(Debug, Error)]
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

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid invoice number).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

impl ValidationError {
    /// Shorthand for [`ValidationError::Required`].
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
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
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            sku: "CAFE-500".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for CAFE-500: available 3, requested 5"
        );

        let err = CoreError::RegisterAlreadyOpen {
            session_id: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Cash register is already open (session abc)");
    }

    #[test]
    fn test_conflict_classification() {
        assert!(CoreError::NoOpenRegister.is_conflict());
        assert!(!CoreError::NoOpenRegister.is_not_found());
        assert!(CoreError::SaleNotFound("x".into()).is_not_found());
        assert!(!CoreError::Validation(ValidationError::required("amount")).is_conflict());
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("initialCash").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(
            core_err.to_string(),
            "Validation error: initialCash is required"
        );
    }
}
