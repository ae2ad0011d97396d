//! # Error Types
//!
//! Domain-specific error types for cotiza-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  cotiza-core errors (this file)                                        │
//! │  ├── CoreError        - Quote workflow errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  cotiza-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures, import format errors         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → caller shows a message            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Catalog entries that fail validation during import or upsert are dropped
//! silently; these errors surface only where a caller asks explicitly
//! (readiness checks, duplicate SKU detection on inline edits).

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Quote workflow errors.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    /// An equipment id does not belong to the repair draft.
    #[error("Equipment not found: {0}")]
    EquipmentNotFound(String),

    /// The quote cannot be saved, exported or shared yet.
    ///
    /// ## When This Occurs
    /// - Client name is empty
    /// - Date outside the allowed window
    /// - Sale without items, repair without billable equipment
    #[error("Quote is not ready: {0}")]
    NotReady(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Why a catalog entry or quote form was rejected.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Blank text, an empty item list, an equipment with nothing billable.
    #[error("{field} is required")]
    Required { field: String },

    /// Negative price, discount percentage outside 0..=100.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Zero or negative amount where a charge is expected.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Unparseable price or quantity text.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Quote date in the past or too far ahead.
    #[error("date {date} must be between {min} and {max}")]
    DateOutOfWindow {
        date: String,
        min: String,
        max: String,
    },

    /// A SKU already used by another catalog entry.
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Result of a quote workflow step.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "client name".to_string(),
        };
        assert_eq!(err.to_string(), "client name is required");

        let err = ValidationError::Duplicate {
            field: "sku".to_string(),
            value: "TERM-01".to_string(),
        };
        assert_eq!(err.to_string(), "sku 'TERM-01' already exists");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "items".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::NotReady(_)));
        assert_eq!(core_err.to_string(), "Quote is not ready: items is required");
    }
}
