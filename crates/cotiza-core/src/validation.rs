//! # Validation Module
//!
//! Input validation utilities for Cotiza.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Where Validation Happens                           │
//! │                                                                         │
//! │  Catalog import / upsert                                               │
//! │  └── invalid entries are DROPPED, never reported one by one            │
//! │                                                                         │
//! │  Quote forms (save / share / export)                                   │
//! │  └── check_ready() → first failing rule, as CoreError::NotReady        │
//! │                                                                         │
//! │  Quantity inputs                                                       │
//! │  └── never rejected: clamped to >= 1                                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use cotiza_core::validation::{validate_sku, validate_price};
//!
//! assert!(validate_sku("TERM-01").is_ok());
//! assert!(validate_price(-1.0).is_err());
//! ```

use chrono::{Days, NaiveDate};

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// How far ahead a quote may be dated.
pub const QUOTE_DATE_WINDOW_DAYS: u64 = 50;

// =============================================================================
// Catalog Validators
// =============================================================================

/// Validates a SKU: must not be blank.
pub fn validate_sku(sku: &str) -> ValidationResult<()> {
    required("sku", sku)
}

/// Validates a product name: must not be blank.
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    required("name", name)
}

/// Validates a price in major units.
///
/// ## Rules
/// - Must be a finite number
/// - Must be non-negative (zero is allowed)
///
/// ## Example
/// ```rust
/// use cotiza_core::validation::validate_price;
///
/// assert!(validate_price(0.0).is_ok());
/// assert!(validate_price(f64::NAN).is_err());
/// ```
pub fn validate_price(price: f64) -> ValidationResult<()> {
    if !price.is_finite() {
        return Err(ValidationError::InvalidFormat {
            field: "price".to_string(),
            reason: "must be a number".to_string(),
        });
    }

    if price < 0.0 {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

// =============================================================================
// Quote Validators
// =============================================================================

/// Validates the client name on a quote header.
pub fn validate_client_name(name: &str) -> ValidationResult<()> {
    required("client name", name)
}

/// Validates a discount percentage (0–100).
pub fn validate_discount(percent: f64) -> ValidationResult<()> {
    if !percent.is_finite() || !(0.0..=100.0).contains(&percent) {
        return Err(ValidationError::OutOfRange {
            field: "discount".to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(())
}

/// Returns the inclusive `(min, max)` dates a quote may carry.
pub fn quote_date_window(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let max = today
        .checked_add_days(Days::new(QUOTE_DATE_WINDOW_DAYS))
        .unwrap_or(NaiveDate::MAX);
    (today, max)
}

/// Validates that a quote date is between today and 50 days ahead.
///
/// ## User Workflow
/// ```text
/// today = 2025-09-01
///   2025-08-31 → Err (past)
///   2025-09-01 → Ok
///   2025-10-21 → Ok (+50)
///   2025-10-22 → Err
/// ```
pub fn validate_quote_date(date: NaiveDate, today: NaiveDate) -> ValidationResult<()> {
    let (min, max) = quote_date_window(today);
    if date < min || date > max {
        return Err(ValidationError::DateOutOfWindow {
            date: date.to_string(),
            min: min.to_string(),
            max: max.to_string(),
        });
    }
    Ok(())
}

fn required(field: &str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
