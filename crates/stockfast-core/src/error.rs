//! # Error Types
//!
//! Domain-specific error types for stockfast-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  stockfast-core errors (this file)                                     │
//! │  ├── CoreError         - Business rule failures                        │
//! │  ├── ValidationErrors  - All field failures of one input               │
//! │  └── ValidationError   - A single field failure                        │
//! │                                                                         │
//! │  stockfast-db errors (separate crate)                                  │
//! │  └── DbError           - Database operation failures                   │
//! │                                                                         │
//! │  HTTP errors (in apps/api)                                             │
//! │  └── ApiError          - What the client sees (status + envelope)      │
//! │                                                                         │
//! │  Flow: ValidationError → ValidationErrors → CoreError → ApiError       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Every validation failure names the form field it belongs to
//! 3. Validation is accept-all or reject-all: failures are collected, never
//!    short-circuited, so the client can mark every bad field at once

use std::collections::BTreeMap;

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// The API layer maps each variant to a status code and a user-facing message.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// QR code cannot be found, or belongs to another product.
    #[error("QR code not found: {0}")]
    QrCodeNotFound(String),

    /// Stock alert cannot be found.
    #[error("Stock alert not found: {0}")]
    AlertNotFound(String),

    /// Another product already carries this hardware identifier.
    #[error("A product with hardware id {0} already exists")]
    DuplicateHardwareId(String),

    /// Requested stock level is below zero.
    #[error("Stock cannot be negative (requested {requested})")]
    NegativeStock { requested: i64 },

    /// Not enough units on hand to complete a sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Record sale (qty: 5)
    ///      │
    ///      ▼
    /// Check stock: available=3
    ///      │
    ///      ▼
    /// InsufficientStock { product: "iPhone 15", available: 3, requested: 5 }
    /// ```
    #[error("Insufficient stock for {product}: available {available}, requested {requested}")]
    InsufficientStock {
        product: String,
        available: i64,
        requested: i64,
    },

    /// Product has sales attached and cannot be removed.
    #[error("Cannot delete a product that has associated sales")]
    ProductHasSales(String),

    /// Soft-delete requested on a product that is already inactive.
    #[error("Product is already inactive")]
    ProductAlreadyInactive(String),

    /// Operation requires an active product.
    #[error("Product {0} is not active")]
    ProductInactive(String),

    /// QR content could not be recognised as a product label.
    #[error("Unrecognised QR code content")]
    InvalidQrContent,

    /// Validation failed (wraps every field error of the input).
    #[error("Invalid data: {0}")]
    Validation(#[from] ValidationErrors),
}

impl From<ValidationError> for CoreError {
    fn from(err: ValidationError) -> Self {
        CoreError::Validation(ValidationErrors::from(err))
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// A single field-level validation failure.
///
/// Every variant carries the client-facing field name (camelCase, as sent in
/// the form) so failures can be keyed into a `fieldErrors` map.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too short.
    #[error("{field} must be at least {min} characters")]
    TooShort { field: String, min: usize },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field} must be zero or positive")]
    MustBeNonNegative { field: String },

    /// Value is not a whole number.
    #[error("{field} must be a whole number")]
    NotAnInteger { field: String },

    /// Invalid format (e.g., hardware id with letters).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Too many entries in a list field.
    #[error("{field} accepts at most {max} entries")]
    TooMany { field: String, max: usize },

    /// Cross-field rule failure, reported on one of the fields.
    #[error("{message}")]
    Rule { field: String, message: String },
}

impl ValidationError {
    /// Returns the client-facing field this error belongs to.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooShort { field, .. }
            | ValidationError::TooLong { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustBeNonNegative { field }
            | ValidationError::NotAnInteger { field }
            | ValidationError::InvalidFormat { field, .. }
            | ValidationError::NotAllowed { field, .. }
            | ValidationError::TooMany { field, .. }
            | ValidationError::Rule { field, .. } => field,
        }
    }

    /// Shorthand for a cross-field rule failure.
    pub fn rule(field: impl Into<String>, message: impl Into<String>) -> Self {
        ValidationError::Rule {
            field: field.into(),
            message: message.into(),
        }
    }
}

// =============================================================================
// Validation Errors (collection)
// =============================================================================

/// Every field failure found while validating one input.
///
/// Never empty when returned as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Error)]
#[error("{}", summary(.0))]
pub struct ValidationErrors(Vec<ValidationError>);

fn summary(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationErrors {
    /// Creates an empty collection.
    pub fn new() -> Self {
        ValidationErrors(Vec::new())
    }

    /// Records one more failure.
    pub fn push(&mut self, err: ValidationError) {
        self.0.push(err);
    }

    /// Records the error side of a field check, passing the value through.
    pub fn check<T>(&mut self, result: Result<T, ValidationError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(err) => {
                self.push(err);
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.0.iter()
    }

    /// Whether any failure is keyed on `field`.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|e| e.field() == field)
    }

    /// Field name → first message for that field.
    ///
    /// This is the `fieldErrors` object of the mutation envelope.
    pub fn field_map(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        for err in &self.0 {
            map.entry(err.field().to_string())
                .or_insert_with(|| err.to_string());
        }
        map
    }

    /// `Ok(value)` when nothing was recorded, `Err(self)` otherwise.
    pub fn into_result<T>(self, value: impl FnOnce() -> T) -> Result<T, ValidationErrors> {
        if self.0.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl From<ValidationError> for ValidationErrors {
    fn from(err: ValidationError) -> Self {
        ValidationErrors(vec![err])
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
            product: "iPhone 15".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for iPhone 15: available 3, requested 5"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "brand".to_string(),
        };
        assert_eq!(err.to_string(), "brand is required");
        assert_eq!(err.field(), "brand");

        let err = ValidationError::rule("sellingPrice", "Selling price must exceed purchase price");
        assert_eq!(err.to_string(), "Selling price must exceed purchase price");
        assert_eq!(err.field(), "sellingPrice");
    }

    #[test]
    fn test_field_map_keeps_first_message_per_field() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::TooShort {
            field: "name".to_string(),
            min: 2,
        });
        errors.push(ValidationError::TooLong {
            field: "name".to_string(),
            max: 100,
        });
        errors.push(ValidationError::Required {
            field: "model".to_string(),
        });

        let map = errors.field_map();
        assert_eq!(map.len(), 2);
        assert_eq!(map["name"], "name must be at least 2 characters");
        assert_eq!(map["model"], "model is required");
        assert!(errors.has_field("model"));
        assert!(!errors.has_field("brand"));
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "category".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        match core_err {
            CoreError::Validation(errors) => assert_eq!(errors.len(), 1),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_into_result() {
        assert_eq!(ValidationErrors::new().into_result(|| 7), Ok(7));

        let errors: ValidationErrors = ValidationError::Required {
            field: "x".to_string(),
        }
        .into();
        assert!(errors.into_result(|| 7).is_err());
    }
}
