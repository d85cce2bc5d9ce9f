//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in stockFast                              │
//! │                                                                         │
//! │  Handler / Service: Result<T, ApiError>                                │
//! │         │                                                               │
//! │         ├── ValidationErrors ──► 400 VALIDATION_ERROR + fieldErrors    │
//! │         ├── CoreError ────────► 400 / 404 / 409 by variant             │
//! │         ├── DbError                                                    │
//! │         │     ├── NotFound ────► 404                                   │
//! │         │     ├── UNIQUE products.hardware_id ► 409 + fieldErrors      │
//! │         │     └── anything else ► logged, 500 generic message          │
//! │         └── missing session ──► 401 (auth layer)                       │
//! │                                                                         │
//! │  Body: {"success":false,"error":"...","code":"...","fieldErrors":{..}} │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::BTreeMap;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use stockfast_core::qr::QrEncodeError;
use stockfast_core::{CoreError, ValidationErrors};
use stockfast_db::DbError;

/// Field names as sent by the client.
const HARDWARE_ID_FIELD: &str = "hardwareId";
const EMAIL_FIELD: &str = "email";

/// API error returned from handlers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// First message per invalid form field
    pub field_errors: Option<BTreeMap<String, String>>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Input validation failed (400)
    ValidationError,

    /// Missing or invalid session (401)
    Unauthenticated,

    /// Resource not found (404)
    NotFound,

    /// Duplicate key, or an operation blocked by dependent records (409)
    Conflict,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::ValidationError => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            field_errors: None,
        }
    }

    /// Attaches a message to one form field.
    pub fn with_field(mut self, field: &str, message: impl Into<String>) -> Self {
        self.field_errors
            .get_or_insert_with(BTreeMap::new)
            .insert(field.to_string(), message.into());
        self
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Conflict, message)
    }

    /// The session rejection. The message is what every client already
    /// matches on.
    pub fn unauthenticated() -> Self {
        ApiError::new(ErrorCode::Unauthenticated, "Authentification requise")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Invalid query string on a read endpoint.
    pub fn invalid_query(errors: ValidationErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Invalid query parameters".to_string(),
            field_errors: Some(errors.field_map()),
        }
    }

    fn duplicate_hardware_id() -> Self {
        ApiError::conflict("A product with this hardware ID already exists")
            .with_field(HARDWARE_ID_FIELD, "This hardware ID is already in use")
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    code: ErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<&'a BTreeMap<String, String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.message,
            code: self.code,
            field_errors: self.field_errors.as_ref(),
        };
        (self.code.status(), Json(body)).into_response()
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, .. } => ApiError::not_found(format!("{} not found", entity)),
            DbError::UniqueViolation { ref field, .. } if field == "products.hardware_id" => {
                ApiError::duplicate_hardware_id()
            }
            DbError::UniqueViolation { ref field, .. } if field == "users.email" => {
                ApiError::conflict("An account with this email already exists")
                    .with_field(EMAIL_FIELD, "This email is already registered")
            }
            DbError::UniqueViolation { field, .. } => {
                tracing::warn!(field = %field, "Unique constraint violated");
                ApiError::conflict("This record already exists")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::PoolExhausted => {
                tracing::error!("Database pool exhausted");
                ApiError::new(ErrorCode::DatabaseError, "Database is busy, try again")
            }
            other => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", other);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(_) => ApiError::not_found("Product not found"),
            CoreError::QrCodeNotFound(_) => ApiError::not_found("QR code not found"),
            CoreError::AlertNotFound(_) => ApiError::not_found("Stock alert not found"),
            CoreError::DuplicateHardwareId(_) => ApiError::duplicate_hardware_id(),
            CoreError::NegativeStock { .. } => ApiError::validation("Invalid data")
                .with_field("newStock", "Stock cannot be negative"),
            e @ CoreError::InsufficientStock { .. } => ApiError::conflict(e.to_string())
                .with_field("quantity", "Not enough units in stock"),
            e @ (CoreError::ProductHasSales(_)
            | CoreError::ProductAlreadyInactive(_)
            | CoreError::ProductInactive(_)) => ApiError::conflict(e.to_string()),
            e @ CoreError::InvalidQrContent => ApiError::validation(e.to_string()),
            CoreError::Validation(errors) => errors.into(),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: "Invalid data".to_string(),
            field_errors: Some(errors.field_map()),
        }
    }
}

/// Audit snapshots and other JSON built on the server side.
impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!("JSON serialization failed: {}", err);
        ApiError::internal("Could not serialize the request record")
    }
}

impl From<QrEncodeError> for ApiError {
    fn from(err: QrEncodeError) -> Self {
        tracing::error!("QR encoding failed: {}", err);
        ApiError::internal("QR code generation failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockfast_core::ValidationError;

    #[test]
    fn test_hardware_id_unique_violation_is_conflict() {
        let err: ApiError = DbError::duplicate("products.hardware_id", "x").into();
        assert_eq!(err.code, ErrorCode::Conflict);
        assert!(err.field_errors.unwrap().contains_key("hardwareId"));
    }

    #[test]
    fn test_validation_errors_keep_fields() {
        let mut errors = ValidationErrors::new();
        errors.push(ValidationError::Rule {
            field: "sellingPrice".to_string(),
            message: "Selling price must be greater than purchase price".to_string(),
        });
        let err: ApiError = CoreError::Validation(errors).into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.field_errors.unwrap()["sellingPrice"],
            "Selling price must be greater than purchase price"
        );
    }

    #[test]
    fn test_internal_db_errors_are_generic() {
        let err: ApiError = DbError::QueryFailed("syntax error near SELEC".to_string()).into();
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "Database operation failed");
    }

    #[test]
    fn test_serialization_failure_is_internal() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: ApiError = err.into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.code.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_has_sales_is_conflict() {
        let err: ApiError = CoreError::ProductHasSales("p-1".to_string()).into();
        assert_eq!(err.code.status(), StatusCode::CONFLICT);
    }
}
