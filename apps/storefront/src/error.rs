//! # API Error Types
//!
//! The error the page layer hands to the UI.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Propagation                               │
//! │                                                                         │
//! │  storefront-core          storefront-store          config              │
//! │  ┌──────────────┐        ┌──────────────┐        ┌──────────────┐      │
//! │  │  CoreError   │        │  StoreError  │        │ ConfigError  │      │
//! │  │  FieldErrors │        │  NotFound    │        │              │      │
//! │  └──────┬───────┘        └──────┬───────┘        └──────┬───────┘      │
//! │         └───────────────────────┼───────────────────────┘              │
//! │                                 ▼                                       │
//! │                          ┌─────────────┐                                │
//! │                          │  ApiError   │  { code, message, fields }     │
//! │                          └─────────────┘                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use storefront_core::{CoreError, FieldError, FieldErrors};
use storefront_store::StoreError;
use ts_rs::TS;

use crate::state::ConfigError;

/// Error returned by page and state operations.
///
/// ## Serialization
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Invalid form: address: Required",
///   "fields": [{ "field": "address", "message": "Required" }]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// Field-scoped messages, only for form validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[ts(export)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Referenced record does not exist
    NotFound,

    /// Network or store failure; the user may retry
    TransportError,

    /// Input validation failed, nothing was sent
    ValidationError,

    /// Operation not allowed in the current state
    InvalidState,

    /// Requested quantity exceeds what the product has
    InsufficientStock,

    /// Configuration could not be loaded
    ConfigError,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Validation failure carrying every field message.
    pub fn fields(errors: FieldErrors) -> Self {
        ApiError {
            code: ErrorCode::ValidationError,
            message: format!("Invalid form: {}", errors),
            fields: errors.into_vec(),
        }
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::InvalidState, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Message for `field`, if this is a field validation error.
    pub fn field(&self, field: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.field == field)
            .map(|f| f.message.as_str())
    }

    pub fn is_not_found(&self) -> bool {
        self.code == ErrorCode::NotFound
    }

    pub fn is_transport(&self) -> bool {
        self.code == ErrorCode::TransportError
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { collection, id } => ApiError::not_found(&collection, &id),
            StoreError::Transport(e) => {
                tracing::warn!("Item store unreachable: {}", e);
                ApiError::new(ErrorCode::TransportError, "Could not reach the store")
            }
            StoreError::Status { status, message } => {
                tracing::warn!(status, "Item store returned an error: {}", message);
                ApiError::new(
                    ErrorCode::TransportError,
                    format!("Store returned status {}", status),
                )
            }
            StoreError::Database(e) | StoreError::ConnectionFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Local store failed: {}", e);
                ApiError::new(ErrorCode::TransportError, "Store operation failed")
            }
            StoreError::Conflict { collection, id } => ApiError::new(
                ErrorCode::InvalidState,
                format!("{} {} already exists", collection, id),
            ),
            other => {
                tracing::error!("Item store error: {}", other);
                ApiError::internal(other.to_string())
            }
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InsufficientStock { .. } | CoreError::QuantityTooLarge { .. } => {
                ApiError::new(ErrorCode::InsufficientStock, err.to_string())
            }
            CoreError::TooManyLineItems { .. } | CoreError::InvalidTransition { .. } => {
                ApiError::invalid_state(err.to_string())
            }
            CoreError::InvalidRange { .. } | CoreError::Validation(_) => {
                ApiError::validation(err.to_string())
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::new(ErrorCode::ConfigError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for page and state operations.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_errors_map_to_codes() {
        let err: ApiError = StoreError::not_found("orders", 3).into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "orders not found: 3");

        let err: ApiError = StoreError::Transport("timed out".into()).into();
        assert!(err.is_transport());
    }

    #[test]
    fn test_field_errors_are_carried() {
        let mut errors = FieldErrors::new();
        errors.push("address", "Required");
        let err = ApiError::fields(errors);

        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.field("address"), Some("Required"));

        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "VALIDATION_ERROR");
        assert_eq!(json["fields"][0]["field"], "address");
    }

    #[test]
    fn test_quantity_errors_are_stock_errors() {
        let err: ApiError = CoreError::QuantityTooLarge {
            product_id: 1,
            requested: 10,
            max: 8,
        }
        .into();
        assert_eq!(err.code, ErrorCode::InsufficientStock);
    }

    #[test]
    fn test_fields_omitted_when_empty() {
        let json = serde_json::to_value(ApiError::internal("boom")).unwrap();
        assert!(json.get("fields").is_none());
    }
}
