//! # Store Errors
//!
//! Error types for item store operations.
//!
//! ## Error Taxonomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  NotFound          id does not resolve           → Empty / error UI     │
//! │  Transport         network, timeout              → surfaced, no retry   │
//! │  Status            4xx / 5xx from a REST store   → surfaced, no retry   │
//! │  Decode            record does not match type    → surfaced             │
//! │  Database          local SQLite failure          → surfaced             │
//! │  InvalidPath       path not valid for operation  → programming error    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! No variant is ever retried automatically: a submit is not idempotent.

use thiserror::Error;

/// Item store operation errors.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record not found.
    ///
    /// ## When This Occurs
    /// - `GET /orders/42` for a missing order
    /// - `PATCH` of a record that was never created
    #[error("{collection} not found: {id}")]
    NotFound { collection: String, id: String },

    /// Network failure or timeout before a response arrived.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The REST store answered with a non-success status.
    #[error("Store returned {status}: {message}")]
    Status { status: u16, message: String },

    /// A record could not be (de)serialized.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The path is not valid for this operation (e.g. `create` on an item).
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// A record body is not a JSON object.
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// A record with this id already exists.
    #[error("{collection} {id} already exists")]
    Conflict { collection: String, id: i64 },

    /// Local database query failed.
    #[error("Database error: {0}")]
    Database(String),

    /// Local database connection failed.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    Migration(String),
}

impl StoreError {
    /// Creates a NotFound error for a collection and id.
    pub fn not_found(collection: impl Into<String>, id: impl ToString) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    pub fn invalid_path(path: impl ToString, reason: impl Into<String>) -> Self {
        StoreError::InvalidPath {
            path: path.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Failures of the store itself rather than of the request.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            StoreError::Transport(_)
                | StoreError::Status { .. }
                | StoreError::Database(_)
                | StoreError::ConnectionFailed(_)
        )
    }
}

/// Convert sqlx errors to StoreError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::RowNotFound    → StoreError::NotFound
/// sqlx::Error::PoolTimedOut   → StoreError::ConnectionFailed
/// sqlx::Error::PoolClosed     → StoreError::ConnectionFailed
/// Other                       → StoreError::Database
/// ```
impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::not_found("record", "unknown"),
            sqlx::Error::PoolTimedOut => {
                StoreError::ConnectionFailed("Connection pool timed out".to_string())
            }
            sqlx::Error::PoolClosed => StoreError::ConnectionFailed("Pool is closed".to_string()),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Migration(err.to_string())
    }
}

/// Convert reqwest errors to StoreError.
///
/// Status errors are produced by the HTTP client itself, so anything
/// arriving here is a transport or decode failure.
impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            StoreError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            StoreError::Status {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            StoreError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Decode(err.to_string())
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
