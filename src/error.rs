//! Error types for the storage layer
//!
//! `StorageError` covers every failure a backend or the serializer can
//! produce. None of these escape [`crate::storage::Storage`]; they are logged
//! and converted to `bool`/`Option` results there. `ApiError` is the HTTP
//! facing error of the inspection server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Storage Error Enum ==
/// Failures raised by the serializer and by key-value backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Value cannot be converted to its wire format
    #[error("Serialization failed: {0}")]
    Serialization(String),

    /// Stored text is not a valid stored item
    #[error("Corrupted data: {0}")]
    CorruptedData(String),

    /// Backend capacity exhausted
    #[error("Quota exceeded: needed {needed} bytes, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// Backend refused access (privacy mode, permissions)
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// File backend I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type for backend operations.
pub type Result<T> = std::result::Result<T, StorageError>;

// == API Error Enum ==
/// Errors returned by the inspection server handlers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Key not present (or expired) in the namespace
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The store reported a failed operation
    #[error("Storage operation failed: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers.
pub type ApiResult<T> = std::result::Result<T, ApiError>;
