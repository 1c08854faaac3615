/**
 * Backend Error Types
 *
 * This module defines the error type returned by every HTTP handler and by
 * the real-time session handlers.
 *
 * # Error Categories
 *
 * ## Handler Errors
 *
 * Request-level failures with an explicit status: missing token, access
 * denied, missing reference, duplicate registration.
 *
 * ## Domain Errors
 *
 * `SharedError` values raised by validation or business rules. They all map
 * to 400.
 *
 * ## Store Errors
 *
 * `StoreError` values from the persistence layer. Not-found maps to 404,
 * uniqueness conflicts to 409 and database faults to 500.
 *
 * ## Internal Errors
 *
 * Everything else the caller cannot act on (hashing, token signing, the
 * upstream image service). The detail is only exposed in development mode.
 */
use axum::http::StatusCode;
use thiserror::Error;

use crate::backend::store::StoreError;
use crate::shared::SharedError;

/// Message shown to clients instead of internal error details
pub const GENERIC_SERVER_ERROR: &str = "Something went wrong!";

/// Backend-specific error types
///
/// # Usage
///
/// ```rust
/// use ecofinds::backend::error::BackendError;
///
/// let err = BackendError::not_found("Product not found");
/// assert_eq!(err.status_code().as_u16(), 404);
/// ```
#[derive(Debug, Error)]
pub enum BackendError {
    /// Request-level error with an explicit status
    #[error("{message}")]
    HandlerError {
        /// HTTP status code for this error
        status: StatusCode,
        /// Human-readable error message
        message: String,
    },

    /// Domain validation or rule violation
    #[error(transparent)]
    SharedError(#[from] SharedError),

    /// Persistence failure
    #[error(transparent)]
    StoreError(#[from] StoreError),

    /// Unexpected internal failure
    #[error("Internal error: {message}")]
    Internal {
        /// Detail for logs, never shown outside development mode
        message: String,
    },
}

impl BackendError {
    /// Create a new handler error with a status code
    pub fn handler(status: StatusCode, message: impl Into<String>) -> Self {
        Self::HandlerError {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::NOT_FOUND, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::handler(StatusCode::SERVICE_UNAVAILABLE, message)
    }

    /// Create a new internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    ///
    /// # Status Code Mapping
    ///
    /// - `HandlerError` - Uses the status code from the error
    /// - `SharedError` - 400 Bad Request
    /// - `StoreError` - 404 / 409 / 400 / 500 depending on the variant
    /// - `Internal` - 500 Internal Server Error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::HandlerError { status, .. } => *status,
            Self::SharedError(err) => shared_status(err),
            Self::StoreError(err) => match err {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Conflict(_) => StatusCode::CONFLICT,
                StoreError::Rejected(shared) => shared_status(shared),
                StoreError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show to clients
    pub fn message(&self) -> String {
        if self.status_code().is_server_error() {
            return match self {
                Self::HandlerError { message, .. } => message.clone(),
                _ => GENERIC_SERVER_ERROR.to_string(),
            };
        }
        self.to_string()
    }

    /// Full detail for logs and development responses
    pub fn detail(&self) -> String {
        match self {
            Self::StoreError(StoreError::Database(e)) => format!("database error: {}", e),
            other => other.to_string(),
        }
    }
}

fn shared_status(err: &SharedError) -> StatusCode {
    match err {
        SharedError::ValidationError { .. } | SharedError::RuleViolation { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

impl From<bcrypt::BcryptError> for BackendError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::internal(format!("password hashing failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for BackendError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Self::internal(format!("token signing failed: {}", err))
    }
}
