//! Shared Error Types
//!
//! This module defines the domain-level errors raised while validating
//! marketplace input (listings, messages, account fields) before anything
//! touches the store.
//!
//! # Error Categories
//!
//! - `ValidationError` - A field failed validation
//! - `RuleViolation` - A marketplace rule was broken (own listing in cart, ...)
//!
//! # Usage
//!
//! ```rust
//! use ecofinds::shared::error::SharedError;
//!
//! let error = SharedError::validation("price", "Price must be a valid positive number");
//! ```
use thiserror::Error;

/// Domain errors shared by the store and the HTTP layer
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SharedError {
    /// Data validation error
    #[error("{message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// A marketplace rule was violated by an otherwise well-formed request
    #[error("{message}")]
    RuleViolation {
        /// Human-readable error message
        message: String,
    },
}

impl SharedError {
    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new rule violation
    pub fn rule(message: impl Into<String>) -> Self {
        Self::RuleViolation {
            message: message.into(),
        }
    }
}
