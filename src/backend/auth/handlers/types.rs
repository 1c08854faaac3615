//! Authentication request and response types
//!
//! Request bodies live in `shared::marketplace::account`; these are the
//! response envelopes.

use serde::{Deserialize, Serialize};

use crate::shared::marketplace::Profile;

/// Response for register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub success: bool,
    /// Bearer token for subsequent requests
    pub token: String,
    pub user: Profile,
}

impl AuthResponse {
    pub fn new(token: String, user: Profile) -> Self {
        Self {
            success: true,
            token,
            user,
        }
    }
}

/// Response carrying the caller's profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub user: Profile,
}

impl UserResponse {
    pub fn new(user: Profile) -> Self {
        Self {
            success: true,
            message: None,
            user,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}
