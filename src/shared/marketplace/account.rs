//! Account Data Structures
//!
//! Accounts own listings, carry an embedded cart and purchase history, and
//! take part in conversations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::shared::error::SharedError;

/// Minimum accepted password length
pub const MIN_PASSWORD_LEN: usize = 6;

/// A registered account, including its credential hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn new(name: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn profile(&self) -> Profile {
        Profile {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }

    pub fn participant(&self) -> Participant {
        Participant {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

/// Public view of an account, never includes the password hash
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Name/email pair shown next to listings and in conversations
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// Emails are unique case-insensitively, so they are stored lowercase
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_name(name: &str) -> Result<String, SharedError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(SharedError::validation("name", "Name is required"));
    }
    Ok(name.to_string())
}

fn validate_email(email: &str) -> Result<String, SharedError> {
    let email = normalize_email(email);
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !email.contains(' '),
        None => false,
    };
    if !valid {
        return Err(SharedError::validation("email", "Invalid email format"));
    }
    Ok(email)
}

/// Registration request (`POST /api/auth/register`)
///
/// Missing fields deserialize as empty and fail validation with a
/// field-specific message.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    /// Returns the normalized `(name, email)` pair
    pub fn validate(&self) -> Result<(String, String), SharedError> {
        let name = validate_name(&self.name)?;
        let email = validate_email(&self.email)?;
        if self.password.len() < MIN_PASSWORD_LEN {
            return Err(SharedError::validation(
                "password",
                format!("Password must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }
        Ok((name, email))
    }
}

/// Login request (`POST /api/auth/login`)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Profile update (`PUT /api/user/profile`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UpdateProfileRequest {
    /// Both fields are required, returns the normalized `(name, email)` pair
    pub fn validate(&self) -> Result<(String, String), SharedError> {
        match (&self.name, &self.email) {
            (Some(name), Some(email)) => Ok((validate_name(name)?, validate_email(email)?)),
            _ => Err(SharedError::validation("name", "Name and email are required")),
        }
    }
}
