//! Authentication Module
//!
//! This module handles account registration, login, JWT sessions and the
//! profile endpoints.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs          - Module exports and documentation
//! ├── passwords.rs    - bcrypt hashing on the blocking pool
//! ├── sessions.rs     - JWT token management
//! └── handlers/       - HTTP handlers
//! ```
//!
//! # Authentication Flow
//!
//! 1. **Register**: name, email and password → account created → JWT returned
//! 2. **Login**: email and password → credentials verified → JWT returned
//! 3. **Authenticated requests**: `Authorization: Bearer <jwt>` → verified by
//!    `auth_middleware` → `AuthUser` available to handlers
//!
//! # Security
//!
//! - Passwords are hashed using bcrypt (cost 12 by default)
//! - Tokens expire after the configured number of days (30 by default)
//! - Invalid credentials return 401 without saying which part was wrong

/// Password hashing
pub mod passwords;

/// JWT token generation and validation
pub mod sessions;

/// HTTP handlers for authentication endpoints
pub mod handlers;

// Re-export commonly used types and handlers
pub use handlers::types::{AuthResponse, UserResponse};
pub use handlers::{get_me, get_profile, login, register, update_profile};
pub use sessions::{Claims, TokenService};
