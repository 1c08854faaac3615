//! Authentication Handlers Module
//!
//! This module contains all HTTP handlers for authentication and profile
//! endpoints.
//!
//! # Module Structure
//!
//! ```text
//! handlers/
//! ├── mod.rs       - Module exports and documentation
//! ├── types.rs     - Response types
//! ├── register.rs  - Account registration handler
//! ├── login.rs     - Authentication handler
//! └── me.rs        - Current account and profile handlers
//! ```
//!
//! # Handlers
//!
//! - **`register`** - POST /api/auth/register
//! - **`login`** - POST /api/auth/login
//! - **`get_me`** - GET /api/auth/me
//! - **`get_profile`** / **`update_profile`** - GET/PUT /api/user/profile

/// Response types
pub mod types;

/// Register handler
pub mod register;

/// Login handler
pub mod login;

/// Current account handlers
pub mod me;

pub use login::login;
pub use me::{get_me, get_profile, update_profile};
pub use register::register;
