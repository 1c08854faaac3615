//! Server Module
//!
//! This module contains all server-side code for initializing and configuring
//! the Axum HTTP server.
//!
//! # Architecture
//!
//! - **`state`** - Application state structure and `FromRef` implementations
//! - **`config`** - Store selection from the loaded configuration
//! - **`init`** - Server initialization and app creation
//!
//! # Module Structure
//!
//! ```text
//! server/
//! ├── mod.rs    - Module exports and documentation
//! ├── state.rs  - AppState and FromRef implementations
//! ├── config.rs - Store loading (PostgreSQL or memory)
//! └── init.rs   - Server initialization and app creation
//! ```
//!
//! # Initialization Flow
//!
//! 1. **Store**: PostgreSQL when `DATABASE_URL` is set, memory otherwise
//! 2. **State**: token service, real-time hub, presence, image client
//! 3. **Background Tasks**: periodic cleanup of empty rooms
//! 4. **Router Creation**: all routes and middleware
//!
//! # Example
//!
//! ```rust,no_run
//! use ecofinds::backend::server::create_app;
//! use ecofinds::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::load()?).await?;
//! # Ok(())
//! # }
//! ```

/// Application state management
pub mod state;

/// Store loading
pub mod config;

/// Server initialization
pub mod init;

pub use init::{create_app, create_app_with};
pub use state::AppState;
