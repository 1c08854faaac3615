//! EcoFinds - Main Library
//!
//! EcoFinds is a second-hand goods marketplace backend: users list items,
//! browse and search listings, keep a cart, "purchase" items and chat with
//! sellers in real time.
//!
//! # Module Structure
//!
//! The library is organized into two modules:
//!
//! - **`shared`** - Plain data types with no I/O
//!   - Accounts, listings, carts, conversations
//!   - Real-time socket events
//!   - Configuration and validation errors
//!
//! - **`backend`** - Server-side code
//!   - Axum HTTP API and WebSocket channel
//!   - PostgreSQL and in-memory stores
//!   - JWT authentication, image service client
//!
//! # Usage
//!
//! ```rust,no_run
//! use ecofinds::backend::server::create_app;
//! use ecofinds::shared::AppConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let app = create_app(AppConfig::load()?).await?;
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Error Handling
//!
//! - `shared::SharedError` for domain validation
//! - `backend::store::StoreError` for persistence
//! - `backend::BackendError` for HTTP responses

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
