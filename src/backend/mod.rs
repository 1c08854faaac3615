//! Backend Module
//!
//! This module contains all server-side code for the EcoFinds marketplace:
//! an Axum HTTP API over a pluggable store, plus a WebSocket channel for
//! chat, presence and typing.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, store loading
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`store`** - `MarketStore` trait with PostgreSQL and in-memory backends
//! - **`auth`** - Registration, login, JWT tokens, profile
//! - **`listings`** - Listing handlers and the image service client
//! - **`cart`** - Cart and purchase handlers
//! - **`chat`** - Conversations and messages
//! - **`realtime`** - Rooms, presence and the WebSocket session
//! - **`middleware`** - Bearer token authentication
//! - **`error`** - Backend-specific error types
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs       - Module exports and documentation
//! ├── main.rs      - ecofinds-server binary
//! ├── server/      - Server initialization and state
//! ├── routes/      - Route configuration
//! ├── store/       - Persistence
//! ├── auth/        - Authentication
//! ├── listings/    - Listings and images
//! ├── cart/        - Cart and purchases
//! ├── chat/        - Conversations
//! ├── realtime/    - Real-time channel
//! ├── middleware/  - Request middleware
//! └── error/       - Error types
//! ```
//!
//! # State Management
//!
//! Handlers share one `AppState`: configuration, the store, the token
//! service, the real-time hub, the presence registry and the optional image
//! client. Every field is cheap to clone.
//!
//! # Error Handling
//!
//! Handlers return `Result<_, BackendError>`. Errors become a status code and
//! a `{success: false, message, status}` body.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Persistence
pub mod store;

/// Authentication and profile
pub mod auth;

/// Listings and image uploads
pub mod listings;

/// Cart and purchases
pub mod cart;

/// Buyer/seller conversations
pub mod chat;

/// Real-time channel
pub mod realtime;

/// Middleware for request processing
pub mod middleware;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::{create_app, create_app_with, AppState};
pub use store::{DynStore, MarketStore, MemoryStore, PgStore};
