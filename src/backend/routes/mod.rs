//! Route Configuration Module
//!
//! This module configures all HTTP routes for the backend server.
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs        - Module exports and documentation
//! ├── router.rs     - Main router creation, layers, fallback
//! └── api_routes.rs - /api endpoints
//! ```
//!
//! # Route Types
//!
//! - `GET /health` - Liveness
//! - `GET /ws` - Real-time WebSocket channel
//! - `/api/...` - REST API, see [`api_routes`]
//! - `/static/...` - Files from the configured static directory
//!
//! Everything else falls through to a 404 JSON error.

/// Main router creation
pub mod router;

/// API endpoint routes
pub mod api_routes;

pub use router::create_router;
