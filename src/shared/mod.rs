//! Shared Module
//!
//! This module contains types and data structures that are shared between
//! the HTTP API, the real-time socket and the storage layer. All types are
//! plain data with serde support and no I/O.
//!
//! # Overview
//!
//! - `marketplace` - Accounts, listings, carts and conversations
//! - `event` - Real-time socket events
//! - `error` - Domain validation errors
//! - `config` - Application configuration

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Application configuration
pub mod config;

/// Marketplace domain types
pub mod marketplace;

/// Re-export commonly used types for convenience
pub use config::{AppConfig, AppConfigBuilder, ConfigError, ImageServiceConfig};
pub use error::SharedError;
pub use event::{ClientEvent, ServerEvent};
