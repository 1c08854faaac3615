//! Real-time Module
//!
//! This module provides presence, room broadcasting and the WebSocket
//! channel used by the chat client.
//!
//! # Architecture
//!
//! - **`hub`** - Room registry over `tokio::sync::broadcast` channels
//! - **`presence`** - Account to active session map
//! - **`session`** - Per-socket state and client event handling
//! - **`socket`** - `GET /ws` upgrade handler and frame loop
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs      - Module exports and documentation
//! ├── hub.rs      - Rooms, envelopes, cleanup
//! ├── presence.rs - Online registry
//! ├── session.rs  - RealtimeSession and SessionEvents
//! └── socket.rs   - WebSocket handler
//! ```
//!
//! # Rooms
//!
//! Each account has a personal room joined on `join`; each conversation has
//! a room joined on `joinChat`. The HTTP chat handlers publish into the same
//! rooms, so REST and socket clients see the same events.
//!
//! State here is volatile and process-local. Nothing is coordinated across
//! instances.

pub mod hub;
pub mod presence;
pub mod session;
pub mod socket;

pub use hub::{Envelope, RealtimeHub, Room, SessionId};
pub use presence::PresenceRegistry;
pub use session::{RealtimeSession, SessionEvents};
pub use socket::ws_handler;
