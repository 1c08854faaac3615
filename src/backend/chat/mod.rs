//! Chat Module
//!
//! Buyer/seller conversations about a listing.
//!
//! # Module Structure
//!
//! ```text
//! chat/
//! ├── mod.rs      - Module exports and documentation
//! ├── service.rs  - Conversation and message operations
//! └── handlers.rs - REST handlers under /api/chat
//! ```
//!
//! # Message Flow
//!
//! 1. The message is validated and stored with state `sent`
//! 2. If the recipient is online, their inbound messages become `delivered`
//! 3. `newMessage` is published to the conversation room and the
//!    recipient's personal room
//!
//! Opening a conversation or sending `markAsSeen` moves inbound messages to
//! `seen` and publishes `messagesSeen`.

pub mod handlers;
pub mod service;

pub use handlers::{get_chat, my_chats, send_chat_message, start_chat};
