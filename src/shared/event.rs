/**
 * Real-time Event System
 *
 * This module defines the JSON events exchanged over the real-time socket.
 * Every frame is `{"event": <name>, "data": {...}}`.
 *
 * Client events ask the server to join rooms, relay chat messages, typing
 * state and read receipts. Server events announce presence changes, new
 * messages, typing state and receipts to the sessions in a room.
 */
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

use crate::shared::marketplace::ChatMessage;

/// Client-side debounce after which "stopped typing" is inferred
pub const TYPING_DEBOUNCE: Duration = Duration::from_millis(1000);

/// Events sent by a connected client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Join the personal room and announce presence
    Join {
        /// Claimed identity, must match the authenticated one when present
        #[serde(default)]
        user_id: Option<Uuid>,
    },
    /// Join a conversation room
    JoinChat { chat_id: Uuid },
    /// Persist and relay a chat message
    SendMessage { chat_id: Uuid, content: String },
    /// Relay typing state, never persisted
    Typing { chat_id: Uuid, is_typing: bool },
    /// Mark inbound messages as seen and notify the other party
    MarkAsSeen { chat_id: Uuid },
}

/// Events pushed to connected clients
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerEvent {
    /// Handshake after the socket is authenticated
    Connected { user_id: Uuid, typing_debounce_ms: u64 },
    UserOnline { user_id: Uuid },
    UserOffline { user_id: Uuid },
    NewMessage { chat_id: Uuid, message: ChatMessage },
    UserTyping { chat_id: Uuid, user_id: Uuid, is_typing: bool },
    MessagesDelivered { chat_id: Uuid, user_id: Uuid, message_ids: Vec<Uuid> },
    MessagesSeen { chat_id: Uuid, user_id: Uuid, message_ids: Vec<Uuid> },
}

impl ServerEvent {
    pub fn connected(user_id: Uuid) -> Self {
        Self::Connected {
            user_id,
            typing_debounce_ms: TYPING_DEBOUNCE.as_millis() as u64,
        }
    }

    /// Wire name of the event, used in logs
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::Connected { .. } => "connected",
            ServerEvent::UserOnline { .. } => "userOnline",
            ServerEvent::UserOffline { .. } => "userOffline",
            ServerEvent::NewMessage { .. } => "newMessage",
            ServerEvent::UserTyping { .. } => "userTyping",
            ServerEvent::MessagesDelivered { .. } => "messagesDelivered",
            ServerEvent::MessagesSeen { .. } => "messagesSeen",
        }
    }
}
