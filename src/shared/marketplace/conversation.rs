//! Conversation Data Structures
//!
//! A conversation is a persisted thread of messages tied to one listing and
//! exactly two parties: the listing's owner and one prospective buyer.
//!
//! # Message State
//!
//! Every message moves through `sent → delivered → seen`. Transitions are
//! monotonic: a message can skip `delivered`, but it never moves backwards.
//! `delivered` and `seen` are best-effort and may never happen if the
//! recipient stays offline.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::account::Participant;
use super::listing::ListingSummary;
use crate::shared::error::SharedError;

/// Delivery state of a single message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageState {
    Sent,
    Delivered,
    Seen,
}

impl MessageState {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageState::Sent => "sent",
            MessageState::Delivered => "delivered",
            MessageState::Seen => "seen",
        }
    }

    /// Move forward to `target`. Returns `false` (and leaves `self` alone)
    /// when `target` is not strictly ahead.
    pub fn advance_to(&mut self, target: MessageState) -> bool {
        if target > *self {
            *self = target;
            true
        } else {
            false
        }
    }
}

impl fmt::Display for MessageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageState {
    type Err = SharedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sent" => Ok(MessageState::Sent),
            "delivered" => Ok(MessageState::Delivered),
            "seen" => Ok(MessageState::Seen),
            other => Err(SharedError::validation(
                "status",
                format!("Unknown message state '{}'", other),
            )),
        }
    }
}

/// A message in a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub status: MessageState,
}

impl ChatMessage {
    pub fn new(sender_id: Uuid, content: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender_id,
            content,
            timestamp: Utc::now(),
            status: MessageState::Sent,
        }
    }
}

/// Trim message content and reject empty messages
pub fn validate_content(raw: &str) -> Result<String, SharedError> {
    let content = raw.trim();
    if content.is_empty() {
        return Err(SharedError::validation("content", "Message content is required"));
    }
    Ok(content.to_string())
}

/// Denormalized summary of the newest message, used by list views
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub sender_id: Uuid,
}

impl From<&ChatMessage> for LastMessage {
    fn from(message: &ChatMessage) -> Self {
        Self {
            content: message.content.clone(),
            timestamp: message.timestamp,
            sender_id: message.sender_id,
        }
    }
}

/// A conversation about one listing between two accounts
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: Uuid,
    /// Always two entries: `[buyer, owner]` as of creation
    pub participants: [Uuid; 2],
    pub listing_id: Uuid,
    pub messages: Vec<ChatMessage>,
    pub last_message: Option<LastMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Conversation {
    pub fn new(listing_id: Uuid, buyer: Uuid, owner: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            participants: [buyer, owner],
            listing_id,
            messages: Vec::new(),
            last_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this conversation is keyed by `(listing, {a, b})`
    pub fn is_keyed_by(&self, listing_id: Uuid, a: Uuid, b: Uuid) -> bool {
        self.listing_id == listing_id && self.has_participant(a) && self.has_participant(b)
    }

    pub fn has_participant(&self, account_id: Uuid) -> bool {
        self.participants.contains(&account_id)
    }

    pub fn other_participant(&self, account_id: Uuid) -> Option<Uuid> {
        if !self.has_participant(account_id) {
            return None;
        }
        self.participants.iter().copied().find(|&id| id != account_id)
    }

    /// Append a message and refresh the last-message summary
    pub fn push(&mut self, message: ChatMessage) {
        self.last_message = Some(LastMessage::from(&message));
        self.updated_at = message.timestamp;
        self.messages.push(message);
    }

    /// Advance every message not authored by `viewer` towards `target`.
    /// Returns the ids of the messages that changed.
    pub fn advance_inbound(&mut self, viewer: Uuid, target: MessageState) -> Vec<Uuid> {
        self.messages
            .iter_mut()
            .filter(|m| m.sender_id != viewer)
            .filter_map(|m| m.status.advance_to(target).then_some(m.id))
            .collect()
    }
}

/// `POST /api/chat/start`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartChatRequest {
    pub product_id: Option<Uuid>,
}

/// `POST /api/chat/message`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    pub chat_id: Uuid,
    #[serde(default)]
    pub content: String,
}

/// Conversation as returned by the chat API, with participants and listing
/// resolved
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationView {
    pub id: Uuid,
    pub participants: Vec<Participant>,
    pub product: Option<ListingSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messages: Option<Vec<ChatMessage>>,
    pub last_message: Option<LastMessage>,
    pub updated_at: DateTime<Utc>,
}
