/**
 * Real-time Room Broadcasting
 *
 * This module provides the room-based broadcast hub. Every room is a
 * `tokio::sync::broadcast` channel created on first subscription:
 *
 * - `Room::Personal(account)` - every session of one account
 * - `Room::Conversation(chat)` - sessions that joined one conversation
 *
 * A separate "everyone" channel carries presence announcements to every
 * connected session.
 *
 * # Envelopes
 *
 * Events travel wrapped in an [`Envelope`]. One publish to several rooms
 * reuses the same envelope id, so a session subscribed to more than one of
 * those rooms can drop the duplicate. The envelope also records the session
 * that caused it, so that session can skip its own echo.
 */
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::shared::ServerEvent;

/// Buffered events per room before slow receivers start lagging
pub const ROOM_CAPACITY: usize = 256;

/// Identifier of one connected socket
pub type SessionId = Uuid;

/// A broadcast room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Room {
    Personal(Uuid),
    Conversation(Uuid),
}

/// An event on its way to the sessions of a room
#[derive(Debug, Clone)]
pub struct Envelope {
    pub id: Uuid,
    /// Session that caused the event, excluded from delivery
    pub origin: Option<SessionId>,
    pub event: ServerEvent,
}

impl Envelope {
    pub fn new(origin: Option<SessionId>, event: ServerEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            origin,
            event,
        }
    }
}

/// Room registry shared by the HTTP handlers and every socket session
///
/// Cloning is cheap; all clones share the same rooms.
#[derive(Clone)]
pub struct RealtimeHub {
    rooms: Arc<DashMap<Room, broadcast::Sender<Envelope>>>,
    everyone: broadcast::Sender<Envelope>,
}

impl RealtimeHub {
    pub fn new() -> Self {
        let (everyone, _) = broadcast::channel(ROOM_CAPACITY);
        Self {
            rooms: Arc::new(DashMap::new()),
            everyone,
        }
    }

    /// Subscribe to a room, creating its channel if needed
    pub fn subscribe(&self, room: Room) -> broadcast::Receiver<Envelope> {
        self.rooms
            .entry(room)
            .or_insert_with(|| broadcast::channel(ROOM_CAPACITY).0)
            .subscribe()
    }

    /// Subscribe to events addressed to every session
    pub fn subscribe_all(&self) -> broadcast::Receiver<Envelope> {
        self.everyone.subscribe()
    }

    /// Publish to one room. Returns the number of receivers reached.
    pub fn publish(&self, room: Room, origin: Option<SessionId>, event: ServerEvent) -> usize {
        self.publish_many(&[room], origin, event)
    }

    /// Publish the same envelope to several rooms.
    ///
    /// Rooms without a channel have no subscribers and are skipped.
    pub fn publish_many(&self, rooms: &[Room], origin: Option<SessionId>, event: ServerEvent) -> usize {
        let name = event.name();
        let envelope = Envelope::new(origin, event);
        let mut reached = 0;

        for room in rooms {
            if let Some(sender) = self.rooms.get(room) {
                // Err only means nobody is listening
                reached += sender.send(envelope.clone()).unwrap_or(0);
            }
        }

        tracing::debug!("[Realtime] {} published to {} receivers", name, reached);
        reached
    }

    /// Publish to every connected session
    pub fn broadcast(&self, origin: Option<SessionId>, event: ServerEvent) -> usize {
        let name = event.name();
        let reached = self.everyone.send(Envelope::new(origin, event)).unwrap_or(0);
        tracing::debug!("[Realtime] {} broadcast to {} receivers", name, reached);
        reached
    }

    /// Drop room channels that have no subscribers left
    pub fn cleanup_inactive_rooms(&self) -> usize {
        let before = self.rooms.len();
        self.rooms.retain(|_, sender| sender.receiver_count() > 0);
        before.saturating_sub(self.rooms.len())
    }

    pub fn subscriber_count(&self, room: Room) -> usize {
        self.rooms
            .get(&room)
            .map(|sender| sender.receiver_count())
            .unwrap_or(0)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RealtimeHub {
    fn default() -> Self {
        Self::new()
    }
}
