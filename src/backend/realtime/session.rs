/**
 * Real-time Session
 *
 * One `RealtimeSession` exists per connected socket. It owns the session's
 * room subscriptions and turns client events into store writes and room
 * publications. It knows nothing about WebSocket framing, so tests drive it
 * directly.
 *
 * # Delivery
 *
 * Each subscribed room gets a forwarder task that copies envelopes from the
 * room channel into the session outbox, skipping envelopes this session
 * caused. [`SessionEvents`] reads the outbox and drops envelopes it has
 * already delivered, which happens when the same publish reaches the
 * session through its personal room and a conversation room.
 *
 * # Lifecycle
 *
 * - `open` queues the `connected` handshake and subscribes to presence
 *   announcements
 * - `join` registers presence and joins the personal room
 * - `close` stops the forwarders and announces `userOffline` if this
 *   session was still the account's active one
 */
use std::collections::{HashMap, VecDeque};

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::backend::chat::service;
use crate::backend::error::BackendError;
use crate::backend::realtime::hub::{Envelope, Room, SessionId};
use crate::backend::server::state::AppState;
use crate::shared::{ClientEvent, ServerEvent};

/// Envelopes buffered between the forwarders and the socket writer
pub const OUTBOX_CAPACITY: usize = 256;

/// Envelope ids remembered for duplicate suppression
const RECENT_ENVELOPES: usize = 32;

pub struct RealtimeSession {
    id: SessionId,
    user_id: Uuid,
    state: AppState,
    outbox: mpsc::Sender<Envelope>,
    everyone: JoinHandle<()>,
    forwarders: HashMap<Room, JoinHandle<()>>,
}

/// Receiving half of a session, yields events in delivery order
pub struct SessionEvents {
    rx: mpsc::Receiver<Envelope>,
    recent: VecDeque<Uuid>,
}

impl SessionEvents {
    /// Next event for this session, `None` once the session is closed
    pub async fn recv(&mut self) -> Option<ServerEvent> {
        while let Some(envelope) = self.rx.recv().await {
            if self.recent.contains(&envelope.id) {
                continue;
            }
            if self.recent.len() == RECENT_ENVELOPES {
                self.recent.pop_front();
            }
            self.recent.push_back(envelope.id);
            return Some(envelope.event);
        }
        None
    }
}

fn forward(
    session: SessionId,
    mut rx: broadcast::Receiver<Envelope>,
    outbox: mpsc::Sender<Envelope>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(envelope) => {
                    if envelope.origin == Some(session) {
                        continue;
                    }
                    if outbox.send(envelope).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!("[Realtime] Session {} lagged, skipped {} events", session, skipped);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

impl RealtimeSession {
    /// Open a session for an authenticated account
    pub fn open(state: AppState, user_id: Uuid) -> (Self, SessionEvents) {
        let id = Uuid::new_v4();
        let (outbox, rx) = mpsc::channel(OUTBOX_CAPACITY);

        // Fresh channel, the handshake always fits
        let _ = outbox.try_send(Envelope::new(None, ServerEvent::connected(user_id)));
        let everyone = forward(id, state.hub.subscribe_all(), outbox.clone());

        let session = Self {
            id,
            user_id,
            state,
            outbox,
            everyone,
            forwarders: HashMap::new(),
        };
        let events = SessionEvents {
            rx,
            recent: VecDeque::with_capacity(RECENT_ENVELOPES),
        };
        (session, events)
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn user_id(&self) -> Uuid {
        self.user_id
    }

    pub fn is_in(&self, room: Room) -> bool {
        self.forwarders.contains_key(&room)
    }

    fn enter(&mut self, room: Room) {
        if self.is_in(room) {
            return;
        }
        let rx = self.state.hub.subscribe(room);
        let handle = forward(self.id, rx, self.outbox.clone());
        self.forwarders.insert(room, handle);
    }

    /// Apply one client event
    pub async fn handle(&mut self, event: ClientEvent) -> Result<(), BackendError> {
        match event {
            ClientEvent::Join { user_id } => self.join(user_id),
            ClientEvent::JoinChat { chat_id } => self.join_chat(chat_id).await,
            ClientEvent::SendMessage { chat_id, content } => {
                service::send_message(&self.state, self.user_id, chat_id, &content, Some(self.id))
                    .await?;
                Ok(())
            }
            ClientEvent::Typing { chat_id, is_typing } => self.typing(chat_id, is_typing),
            ClientEvent::MarkAsSeen { chat_id } => {
                service::mark_seen(&self.state, self.user_id, chat_id, Some(self.id)).await?;
                Ok(())
            }
        }
    }

    fn join(&mut self, claimed: Option<Uuid>) -> Result<(), BackendError> {
        if claimed.is_some_and(|claimed| claimed != self.user_id) {
            return Err(BackendError::forbidden("Cannot join as another user"));
        }

        if let Some(previous) = self.state.presence.register(self.user_id, self.id) {
            tracing::debug!("[Realtime] Session {} replaces {} for {}", self.id, previous, self.user_id);
        }
        self.enter(Room::Personal(self.user_id));
        self.state
            .hub
            .broadcast(Some(self.id), ServerEvent::UserOnline { user_id: self.user_id });

        tracing::info!("[Realtime] User {} joined", self.user_id);
        Ok(())
    }

    async fn join_chat(&mut self, chat_id: Uuid) -> Result<(), BackendError> {
        service::load_participant_conversation(&self.state.store, chat_id, self.user_id).await?;
        self.enter(Room::Conversation(chat_id));
        tracing::debug!("[Realtime] Session {} joined chat {}", self.id, chat_id);
        Ok(())
    }

    fn typing(&self, chat_id: Uuid, is_typing: bool) -> Result<(), BackendError> {
        let room = Room::Conversation(chat_id);
        if !self.is_in(room) {
            return Err(BackendError::forbidden("Join the chat before typing"));
        }
        self.state.hub.publish(
            room,
            Some(self.id),
            ServerEvent::UserTyping {
                chat_id,
                user_id: self.user_id,
                is_typing,
            },
        );
        Ok(())
    }

    /// Stop delivery and release presence
    pub fn close(self) {
        self.everyone.abort();
        for handle in self.forwarders.values() {
            handle.abort();
        }

        if self.state.presence.remove_if(self.user_id, self.id) {
            self.state
                .hub
                .broadcast(Some(self.id), ServerEvent::UserOffline { user_id: self.user_id });
            tracing::info!("[Realtime] User {} went offline", self.user_id);
        }
    }
}
