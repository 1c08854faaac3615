//! Presence registry
//!
//! Maps an account to the socket session that most recently joined for it.
//! A second tab replaces the first; when the replaced tab disconnects it must
//! not take the account offline, hence [`PresenceRegistry::remove_if`].

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::backend::realtime::hub::SessionId;

#[derive(Clone, Default)]
pub struct PresenceRegistry {
    online: Arc<DashMap<Uuid, SessionId>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `session` as the active session of `user`.
    /// Returns the session it replaced, if any.
    pub fn register(&self, user: Uuid, session: SessionId) -> Option<SessionId> {
        self.online.insert(user, session)
    }

    /// Remove `user` only while it still maps to `session`
    pub fn remove_if(&self, user: Uuid, session: SessionId) -> bool {
        self.online
            .remove_if(&user, |_, active| *active == session)
            .is_some()
    }

    pub fn is_online(&self, user: Uuid) -> bool {
        self.online.contains_key(&user)
    }

    pub fn session_of(&self, user: Uuid) -> Option<SessionId> {
        self.online.get(&user).map(|entry| *entry.value())
    }

    pub fn online_count(&self) -> usize {
        self.online.len()
    }
}
