//! Session storage behind a small capability interface.
//!
//! Route handlers only ever see [`SessionStore`], so the in-process map can
//! be swapped for a shared cache without touching them.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::SessionError;
use crate::session::{AuthSession, SessionId};

/// Storage capability for authentication sessions.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Loads a session by ID.
    ///
    /// Expired records are treated as absent; a replayed cookie referencing
    /// a destroyed or expired session reads as no session at all.
    async fn load(&self, id: &SessionId) -> Result<Option<AuthSession>, SessionError>;

    /// Persists a session, replacing any record with the same ID.
    async fn save(&self, session: &AuthSession) -> Result<(), SessionError>;

    /// Invalidates a session record.
    ///
    /// Destroying an absent session is not an error; callers await this
    /// before sending any redirect so the old cookie cannot read stale
    /// state afterwards.
    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError>;
}

/// In-process session store backed by a `HashMap`.
///
/// Suitable for a single instance. Expired records linger until loaded or
/// swept by [`purge_expired`](MemorySessionStore::purge_expired).
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<SessionId, AuthSession>>,
}

impl MemorySessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes all expired sessions, returning how many were dropped.
    pub async fn purge_expired(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired());
        before - sessions.len()
    }

    /// Returns the number of live records, expired or not.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Returns true if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, id: &SessionId) -> Result<Option<AuthSession>, SessionError> {
        let expired = {
            let sessions = self.sessions.read().await;
            match sessions.get(id) {
                Some(session) if session.is_expired() => true,
                Some(session) => return Ok(Some(session.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            tracing::debug!(session_id = %id, "dropping expired session on load");
            self.sessions.write().await.remove(id);
        }
        Ok(None)
    }

    async fn save(&self, session: &AuthSession) -> Result<(), SessionError> {
        self.sessions
            .write()
            .await
            .insert(session.id().clone(), session.clone());
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<(), SessionError> {
        self.sessions.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::UserClaims;
    use chrono::Duration;

    fn session(ttl_seconds: i64) -> AuthSession {
        AuthSession::new(SessionId::generate(), Duration::seconds(ttl_seconds))
    }

    #[tokio::test]
    async fn save_then_load_roundtrips() {
        let store = MemorySessionStore::new();
        let mut s = session(3600);
        s.complete_login(UserClaims::new("sub-1".to_string()));

        store.save(&s).await.expect("save");
        let loaded = store.load(s.id()).await.expect("load").expect("present");
        assert_eq!(loaded, s);
    }

    #[tokio::test]
    async fn load_unknown_id_is_none() {
        let store = MemorySessionStore::new();
        let loaded = store.load(&SessionId::generate()).await.expect("load");
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn expired_session_reads_as_absent_and_is_dropped() {
        let store = MemorySessionStore::new();
        let s = session(-1);
        store.save(&s).await.expect("save");

        assert!(store.load(s.id()).await.expect("load").is_none());
        // The expired record was removed, not just hidden.
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn destroy_removes_the_record() {
        let store = MemorySessionStore::new();
        let s = session(3600);
        store.save(&s).await.expect("save");

        store.destroy(s.id()).await.expect("destroy");
        assert!(store.load(s.id()).await.expect("load").is_none());
    }

    #[tokio::test]
    async fn destroy_is_idempotent() {
        let store = MemorySessionStore::new();
        let s = session(3600);
        store.save(&s).await.expect("save");

        store.destroy(s.id()).await.expect("first destroy");
        store.destroy(s.id()).await.expect("second destroy");
        store
            .destroy(&SessionId::generate())
            .await
            .expect("destroy of unknown id");
    }

    #[tokio::test]
    async fn purge_drops_only_expired_sessions() {
        let store = MemorySessionStore::new();
        let live = session(3600);
        let dead_a = session(-1);
        let dead_b = session(-10);
        store.save(&live).await.expect("save");
        store.save(&dead_a).await.expect("save");
        store.save(&dead_b).await.expect("save");

        assert_eq!(store.purge_expired().await, 2);
        assert_eq!(store.len().await, 1);
        assert!(store.load(live.id()).await.expect("load").is_some());
    }

    #[tokio::test]
    async fn save_overwrites_existing_record() {
        let store = MemorySessionStore::new();
        let mut s = session(3600);
        store.save(&s).await.expect("save anonymous");

        s.complete_login(UserClaims::new("sub-2".to_string()));
        store.save(&s).await.expect("save authenticated");

        let loaded = store.load(s.id()).await.expect("load").expect("present");
        assert!(loaded.is_authenticated());
        assert_eq!(store.len().await, 1);
    }
}
