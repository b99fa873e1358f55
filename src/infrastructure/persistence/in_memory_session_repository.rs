use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use lru::LruCache;
use tokio::sync::Mutex;

use crate::application::ports::{RepositoryError, SessionRepository};
use crate::domain::{ChatSession, Message, SessionDocument, SessionId, SessionOverview};

pub const DEFAULT_MAX_SESSIONS: usize = 1_000;

struct StoredSession {
    session: ChatSession,
    last_access: Instant,
}

/// Process-local session store bounded by count and idle time.
///
/// Every access moves a session to the front of the LRU order and refreshes
/// its idle clock, so idle sessions collect at the back. Creating a session
/// past `max_sessions` evicts the least recently used one. A session untouched
/// for longer than `idle_ttl` is dropped the next time the store is used.
pub struct InMemorySessionRepository {
    sessions: Mutex<LruCache<SessionId, StoredSession>>,
    idle_ttl: Option<Duration>,
}

impl Default for InMemorySessionRepository {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS, None)
    }
}

impl InMemorySessionRepository {
    /// `max_sessions` of zero is treated as one. `None` disables idle expiry.
    pub fn new(max_sessions: usize, idle_ttl: Option<Duration>) -> Self {
        let capacity = NonZeroUsize::new(max_sessions).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
            idle_ttl,
        }
    }

    fn is_idle(&self, stored: &StoredSession, now: Instant) -> bool {
        self.idle_ttl
            .is_some_and(|ttl| now.duration_since(stored.last_access) > ttl)
    }

    /// Pops expired sessions off the back of the LRU order.
    fn evict_idle(&self, sessions: &mut LruCache<SessionId, StoredSession>) {
        let now = Instant::now();
        while let Some((id, stored)) = sessions.peek_lru() {
            if !self.is_idle(stored, now) {
                break;
            }
            let id = *id;
            sessions.pop(&id);
            tracing::debug!(session_id = %id, "Evicted idle session");
        }
    }

    /// Runs `f` on a live session and refreshes its idle clock.
    async fn with_session<T>(
        &self,
        id: SessionId,
        f: impl FnOnce(&mut ChatSession) -> T,
    ) -> Option<T> {
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions);
        let stored = sessions.get_mut(&id)?;
        stored.last_access = Instant::now();
        Some(f(&mut stored.session))
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions);
        if sessions.contains(&session.id) {
            return Err(RepositoryError::AlreadyExists(session.id));
        }

        let stored = StoredSession {
            session: session.clone(),
            last_access: Instant::now(),
        };
        if let Some((evicted, _)) = sessions.push(session.id, stored) {
            tracing::info!(
                session_id = %evicted,
                capacity = sessions.cap().get(),
                "Session store full, evicted least recently used session"
            );
        }
        Ok(())
    }

    async fn get_session(&self, id: SessionId) -> Result<Option<ChatSession>, RepositoryError> {
        Ok(self.with_session(id, |session| session.clone()).await)
    }

    async fn get_overview(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionOverview>, RepositoryError> {
        Ok(self.with_session(id, |session| session.overview()).await)
    }

    async fn get_document_text(&self, id: SessionId) -> Result<Option<Arc<str>>, RepositoryError> {
        self.with_session(id, |session| {
            session.document.as_ref().map(|d| Arc::clone(&d.text))
        })
        .await
        .ok_or(RepositoryError::NotFound(id))
    }

    async fn set_document(
        &self,
        id: SessionId,
        document: SessionDocument,
    ) -> Result<(), RepositoryError> {
        self.with_session(id, |session| {
            session.document = Some(document);
            session.updated_at = Utc::now();
        })
        .await
        .ok_or(RepositoryError::NotFound(id))
    }

    async fn append_turn(
        &self,
        session_id: SessionId,
        messages: &[Message],
    ) -> Result<(), RepositoryError> {
        self.with_session(session_id, |session| {
            session.messages.extend_from_slice(messages);
            session.updated_at = Utc::now();
        })
        .await
        .ok_or(RepositoryError::NotFound(session_id))
    }

    async fn get_messages(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError> {
        self.with_session(session_id, |session| {
            let start = session.messages.len().saturating_sub(limit);
            session.messages[start..].to_vec()
        })
        .await
        .ok_or(RepositoryError::NotFound(session_id))
    }

    async fn count_sessions(&self) -> Result<usize, RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions);
        Ok(sessions.len())
    }

    async fn delete_session(&self, id: SessionId) -> Result<(), RepositoryError> {
        let mut sessions = self.sessions.lock().await;
        self.evict_idle(&mut sessions);
        sessions
            .pop(&id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound(id))
    }
}
