use std::sync::Arc;

use crate::domain::{ChatSession, Message, SessionDocument, SessionId, SessionOverview};
use async_trait::async_trait;

use super::RepositoryError;

/// Session store. Operations on an unknown session fail with
/// [`RepositoryError::NotFound`]; only the `get_*` lookups answer `Ok(None)`.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: &ChatSession) -> Result<(), RepositoryError>;

    /// Full copy of the session, messages and document included.
    async fn get_session(&self, id: SessionId) -> Result<Option<ChatSession>, RepositoryError>;

    async fn get_overview(
        &self,
        id: SessionId,
    ) -> Result<Option<SessionOverview>, RepositoryError>;

    /// `Ok(None)` when the session exists but has no document yet.
    async fn get_document_text(&self, id: SessionId) -> Result<Option<Arc<str>>, RepositoryError>;

    async fn set_document(
        &self,
        id: SessionId,
        document: SessionDocument,
    ) -> Result<(), RepositoryError>;

    /// Appends all `messages` under one write, so a turn is stored whole or not at all.
    async fn append_turn(
        &self,
        session_id: SessionId,
        messages: &[Message],
    ) -> Result<(), RepositoryError>;

    /// Returns the newest `limit` messages in chronological order.
    async fn get_messages(
        &self,
        session_id: SessionId,
        limit: usize,
    ) -> Result<Vec<Message>, RepositoryError>;

    async fn count_sessions(&self) -> Result<usize, RepositoryError>;

    async fn delete_session(&self, id: SessionId) -> Result<(), RepositoryError>;
}
