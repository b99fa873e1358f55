use super::{MessageId, MessageRole, SessionId};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct Message {
    pub id: MessageId,
    pub session_id: SessionId,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(session_id: SessionId, role: MessageRole, content: String) -> Self {
        Self {
            id: MessageId::new(),
            session_id,
            role,
            content,
            created_at: Utc::now(),
        }
    }
}
