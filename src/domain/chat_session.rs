use std::sync::Arc;

use super::{Document, Message, SessionId};
use chrono::{DateTime, Utc};

/// Extracted text of the document a session is answering questions about.
///
/// The text is shared so that reading it for a prompt or a summary does not
/// copy what can be several megabytes.
#[derive(Debug, Clone)]
pub struct SessionDocument {
    pub document: Document,
    pub text: Arc<str>,
    pub characters: usize,
    pub extracted_at: DateTime<Utc>,
}

impl SessionDocument {
    pub fn new(document: Document, text: String) -> Self {
        Self {
            document,
            characters: text.chars().count(),
            text: Arc::from(text),
            extracted_at: Utc::now(),
        }
    }

    pub fn overview(&self) -> DocumentOverview {
        DocumentOverview {
            document: self.document.clone(),
            characters: self.characters,
            extracted_at: self.extracted_at,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatSession {
    pub id: SessionId,
    pub title: Option<String>,
    pub document: Option<SessionDocument>,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ChatSession {
    pub fn new(title: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            title,
            document: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn overview(&self) -> SessionOverview {
        SessionOverview {
            id: self.id,
            title: self.title.clone(),
            document: self.document.as_ref().map(SessionDocument::overview),
            message_count: self.messages.len(),
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// Session metadata without the document text or message bodies.
#[derive(Debug, Clone)]
pub struct SessionOverview {
    pub id: SessionId,
    pub title: Option<String>,
    pub document: Option<DocumentOverview>,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct DocumentOverview {
    pub document: Document,
    pub characters: usize,
    pub extracted_at: DateTime<Utc>,
}
