use std::sync::Arc;

use crate::application::ports::{
    FileLoader, FileLoaderError, LlmClient, LlmClientError, RepositoryError, SessionRepository,
};
use crate::domain::{
    ChatSession, ContentType, Document, DocumentId, Message, MessageRole, SessionDocument,
    SessionId, SessionOverview,
};
use crate::infrastructure::observability::sanitize_prompt;

use super::generation_options::GenerationOptions;
use super::prompt_assembler::{PromptAssembler, PromptError};
use super::token_counter::count_tokens;

pub struct ChatService<L>
where
    L: LlmClient + ?Sized,
{
    file_loader: Arc<dyn FileLoader>,
    llm_client: Arc<L>,
    session_repository: Arc<dyn SessionRepository>,
    assembler: PromptAssembler,
    generation: GenerationOptions,
}

impl<L> ChatService<L>
where
    L: LlmClient + ?Sized,
{
    pub fn new(
        file_loader: Arc<dyn FileLoader>,
        llm_client: Arc<L>,
        session_repository: Arc<dyn SessionRepository>,
        assembler: PromptAssembler,
        generation: GenerationOptions,
    ) -> Self {
        Self {
            file_loader,
            llm_client,
            session_repository,
            assembler,
            generation,
        }
    }

    pub async fn start_session(&self, title: Option<String>) -> Result<ChatSession, ChatError> {
        let session = ChatSession::new(title);
        self.session_repository.create_session(&session).await?;
        tracing::info!(session_id = %session.id, "Chat session started");
        Ok(session)
    }

    pub async fn overview(&self, session_id: SessionId) -> Result<SessionOverview, ChatError> {
        self.session_repository
            .get_overview(session_id)
            .await?
            .ok_or(ChatError::SessionNotFound(session_id))
    }

    pub async fn end_session(&self, session_id: SessionId) -> Result<(), ChatError> {
        self.session_repository
            .delete_session(session_id)
            .await
            .map_err(session_not_found)
    }

    pub async fn active_sessions(&self) -> Result<usize, ChatError> {
        Ok(self.session_repository.count_sessions().await?)
    }

    /// Extracts the upload and makes it the session's document, replacing any previous one.
    #[tracing::instrument(
        skip(self, data, session_id),
        fields(session_id = %session_id, bytes = data.len())
    )]
    pub async fn attach_document(
        &self,
        session_id: SessionId,
        data: &[u8],
        filename: String,
        content_type: ContentType,
    ) -> Result<DocumentSummary, ChatError> {
        self.overview(session_id).await?;

        let document = Document::new(filename, content_type, data.len() as u64);
        let text = self.file_loader.extract_text(data, &document).await?;

        let summary = DocumentSummary {
            document_id: document.id,
            filename: document.filename.clone(),
            content_type,
            characters: text.chars().count(),
            tokens: count_tokens(&text),
        };

        self.session_repository
            .set_document(session_id, SessionDocument::new(document, text))
            .await
            .map_err(session_not_found)?;

        tracing::info!(
            document_id = %summary.document_id.as_uuid(),
            characters = summary.characters,
            tokens = summary.tokens,
            "Document attached to session"
        );

        Ok(summary)
    }

    #[tracing::instrument(skip(self, session_id, question), fields(session_id = %session_id))]
    pub async fn ask(&self, session_id: SessionId, question: &str) -> Result<ChatAnswer, ChatError> {
        tracing::debug!(question = %sanitize_prompt(question), "Answering question");

        let document = self.document_text(session_id).await?;
        let history = self
            .session_repository
            .get_messages(session_id, self.assembler.max_history_messages())
            .await
            .map_err(session_not_found)?;

        let prompt = self
            .assembler
            .assemble(document.as_deref(), &history, question)?;

        if prompt.document_truncated {
            tracing::debug!(used = prompt.used, "Document truncated to fit the prompt budget");
        }

        let completion = self
            .llm_client
            .chat(&self.generation.request(prompt.messages))
            .await?;

        let turn = [
            Message::new(session_id, MessageRole::User, question.trim().to_string()),
            Message::new(session_id, MessageRole::Assistant, completion.content.clone()),
        ];
        self.session_repository
            .append_turn(session_id, &turn)
            .await
            .map_err(session_not_found)?;

        tracing::info!(
            history_dropped = prompt.history_dropped,
            document_truncated = prompt.document_truncated,
            "Question answered"
        );

        Ok(ChatAnswer {
            answer: completion.content,
            document_truncated: prompt.document_truncated,
            history_dropped: prompt.history_dropped,
        })
    }

    pub async fn history(&self, session_id: SessionId) -> Result<Vec<Message>, ChatError> {
        self.session_repository
            .get_messages(session_id, usize::MAX)
            .await
            .map_err(session_not_found)
    }

    /// Text of the attached document, if any. Shared, not copied.
    pub async fn document_text(
        &self,
        session_id: SessionId,
    ) -> Result<Option<Arc<str>>, ChatError> {
        self.session_repository
            .get_document_text(session_id)
            .await
            .map_err(session_not_found)
    }
}

fn session_not_found(error: RepositoryError) -> ChatError {
    match error {
        RepositoryError::NotFound(id) => ChatError::SessionNotFound(id),
        other => ChatError::Repository(other),
    }
}

#[derive(Debug, Clone)]
pub struct DocumentSummary {
    pub document_id: DocumentId,
    pub filename: String,
    pub content_type: ContentType,
    pub characters: usize,
    pub tokens: usize,
}

#[derive(Debug, Clone)]
pub struct ChatAnswer {
    pub answer: String,
    pub document_truncated: bool,
    pub history_dropped: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("session not found: {0}")]
    SessionNotFound(SessionId),
    #[error("extraction: {0}")]
    Extraction(#[from] FileLoaderError),
    #[error("prompt: {0}")]
    Prompt(#[from] PromptError),
    #[error("completion: {0}")]
    Completion(#[from] LlmClientError),
    #[error("repository: {0}")]
    Repository(#[from] RepositoryError),
}
