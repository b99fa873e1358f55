use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::LlmClient;
use crate::domain::SessionId;
use crate::infrastructure::observability::sanitize_prompt;
use crate::presentation::state::AppState;

use super::error::chat_error_response;
use super::extract::{ApiJson, ApiPath};

#[derive(Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Serialize)]
pub struct AskResponse {
    pub answer: String,
    pub document_truncated: bool,
    pub history_dropped: usize,
}

#[derive(Serialize)]
pub struct MessageDto {
    pub role: &'static str,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct HistoryResponse {
    pub messages: Vec<MessageDto>,
}

#[tracing::instrument(skip(state, request))]
pub async fn ask_handler<L>(
    State(state): State<AppState<L>>,
    ApiPath(session_id): ApiPath<Uuid>,
    ApiJson(request): ApiJson<AskRequest>,
) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
{
    tracing::debug!(question = %sanitize_prompt(&request.question), "Processing question");

    match state
        .chat_service
        .ask(SessionId::from_uuid(session_id), &request.question)
        .await
    {
        Ok(answer) => (
            StatusCode::OK,
            Json(AskResponse {
                answer: answer.answer,
                document_truncated: answer.document_truncated,
                history_dropped: answer.history_dropped,
            }),
        )
            .into_response(),
        Err(e) => chat_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn history_handler<L>(
    State(state): State<AppState<L>>,
    ApiPath(session_id): ApiPath<Uuid>,
) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
{
    match state
        .chat_service
        .history(SessionId::from_uuid(session_id))
        .await
    {
        Ok(messages) => {
            let messages = messages
                .into_iter()
                .map(|m| MessageDto {
                    role: m.role.as_str(),
                    content: m.content,
                    created_at: m.created_at,
                })
                .collect();
            (StatusCode::OK, Json(HistoryResponse { messages })).into_response()
        }
        Err(e) => chat_error_response(e),
    }
}
