use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::ports::LlmClient;
use crate::domain::{SessionId, SessionOverview};
use crate::presentation::state::AppState;

use super::error::chat_error_response;
use super::extract::{ApiJson, ApiPath};

/// The body is optional; a bare `POST` opens an untitled session.
#[derive(Deserialize)]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Serialize)]
pub struct SessionCreatedResponse {
    pub session_id: String,
}

#[derive(Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub title: Option<String>,
    pub document: Option<DocumentInfo>,
    pub message_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DocumentInfo {
    pub document_id: String,
    pub filename: String,
    pub content_type: &'static str,
    pub size_bytes: u64,
    pub characters: usize,
}

impl From<SessionOverview> for SessionResponse {
    fn from(session: SessionOverview) -> Self {
        Self {
            session_id: session.id.to_string(),
            title: session.title,
            document: session.document.map(|d| DocumentInfo {
                document_id: d.document.id.as_uuid().to_string(),
                filename: d.document.filename,
                content_type: d.document.content_type.as_mime(),
                size_bytes: d.document.size_bytes,
                characters: d.characters,
            }),
            message_count: session.message_count,
            created_at: session.created_at,
            updated_at: session.updated_at,
        }
    }
}

#[tracing::instrument(skip(state, request))]
pub async fn create_session_handler<L>(
    State(state): State<AppState<L>>,
    request: Option<ApiJson<CreateSessionRequest>>,
) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
{
    let title = request.and_then(|ApiJson(request)| request.title);
    match state.chat_service.start_session(title).await {
        Ok(session) => (
            StatusCode::CREATED,
            Json(SessionCreatedResponse {
                session_id: session.id.to_string(),
            }),
        )
            .into_response(),
        Err(e) => chat_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn get_session_handler<L>(
    State(state): State<AppState<L>>,
    ApiPath(session_id): ApiPath<Uuid>,
) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
{
    match state
        .chat_service
        .overview(SessionId::from_uuid(session_id))
        .await
    {
        Ok(session) => (StatusCode::OK, Json(SessionResponse::from(session))).into_response(),
        Err(e) => chat_error_response(e),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_session_handler<L>(
    State(state): State<AppState<L>>,
    ApiPath(session_id): ApiPath<Uuid>,
) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
{
    match state
        .chat_service
        .end_session(SessionId::from_uuid(session_id))
        .await
    {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => chat_error_response(e),
    }
}
