use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::LlmClient;
use crate::domain::SessionId;
use crate::presentation::state::AppState;

use super::error::{chat_error_response, error_response, summary_error_response};
use super::extract::ApiPath;

#[derive(Serialize)]
pub struct SectionDto {
    pub index: usize,
    pub offset: usize,
    pub summary: String,
}

#[derive(Serialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub sections: Vec<SectionDto>,
}

#[tracing::instrument(skip(state))]
pub async fn summarize_handler<L>(
    State(state): State<AppState<L>>,
    ApiPath(session_id): ApiPath<Uuid>,
) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
{
    let text = match state
        .chat_service
        .document_text(SessionId::from_uuid(session_id))
        .await
    {
        Ok(Some(text)) => text,
        Ok(None) => {
            return error_response(StatusCode::CONFLICT, "No document attached to this session");
        }
        Err(e) => return chat_error_response(e),
    };

    match state.summary_service.summarize(&text).await {
        Ok(report) => {
            let sections = report
                .sections
                .into_iter()
                .map(|s| SectionDto {
                    index: s.index,
                    offset: s.offset,
                    summary: s.summary,
                })
                .collect();
            (
                StatusCode::OK,
                Json(SummaryResponse {
                    summary: report.summary,
                    sections,
                }),
            )
                .into_response()
        }
        Err(e) => summary_error_response(e),
    }
}
