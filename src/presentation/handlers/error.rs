use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::ports::{FileLoaderError, LlmClientError, RepositoryError};
use crate::application::services::{ChatError, PromptError, SummaryError};

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub(super) fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn llm_error_status(error: &LlmClientError) -> StatusCode {
    match error {
        LlmClientError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        LlmClientError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        LlmClientError::ApiRequestFailed(_) | LlmClientError::InvalidResponse(_) => {
            StatusCode::BAD_GATEWAY
        }
    }
}

pub(super) fn chat_error_response(error: ChatError) -> Response {
    let status = match &error {
        ChatError::SessionNotFound(_) => StatusCode::NOT_FOUND,
        ChatError::Extraction(FileLoaderError::UnsupportedContentType(_)) => {
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        }
        ChatError::Extraction(FileLoaderError::TimedOut { .. }) => StatusCode::GATEWAY_TIMEOUT,
        ChatError::Extraction(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ChatError::Prompt(PromptError::EmptyQuestion) => StatusCode::BAD_REQUEST,
        ChatError::Prompt(PromptError::BudgetExceeded { .. }) => StatusCode::PAYLOAD_TOO_LARGE,
        ChatError::Completion(e) => llm_error_status(e),
        ChatError::Repository(RepositoryError::NotFound(_)) => StatusCode::NOT_FOUND,
        ChatError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        tracing::error!(error = %error, "Request failed");
    } else {
        tracing::warn!(error = %error, "Request rejected");
    }

    error_response(status, error.to_string())
}

pub(super) fn summary_error_response(error: SummaryError) -> Response {
    let status = match &error {
        SummaryError::EmptyDocument => StatusCode::UNPROCESSABLE_ENTITY,
        SummaryError::Splitting(_) => StatusCode::INTERNAL_SERVER_ERROR,
        SummaryError::Section { source, .. } => llm_error_status(source),
        SummaryError::Combine(source) => llm_error_status(source),
    };

    tracing::error!(error = %error, "Summarization failed");
    error_response(status, error.to_string())
}
