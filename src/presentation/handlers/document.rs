use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::ports::LlmClient;
use crate::domain::{ContentType, SessionId};
use crate::presentation::state::AppState;

use super::error::{chat_error_response, error_response};
use super::extract::ApiPath;

#[derive(Serialize)]
pub struct DocumentUploadResponse {
    pub document_id: String,
    pub filename: String,
    pub content_type: &'static str,
    pub characters: usize,
    pub tokens: usize,
    pub message: String,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_document_handler<L>(
    State(state): State<AppState<L>>,
    ApiPath(session_id): ApiPath<Uuid>,
    multipart: Result<Multipart, MultipartRejection>,
) -> impl IntoResponse
where
    L: LlmClient + ?Sized + 'static,
{
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::warn!(error = %rejection.body_text(), "Upload is not multipart");
            return error_response(rejection.status(), rejection.body_text());
        }
    };

    let field = loop {
        match multipart.next_field().await {
            Ok(Some(f)) if f.file_name().is_some() => break f,
            Ok(Some(_)) => continue,
            Ok(None) => {
                tracing::warn!("Upload request with no file");
                return error_response(StatusCode::BAD_REQUEST, "No file uploaded");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read multipart");
                return error_response(e.status(), format!("Failed to read multipart: {}", e));
            }
        }
    };

    let filename = field.file_name().unwrap_or("upload").to_string();
    let declared_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let Some(content_type) =
        ContentType::from_mime(&declared_type).or_else(|| ContentType::from_filename(&filename))
    else {
        tracing::warn!(content_type = %declared_type, filename = %filename, "Unsupported content type");
        return error_response(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            format!("Unsupported content type: {}", declared_type),
        );
    };

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read file bytes");
            return error_response(e.status(), format!("Failed to read file: {}", e));
        }
    };

    if data.len() > state.max_upload_bytes {
        return error_response(
            StatusCode::PAYLOAD_TOO_LARGE,
            format!(
                "File is {} bytes, the limit is {} bytes",
                data.len(),
                state.max_upload_bytes
            ),
        );
    }

    match state
        .chat_service
        .attach_document(SessionId::from_uuid(session_id), &data, filename, content_type)
        .await
    {
        Ok(summary) => (
            StatusCode::OK,
            Json(DocumentUploadResponse {
                document_id: summary.document_id.as_uuid().to_string(),
                filename: summary.filename,
                content_type: summary.content_type.as_mime(),
                characters: summary.characters,
                tokens: summary.tokens,
                message: "Document content extracted successfully".to_string(),
            }),
        )
            .into_response(),
        Err(e) => chat_error_response(e),
    }
}
