use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::application::services::evaluate;

use super::error::error_response;
use super::extract::ApiJson;

#[derive(Deserialize)]
pub struct EvaluateRequest {
    pub candidate: String,
    pub reference: String,
}

/// Scores a generated text against a reference with ROUGE-1, ROUGE-2 and ROUGE-L.
pub async fn evaluate_handler(ApiJson(request): ApiJson<EvaluateRequest>) -> impl IntoResponse {
    if request.reference.trim().is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Reference text is empty");
    }

    let report = evaluate(&request.candidate, &request.reference);
    tracing::debug!(rouge_l_f1 = report.rouge_l.f1, "Evaluation computed");
    (StatusCode::OK, Json(report)).into_response()
}
