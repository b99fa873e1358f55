use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::application::ports::LlmClient;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub active_sessions: usize,
}

/// Liveness plus the number of sessions held in memory. A failing session
/// store reports `degraded` with 503.
pub async fn health_handler<L>(
    State(state): State<AppState<L>>,
) -> (StatusCode, Json<HealthResponse>)
where
    L: LlmClient + ?Sized + 'static,
{
    let (status_code, status, active_sessions) = match state.chat_service.active_sessions().await {
        Ok(count) => (StatusCode::OK, "healthy", count),
        Err(e) => {
            tracing::error!(error = %e, "Session store unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, "degraded", 0)
        }
    };

    (
        status_code,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION"),
            active_sessions,
        }),
    )
}
