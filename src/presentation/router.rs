use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::LlmClient;
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    ask_handler, create_session_handler, delete_session_handler, evaluate_handler,
    get_session_handler, health_handler, history_handler, summarize_handler,
    upload_document_handler,
};
use crate::presentation::state::AppState;

/// Room for multipart framing on top of the file itself, so oversized files
/// reach the handler and get a 413 with a JSON body.
const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

pub fn create_router<L>(state: AppState<L>) -> Router
where
    L: LlmClient + ?Sized + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    let body_limit =
        DefaultBodyLimit::max(state.max_upload_bytes.saturating_add(MULTIPART_OVERHEAD_BYTES));

    Router::new()
        .route("/health", get(health_handler::<L>))
        .route("/api/v1/sessions", post(create_session_handler::<L>))
        .route(
            "/api/v1/sessions/{id}",
            get(get_session_handler::<L>).delete(delete_session_handler::<L>),
        )
        .route(
            "/api/v1/sessions/{id}/document",
            post(upload_document_handler::<L>),
        )
        .route(
            "/api/v1/sessions/{id}/messages",
            post(ask_handler::<L>).get(history_handler::<L>),
        )
        .route("/api/v1/sessions/{id}/summary", post(summarize_handler::<L>))
        .route("/api/v1/evaluate", post(evaluate_handler))
        .layer(body_limit)
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
