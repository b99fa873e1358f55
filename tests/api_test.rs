mod helpers;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use helpers::ScriptedLlmClient;
use pdfchat::application::ports::{
    FileLoader, FileLoaderError, LlmClient, LlmClientError, TextSplitter,
};
use pdfchat::application::services::{
    ChatService, ContextBudget, GenerationOptions, PromptAssembler, SummaryService,
};
use pdfchat::domain::{ContentType, Document};
use pdfchat::infrastructure::llm::MockLlmClient;
use pdfchat::infrastructure::observability::REQUEST_ID_HEADER;
use pdfchat::infrastructure::persistence::InMemorySessionRepository;
use pdfchat::infrastructure::text_processing::{
    CompositeFileLoader, PdfAdapter, PlainTextAdapter, RecursiveCharacterSplitter,
};
use pdfchat::presentation::{AppState, create_router};

const TEST_MAX_UPLOAD_BYTES: usize = 4096;
const TEST_BUDGET_CHARS: usize = 4_000;
const TEST_MAX_HISTORY: usize = 6;
const BOUNDARY: &str = "pdfchat-test-boundary";

/// Router wired with in-memory ports; the model and loader can be swapped per test.
struct TestApp {
    llm_client: Arc<dyn LlmClient>,
    file_loader: Arc<dyn FileLoader>,
    budget_chars: usize,
}

impl TestApp {
    fn new() -> Self {
        Self {
            llm_client: Arc::new(MockLlmClient),
            file_loader: helpers::text_only_loader(),
            budget_chars: TEST_BUDGET_CHARS,
        }
    }

    fn with_llm(mut self, llm_client: Arc<dyn LlmClient>) -> Self {
        self.llm_client = llm_client;
        self
    }

    fn with_loader(mut self, file_loader: Arc<dyn FileLoader>) -> Self {
        self.file_loader = file_loader;
        self
    }

    fn with_budget_chars(mut self, budget_chars: usize) -> Self {
        self.budget_chars = budget_chars;
        self
    }

    fn build(self) -> axum::Router {
        let text_splitter: Arc<dyn TextSplitter> =
            Arc::new(RecursiveCharacterSplitter::new(500, 50));

        let chat_service = Arc::new(ChatService::new(
            self.file_loader,
            Arc::clone(&self.llm_client),
            Arc::new(InMemorySessionRepository::default()),
            PromptAssembler::new(
                helpers::TEST_SYSTEM_PROMPT.to_string(),
                ContextBudget::chars(self.budget_chars),
                TEST_MAX_HISTORY,
            ),
            GenerationOptions::default(),
        ));

        let summary_service = Arc::new(SummaryService::new(
            self.llm_client,
            text_splitter,
            2,
            GenerationOptions::default(),
        ));

        create_router(AppState {
            chat_service,
            summary_service,
            max_upload_bytes: TEST_MAX_UPLOAD_BYTES,
        })
    }
}

fn create_test_app() -> axum::Router {
    TestApp::new().build()
}

fn failing_llm(error: LlmClientError) -> Arc<dyn LlmClient> {
    Arc::new(ScriptedLlmClient::answering("unused").then(Err(error)))
}

/// Stands in for a PDF whose extraction ran past its deadline.
struct TimingOutLoader;

#[async_trait::async_trait]
impl FileLoader for TimingOutLoader {
    async fn extract_text(
        &self,
        _data: &[u8],
        document: &Document,
    ) -> Result<String, FileLoaderError> {
        Err(FileLoaderError::TimedOut {
            filename: document.filename.clone(),
            after: Duration::from_secs(30),
        })
    }
}

async fn upload_text(app: &axum::Router, session_id: &str, text: &str) {
    let response = app
        .clone()
        .oneshot(upload_request(session_id, "notes.txt", "text/plain", text.as_bytes()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

async fn summarize(app: &axum::Router, session_id: &str) -> axum::response::Response {
    app.clone()
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/sessions/{session_id}/summary"),
        ))
        .await
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn upload_request(
    session_id: &str,
    filename: &str,
    content_type: &str,
    data: &[u8],
) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/sessions/{session_id}/document"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_session(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request("POST", "/api/v1/sessions", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string()
}

async fn ask(app: &axum::Router, session_id: &str, question: &str) -> axum::response::Response {
    app.clone()
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/sessions/{session_id}/messages"),
            json!({ "question": question }),
        ))
        .await
        .unwrap()
}

#[tokio::test]
async fn given_running_server_when_health_check_then_returns_ok() {
    let app = create_test_app();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn given_open_session_when_health_check_then_reports_active_sessions() {
    let app = create_test_app();
    app.clone()
        .oneshot(json_request("POST", "/api/v1/sessions", json!({})))
        .await
        .unwrap();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert_eq!(body_json(response).await["active_sessions"], 1);
}

#[tokio::test]
async fn given_request_without_id_when_handled_then_response_carries_generated_request_id() {
    let app = create_test_app();

    let response = app.oneshot(empty_request("GET", "/health")).await.unwrap();

    assert!(response.headers().contains_key(REQUEST_ID_HEADER));
}

#[tokio::test]
async fn given_request_with_id_when_handled_then_response_echoes_it() {
    let app = create_test_app();
    let request = Request::builder()
        .uri("/health")
        .header(REQUEST_ID_HEADER, "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.headers()[REQUEST_ID_HEADER], "trace-42");
}

#[tokio::test]
async fn given_title_when_creating_session_then_session_is_retrievable() {
    let app = create_test_app();
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/sessions",
            json!({ "title": "Lecture 3" }),
        ))
        .await
        .unwrap();
    let session_id = body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .oneshot(empty_request("GET", &format!("/api/v1/sessions/{session_id}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Lecture 3");
    assert_eq!(body["message_count"], 0);
    assert!(body["document"].is_null());
}

#[tokio::test]
async fn given_unknown_session_when_fetching_then_returns_not_found() {
    let app = create_test_app();
    let unknown = uuid::Uuid::new_v4();

    let response = app
        .oneshot(empty_request("GET", &format!("/api/v1/sessions/{unknown}")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_malformed_session_id_when_fetching_then_returns_bad_request() {
    let app = create_test_app();

    let response = app
        .oneshot(empty_request("GET", "/api/v1/sessions/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_uploaded_text_when_asking_then_returns_answer_and_records_history() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(upload_request(
            &session_id,
            "notes.txt",
            "text/plain",
            b"Rust guarantees memory safety without a garbage collector.",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let upload = body_json(response).await;
    assert_eq!(upload["filename"], "notes.txt");
    assert_eq!(upload["content_type"], "text/plain");
    assert!(upload["characters"].as_u64().unwrap() > 0);

    let response = ask(&app, &session_id, "What does Rust guarantee?").await;
    assert_eq!(response.status(), StatusCode::OK);
    let answer = body_json(response).await;
    assert_eq!(answer["answer"], "Mock answer to: What does Rust guarantee?");
    assert_eq!(answer["document_truncated"], false);

    let response = app
        .oneshot(empty_request(
            "GET",
            &format!("/api/v1/sessions/{session_id}/messages"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let history = body_json(response).await;
    let messages = history["messages"].as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[0]["content"], "What does Rust guarantee?");
    assert_eq!(messages[1]["role"], "assistant");
}

#[tokio::test]
async fn given_no_document_when_asking_then_still_answers() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = ask(&app, &session_id, "Hello?").await;

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn given_blank_question_when_asking_then_returns_bad_request() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = ask(&app, &session_id, "   ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_unknown_session_when_asking_then_returns_not_found() {
    let app = create_test_app();

    let response = ask(&app, &uuid::Uuid::new_v4().to_string(), "Anything?").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_unrecognized_file_type_when_uploading_then_returns_unsupported_media_type() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .oneshot(upload_request(
            &session_id,
            "archive.zip",
            "application/zip",
            b"PK\x03\x04",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn given_type_without_registered_loader_when_uploading_then_returns_unsupported_media_type() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .oneshot(upload_request(
            &session_id,
            "scan.png",
            "image/png",
            b"\x89PNG\r\n\x1a\n",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn given_generic_mime_when_uploading_then_falls_back_to_extension() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .oneshot(upload_request(
            &session_id,
            "readme.md",
            "application/octet-stream",
            b"# Title\n\nSome markdown body.",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn given_file_over_limit_when_uploading_then_returns_payload_too_large() {
    let app = create_test_app();
    let session_id = create_session(&app).await;
    let data = vec![b'a'; TEST_MAX_UPLOAD_BYTES + 1];

    let response = app
        .oneshot(upload_request(&session_id, "big.txt", "text/plain", &data))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn given_blank_text_file_when_uploading_then_returns_unprocessable_entity() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .oneshot(upload_request(&session_id, "blank.txt", "text/plain", b"   \n\n  "))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn given_multipart_without_file_when_uploading_then_returns_bad_request() {
    let app = create_test_app();
    let session_id = create_session(&app).await;
    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"note\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/sessions/{session_id}/document"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_session_without_document_when_summarizing_then_returns_conflict() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/sessions/{session_id}/summary"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn given_attached_document_when_summarizing_then_returns_summary_with_sections() {
    let app = create_test_app();
    let session_id = create_session(&app).await;
    app.clone()
        .oneshot(upload_request(
            &session_id,
            "notes.txt",
            "text/plain",
            b"Ownership moves values. Borrowing lends them out.",
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(empty_request(
            "POST",
            &format!("/api/v1/sessions/{session_id}/summary"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["sections"].as_array().unwrap().len(), 1);
    assert!(!body["summary"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn given_deleted_session_when_fetching_then_returns_not_found() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(empty_request(
            "DELETE",
            &format!("/api/v1/sessions/{session_id}"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .oneshot(empty_request("GET", &format!("/api/v1/sessions/{session_id}")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn given_identical_texts_when_evaluating_then_scores_are_perfect() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/evaluate",
            json!({
                "candidate": "the quick brown fox",
                "reference": "the quick brown fox"
            }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["rouge1"]["f1"], 1.0);
    assert_eq!(body["rouge2"]["f1"], 1.0);
    assert_eq!(body["rouge_l"]["f1"], 1.0);
}

#[tokio::test]
async fn given_empty_reference_when_evaluating_then_returns_bad_request() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/evaluate",
            json!({ "candidate": "text", "reference": "  " }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn given_no_body_when_creating_session_then_untitled_session_is_created() {
    let app = create_test_app();

    let response = app
        .clone()
        .oneshot(empty_request("POST", "/api/v1/sessions"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let session_id = body_json(response).await["session_id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .oneshot(empty_request("GET", &format!("/api/v1/sessions/{session_id}")))
        .await
        .unwrap();
    assert!(body_json(response).await["title"].is_null());
}

#[tokio::test]
async fn given_non_json_body_when_creating_session_then_returns_json_error() {
    let app = create_test_app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/sessions")
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from("title"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_malformed_json_when_asking_then_returns_json_bad_request() {
    let app = create_test_app();
    let session_id = create_session(&app).await;
    let request = Request::builder()
        .method("POST")
        .uri(format!("/api/v1/sessions/{session_id}/messages"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"question\": "))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_missing_reference_when_evaluating_then_returns_json_unprocessable_entity() {
    let app = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/api/v1/evaluate",
            json!({ "candidate": "text" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_json_body_when_uploading_document_then_returns_json_error() {
    let app = create_test_app();
    let session_id = create_session(&app).await;

    let response = app
        .oneshot(json_request(
            "POST",
            &format!("/api/v1/sessions/{session_id}/document"),
            json!({ "file": "notes.txt" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_question_larger_than_budget_when_asking_then_returns_payload_too_large() {
    let app = TestApp::new().with_budget_chars(60).build();
    let session_id = create_session(&app).await;

    let response = ask(&app, &session_id, &"why ".repeat(40)).await;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_provider_still_rate_limited_when_asking_then_returns_too_many_requests() {
    let app = TestApp::new()
        .with_llm(failing_llm(LlmClientError::RateLimited {
            retry_after: Some(Duration::from_secs(5)),
        }))
        .build();
    let session_id = create_session(&app).await;

    let response = ask(&app, &session_id, "Hello?").await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn given_provider_failure_when_asking_then_returns_bad_gateway() {
    let app = TestApp::new()
        .with_llm(failing_llm(LlmClientError::ApiRequestFailed(
            "HTTP 500: upstream down".to_string(),
        )))
        .build();
    let session_id = create_session(&app).await;

    let response = ask(&app, &session_id, "Hello?").await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn given_misconfigured_provider_when_asking_then_returns_internal_server_error() {
    let app = TestApp::new()
        .with_llm(failing_llm(LlmClientError::Configuration(
            "missing api key".to_string(),
        )))
        .build();
    let session_id = create_session(&app).await;

    let response = ask(&app, &session_id, "Hello?").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn given_extraction_timeout_when_uploading_then_returns_gateway_timeout() {
    let loader: Arc<dyn FileLoader> = Arc::new(
        CompositeFileLoader::new()
            .with_loader(ContentType::Text, Arc::new(PlainTextAdapter))
            .with_loader(ContentType::Pdf, Arc::new(TimingOutLoader)),
    );
    let app = TestApp::new().with_loader(loader).build();
    let session_id = create_session(&app).await;

    let response = app
        .oneshot(upload_request(&session_id, "scan.pdf", "application/pdf", b"%PDF-1.4"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_rate_limited_section_when_summarizing_then_returns_too_many_requests() {
    let app = TestApp::new()
        .with_llm(failing_llm(LlmClientError::RateLimited { retry_after: None }))
        .build();
    let session_id = create_session(&app).await;
    upload_text(&app, &session_id, "Ownership moves values.").await;

    let response = summarize(&app, &session_id).await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn given_invalid_provider_response_when_summarizing_then_returns_bad_gateway() {
    let app = TestApp::new()
        .with_llm(failing_llm(LlmClientError::InvalidResponse(
            "no choices".to_string(),
        )))
        .build();
    let session_id = create_session(&app).await;
    upload_text(&app, &session_id, "Ownership moves values.").await;

    let response = summarize(&app, &session_id).await;

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn given_uploaded_pdf_when_asking_then_prompt_carries_pdf_text() {
    let llm = Arc::new(ScriptedLlmClient::answering("It greets the world."));
    let loader: Arc<dyn FileLoader> = Arc::new(
        CompositeFileLoader::new().with_loader(ContentType::Pdf, Arc::new(PdfAdapter::new())),
    );
    let app = TestApp::new()
        .with_llm(Arc::clone(&llm) as Arc<dyn LlmClient>)
        .with_loader(loader)
        .build();
    let session_id = create_session(&app).await;

    let response = app
        .clone()
        .oneshot(upload_request(
            &session_id,
            "sample.pdf",
            "application/pdf",
            include_bytes!("fixtures/sample.pdf"),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["content_type"], "application/pdf");

    let response = ask(&app, &session_id, "What does it say?").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["answer"], "It greets the world.");
    let user_turn = &llm.requests()[0].messages[1].content;
    assert!(user_turn.contains("Hello PDF world"));
}
