use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use pdfchat::application::ports::{FileLoader, LlmClient, TextSplitter};
use pdfchat::application::services::{ChatService, PromptAssembler, SummaryService};
use pdfchat::infrastructure::llm::{MockLlmClient, RetryingLlmClient, create_llm_client};
use pdfchat::infrastructure::observability::{TracingConfig, init_tracing};
use pdfchat::infrastructure::persistence::InMemorySessionRepository;
use pdfchat::infrastructure::text_processing::{RecursiveCharacterSplitter, create_file_loader};
use pdfchat::presentation::{AppState, Environment, ScaffoldConfig, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;

    init_tracing(&TracingConfig::from_env()).context("failed to initialize tracing")?;

    let settings = Settings::load(environment).context("failed to load settings")?;
    let scaffold = ScaffoldConfig::from_env();

    let llm_client: Arc<dyn LlmClient> = if scaffold.enabled {
        tracing::warn!("Scaffold mode enabled, answers come from the mock model");
        Arc::new(MockLlmClient)
    } else {
        let client = create_llm_client(&settings.llm).context("failed to configure LLM client")?;
        Arc::new(RetryingLlmClient::new(client, settings.llm.retry.policy()))
    };

    let file_loader: Arc<dyn FileLoader> =
        Arc::new(create_file_loader(&settings.extraction, &settings.llm));
    let text_splitter: Arc<dyn TextSplitter> = Arc::new(RecursiveCharacterSplitter::new(
        settings.summary.chunk_size,
        settings.summary.chunk_overlap,
    ));
    let generation = settings.llm.generation_options();

    let chat_service = Arc::new(ChatService::new(
        file_loader,
        Arc::clone(&llm_client),
        Arc::new(InMemorySessionRepository::new(
            settings.sessions.max_sessions,
            settings.sessions.idle_ttl(),
        )),
        PromptAssembler::new(
            settings.llm.system_prompt.clone(),
            settings.prompt.budget(),
            settings.prompt.max_history_messages,
        ),
        generation,
    ));

    let summary_service = Arc::new(SummaryService::new(
        Arc::clone(&llm_client),
        text_splitter,
        settings.summary.max_concurrency,
        generation,
    ));

    let state = AppState {
        chat_service,
        summary_service,
        max_upload_bytes: settings.extraction.max_file_size_bytes(),
    };

    let router = create_router(state);

    let host: std::net::IpAddr = settings
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server host: {}", settings.server.host))?;
    let addr = SocketAddr::new(host, settings.server.port);
    tracing::info!(environment = %environment, "Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
