#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use pdfchat::application::ports::{
    ChatCompletion, ChatRequest, FileLoader, LlmClient, LlmClientError,
};
use pdfchat::application::services::{
    ChatService, ContextBudget, GenerationOptions, PromptAssembler,
};
use pdfchat::domain::ContentType;
use pdfchat::infrastructure::persistence::InMemorySessionRepository;
use pdfchat::infrastructure::text_processing::{CompositeFileLoader, PlainTextAdapter};

pub const TEST_SYSTEM_PROMPT: &str = "Answer from the document.";

/// Replays queued results in order, then falls back to a fixed answer.
/// Every request is recorded for inspection.
pub struct ScriptedLlmClient {
    script: Mutex<VecDeque<Result<String, LlmClientError>>>,
    requests: Mutex<Vec<ChatRequest>>,
    fallback: String,
}

impl ScriptedLlmClient {
    pub fn answering(fallback: &str) -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            fallback: fallback.to_string(),
        }
    }

    pub fn then(self, result: Result<&str, LlmClientError>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(result.map(str::to_string));
        self
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        let content = match next {
            Some(result) => result?,
            None => self.fallback.clone(),
        };
        Ok(ChatCompletion {
            content,
            model: Some("scripted".to_string()),
            usage: None,
        })
    }
}

/// Fails with `RateLimited` a fixed number of times before answering.
pub struct FlakyLlmClient {
    failures: usize,
    calls: AtomicUsize,
}

impl FlakyLlmClient {
    pub fn failing(failures: usize) -> Self {
        Self {
            failures,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl LlmClient for FlakyLlmClient {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatCompletion, LlmClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call < self.failures {
            return Err(LlmClientError::RateLimited { retry_after: None });
        }
        Ok(ChatCompletion {
            content: "recovered".to_string(),
            model: None,
            usage: None,
        })
    }
}

pub fn text_only_loader() -> Arc<dyn FileLoader> {
    Arc::new(
        CompositeFileLoader::new().with_loader(ContentType::Text, Arc::new(PlainTextAdapter)),
    )
}

pub fn chat_service_with<L>(
    llm_client: Arc<L>,
    budget: ContextBudget,
    max_history_messages: usize,
) -> ChatService<L>
where
    L: LlmClient + ?Sized,
{
    ChatService::new(
        text_only_loader(),
        llm_client,
        Arc::new(InMemorySessionRepository::default()),
        PromptAssembler::new(
            TEST_SYSTEM_PROMPT.to_string(),
            budget,
            max_history_messages,
        ),
        GenerationOptions::default(),
    )
}
