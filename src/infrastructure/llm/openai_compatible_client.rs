use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::RETRY_AFTER;
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    ChatCompletion, ChatMessage, ChatRequest, LlmClient, LlmClientError, TokenUsage,
};
use crate::presentation::config::LlmSettings;

use super::llm_provider::LlmProvider;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

pub struct OpenAiCompatibleClient {
    client: Client,
    provider: LlmProvider,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    top_p: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: Option<String>,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAiCompatibleClient {
    pub fn new(provider: LlmProvider, base_url: &str, api_key: &str, model: &str) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            client,
            provider,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn provider(&self) -> LlmProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if self.api_key.is_empty() {
            request
        } else {
            request.bearer_auth(&self.api_key)
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    #[tracing::instrument(
        skip(self, request),
        fields(provider = %self.provider, model = %self.model, messages = request.messages.len())
    )]
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmClientError> {
        let request_body = ChatCompletionRequest {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            top_p: request.top_p,
            max_tokens: request.max_tokens,
        };

        let http_request = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request_body);
        let response = self
            .apply_auth(http_request)
            .send()
            .await
            .map_err(|e| LlmClientError::ApiRequestFailed(e.to_string()))?;

        if response.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs);
            tracing::warn!(?retry_after, "Provider rate limited the request");
            return Err(LlmClientError::RateLimited { retry_after });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmClientError::ApiRequestFailed(format!(
                "HTTP {}: {}",
                status, body
            )));
        }

        let completion_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmClientError::InvalidResponse(e.to_string()))?;

        let content = completion_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content.unwrap_or_default())
            .ok_or_else(|| LlmClientError::InvalidResponse("empty choices".to_string()))?;

        if let Some(usage) = completion_response.usage {
            tracing::debug!(
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "Chat completion received"
            );
        }

        Ok(ChatCompletion {
            content: content.trim().to_string(),
            model: completion_response.model,
            usage: completion_response.usage,
        })
    }
}

pub fn create_llm_client(settings: &LlmSettings) -> Result<OpenAiCompatibleClient, LlmClientError> {
    let provider = settings.provider;

    let base_url = settings.resolved_base_url().ok_or_else(|| {
        LlmClientError::Configuration(format!("base_url required for {} provider", provider))
    })?;

    let model = match (&settings.chat_model, provider.default_model()) {
        (Some(model), _) if !model.trim().is_empty() => model.clone(),
        (_, Some(model)) => model.to_string(),
        _ => {
            return Err(LlmClientError::Configuration(format!(
                "chat_model required for {} provider",
                provider
            )));
        }
    };

    if provider.requires_api_key() && settings.api_key.trim().is_empty() {
        return Err(LlmClientError::Configuration(format!(
            "api_key required for {} provider",
            provider
        )));
    }

    tracing::info!(provider = %provider, base_url = %base_url, model = %model, "LLM client configured");

    Ok(OpenAiCompatibleClient::new(
        provider,
        &base_url,
        &settings.api_key,
        &model,
    ))
}
