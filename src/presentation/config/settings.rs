use std::time::Duration;

use config::{Config, ConfigError, File};
use serde::Deserialize;

use crate::application::services::{BudgetUnit, ContextBudget, GenerationOptions};
use crate::infrastructure::llm::{LlmProvider, RetryPolicy};
use crate::infrastructure::persistence::DEFAULT_MAX_SESSIONS;

use super::Environment;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant. Answer the user's question \
using the document content provided. If the document does not contain the answer, say so.";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub llm: LlmSettings,
    pub prompt: PromptSettings,
    pub summary: SummarySettings,
    pub extraction: ExtractionSettings,
    pub sessions: SessionSettings,
}

impl Settings {
    /// Layers `appsettings.{environment}.toml` (optional) under `APP_*`
    /// environment variables, e.g. `APP_LLM__API_KEY`.
    pub fn load(environment: Environment) -> Result<Self, ConfigError> {
        let configuration = Config::builder()
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = configuration.try_deserialize()?;
        settings.llm.resolve_api_key();
        Ok(settings)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    pub provider: LlmProvider,
    pub api_key: String,
    pub base_url: Option<String>,
    pub chat_model: Option<String>,
    pub temperature: f32,
    pub top_p: f32,
    pub max_tokens: Option<u32>,
    pub system_prompt: String,
    pub retry: RetrySettings,
}

impl LlmSettings {
    /// Falls back to the provider's conventional variable, e.g. `SAMBANOVA_API_KEY`.
    fn resolve_api_key(&mut self) {
        if !self.api_key.trim().is_empty() {
            return;
        }
        let variable = format!("{}_API_KEY", self.provider.as_str().to_uppercase());
        if let Ok(key) = std::env::var(&variable) {
            self.api_key = key;
        }
    }

    /// Explicit `base_url` if set, otherwise the provider's public endpoint.
    pub fn resolved_base_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or(self.provider.default_base_url())
            .map(str::to_string)
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
        }
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::Sambanova,
            api_key: String::new(),
            base_url: None,
            chat_model: None,
            temperature: 0.1,
            top_p: 0.1,
            max_tokens: None,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            retry: RetrySettings::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
}

impl RetrySettings {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1_000,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PromptSettings {
    pub budget_unit: BudgetUnit,
    pub budget_limit: usize,
    pub max_history_messages: usize,
}

impl PromptSettings {
    pub fn budget(&self) -> ContextBudget {
        ContextBudget::new(self.budget_unit, self.budget_limit)
    }
}

impl Default for PromptSettings {
    fn default() -> Self {
        Self {
            budget_unit: BudgetUnit::Tokens,
            budget_limit: 6_000,
            max_history_messages: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummarySettings {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_concurrency: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            chunk_size: 4_000,
            chunk_overlap: 200,
            max_concurrency: 4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractionSettings {
    pub max_file_size_mb: usize,
    pub pdf_timeout_secs: u64,
    /// Vision model for image uploads; images are rejected when unset.
    pub vision_model: Option<String>,
    /// Whisper-compatible model for audio uploads; audio is rejected when unset.
    pub transcription_model: Option<String>,
}

impl ExtractionSettings {
    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self {
            max_file_size_mb: 20,
            pdf_timeout_secs: 30,
            vision_model: None,
            transcription_model: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    /// Creating a session past this count evicts the least recently used one.
    pub max_sessions: usize,
    /// Sessions untouched for this long are dropped; 0 keeps them until evicted.
    pub idle_ttl_secs: u64,
}

impl SessionSettings {
    pub fn idle_ttl(&self) -> Option<Duration> {
        (self.idle_ttl_secs > 0).then(|| Duration::from_secs(self.idle_ttl_secs))
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            max_sessions: DEFAULT_MAX_SESSIONS,
            idle_ttl_secs: 3_600,
        }
    }
}
