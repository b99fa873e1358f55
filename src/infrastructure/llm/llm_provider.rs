use std::fmt;

use serde::Deserialize;

/// Hosted chat-completion providers reachable through the OpenAI wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    Sambanova,
    Together,
    #[serde(rename = "deepseek")]
    DeepSeek,
    Groq,
    #[serde(rename = "openai")]
    OpenAi,
    /// Any other OpenAI-compatible server, e.g. a locally served model.
    Custom,
}

impl LlmProvider {
    pub fn default_base_url(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Sambanova => Some("https://api.sambanova.ai/v1"),
            LlmProvider::Together => Some("https://api.together.xyz/v1"),
            LlmProvider::DeepSeek => Some("https://api.deepseek.com/v1"),
            LlmProvider::Groq => Some("https://api.groq.com/openai/v1"),
            LlmProvider::OpenAi => Some("https://api.openai.com/v1"),
            LlmProvider::Custom => None,
        }
    }

    pub fn default_model(&self) -> Option<&'static str> {
        match self {
            LlmProvider::Sambanova => Some("Qwen2.5-72B-Instruct"),
            LlmProvider::Together => Some("meta-llama/Llama-3.3-70B-Instruct-Turbo"),
            LlmProvider::DeepSeek => Some("deepseek-chat"),
            LlmProvider::Groq => Some("llama-3.3-70b-versatile"),
            LlmProvider::OpenAi => Some("gpt-4o-mini"),
            LlmProvider::Custom => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        !matches!(self, LlmProvider::Custom)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LlmProvider::Sambanova => "sambanova",
            LlmProvider::Together => "together",
            LlmProvider::DeepSeek => "deepseek",
            LlmProvider::Groq => "groq",
            LlmProvider::OpenAi => "openai",
            LlmProvider::Custom => "custom",
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
