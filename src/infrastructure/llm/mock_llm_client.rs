use async_trait::async_trait;

use crate::application::ports::{ChatCompletion, ChatRequest, LlmClient, LlmClientError};

/// Answers without calling out, echoing the last user turn. Used in scaffold mode.
pub struct MockLlmClient;

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmClientError> {
        let last_user_turn = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        let question = last_user_turn
            .rsplit_once("User question: ")
            .map(|(_, q)| q.trim_end_matches("\nAnswer:"))
            .unwrap_or(last_user_turn);

        Ok(ChatCompletion {
            content: format!("Mock answer to: {}", question.trim()),
            model: Some("mock".to_string()),
            usage: None,
        })
    }
}
