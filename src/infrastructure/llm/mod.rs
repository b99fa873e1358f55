mod llm_provider;
mod mock_llm_client;
mod openai_compatible_client;
mod retrying_client;

pub use llm_provider::LlmProvider;
pub use mock_llm_client::MockLlmClient;
pub use openai_compatible_client::{OpenAiCompatibleClient, create_llm_client};
pub use retrying_client::{RetryPolicy, RetryingLlmClient};
