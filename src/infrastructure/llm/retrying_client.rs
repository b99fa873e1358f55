use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{ChatCompletion, ChatRequest, LlmClient, LlmClientError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub multiplier: f64,
}

impl RetryPolicy {
    /// Backoff before retry number `attempt` (zero-based). A server-provided
    /// delay wins over the exponential schedule; both are capped.
    pub fn delay_for(&self, attempt: u32, retry_after: Option<Duration>) -> Duration {
        let delay = retry_after.unwrap_or_else(|| {
            let factor = self.multiplier.max(1.0).powi(attempt as i32);
            let millis = self.initial_backoff.as_millis() as f64 * factor;
            Duration::from_millis(millis.min(u64::MAX as f64) as u64)
        });
        delay.min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            multiplier: 2.0,
        }
    }
}

/// Retries requests the provider rejected with HTTP 429. Every other error
/// is returned on first occurrence.
pub struct RetryingLlmClient<L> {
    inner: L,
    policy: RetryPolicy,
}

impl<L> RetryingLlmClient<L>
where
    L: LlmClient,
{
    pub fn new(inner: L, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn inner(&self) -> &L {
        &self.inner
    }
}

#[async_trait]
impl<L> LlmClient for RetryingLlmClient<L>
where
    L: LlmClient,
{
    async fn chat(&self, request: &ChatRequest) -> Result<ChatCompletion, LlmClientError> {
        let mut attempt = 0;
        loop {
            match self.inner.chat(request).await {
                Err(LlmClientError::RateLimited { retry_after })
                    if attempt < self.policy.max_retries =>
                {
                    let delay = self.policy.delay_for(attempt, retry_after);
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.policy.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        "Rate limited, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(LlmClientError::RateLimited { retry_after }) => {
                    tracing::error!(attempts = attempt + 1, "Rate limit retries exhausted");
                    return Err(LlmClientError::RateLimited { retry_after });
                }
                other => return other,
            }
        }
    }
}
