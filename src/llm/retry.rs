use crate::config::ProviderConfig;
use crate::error::LlmError;
use crate::llm::validator::validate_response;
use crate::llm::{ChatOptions, ChatTransport, Message};
use crate::types::ParsedRecipe;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

const MAX_ATTEMPTS: u32 = 3;
const INITIAL_DELAY_MS: u64 = 1000;
const TIMEOUT_MS: u64 = 30000;

#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    /// Deadline for each individual attempt.
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    RetryAfter(Duration),
    Exhausted,
    ImmediateFail,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            initial_delay: Duration::from_millis(INITIAL_DELAY_MS),
            timeout: Duration::from_millis(TIMEOUT_MS),
        }
    }
}

impl From<&ProviderConfig> for RetryConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            initial_delay: Duration::from_millis(config.initial_retry_delay_ms),
            timeout: config.timeout(),
        }
    }
}

impl RetryConfig {
    /// Wait before retry number `retry_index` (0 for the first retry).
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        self.initial_delay
            .saturating_mul(2u32.saturating_pow(retry_index))
    }

    /// What to do after attempt number `attempts_made` failed with `err`.
    pub fn decide(&self, attempts_made: u32, err: &LlmError) -> RetryDecision {
        if !err.is_retryable() {
            RetryDecision::ImmediateFail
        } else if attempts_made >= self.max_attempts {
            RetryDecision::Exhausted
        } else {
            RetryDecision::RetryAfter(self.delay_for(attempts_made.saturating_sub(1)))
        }
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// runs out of attempts. Both attempts and backoff waits race `cancel`; no
/// new attempt starts once cancellation has been observed.
pub async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    cancel: &CancellationToken,
    mut operation: F,
) -> Result<T, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, LlmError>>,
{
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(LlmError::Cancelled);
        }
        attempt += 1;

        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(LlmError::Cancelled),
            result = operation() => result,
        };

        let err = match result {
            Ok(value) => return Ok(value),
            Err(e) => e,
        };

        match config.decide(attempt, &err) {
            RetryDecision::ImmediateFail => return Err(err),
            RetryDecision::Exhausted => {
                return Err(LlmError::MaxRetriesExceeded {
                    attempts: attempt,
                    last: Box::new(err),
                })
            }
            RetryDecision::RetryAfter(delay) => {
                tracing::warn!(
                    "Request failed (attempt {}/{}), retrying in {}ms: {}",
                    attempt,
                    config.max_attempts,
                    delay.as_millis(),
                    err
                );

                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => return Err(LlmError::Cancelled),
                    _ = sleep(delay) => {}
                }
            }
        }
    }
}

/// Chat transport plus reply validation under the retry policy.
#[derive(Clone)]
pub struct RetryingChatClient {
    transport: Arc<dyn ChatTransport>,
    config: RetryConfig,
}

impl RetryingChatClient {
    pub fn new(transport: Arc<dyn ChatTransport>, config: RetryConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    pub async fn chat(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        cancel: &CancellationToken,
    ) -> Result<ParsedRecipe, LlmError> {
        with_retry(&self.config, cancel, || async move {
            let response = self
                .transport
                .send(messages, options, self.config.timeout)
                .await?;
            validate_response(&response)
        })
        .await
    }
}
