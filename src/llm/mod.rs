mod retry;

pub mod openrouter;
pub mod validator;

#[cfg(test)]
pub(crate) mod testing;

pub use retry::{RetryConfig, RetryingChatClient};

use crate::error::LlmError;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;

/// A single HTTP exchange with a chat-completion endpoint. Implementations
/// do not retry and do not look at the shape of the reply beyond decoding
/// it as JSON.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        timeout: Duration,
    ) -> Result<serde_json::Value, LlmError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatOptions {
    pub model_name: Option<String>,
    pub model_params: Option<ModelParameters>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelParameters {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            temperature: Some(0.7),
            top_p: Some(0.9),
            max_tokens: Some(150),
        }
    }
}

impl ChatOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model_name = Some(model.into());
        self
    }

    pub fn with_params(mut self, params: ModelParameters) -> Self {
        self.model_params = Some(params);
        self
    }
}
