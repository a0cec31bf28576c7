use crate::config::ProviderConfig;
use crate::error::LlmError;
use crate::llm::{ChatOptions, ChatTransport, Message, ModelParameters};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::time::Duration;

const HTTP_REFERER: &str = "https://10x-healthy-meal.com";
const APP_TITLE: &str = "10x Healthy Meal";

/// Chat-completion transport for OpenRouter and other OpenAI-compatible
/// endpoints.
pub struct OpenRouterClient {
    client: Client,
    api_key: SecretString,
    base_url: String,
    default_model: String,
}

impl OpenRouterClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, LlmError> {
        if !config.has_api_key() {
            return Err(LlmError::Configuration(
                "OpenRouter API key is required".to_string(),
            ));
        }

        Ok(Self {
            client: Client::new(),
            api_key: config.api_key.clone(),
            base_url: config.base_url.clone(),
            default_model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    response_format: ResponseFormat,
    parameters: &'a ModelParameters,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[async_trait]
impl ChatTransport for OpenRouterClient {
    async fn send(
        &self,
        messages: &[Message],
        options: &ChatOptions,
        timeout: Duration,
    ) -> Result<serde_json::Value, LlmError> {
        let default_params = ModelParameters::default();
        let request = ChatRequest {
            model: options.model_name.as_deref().unwrap_or(&self.default_model),
            messages,
            response_format: ResponseFormat {
                format_type: "json_object",
            },
            parameters: options.model_params.as_ref().unwrap_or(&default_params),
        };

        tracing::debug!(
            url = %self.base_url,
            model = request.model,
            messages = messages.len(),
            "sending chat completion request"
        );

        let exchange = async {
            let response = self
                .client
                .post(&self.base_url)
                .header("Content-Type", "application/json")
                .header(
                    "Authorization",
                    format!("Bearer {}", self.api_key.expose_secret()),
                )
                .header("HTTP-Referer", HTTP_REFERER)
                .header("X-Title", APP_TITLE)
                .json(&request)
                .send()
                .await?;

            let status = response.status();
            let body = response.text().await?;
            Ok::<_, LlmError>((status, body))
        };

        // Dropping the exchange future aborts the in-flight request.
        let (status, body) = tokio::time::timeout(timeout, exchange)
            .await
            .map_err(|_| LlmError::Timeout {
                after_ms: timeout.as_millis() as u64,
            })??;

        if status == StatusCode::UNAUTHORIZED {
            return Err(LlmError::Unauthorized);
        }

        if !status.is_success() {
            tracing::warn!("Provider returned {}: {}", status, body);
            return Err(LlmError::Transport {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            LlmError::MalformedResponse(format!("failed to parse response as JSON: {}", e))
        })
    }
}
