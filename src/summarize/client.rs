//! Chat-completions client for the text-generation service.
//!
//! Speaks the OpenAI-compatible `/v1/chat/completions` shape. The API key
//! is read from the environment on each request, so a missing key only
//! matters once a summary is actually requested.

use super::{ChatMessage, GenerationRequest, TextGenerator};
use crate::error::{WatchError, WatchResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Connection settings for the chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    pub timeout_seconds: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com/v1/chat/completions".to_string(),
            model: "gpt-4".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_seconds: 120,
        }
    }
}

/// Request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    temperature: f32,
}

/// Response body.
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// HTTP client for an OpenAI-compatible chat endpoint.
pub struct ChatCompletionsClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl ChatCompletionsClient {
    /// Create a client. No credential is needed yet.
    pub fn new(config: ClientConfig) -> WatchResult<Self> {
        info!("Using model {} at {}", config.model, config.api_url);

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| WatchError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    fn api_key(&self) -> WatchResult<String> {
        match std::env::var(&self.config.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(WatchError::configuration(format!(
                "{} environment variable not set",
                self.config.api_key_env
            ))),
        }
    }
}

impl TextGenerator for ChatCompletionsClient {
    async fn generate(&self, request: &GenerationRequest) -> WatchResult<String> {
        let api_key = self.api_key()?;

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        debug!(
            "Sending chat request with {} messages to {}",
            request.messages.len(),
            self.config.api_url
        );

        let response = self
            .http_client
            .post(&self.config.api_url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    WatchError::upstream(format!(
                        "Request timed out after {}s",
                        self.config.timeout_seconds
                    ))
                } else if e.is_connect() {
                    WatchError::upstream(format!("Cannot connect to {}", self.config.api_url))
                } else {
                    WatchError::upstream(format!("Failed to send request: {}", e))
                }
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| WatchError::upstream(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ApiErrorBody>(&text)
                .map(|b| b.error.message)
                .unwrap_or_else(|_| text.clone());
            return Err(WatchError::upstream(format!("API error {}: {}", status, message)));
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&text)
            .map_err(|e| WatchError::upstream(format!("Failed to parse response: {}", e)))?;

        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.unwrap_or_default())
            .ok_or_else(|| WatchError::upstream("No choices in response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.api_key_env, "OPENAI_API_KEY");
    }

    #[test]
    fn test_missing_credential_is_configuration_error() {
        let client = ChatCompletionsClient::new(ClientConfig {
            api_key_env: "WATERWATCH_TEST_UNSET_API_KEY".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();

        let request = GenerationRequest {
            messages: Vec::new(),
            max_tokens: 10,
            temperature: 0.0,
        };
        let result = tokio_test::block_on(client.generate(&request));
        assert!(matches!(result, Err(WatchError::Configuration { .. })));
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::system("be brief"), ChatMessage::user("data")];
        let body = ChatCompletionRequest {
            model: "gpt-4",
            messages: &messages,
            max_tokens: 300,
            temperature: 0.2,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "data");
        assert_eq!(json["max_tokens"], 300);
    }

    #[test]
    fn test_response_parsing() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"All clear."}}]}"#;
        let parsed: ChatCompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.choices[0].message.content.as_deref(), Some("All clear."));
    }
}
