//! OpenAI-compatible chat completions client.
//!
//! The credential is carried by [`LlmSettings`] and handed to the client at
//! construction; nothing is read from process-wide state here.

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_API_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Failure kinds of a text-generation call.
#[derive(Debug, Error)]
pub enum LlmError {
    /// Client misconfiguration (empty key, unusable HTTP client)
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection refused, DNS failure, timeout
    #[error("transport error: {0}")]
    Transport(String),

    /// 401 / 403 from the service
    #[error("authentication error: {0}")]
    Authentication(String),

    /// Any other non-2xx response (rate limit, server error, bad request)
    #[error("service returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    /// Body could not be decoded or carried no message content
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl LlmError {
    /// Whether the same request could succeed if sent again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(_) => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::Config(_) | LlmError::Authentication(_) | LlmError::MalformedResponse(_) => {
                false
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Config(_) => "config",
            LlmError::Transport(_) => "transport",
            LlmError::Authentication(_) => "authentication",
            LlmError::Api { .. } => "api",
            LlmError::MalformedResponse(_) => "malformed_response",
        }
    }
}

#[derive(Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Option<Duration>,
}

impl std::fmt::Debug for LlmSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: None,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role: "system", "user", "assistant"
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request body.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<Message>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ChatRequest {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            messages: Vec::new(),
            temperature: None,
        }
    }

    pub fn message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

/// Seam between the extraction stage and whatever produces the reply text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError>;

    fn model(&self) -> &str;
}

#[derive(Clone)]
pub struct ChatClient {
    http_client: Client,
    settings: LlmSettings,
}

impl ChatClient {
    pub fn new(settings: LlmSettings) -> Result<Self, LlmError> {
        if settings.api_key.trim().is_empty() {
            return Err(LlmError::Config("API key is empty".into()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| LlmError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.settings.base_url
    }
}

#[async_trait]
impl TextGenerator for ChatClient {
    async fn complete(&self, request: ChatRequest) -> Result<String, LlmError> {
        let start = std::time::Instant::now();
        let endpoint = format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        );

        let response = self
            .http_client
            .post(&endpoint)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.settings.api_key))
            .header(header::CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Chat completion request failed");
                LlmError::Transport(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %error_text, "Chat completion API error");
            return Err(match status {
                StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    LlmError::Authentication(error_text)
                }
                _ => LlmError::Api {
                    status: status.as_u16(),
                    message: error_text,
                },
            });
        }

        let chat_response: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| LlmError::MalformedResponse(e.to_string()))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::MalformedResponse("no choices in response".into()))?
            .message
            .content
            .ok_or_else(|| LlmError::MalformedResponse("message has no content".into()))?;

        debug!(
            model = %request.model,
            duration_ms = start.elapsed().as_millis(),
            response_len = content.len(),
            "Chat completion finished"
        );

        Ok(content)
    }

    fn model(&self) -> &str {
        &self.settings.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn client_for(server: &MockServer) -> ChatClient {
        ChatClient::new(LlmSettings::new("sk-test").with_base_url(server.base_url())).unwrap()
    }

    fn request() -> ChatRequest {
        ChatRequest::new("gpt-4")
            .message(Message::system("persona"))
            .message(Message::user("task"))
            .temperature(0.0)
    }

    #[test]
    fn test_empty_api_key_is_rejected() {
        let result = ChatClient::new(LlmSettings::new("  "));
        assert!(matches!(result, Err(LlmError::Config(_))));
    }

    #[test]
    fn test_request_serializes_temperature_and_messages() {
        let body = serde_json::to_value(request()).unwrap();
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "task");

        let no_temp = serde_json::to_value(ChatRequest::new("gpt-4")).unwrap();
        assert!(no_temp.get("temperature").is_none());
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/chat/completions")
                .header("Authorization", "Bearer sk-test");
            then.status(200).json_body(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Name: A, Start: B"}}]
            }));
        });

        let content = client_for(&server).complete(request()).await.unwrap();

        api_mock.assert();
        assert_eq!(content, "Name: A, Start: B");
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(401).body("invalid api key");
        });

        let err = client_for(&server).complete(request()).await.unwrap_err();

        assert!(matches!(err, LlmError::Authentication(ref m) if m == "invalid api key"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_rate_limit_maps_to_retryable_api_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(429).body("slow down");
        });

        let err = client_for(&server).complete(request()).await.unwrap_err();

        assert!(matches!(err, LlmError::Api { status: 429, .. }));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_missing_choices_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).json_body(serde_json::json!({"choices": []}));
        });

        let err = client_for(&server).complete(request()).await.unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[tokio::test]
    async fn test_null_content_is_malformed() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200)
                .json_body(serde_json::json!({"choices": [{"message": {"content": null}}]}));
        });

        let err = client_for(&server).complete(request()).await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, LlmError::MalformedResponse(ref m) if m == "message has no content"));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_non_json_body_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/chat/completions");
            then.status(200).body("<html>gateway</html>");
        });

        let err = client_for(&server).complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let client =
            ChatClient::new(LlmSettings::new("sk-test").with_base_url("http://127.0.0.1:1"))
                .unwrap();

        let err = client.complete(request()).await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }
}
