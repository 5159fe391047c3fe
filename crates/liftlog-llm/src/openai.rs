//! OpenAI Provider Implementation
//!
//! Chat-completions client for the hosted OpenAI API (or any service that
//! speaks the same wire format).
//!
//! # Features
//!
//! - Async HTTP communication via reqwest
//! - Deterministic sampling and JSON-object response mode
//! - Per-request timeout, surfaced as [`LlmError::Timeout`]
//! - No retries: one call, one outbound request
//!
//! # Examples
//!
//! ```no_run
//! use liftlog_llm::OpenAiProvider;
//!
//! let provider = OpenAiProvider::new("https://api.openai.com", "sk-...", "gpt-4o-mini")
//!     .expect("HTTP client");
//! ```

use crate::LlmError;
use liftlog_domain::{CompletionRequest, LlmProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::{debug, warn};

/// Default API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

/// Default model: small and cheap, good enough for log parsing
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default request timeout (8 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 8;

/// Connect timeout for the underlying HTTP client
pub const CONNECT_TIMEOUT_SECS: u64 = 5;

/// Upstream error bodies are cut to this many characters
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Chat-completions provider
pub struct OpenAiProvider {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

/// Request body for the chat-completions API
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

/// Response envelope from the chat-completions API
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

impl OpenAiProvider {
    /// Create a new provider
    ///
    /// # Parameters
    ///
    /// - `base_url`: API root, without the `/v1/...` path
    /// - `api_key`: bearer credential
    /// - `model`: model identifier (e.g. "gpt-4o-mini")
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Other`] if the HTTP client cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| LlmError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            client,
        })
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Model identifier sent with every request
    pub fn model(&self) -> &str {
        &self.model
    }

    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    fn request_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            response_format: request
                .json_output
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }

    /// Run one chat completion and return the first choice's content.
    ///
    /// # Errors
    ///
    /// - [`LlmError::Timeout`] when the deadline passes
    /// - [`LlmError::Upstream`] for any non-2xx status
    /// - [`LlmError::InvalidResponse`] when the envelope has no choices
    /// - [`LlmError::Communication`] for connection failures
    pub async fn chat(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        let url = self.completions_url();
        let body = self.request_body(request);

        debug!(
            "POST {} model={} user_len={}",
            url,
            self.model,
            request.user.len()
        );

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Inference service returned HTTP {}", status);
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body: error_text.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let envelope = response.json::<ChatCompletionResponse>().await?;
        content_from_envelope(envelope)
    }
}

/// Pull the first choice's message content; null content becomes ""
fn content_from_envelope(envelope: ChatCompletionResponse) -> Result<String, LlmError> {
    envelope
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content.unwrap_or_default())
        .ok_or_else(|| LlmError::InvalidResponse("Response contained no choices".to_string()))
}

impl fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl LlmProvider for OpenAiProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.chat(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("https://api.example.com/", "sk-test", DEFAULT_MODEL).unwrap()
    }

    /// Answer a single HTTP request with a canned response; yields the raw request
    async fn serve_once(
        status: &'static str,
        body: &'static str,
        delay: Duration,
    ) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            while !request_complete(&received) {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }

            tokio::time::sleep(delay).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = socket.write_all(response.as_bytes()).await;
            String::from_utf8_lossy(&received).into_owned()
        });

        (base_url, handle)
    }

    fn request_complete(received: &[u8]) -> bool {
        let text = String::from_utf8_lossy(received);
        let Some(head_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let content_length = text[..head_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        received.len() >= head_end + 4 + content_length
    }

    fn local_provider(base_url: &str) -> OpenAiProvider {
        OpenAiProvider::new(base_url, "sk-local", DEFAULT_MODEL).unwrap()
    }

    #[test]
    fn test_provider_creation() {
        let provider = provider();
        assert_eq!(provider.base_url, "https://api.example.com");
        assert_eq!(provider.model(), "gpt-4o-mini");
        assert_eq!(provider.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            provider.completions_url(),
            "https://api.example.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_with_timeout() {
        let provider = provider().with_timeout(Duration::from_secs(3));
        assert_eq!(provider.timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_request_body_shape() {
        let provider = provider();
        let request = CompletionRequest::new("Parse workouts.", "DB Row 40x10");
        let body = serde_json::to_value(provider.request_body(&request)).unwrap();

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][0]["content"], "Parse workouts.");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "DB Row 40x10");
        assert_eq!(body["response_format"]["type"], "json_object");
    }

    #[test]
    fn test_request_body_without_json_mode() {
        let provider = provider();
        let request = CompletionRequest::new("system", "user").with_json_output(false);
        let body = serde_json::to_value(provider.request_body(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_content_from_envelope() {
        let envelope: ChatCompletionResponse = serde_json::from_str(
            r#"{"id": "x", "choices": [{"index": 0, "message": {"role": "assistant", "content": "{\"sets\": []}"}}]}"#,
        )
        .unwrap();
        assert_eq!(content_from_envelope(envelope).unwrap(), r#"{"sets": []}"#);
    }

    #[test]
    fn test_null_content_becomes_empty() {
        let envelope: ChatCompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": null}}]}"#).unwrap();
        assert_eq!(content_from_envelope(envelope).unwrap(), "");
    }

    #[test]
    fn test_no_choices_is_invalid() {
        let envelope: ChatCompletionResponse = serde_json::from_str(r#"{"choices": []}"#).unwrap();
        assert!(matches!(
            content_from_envelope(envelope),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let rendered = format!("{:?}", provider());
        assert!(!rendered.contains("sk-test"));
        assert!(rendered.contains("<redacted>"));
    }

    #[tokio::test]
    async fn test_error_handling() {
        // Invalid port triggers a client-side failure before any network I/O
        let provider = OpenAiProvider::new("http://localhost:99999", "sk-test", DEFAULT_MODEL)
            .unwrap();

        let result = provider.complete(&CompletionRequest::new("s", "u")).await;
        match result {
            Err(LlmError::Communication(_)) => {}
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_returns_first_choice() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"choices": [{"message": {"role": "assistant", "content": "{\"sets\":[]}"}}]}"#,
            Duration::ZERO,
        )
        .await;

        let request = CompletionRequest::new("Parse workouts.", "Squat 225x5");
        let content = local_provider(&base_url).complete(&request).await.unwrap();
        assert_eq!(content, r#"{"sets":[]}"#);

        let received = server.await.unwrap().to_lowercase();
        assert!(received.starts_with("post /v1/chat/completions "));
        assert!(received.contains("authorization: bearer sk-local"));
        assert!(received.contains(r#""response_format":{"type":"json_object"}"#));
        assert!(received.contains(r#""temperature":0.0"#));
    }

    #[tokio::test]
    async fn test_non_success_status_is_upstream_error() {
        let (base_url, _server) = serve_once(
            "500 Internal Server Error",
            r#"{"error": {"message": "model overloaded"}}"#,
            Duration::ZERO,
        )
        .await;

        let result = local_provider(&base_url)
            .complete(&CompletionRequest::new("s", "u"))
            .await;
        match result {
            Err(LlmError::Upstream { status, body }) => {
                assert_eq!(status, 500);
                assert!(body.contains("model overloaded"));
            }
            other => panic!("Expected Upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_slow_service_is_timeout() {
        let (base_url, _server) =
            serve_once("200 OK", r#"{"choices": []}"#, Duration::from_secs(5)).await;

        let provider = local_provider(&base_url).with_timeout(Duration::from_millis(200));
        let result = provider.complete(&CompletionRequest::new("s", "u")).await;
        assert_eq!(result.unwrap_err(), LlmError::Timeout);
    }

    #[tokio::test]
    async fn test_undecodable_envelope_is_invalid_response() {
        let (base_url, _server) =
            serve_once("200 OK", r#"{"unexpected": true}"#, Duration::ZERO).await;

        let result = local_provider(&base_url)
            .complete(&CompletionRequest::new("s", "u"))
            .await;
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_refused_connection_is_communication_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let result = local_provider(&base_url)
            .complete(&CompletionRequest::new("s", "u"))
            .await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    // Requires OPENAI_API_KEY and network access
    #[tokio::test]
    #[ignore]
    async fn test_openai_chat_integration() {
        let key = std::env::var("OPENAI_API_KEY").unwrap();
        let provider = OpenAiProvider::new(DEFAULT_BASE_URL, key, DEFAULT_MODEL).unwrap();
        let request = CompletionRequest::new(
            r#"Reply with the JSON object {"ok": true} and nothing else."#,
            "ping",
        );
        let response = provider.complete(&request).await.unwrap();
        assert!(response.contains("ok"));
    }
}
