//! Liftlog LLM Provider Layer
//!
//! Implementations of the `LlmProvider` trait from `liftlog-domain`.
//!
//! # Providers
//!
//! - `MockProvider`: Recorded fixture responses for testing, no network
//! - `OpenAiProvider`: Hosted chat-completions API
//!
//! # Examples
//!
//! ```
//! use liftlog_domain::{CompletionRequest, LlmProvider};
//! use liftlog_llm::MockProvider;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let provider = MockProvider::new(r#"{"sets": []}"#);
//! let request = CompletionRequest::new("system prompt", "Squat 225x5");
//! let raw = provider.complete(&request).await.unwrap();
//! assert_eq!(raw, r#"{"sets": []}"#);
//! # });
//! ```

#![warn(missing_docs)]

pub mod openai;

use liftlog_domain::{CompletionRequest, LlmProvider};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

pub use openai::OpenAiProvider;

/// Errors that can occur during LLM operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// The inference service did not answer in time
    #[error("Request to inference service timed out")]
    Timeout,

    /// Non-2xx answer from the inference service
    #[error("Inference service returned HTTP {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body, truncated
        body: String,
    },

    /// The service answered but the envelope could not be decoded
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// True when the failure was a deadline expiry rather than a refusal
    pub fn is_timeout(&self) -> bool {
        matches!(self, LlmError::Timeout)
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::InvalidResponse(err.to_string())
        } else {
            LlmError::Communication(err.to_string())
        }
    }
}

/// Mock LLM provider for deterministic testing
///
/// Returns pre-configured responses keyed by the user message, without making
/// any network calls. Lets the extraction pipeline run against recorded model
/// output.
///
/// # Examples
///
/// ```
/// use liftlog_domain::{CompletionRequest, LlmProvider};
/// use liftlog_llm::MockProvider;
///
/// # tokio::runtime::Runtime::new().unwrap().block_on(async {
/// let provider = MockProvider::default();
/// provider.add_response("Squat 225x5", r#"{"sets": [1]}"#);
///
/// let hit = CompletionRequest::new("system", "Squat 225x5");
/// let miss = CompletionRequest::new("system", "Bench 135x10");
/// assert_eq!(provider.complete(&hit).await.unwrap(), r#"{"sets": [1]}"#);
/// assert_eq!(provider.complete(&miss).await.unwrap(), r#"{"sets": []}"#);
/// assert_eq!(provider.call_count(), 2);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockProvider {
    default_response: String,
    responses: Arc<Mutex<HashMap<String, Result<String, LlmError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
    delay: Option<Duration>,
}

impl MockProvider {
    /// Create a new MockProvider with a fixed response for all prompts
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            responses: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            delay: None,
        }
    }

    /// Sleep before answering; used to exercise timeouts
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Add a specific response for a given user message
    pub fn add_response(&self, user: impl Into<String>, response: impl Into<String>) {
        self.responses
            .lock()
            .unwrap()
            .insert(user.into(), Ok(response.into()));
    }

    /// Configure to return an error for a specific user message
    pub fn add_error(&self, user: impl Into<String>, error: LlmError) {
        self.responses.lock().unwrap().insert(user.into(), Err(error));
    }

    /// Get the number of times complete was called
    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// The most recent request, if any
    pub fn last_request(&self) -> Option<CompletionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    /// Forget recorded requests
    pub fn reset(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new(r#"{"sets": []}"#)
    }
}

impl LlmProvider for MockProvider {
    type Error = LlmError;

    async fn complete(&self, request: &CompletionRequest) -> Result<String, LlmError> {
        self.requests.lock().unwrap().push(request.clone());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let configured = self.responses.lock().unwrap().get(&request.user).cloned();
        configured.unwrap_or_else(|| Ok(self.default_response.clone()))
    }
}
