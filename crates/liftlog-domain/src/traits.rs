//! Trait definitions for external interactions
//!
//! These traits define the boundary between the parsing pipeline and the
//! hosted inference service. Implementations live in `liftlog-llm`.

use std::future::Future;

/// A two-message exchange sent to a text-generation service
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// System-level instruction block
    pub system: String,

    /// User-level message; the raw workout text
    pub user: String,

    /// Sampling temperature (0.0 = deterministic)
    pub temperature: f32,

    /// Ask the service to emit a single well-formed JSON value
    pub json_output: bool,
}

impl CompletionRequest {
    /// Create a deterministic, JSON-constrained request
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            temperature: 0.0,
            json_output: true,
        }
    }

    /// Override the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Toggle the JSON response constraint
    pub fn with_json_output(mut self, json_output: bool) -> Self {
        self.json_output = json_output;
        self
    }
}

/// Trait for LLM provider operations
///
/// Implemented by the infrastructure layer (liftlog-llm). One call maps to
/// exactly one outbound request; implementations do not retry.
pub trait LlmProvider: Send + Sync {
    /// Error type for LLM operations
    type Error;

    /// Run the exchange and return the model's raw text output
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String, Self::Error>> + Send;
}
