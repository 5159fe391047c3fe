//! Error types for the Extractor

use liftlog_llm::LlmError;
use thiserror::Error;

/// Errors that can occur during extraction.
///
/// Malformed model output is not represented here: the normalizer absorbs it
/// into an empty or partial result.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// LLM provider error
    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    /// Extraction timeout
    #[error("Extraction timed out after {0} seconds")]
    Timeout(u64),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ExtractorError {
    /// True when the extraction backend ran out of time
    pub fn is_timeout(&self) -> bool {
        match self {
            ExtractorError::Timeout(_) => true,
            ExtractorError::Llm(e) => e.is_timeout(),
            ExtractorError::Config(_) => false,
        }
    }
}
