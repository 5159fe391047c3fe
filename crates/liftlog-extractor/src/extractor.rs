//! Core Extractor implementation

use crate::config::ExtractorConfig;
use crate::error::ExtractorError;
use crate::parser::normalize;
use crate::prompt::PromptBuilder;
use liftlog_domain::{LlmProvider, ParseRequest, ParseResponse};
use liftlog_llm::LlmError;
use std::sync::Arc;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Turns free-form workout notes into validated sets.
///
/// Stateless across calls: each `parse` builds its own prompt, makes at most
/// one provider call and normalizes the result.
pub struct Extractor<L>
where
    L: LlmProvider<Error = LlmError>,
{
    llm_provider: Arc<L>,
    prompt: PromptBuilder,
    config: ExtractorConfig,
}

impl<L> Extractor<L>
where
    L: LlmProvider<Error = LlmError>,
{
    /// Create a new Extractor, resolving the configured system prompt
    pub fn new(llm_provider: L, config: ExtractorConfig) -> Result<Self, ExtractorError> {
        config.validate().map_err(ExtractorError::Config)?;
        let prompt = PromptBuilder::new(config.resolve_system_prompt()?);

        Ok(Self {
            llm_provider: Arc::new(llm_provider),
            prompt,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// The underlying provider
    pub fn provider(&self) -> &L {
        &self.llm_provider
    }

    /// Parse workout notes into sets.
    ///
    /// Blank input returns an empty response without calling the provider.
    /// Malformed model output degrades to an empty or partial response.
    ///
    /// # Errors
    ///
    /// - [`ExtractorError::Timeout`] when the provider exceeds the configured deadline
    /// - [`ExtractorError::Llm`] when the provider call fails
    pub async fn parse(&self, request: ParseRequest) -> Result<ParseResponse, ExtractorError> {
        let text = request.text.trim();
        if text.is_empty() {
            debug!("Blank input; skipping model call");
            return Ok(ParseResponse::empty());
        }

        info!("Parsing workout text, length {}", text.len());

        let completion = self.prompt.build(text);
        let raw = timeout(
            self.config.request_timeout(),
            self.llm_provider.complete(&completion),
        )
        .await
        .map_err(|_| {
            warn!(
                "Model call exceeded {}s deadline",
                self.config.request_timeout_secs
            );
            ExtractorError::Timeout(self.config.request_timeout_secs)
        })?
        .inspect_err(|e| warn!("Model call failed: {}", e))?;

        debug!("LLM response length: {} chars", raw.len());

        let normalized = normalize(&raw, self.config.enforce_rep_totals);
        info!(
            "Extracted {} sets ({} candidates, {} dropped)",
            normalized.sets.len(),
            normalized.candidates,
            normalized.dropped
        );

        Ok(ParseResponse::from_sets(normalized.sets))
    }
}
