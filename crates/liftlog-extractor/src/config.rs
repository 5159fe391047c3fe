//! Configuration for the Extractor

use crate::error::ExtractorError;
use crate::prompt::DEFAULT_SYSTEM_PROMPT;
use liftlog_llm::openai::{DEFAULT_MODEL, DEFAULT_TIMEOUT_SECS};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the Extractor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExtractorConfig {
    /// Model identifier passed to the inference service
    pub model: String,

    /// Maximum time for a single model call (seconds)
    pub request_timeout_secs: u64,

    /// Inline replacement for the built-in extraction prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    /// File holding a replacement extraction prompt
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<PathBuf>,

    /// Drop sets whose `reps_total` disagrees with the assisted/unassisted split
    pub enforce_rep_totals: bool,
}

impl ExtractorConfig {
    /// Get the request timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model must not be empty".to_string());
        }
        if self.request_timeout_secs == 0 {
            return Err("request_timeout_secs must be greater than 0".to_string());
        }
        if let Some(prompt) = &self.system_prompt {
            if prompt.trim().is_empty() {
                return Err("system_prompt must not be blank".to_string());
            }
        }
        if self.system_prompt.is_some() && self.system_prompt_file.is_some() {
            return Err("set either system_prompt or system_prompt_file, not both".to_string());
        }
        Ok(())
    }

    /// Resolve the extraction prompt: inline, then file, then built-in
    pub fn resolve_system_prompt(&self) -> Result<String, ExtractorError> {
        if let Some(prompt) = &self.system_prompt {
            return Ok(prompt.clone());
        }
        if let Some(path) = &self.system_prompt_file {
            let prompt = std::fs::read_to_string(path).map_err(|e| {
                ExtractorError::Config(format!(
                    "Failed to read system prompt file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            if prompt.trim().is_empty() {
                return Err(ExtractorError::Config(format!(
                    "System prompt file {} is empty",
                    path.display()
                )));
            }
            return Ok(prompt);
        }
        Ok(DEFAULT_SYSTEM_PROMPT.to_string())
    }

    /// Load configuration from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, String> {
        toml::from_str(toml_str).map_err(|e| format!("Failed to parse TOML: {}", e))
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| format!("Failed to serialize to TOML: {}", e))
    }
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            system_prompt: None,
            system_prompt_file: None,
            enforce_rep_totals: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExtractorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.model, "gpt-4o-mini");
        assert_eq!(config.request_timeout(), Duration::from_secs(8));
        assert!(!config.enforce_rep_totals);
    }

    #[test]
    fn test_invalid_timeout() {
        let config = ExtractorConfig {
            request_timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_temperature_is_not_configurable() {
        let err = ExtractorConfig::from_toml("temperature = 0.9").unwrap_err();
        assert!(err.contains("temperature"), "unexpected error: {}", err);
    }

    #[test]
    fn test_blank_model_and_prompt() {
        let config = ExtractorConfig {
            model: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = ExtractorConfig {
            system_prompt: Some("\n".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_prompt_sources_are_exclusive() {
        let config = ExtractorConfig {
            system_prompt: Some("inline".to_string()),
            system_prompt_file: Some(PathBuf::from("prompt.txt")),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_resolve_default_prompt() {
        let prompt = ExtractorConfig::default().resolve_system_prompt().unwrap();
        assert_eq!(prompt, DEFAULT_SYSTEM_PROMPT);
    }

    #[test]
    fn test_resolve_inline_prompt() {
        let config = ExtractorConfig {
            system_prompt: Some("Return {\"sets\": []}".to_string()),
            ..Default::default()
        };
        assert_eq!(config.resolve_system_prompt().unwrap(), "Return {\"sets\": []}");
    }

    #[test]
    fn test_resolve_missing_prompt_file() {
        let config = ExtractorConfig {
            system_prompt_file: Some(PathBuf::from("/nonexistent/liftlog/prompt.txt")),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve_system_prompt(),
            Err(ExtractorError::Config(_))
        ));
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = ExtractorConfig::from_toml("request_timeout_secs = 4").unwrap();
        assert_eq!(config.request_timeout_secs, 4);
        assert_eq!(config.model, "gpt-4o-mini");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ExtractorConfig {
            enforce_rep_totals: true,
            ..Default::default()
        };
        let toml_str = config.to_toml().unwrap();
        let parsed = ExtractorConfig::from_toml(&toml_str).unwrap();
        assert_eq!(config, parsed);
    }
}
