//! Configuration for the parse server.
//!
//! Settings come from an optional TOML file and are then overridden by
//! environment variables. The API credential is read from the environment
//! only and is never serialized or logged.

use liftlog_extractor::ExtractorConfig;
use liftlog_llm::openai::DEFAULT_BASE_URL;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Environment variable holding the inference service credential
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// Server configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read config file
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    /// Failed to parse TOML
    #[error("Failed to parse config TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The inference credential is absent
    #[error("Missing {0} env var")]
    MissingCredential(&'static str),

    /// A value is present but unusable
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Bearer credential for the inference service
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wrap a raw key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw key, for the Authorization header
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Bind port (e.g., 8000)
    #[serde(default = "default_bind_port")]
    pub bind_port: u16,

    /// Inference service root URL
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Extraction settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Credential; only ever set from the environment
    #[serde(skip)]
    pub api_key: Option<ApiKey>,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_bind_port() -> u16 {
    8000
}

fn default_api_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            bind_port: default_bind_port(),
            api_base_url: default_api_base_url(),
            extractor: ExtractorConfig::default(),
            api_key: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ServerConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Overlay environment variables.
    ///
    /// `lookup` is `std::env::var` in production; tests pass a map.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(address) = lookup("LIFTLOG_BIND_ADDRESS") {
            self.bind_address = address;
        }
        if let Some(port) = lookup("LIFTLOG_PORT").or_else(|| lookup("PORT")) {
            self.bind_port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("port '{}' is not a number", port)))?;
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(model) = lookup("LIFTLOG_MODEL") {
            self.extractor.model = model;
        }
        if let Some(secs) = lookup("LIFTLOG_TIMEOUT_SECS") {
            self.extractor.request_timeout_secs = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!("timeout '{}' is not a number", secs))
            })?;
        }
        if let Some(key) = lookup(API_KEY_VAR) {
            self.api_key = Some(ApiKey::new(key.trim()));
        }
        Ok(())
    }

    /// The credential, or the startup error that its absence implies
    pub fn api_key(&self) -> Result<&ApiKey, ConfigError> {
        self.api_key
            .as_ref()
            .ok_or(ConfigError::MissingCredential(API_KEY_VAR))
    }

    /// Check everything needed to serve traffic
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api_key()?;
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("api_base_url must not be empty".to_string()));
        }
        self.extractor.validate().map_err(ConfigError::Invalid)
    }

    /// Create a default configuration for testing
    pub fn default_test_config() -> Self {
        ServerConfig {
            bind_address: "127.0.0.1".to_string(),
            bind_port: 8000,
            api_key: Some(ApiKey::new("test-key-do-not-use-in-production")),
            ..Default::default()
        }
    }

    /// Get the full bind address (address:port)
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.bind_port)
    }
}
