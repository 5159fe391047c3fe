//! Liftlog Server
//!
//! HTTP front end for the workout-notes extractor.
//! Stateless: each request is handled on its own.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use config::{ConfigError, ServerConfig};
use handlers::{create_router, AppState};
use liftlog_extractor::{Extractor, ExtractorError};
use liftlog_llm::{LlmError, OpenAiProvider};
use tokio::net::TcpListener;
use tracing::info;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The inference client could not be constructed
    #[error("Inference client error: {0}")]
    Client(#[from] LlmError),

    /// The extractor rejected its configuration
    #[error("Extractor error: {0}")]
    Extractor(#[from] ExtractorError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Build the application state backed by the hosted inference service.
///
/// Fails when the credential is missing, so nothing is bound without one.
pub fn build_state(config: &ServerConfig) -> Result<AppState<OpenAiProvider>, ServerError> {
    config.validate()?;
    let api_key = config.api_key()?;

    let provider = OpenAiProvider::new(
        config.api_base_url.as_str(),
        api_key.expose(),
        config.extractor.model.as_str(),
    )?
    .with_timeout(config.extractor.request_timeout());

    let extractor = Extractor::new(provider, config.extractor.clone())?;
    Ok(AppState::new(extractor))
}

/// Start the HTTP server
///
/// Validates configuration, builds the extractor, binds and serves until
/// Ctrl-C.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    let state = build_state(&config)?;

    info!("Starting Liftlog server");
    info!("Bind address: {}", config.bind_addr());
    info!("Inference service: {}", config.api_base_url);
    info!("Model: {}", config.extractor.model);
    info!("Request timeout: {} seconds", config.extractor.request_timeout_secs);

    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // No signal handler available; serve until the process is killed
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_state_requires_credential() {
        let result = build_state(&ServerConfig::default());
        assert!(matches!(
            result,
            Err(ServerError::Config(ConfigError::MissingCredential(_)))
        ));
    }

    #[test]
    fn test_build_state_with_credential() {
        let state = build_state(&ServerConfig::default_test_config()).unwrap();
        assert_eq!(state.extractor.config().model, "gpt-4o-mini");
        assert_eq!(state.extractor.provider().model(), "gpt-4o-mini");
    }

    #[tokio::test]
    async fn test_start_server_refuses_without_credential() {
        let config = ServerConfig {
            bind_port: 0,
            ..Default::default()
        };
        let result = start_server(config).await;
        assert!(matches!(result, Err(ServerError::Config(_))));
    }
}
