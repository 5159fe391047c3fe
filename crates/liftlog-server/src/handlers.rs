//! HTTP request handlers for the parse service.
//!
//! Implements the parse endpoint and liveness probes using axum.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router as AxumRouter,
};
use liftlog_domain::{LlmProvider, ParseRequest, ParseResponse};
use liftlog_extractor::{Extractor, ExtractorError};
use liftlog_llm::LlmError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;

/// Fixed liveness message
pub const HEALTH_MESSAGE: &str = "Workout parser backend running";

/// Shared application state
pub struct AppState<L>
where
    L: LlmProvider<Error = LlmError>,
{
    /// Extraction pipeline
    pub extractor: Arc<Extractor<L>>,
}

impl<L> AppState<L>
where
    L: LlmProvider<Error = LlmError>,
{
    /// Wrap an extractor
    pub fn new(extractor: Extractor<L>) -> Self {
        Self {
            extractor: Arc::new(extractor),
        }
    }
}

impl<L> Clone for AppState<L>
where
    L: LlmProvider<Error = LlmError>,
{
    fn clone(&self) -> Self {
        Self {
            extractor: Arc::clone(&self.extractor),
        }
    }
}

/// Liveness response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always true when the process is serving
    pub ok: bool,
    /// Fixed acknowledgment
    pub message: String,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// The extraction backend did not answer in time
    UpstreamTimeout(String),
    /// The extraction backend could not be reached or refused the call
    Upstream(String),
    /// Internal server error
    InternalError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::UpstreamTimeout(msg) => (StatusCode::GATEWAY_TIMEOUT, msg),
            AppError::Upstream(msg) => (StatusCode::BAD_GATEWAY, msg),
            AppError::InternalError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<ExtractorError> for AppError {
    fn from(e: ExtractorError) -> Self {
        if e.is_timeout() {
            return AppError::UpstreamTimeout(e.to_string());
        }
        match e {
            ExtractorError::Llm(_) => AppError::Upstream(e.to_string()),
            _ => AppError::InternalError(e.to_string()),
        }
    }
}

/// POST /parse - Extract sets from workout notes
///
/// Returns 200 with a possibly empty or partial list; 502/504 when the
/// extraction backend fails.
async fn parse_text<L>(
    State(state): State<AppState<L>>,
    Json(request): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, AppError>
where
    L: LlmProvider<Error = LlmError> + 'static,
{
    let response = state.extractor.parse(request).await.map_err(|e| {
        error!("Parse failed: {}", e);
        AppError::from(e)
    })?;

    Ok(Json(response))
}

/// GET / and GET /health - Liveness probe
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        message: HEALTH_MESSAGE.to_string(),
    })
}

/// Create the axum router with all routes
pub fn create_router<L>(state: AppState<L>) -> AxumRouter
where
    L: LlmProvider<Error = LlmError> + 'static,
{
    AxumRouter::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .route("/parse", post(parse_text::<L>))
        .with_state(state)
}
