//! Request handlers for API endpoints.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use affect_core::{DominantEmotion, MultiEmotion};
use affect_service::{EmotionGraph, EmotionService, Route, ServiceConfig};

/// Longest text accepted by a single analysis, in characters.
pub const MAX_TEXT_CHARS: usize = 8_000;

/// Most texts accepted by one batch request.
pub const MAX_BATCH: usize = 32;

// ============================================================================
// Application State
// ============================================================================

/// Shared application state: the analysis service and a sequence counter.
pub struct AppState {
    pub service: EmotionService,
    sequence: AtomicU64,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Self {
        Self::with_service(EmotionService::new(config))
    }

    pub fn with_service(service: EmotionService) -> Self {
        Self {
            service,
            sequence: AtomicU64::new(0),
        }
    }

    /// Next analysis sequence number, starting at 1.
    pub fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::Relaxed) + 1
    }
}

pub type SharedState = Arc<AppState>;

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Request-level rejection.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    fn too_large(message: String) -> Self {
        Self {
            status: StatusCode::PAYLOAD_TOO_LARGE,
            message,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

fn check_text(text: &str) -> Result<(), ApiError> {
    let chars = text.chars().count();
    if chars > MAX_TEXT_CHARS {
        return Err(ApiError::too_large(format!(
            "text has {chars} characters (max {MAX_TEXT_CHARS})"
        )));
    }
    Ok(())
}

// ============================================================================
// Health Check
// ============================================================================

pub async fn health_check(State(state): State<SharedState>) -> impl IntoResponse {
    let config = state.service.config();
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "mode": config.mode,
        "clusters": config.clusters,
        "remote": state.service.route() == Route::Remote,
        "model": config.model.model,
    }))
}

// ============================================================================
// Analysis
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Increases with every analysis; clients keep only the latest.
    pub sequence: u64,
    pub latency_ms: u64,
    /// Present when the preferred pipeline was not used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<String>,
    pub graph: EmotionGraph,
}

async fn run_analysis(state: &AppState, text: &str) -> AnalyzeResponse {
    let sequence = state.next_sequence();
    let start = Instant::now();
    let resolved = state.service.analyze_resolved(text).await;
    let latency_ms = start.elapsed().as_millis() as u64;

    AnalyzeResponse {
        sequence,
        latency_ms,
        fallback: resolved.reason().map(ToString::to_string),
        graph: resolved.into_inner(),
    }
}

pub async fn analyze(
    State(state): State<SharedState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    check_text(&req.text)?;
    Ok(Json(run_analysis(&state, &req.text).await))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub texts: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub results: Vec<AnalyzeResponse>,
    pub latency_ms: u64,
}

pub async fn analyze_batch(
    State(state): State<SharedState>,
    Json(req): Json<BatchRequest>,
) -> Result<Json<BatchResponse>, ApiError> {
    if req.texts.len() > MAX_BATCH {
        return Err(ApiError::too_large(format!(
            "batch has {} texts (max {MAX_BATCH})",
            req.texts.len()
        )));
    }
    for text in &req.texts {
        check_text(text)?;
    }

    let start = Instant::now();
    let futures: Vec<_> = req
        .texts
        .iter()
        .map(|text| run_analysis(&state, text))
        .collect();
    let results = futures::future::join_all(futures).await;

    Ok(Json(BatchResponse {
        results,
        latency_ms: start.elapsed().as_millis() as u64,
    }))
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub dominant: DominantEmotion,
    pub expansion: MultiEmotion,
}

/// Local classification and expansion only; never calls the remote model.
pub async fn classify(
    State(state): State<SharedState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<ClassifyResponse>, ApiError> {
    check_text(&req.text)?;
    let (dominant, expansion) = state.service.classify(&req.text);
    Ok(Json(ClassifyResponse {
        dominant,
        expansion,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> SharedState {
        Arc::new(AppState::new(ServiceConfig::offline()))
    }

    #[tokio::test]
    async fn test_analyze_assigns_increasing_sequence() {
        let state = state();
        let first = analyze(
            State(state.clone()),
            Json(AnalyzeRequest { text: "I'm so happy".into() }),
        )
        .await
        .unwrap();
        let second = analyze(
            State(state.clone()),
            Json(AnalyzeRequest { text: "estoy triste".into() }),
        )
        .await
        .unwrap();

        assert_eq!(first.sequence, 1);
        assert_eq!(second.sequence, 2);
        assert!(first.fallback.is_none());
        assert_eq!(first.graph.emotions[0].label, "joy");
        assert_eq!(second.graph.emotions[0].label, "sadness");
    }

    #[tokio::test]
    async fn test_oversized_text_is_rejected() {
        let text = "a".repeat(MAX_TEXT_CHARS + 1);
        let err = analyze(State(state()), Json(AnalyzeRequest { text }))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_batch_preserves_order() {
        let req = BatchRequest {
            texts: vec!["thank you".into(), "".into(), "that is gross".into()],
        };
        let resp = analyze_batch(State(state()), Json(req)).await.unwrap();
        let labels: Vec<&str> = resp
            .results
            .iter()
            .map(|r| r.graph.emotions[0].label.as_str())
            .collect();
        assert_eq!(labels, vec!["gratitude", "neutral", "disgust"]);
    }

    #[tokio::test]
    async fn test_classify_returns_expansion() {
        let resp = classify(
            State(state()),
            Json(AnalyzeRequest { text: "gracias por todo, te amo".into() }),
        )
        .await
        .unwrap();
        assert_eq!(resp.dominant.label, "joy");
        assert_eq!(resp.expansion.emotions.len(), 4);
        assert_eq!(resp.expansion.pairs.len(), 3);
    }
}
