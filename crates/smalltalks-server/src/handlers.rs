//! API route handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use smalltalks_core::Analysis;
use tracing::{debug, info};

use crate::error::{ApiError, Result};
use crate::models::{AnalyzeRequest, HealthResponse, IntentEntry, IntentsResponse, ReloadResponse};
use crate::state::AppState;

/// Longest accepted utterance, in bytes.
pub const MAX_TEXT_LEN: usize = 16 * 1024;

/// POST /api/analyze - Detect smalltalk intents and curse words.
pub async fn analyze(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<Analysis>> {
    let Json(req) = payload?;
    if req.text.len() > MAX_TEXT_LEN {
        return Err(ApiError::BadRequest(format!(
            "text exceeds {MAX_TEXT_LEN} bytes"
        )));
    }

    let config = req.config.unwrap_or_default();
    debug!(text_len = req.text.len(), ?config, "Analysing text");

    let detector = state.detector.read().await;
    let analysis = detector.analyze(&req.text, config).await?;

    Ok(Json(analysis))
}

/// GET /api/intents - List loaded intents in scan order.
pub async fn get_intents(State(state): State<AppState>) -> Result<Json<IntentsResponse>> {
    let detector = state.detector.read().await;
    detector.init().await?;

    let intents = detector
        .intents()
        .ok_or_else(|| ApiError::Internal("intents not loaded".to_string()))?
        .iter()
        .map(|intent| IntentEntry {
            name: intent.name().to_string(),
            priority: intent.priority(),
        })
        .collect();

    Ok(Json(IntentsResponse { intents }))
}

/// POST /api/reload - Drop cached rules and word lists and load them again.
pub async fn reload(State(state): State<AppState>) -> Result<Json<ReloadResponse>> {
    let mut detector = state.detector.write().await;
    detector.reset();
    detector.init().await?;

    let intents = detector.intents().map_or(0, <[_]>::len);
    info!(intents, "Reloaded smalltalk data");

    Ok(Json(ReloadResponse {
        success: true,
        intents,
    }))
}

/// GET /api/health - Liveness check.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
