//! API request and response models.

use serde::{Deserialize, Serialize};
use smalltalks_core::PreProcessingConfig;

/// Request body for POST /api/analyze.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// The utterance to analyse.
    pub text: String,
    /// Pre-processing options; defaults apply when omitted.
    #[serde(default)]
    pub config: Option<PreProcessingConfig>,
}

/// Intent entry in the response.
#[derive(Debug, Serialize)]
pub struct IntentEntry {
    pub name: String,
    pub priority: i32,
}

/// Response body for GET /api/intents.
#[derive(Debug, Serialize)]
pub struct IntentsResponse {
    /// Intents in scan order.
    pub intents: Vec<IntentEntry>,
}

/// Response body for POST /api/reload.
#[derive(Debug, Serialize)]
pub struct ReloadResponse {
    pub success: bool,
    /// Number of intents after reloading.
    pub intents: usize,
}

/// Response body for GET /api/health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}
