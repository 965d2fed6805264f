/// AI-content detection endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/text/detect
/// Content-Type: application/json
///
/// { "text": "In the ever-evolving landscape of technology..." }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "ai_probability": 0.87,
///   "analysis": "Estimated 87% likelihood of AI generation; 4 of 5 sentences flagged.",
///   "engine": "sapling"
/// }
/// ```
///
/// # Fallback chain
///
/// Sapling → HuggingFace detector → local heuristic. Heuristic-served
/// responses carry the `[Fallback Analysis]` marker at the start of
/// `analysis`.
///
/// # Errors
///
/// - `400 Bad Request`: text too short or too long
/// - `401 Unauthorized`: missing or expired session
/// - `429 Too Many Requests`: daily quota or rate limit exhausted

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use truetext_providers::{types::estimate_tokens, Feature};
use truetext_shared::auth::middleware::AuthContext;

use super::{record_usage, validate_length, MAX_TEXT_CHARS, MIN_TEXT_CHARS};

/// Detect request
#[derive(Debug, Deserialize)]
pub struct DetectRequest {
    /// Text to score
    pub text: String,
}

/// Detect response: the stable detection contract
#[derive(Debug, Serialize)]
pub struct DetectResponse {
    /// Probability the text is AI-generated, in [0, 1]
    pub ai_probability: f64,

    /// Human-readable explanation
    pub analysis: String,

    /// Engine that served the request
    pub engine: String,
}

/// Detect handler
pub async fn detect(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<DetectRequest>,
) -> ApiResult<Json<DetectResponse>> {
    validate_length("Text", &req.text, MIN_TEXT_CHARS, MAX_TEXT_CHARS)?;

    state.quota.check(auth.user_id, auth.plan).await?;

    let report = state.providers.detect(&req.text).await;

    record_usage(
        &state,
        auth.user_id,
        Feature::Detect,
        estimate_tokens(&req.text),
        &report.engine,
    )
    .await;

    Ok(Json(DetectResponse {
        ai_probability: report.ai_probability,
        analysis: report.analysis,
        engine: report.engine,
    }))
}
