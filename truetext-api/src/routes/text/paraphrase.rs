/// Paraphrasing endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/text/paraphrase
/// Content-Type: application/json
///
/// {
///   "text": "The committee will commence deliberations shortly...",
///   "level": "balanced",
///   "model": "swift"
/// }
/// ```
///
/// `level` selects the sampling temperature forwarded to the provider;
/// `model` is an optional alias resolved by the routing table (unknown
/// aliases fall back to the default model).
///
/// # Fallback chain
///
/// Routed chat model → alternate chat model → local substitution
/// heuristic. The heuristic tier is pure, so a fallback-served request is
/// deterministic for a given `(text, level)`.
///
/// # Errors
///
/// - `400 Bad Request`: text too short or too long
/// - `401 Unauthorized`: missing or expired session
/// - `429 Too Many Requests`: daily quota or rate limit exhausted

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use truetext_providers::{Feature, ParaphraseLevel};
use truetext_shared::auth::middleware::AuthContext;

use super::{record_usage, validate_length, MAX_TEXT_CHARS, MIN_TEXT_CHARS};

/// Paraphrase request
#[derive(Debug, Deserialize)]
pub struct ParaphraseRequest {
    /// Text to paraphrase
    pub text: String,

    /// Rewording intensity (defaults to "balanced")
    #[serde(default)]
    pub level: ParaphraseLevel,

    /// Optional model alias ("standard", "swift", "premium")
    pub model: Option<String>,
}

/// Paraphrase response
#[derive(Debug, Serialize)]
pub struct ParaphraseResponse {
    /// Paraphrased text
    pub output: String,

    /// Level that was applied
    pub level: ParaphraseLevel,

    /// Engine that served the request
    pub engine: String,
}

/// Paraphrase handler
pub async fn paraphrase(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ParaphraseRequest>,
) -> ApiResult<Json<ParaphraseResponse>> {
    validate_length("Text", &req.text, MIN_TEXT_CHARS, MAX_TEXT_CHARS)?;

    state.quota.check(auth.user_id, auth.plan).await?;

    let outcome = state
        .providers
        .paraphrase(&req.text, req.level, req.model.as_deref())
        .await;

    record_usage(
        &state,
        auth.user_id,
        Feature::Paraphrase,
        outcome.tokens,
        &outcome.engine,
    )
    .await;

    Ok(Json(ParaphraseResponse {
        output: outcome.output,
        level: req.level,
        engine: outcome.engine,
    }))
}
