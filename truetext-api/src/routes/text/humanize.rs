/// Text humanization endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/text/humanize
/// Content-Type: application/json
///
/// {
///   "text": "The utilization of advanced methodologies...",
///   "mode": "natural"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "output": "Using better methods...",
///   "engine": "humanizeai"
/// }
/// ```
///
/// # Fallback chain
///
/// HumanizeAI task API → chat rewrite → local heuristic. The endpoint
/// always answers 200 once validation and quota pass; `engine` records
/// which tier served the request.
///
/// # Errors
///
/// - `400 Bad Request`: text too short or too long
/// - `401 Unauthorized`: missing or expired session
/// - `429 Too Many Requests`: daily quota or rate limit exhausted

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use truetext_providers::{Feature, HumanizeMode};
use truetext_shared::auth::middleware::AuthContext;

use super::{record_usage, validate_length, MAX_TEXT_CHARS, MIN_TEXT_CHARS};

/// Humanize request
#[derive(Debug, Deserialize)]
pub struct HumanizeRequest {
    /// Text to humanize
    pub text: String,

    /// Target register (defaults to "natural")
    #[serde(default)]
    pub mode: HumanizeMode,
}

/// Humanize response
#[derive(Debug, Serialize)]
pub struct HumanizeResponse {
    /// Humanized text
    pub output: String,

    /// Engine that served the request
    pub engine: String,
}

/// Humanize handler
pub async fn humanize(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<HumanizeRequest>,
) -> ApiResult<Json<HumanizeResponse>> {
    validate_length("Text", &req.text, MIN_TEXT_CHARS, MAX_TEXT_CHARS)?;

    state.quota.check(auth.user_id, auth.plan).await?;

    let outcome = state.providers.humanize(&req.text, req.mode).await;

    record_usage(
        &state,
        auth.user_id,
        Feature::Humanize,
        outcome.tokens,
        &outcome.engine,
    )
    .await;

    Ok(Json(HumanizeResponse {
        output: outcome.output,
        engine: outcome.engine,
    }))
}
