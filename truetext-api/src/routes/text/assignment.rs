/// Assignment generation endpoint
///
/// # Endpoint
///
/// ```text
/// POST /v1/text/assignment
/// Content-Type: application/json
///
/// {
///   "topic": "The economic causes of the industrial revolution",
///   "word_count": 800,
///   "academic_level": "undergraduate"
/// }
/// ```
///
/// # Fallback chain
///
/// Routed chat model → alternate chat model. There is no local tier
/// because a heuristic cannot write an assignment, so exhausting both
/// models surfaces as a 502 (or 503 when no chat provider is configured
/// at all).
///
/// # Errors
///
/// - `400 Bad Request`: topic out of bounds or word count out of range
/// - `401 Unauthorized`: missing or expired session
/// - `429 Too Many Requests`: daily quota or rate limit exhausted
/// - `502 Bad Gateway`: both chat tiers failed
/// - `503 Service Unavailable`: no chat provider configured

use crate::{app::AppState, error::ApiError, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use truetext_providers::Feature;
use truetext_shared::auth::middleware::AuthContext;

use super::{record_usage, validate_length, MAX_TOPIC_CHARS, MIN_TOPIC_CHARS};

/// Smallest assignment the endpoint will draft
pub const MIN_WORD_COUNT: u32 = 100;

/// Largest assignment the endpoint will draft
pub const MAX_WORD_COUNT: u32 = 5_000;

/// Default assignment length
const DEFAULT_WORD_COUNT: u32 = 500;

/// Academic register for the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AcademicLevel {
    /// Secondary school register
    HighSchool,

    /// Undergraduate register
    #[default]
    Undergraduate,

    /// Graduate register
    Graduate,
}

impl AcademicLevel {
    /// Level name as used in prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            AcademicLevel::HighSchool => "high school",
            AcademicLevel::Undergraduate => "undergraduate",
            AcademicLevel::Graduate => "graduate",
        }
    }
}

/// Assignment request
#[derive(Debug, Deserialize)]
pub struct AssignmentRequest {
    /// Assignment topic
    pub topic: String,

    /// Target length in words (defaults to 500)
    pub word_count: Option<u32>,

    /// Academic register (defaults to "undergraduate")
    #[serde(default)]
    pub academic_level: AcademicLevel,
}

/// Assignment response
#[derive(Debug, Serialize)]
pub struct AssignmentResponse {
    /// Generated draft
    pub output: String,

    /// Engine that served the request
    pub engine: String,
}

/// Assignment handler
pub async fn assignment(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<AssignmentRequest>,
) -> ApiResult<Json<AssignmentResponse>> {
    validate_length("Topic", &req.topic, MIN_TOPIC_CHARS, MAX_TOPIC_CHARS)?;

    let word_count = req.word_count.unwrap_or(DEFAULT_WORD_COUNT);
    if !(MIN_WORD_COUNT..=MAX_WORD_COUNT).contains(&word_count) {
        return Err(ApiError::BadRequest(format!(
            "Word count must be between {} and {}",
            MIN_WORD_COUNT, MAX_WORD_COUNT
        )));
    }

    state.quota.check(auth.user_id, auth.plan).await?;

    let outcome = state
        .providers
        .assignment(&req.topic, word_count, req.academic_level.as_str())
        .await?;

    record_usage(
        &state,
        auth.user_id,
        Feature::Assignment,
        outcome.tokens,
        &outcome.engine,
    )
    .await;

    Ok(Json(AssignmentResponse {
        output: outcome.output,
        engine: outcome.engine,
    }))
}
