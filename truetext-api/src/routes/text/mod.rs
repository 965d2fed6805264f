/// Text feature endpoints
///
/// One module per operation:
///
/// - `humanize`: POST /v1/text/humanize
/// - `paraphrase`: POST /v1/text/paraphrase
/// - `detect`: POST /v1/text/detect
/// - `assignment`: POST /v1/text/assignment
///
/// All four share the same handler shape: validate the payload, check the
/// daily quota, dispatch through the provider router, record the usage
/// log entry, return the normalized result.

pub mod assignment;
pub mod detect;
pub mod humanize;
pub mod paraphrase;

use crate::app::AppState;
use crate::error::ApiError;
use uuid::Uuid;

use truetext_providers::Feature;
use truetext_shared::models::usage::{RecordUsage, UsageLog};

/// Minimum characters for humanize/paraphrase/detect input
pub const MIN_TEXT_CHARS: usize = 50;

/// Maximum characters for any text input
pub const MAX_TEXT_CHARS: usize = 50_000;

/// Minimum characters for an assignment topic
pub const MIN_TOPIC_CHARS: usize = 10;

/// Maximum characters for an assignment topic
pub const MAX_TOPIC_CHARS: usize = 500;

/// Checks a text field's length bounds
///
/// `field` is the client-facing field name ("Text" or "Topic"); the error
/// message is exact and stable because clients match on it.
///
/// # Errors
///
/// Returns a 400 [`ApiError::BadRequest`] when out of bounds.
pub(crate) fn validate_length(
    field: &str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ApiError> {
    let chars = value.chars().count();

    if chars < min {
        return Err(ApiError::BadRequest(format!(
            "{} must be at least {} characters",
            field, min
        )));
    }

    if chars > max {
        return Err(ApiError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }

    Ok(())
}

/// Records a usage log entry for a served feature request
///
/// Best-effort: the client already has their result, so a failed write is
/// logged rather than turned into an error response.
pub(crate) async fn record_usage(
    state: &AppState,
    user_id: Uuid,
    feature: Feature,
    tokens: i64,
    engine: &str,
) {
    let result = UsageLog::record(
        &state.db,
        RecordUsage {
            user_id,
            feature: feature.as_str().to_string(),
            tokens: tokens.clamp(0, i32::MAX as i64) as i32,
            engine: engine.to_string(),
        },
    )
    .await;

    if let Err(err) = result {
        tracing::error!(
            error = %err,
            user_id = %user_id,
            feature = feature.as_str(),
            "Failed to record usage log entry"
        );
    }
}
