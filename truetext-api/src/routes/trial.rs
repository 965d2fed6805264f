/// Trial endpoints
///
/// A trial is a one-time, 7-day grant of pro-plan limits to a free-plan
/// user. Eligibility is evaluated from the user row (pure function);
/// starting stamps the window and consumes the grant, cancelling ends the
/// window now without restoring eligibility.
///
/// # Endpoints
///
/// - `POST /v1/trial/start` - 400 when ineligible
/// - `POST /v1/trial/cancel` - 400 when no trial is active

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use truetext_shared::auth::middleware::AuthContext;
use truetext_shared::models::user::{TrialEligibility, User};

/// Trial state response
#[derive(Debug, Serialize)]
pub struct TrialResponse {
    /// Whether a trial is active right now
    pub trial_active: bool,

    /// When the trial started
    pub trial_started_at: Option<DateTime<Utc>>,

    /// When the trial ends or ended
    pub trial_ends_at: Option<DateTime<Utc>>,
}

impl TrialResponse {
    fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            trial_active: user.trial_active(now),
            trial_started_at: user.trial_started_at,
            trial_ends_at: user.trial_ends_at,
        }
    }
}

/// Trial start handler
///
/// # Errors
///
/// - `400 Bad Request`: user is ineligible (trial already used, trial
///   currently active, or already on a paid plan)
/// - `401 Unauthorized`: missing or expired session
pub async fn start_trial(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TrialResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let now = Utc::now();

    match user.trial_eligibility(now) {
        TrialEligibility::Eligible => {}
        reason => {
            tracing::info!(user_id = %user.id, ?reason, "Trial start rejected");
            return Err(ApiError::BadRequest(
                "Trial is not available for this account".to_string(),
            ));
        }
    }

    let user = User::start_trial(&state.db, user.id, now)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, ends_at = ?user.trial_ends_at, "Trial started");

    Ok(Json(TrialResponse::from_user(&user, now)))
}

/// Trial cancel handler
///
/// Ends an active trial immediately. The trial stays consumed.
///
/// # Errors
///
/// - `400 Bad Request`: no trial is currently active
/// - `401 Unauthorized`: missing or expired session
pub async fn cancel_trial(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<TrialResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    let now = Utc::now();

    if !user.trial_active(now) {
        return Err(ApiError::BadRequest(
            "No active trial to cancel".to_string(),
        ));
    }

    let user = User::cancel_trial(&state.db, user.id, now)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "Trial cancelled");

    Ok(Json(TrialResponse::from_user(&user, now)))
}
