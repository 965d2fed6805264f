/// Admin endpoints
///
/// User management, admin-configurable settings, and the usage overview.
/// Every route here sits behind the session layer plus the admin guard;
/// non-admin sessions receive 403 before any handler runs.
///
/// # Endpoints
///
/// - `GET    /v1/admin/users` - paginated user list
/// - `PATCH  /v1/admin/users/:id` - change role and/or plan
/// - `DELETE /v1/admin/users/:id` - delete an account
/// - `GET    /v1/admin/settings` - list settings
/// - `PUT    /v1/admin/settings/:key` - create or replace a setting
/// - `DELETE /v1/admin/settings/:key` - delete a setting
/// - `GET    /v1/admin/usage` - per-feature totals

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::auth::UserProfile,
    routes::map_validation_errors,
    routes::usage::Pagination,
};
use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use truetext_shared::auth::middleware::AuthContext;
use truetext_shared::models::setting::{Setting, UpsertSetting};
use truetext_shared::models::usage::{FeatureTotals, UsageLog};
use truetext_shared::models::user::{PlanTier, UpdateUser, User, UserRole};

/// User list response
#[derive(Debug, Serialize)]
pub struct UserListResponse {
    /// Users for the requested page (newest first)
    pub users: Vec<UserProfile>,

    /// Total user count
    pub total: i64,
}

/// Admin user update request
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    /// New role
    pub role: Option<UserRole>,

    /// New plan
    pub plan: Option<PlanTier>,
}

/// Setting write request
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertSettingRequest {
    /// Setting value
    #[validate(length(max = 4096, message = "Value must be at most 4096 characters"))]
    pub value: String,

    /// Human-readable description
    #[validate(length(max = 512, message = "Description must be at most 512 characters"))]
    #[serde(default)]
    pub description: String,
}

/// Usage overview response
#[derive(Debug, Serialize)]
pub struct UsageOverviewResponse {
    /// Totals per feature, busiest first
    pub features: Vec<FeatureTotals>,

    /// Total registered users
    pub users: i64,
}

/// User list handler
pub async fn list_users(
    State(state): State<AppState>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<UserListResponse>> {
    let (limit, offset) = pagination.bounds();

    let users = User::list(&state.db, limit, offset).await?;
    let total = User::count(&state.db).await?;

    let now = Utc::now();
    let users = users
        .iter()
        .map(|user| UserProfile::from_user(user, now))
        .collect();

    Ok(Json(UserListResponse { users, total }))
}

/// User update handler (role and/or plan)
///
/// # Errors
///
/// - `400 Bad Request`: neither field present
/// - `404 Not Found`: unknown user id
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserProfile>> {
    if req.role.is_none() && req.plan.is_none() {
        return Err(ApiError::BadRequest(
            "Provide a role or plan to update".to_string(),
        ));
    }

    let user = User::update(
        &state.db,
        id,
        UpdateUser {
            role: req.role,
            plan: req.plan,
            password_hash: None,
        },
    )
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        plan = %user.plan,
        "Admin updated user"
    );

    Ok(Json(UserProfile::from_user(&user, Utc::now())))
}

/// User delete handler
///
/// Usage logs cascade away with the account.
///
/// # Errors
///
/// - `400 Bad Request`: attempting to delete your own account
/// - `404 Not Found`: unknown user id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    if id == auth.user_id {
        return Err(ApiError::BadRequest(
            "Cannot delete your own account".to_string(),
        ));
    }

    let deleted = User::delete(&state.db, id).await?;
    if !deleted {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %id, deleted_by = %auth.user_id, "Admin deleted user");

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Settings list handler
pub async fn list_settings(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Setting>>> {
    let settings = Setting::list(&state.db).await?;
    Ok(Json(settings))
}

/// Setting upsert handler
///
/// # Errors
///
/// - `400 Bad Request`: key or value out of bounds
pub async fn upsert_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(req): Json<UpsertSettingRequest>,
) -> ApiResult<Json<Setting>> {
    req.validate().map_err(map_validation_errors)?;

    if key.is_empty() || key.len() > 64 {
        return Err(ApiError::BadRequest(
            "Setting key must be between 1 and 64 characters".to_string(),
        ));
    }

    let setting = Setting::upsert(
        &state.db,
        &key,
        UpsertSetting {
            value: req.value,
            description: req.description,
        },
    )
    .await?;

    tracing::info!(key = %setting.key, "Admin wrote setting");

    Ok(Json(setting))
}

/// Setting delete handler
///
/// # Errors
///
/// - `404 Not Found`: unknown key
pub async fn delete_setting(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let deleted = Setting::delete(&state.db, &key).await?;
    if !deleted {
        return Err(ApiError::NotFound("Setting not found".to_string()));
    }

    Ok(Json(serde_json::json!({ "ok": true })))
}

/// Usage overview handler
pub async fn usage_overview(
    State(state): State<AppState>,
) -> ApiResult<Json<UsageOverviewResponse>> {
    let features = UsageLog::totals_by_feature(&state.db).await?;
    let users = User::count(&state.db).await?;

    Ok(Json(UsageOverviewResponse { features, users }))
}
