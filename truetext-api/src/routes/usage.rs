/// Usage log endpoint
///
/// Returns the caller's own feature-invocation history for the dashboard.
///
/// # Endpoint
///
/// ```text
/// GET /v1/usage?limit=50&offset=0
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use truetext_shared::auth::middleware::AuthContext;
use truetext_shared::models::usage::UsageLog;

/// Largest page the endpoint will return
const MAX_PAGE_SIZE: i64 = 200;

/// Pagination query parameters
#[derive(Debug, Deserialize)]
pub struct Pagination {
    /// Page size (default 50, capped at 200)
    pub limit: Option<i64>,

    /// Rows to skip
    pub offset: Option<i64>,
}

impl Pagination {
    /// Clamped (limit, offset) pair
    pub fn bounds(&self) -> (i64, i64) {
        let limit = self.limit.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
        let offset = self.offset.unwrap_or(0).max(0);
        (limit, offset)
    }
}

/// One usage log entry as shown to the user
#[derive(Debug, Serialize)]
pub struct UsageEntry {
    /// Entry ID
    pub id: String,

    /// Feature name
    pub feature: String,

    /// Tokens attributed to the request
    pub tokens: i32,

    /// Engine that served the request
    pub engine: String,

    /// When the invocation happened
    pub created_at: DateTime<Utc>,
}

/// Usage list response
#[derive(Debug, Serialize)]
pub struct UsageResponse {
    /// Entries for the requested page (newest first)
    pub entries: Vec<UsageEntry>,

    /// Total entries for this user
    pub total: i64,
}

/// Usage list handler
pub async fn list_usage(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(pagination): Query<Pagination>,
) -> ApiResult<Json<UsageResponse>> {
    let (limit, offset) = pagination.bounds();

    let logs = UsageLog::list_by_user(&state.db, auth.user_id, limit, offset).await?;
    let total = UsageLog::count_by_user(&state.db, auth.user_id).await?;

    let entries = logs
        .into_iter()
        .map(|log| UsageEntry {
            id: log.id.to_string(),
            feature: log.feature,
            tokens: log.tokens,
            engine: log.engine,
            created_at: log.created_at,
        })
        .collect();

    Ok(Json(UsageResponse { entries, total }))
}
