/// Health check endpoint
///
/// Provides a simple health check that verifies:
/// - The server is running
/// - Database connectivity
/// - Redis connectivity
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "database": "connected",
///   "redis": "connected"
/// }
/// ```

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status ("healthy" or "degraded")
    pub status: String,

    /// Application version
    pub version: String,

    /// Database status
    pub database: String,

    /// Redis status
    pub redis: String,
}

/// Health check handler
///
/// Returns service health status including datastore connectivity. Always
/// answers 200; a degraded status is reported in the body so load
/// balancers and dashboards can distinguish partial outages.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    let database = match sqlx::query("SELECT 1").fetch_one(&state.db).await {
        Ok(_) => "connected",
        Err(_) => "disconnected",
    };

    let redis = match state.redis.ping().await {
        Ok(true) => "connected",
        _ => "disconnected",
    };

    let status = if database == "connected" && redis == "connected" {
        "healthy"
    } else {
        "degraded"
    };

    Ok(Json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        redis: redis.to_string(),
    }))
}
