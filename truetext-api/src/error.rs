/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which automatically converts
/// to the right status code with a JSON `{error, message}` body.
///
/// Taxonomy: validation → 400, auth → 401, forbidden → 403, not-found →
/// 404, conflict → 409, quota/rate → 429, upstream provider failure →
/// 502, session store unavailable → 503, unexpected → 500. Internal detail
/// is logged, never leaked.
///
/// # Example
///
/// ```
/// use truetext_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler() -> ApiResult<Json<serde_json::Value>> {
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;

use truetext_providers::ProviderError;
use truetext_shared::auth::middleware::{AuthError, ForbiddenError};
use truetext_shared::auth::password::PasswordError;
use truetext_shared::quota::QuotaError;
use truetext_shared::redis::{RedisClientError, SessionError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Forbidden (403)
    Forbidden(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409) - e.g., duplicate email
    Conflict(String),

    /// Validation failure (400) with per-field detail
    ValidationError(Vec<ValidationErrorDetail>),

    /// Too many requests (429)
    RateLimitExceeded {
        /// Seconds the client should wait before retrying
        retry_after: u64,
        /// Human-readable message
        message: String,
    },

    /// Upstream provider failure (502)
    Upstream(String),

    /// Internal server error (500)
    InternalError(String),

    /// Service unavailable (503)
    ServiceUnavailable(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::RateLimitExceeded { message, .. } => {
                write!(f, "Rate limit exceeded: {}", message)
            }
            ApiError::Upstream(msg) => write!(f, "Upstream provider error: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            ApiError::ServiceUnavailable(msg) => write!(f, "Service unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Handle rate limit separately to add Retry-After header
        if let ApiError::RateLimitExceeded {
            retry_after,
            message,
        } = &self
        {
            let body = Json(ErrorResponse {
                error: "rate_limit_exceeded".to_string(),
                message: message.clone(),
                details: None,
            });

            let mut response = (StatusCode::TOO_MANY_REQUESTS, body).into_response();
            if let Ok(value) = axum::http::HeaderValue::from_str(&retry_after.to_string()) {
                response.headers_mut().insert("Retry-After", value);
            }
            return response;
        }

        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg, None),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::ValidationError(errors) => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::RateLimitExceeded { message, .. } => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limit_exceeded",
                message,
                None,
            ),
            ApiError::Upstream(msg) => {
                // Upstream detail is logged; clients get a static message
                tracing::error!("Upstream provider error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "Upstream provider request failed".to_string(),
                    None,
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                "service_unavailable",
                msg,
                None,
            ),
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound("Resource not found".to_string()),
            sqlx::Error::Database(db_err) => {
                // Unique constraint violations surface as conflicts
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Conflict("Email already exists".to_string());
                    }
                    return ApiError::Conflict(format!("Constraint violation: {}", constraint));
                }

                ApiError::InternalError(format!("Database error: {}", db_err))
            }
            _ => ApiError::InternalError(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingCredentials => {
                ApiError::Unauthorized("Missing session cookie".to_string())
            }
            AuthError::InvalidFormat => {
                ApiError::Unauthorized("Invalid session token".to_string())
            }
            AuthError::InvalidSession => {
                ApiError::Unauthorized("Session expired or invalid".to_string())
            }
            AuthError::UserNotFound => {
                ApiError::Unauthorized("Session expired or invalid".to_string())
            }
            AuthError::StoreError(msg) => ApiError::ServiceUnavailable(format!(
                "Session store unavailable: {}",
                msg
            )),
        }
    }
}

/// Convert role guard failures to API errors
impl From<ForbiddenError> for ApiError {
    fn from(_: ForbiddenError) -> Self {
        ApiError::Forbidden("Admin role required".to_string())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}

/// Convert session store errors to API errors
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Store(e) => {
                ApiError::ServiceUnavailable(format!("Session store unavailable: {}", e))
            }
            SessionError::Corrupt(msg) => {
                ApiError::InternalError(format!("Corrupt session entry: {}", msg))
            }
        }
    }
}

/// Convert Redis client errors to API errors
impl From<RedisClientError> for ApiError {
    fn from(err: RedisClientError) -> Self {
        ApiError::ServiceUnavailable(format!("Redis unavailable: {}", err))
    }
}

/// Convert quota errors to API errors
impl From<QuotaError> for ApiError {
    fn from(err: QuotaError) -> Self {
        match err {
            QuotaError::LimitExceeded { limit, current } => ApiError::RateLimitExceeded {
                retry_after: seconds_until_utc_midnight(),
                message: format!("Daily request limit exceeded ({}/{})", current, limit),
            },
            QuotaError::DatabaseError(e) => ApiError::from(e),
        }
    }
}

/// Convert provider errors to API errors
///
/// Only errors that survive a feature's full fallback chain reach this
/// conversion.
impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(what) => {
                ApiError::ServiceUnavailable(format!("Feature unavailable: {} not configured", what))
            }
            other => ApiError::Upstream(other.to_string()),
        }
    }
}

/// Seconds remaining until the next UTC midnight (daily quota reset)
fn seconds_until_utc_midnight() -> u64 {
    use chrono::{Duration, Utc};

    let now = Utc::now();
    let tomorrow = (now + Duration::days(1))
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .expect("midnight is a valid time")
        .and_utc();

    (tomorrow - now).num_seconds().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::Upstream("provider 500".to_string());
        assert_eq!(err.to_string(), "Upstream provider error: provider 500");
    }

    #[test]
    fn test_validation_error_display() {
        let errors = vec![
            ValidationErrorDetail {
                field: "email".to_string(),
                message: "Invalid email format".to_string(),
            },
            ValidationErrorDetail {
                field: "password".to_string(),
                message: "Password too short".to_string(),
            },
        ];

        let err = ApiError::ValidationError(errors);
        assert_eq!(err.to_string(), "Validation failed: 2 errors");
    }

    #[test]
    fn test_quota_error_maps_to_429() {
        let err = ApiError::from(QuotaError::LimitExceeded {
            limit: 20,
            current: 20,
        });

        match err {
            ApiError::RateLimitExceeded {
                retry_after,
                message,
            } => {
                assert!(message.contains("20/20"));
                assert!(retry_after <= 86_400);
            }
            other => panic!("expected rate limit error, got {:?}", other),
        }
    }

    #[test]
    fn test_unconfigured_provider_maps_to_503() {
        let err = ApiError::from(ProviderError::NotConfigured("GROQ_API_KEY"));
        assert!(matches!(err, ApiError::ServiceUnavailable(_)));
    }

    #[test]
    fn test_provider_status_maps_to_upstream() {
        let err = ApiError::from(ProviderError::from_status(500, "boom"));
        assert!(matches!(err, ApiError::Upstream(_)));
    }

    #[test]
    fn test_seconds_until_midnight_bounds() {
        let secs = seconds_until_utc_midnight();
        assert!(secs <= 86_400);
    }
}
