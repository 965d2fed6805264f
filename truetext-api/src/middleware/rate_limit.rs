/// Rate limiting middleware for the text-feature endpoints
///
/// Token bucket rate limiting with Redis-backed state so limits hold
/// across instances. Limits are applied per user based on their effective
/// plan (an active trial gets pro limits).
///
/// # Rate Limits by Plan
///
/// - **Free**: 30 requests/minute
/// - **Pro**: 120 requests/minute
/// - **Enterprise**: 600 requests/minute
///
/// # Algorithm
///
/// Token bucket, evaluated atomically in a Lua script:
/// - Tokens refill at a constant rate up to the bucket capacity
/// - Each request consumes 1 token
/// - Request rejected with 429 when the bucket is empty
///
/// # Storage
///
/// State lives in Redis hashes under `ratelimit:user:{user_id}` with a
/// 2-minute TTL for auto-cleanup.
///
/// # Headers
///
/// Responses include:
/// - `X-RateLimit-Limit`: requests allowed per minute
/// - `X-RateLimit-Remaining`: tokens remaining
/// - `Retry-After`: seconds to wait (429 responses only)

use crate::app::AppState;
use crate::error::ApiError;
use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
    Extension,
};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use truetext_shared::auth::middleware::AuthContext;
use truetext_shared::models::user::PlanTier;
use truetext_shared::redis::RedisClient;

/// Rate limit configuration for a plan
#[derive(Debug, Clone, Copy)]
pub struct RateLimit {
    /// Maximum requests per minute
    pub requests_per_minute: u32,

    /// Token refill rate (tokens per second)
    pub refill_rate: f64,

    /// Maximum tokens in bucket (burst capacity)
    pub bucket_capacity: u32,
}

impl RateLimit {
    /// Gets rate limit configuration for a plan
    pub fn for_plan(plan: PlanTier) -> Self {
        match plan {
            PlanTier::Free => RateLimit {
                requests_per_minute: 30,
                refill_rate: 0.5,
                bucket_capacity: 30,
            },
            PlanTier::Pro => RateLimit {
                requests_per_minute: 120,
                refill_rate: 2.0,
                bucket_capacity: 120,
            },
            PlanTier::Enterprise => RateLimit {
                requests_per_minute: 600,
                refill_rate: 10.0,
                bucket_capacity: 600,
            },
        }
    }
}

/// Result of a rate limit check
#[derive(Debug)]
pub struct RateLimitResult {
    /// Whether the request is allowed
    pub ok: bool,

    /// Tokens remaining
    pub remaining: u32,

    /// Seconds until a token is available (when rejected)
    pub reset_after: u64,
}

/// Rate limiting middleware layer
///
/// Must run inside the session layer so the [`AuthContext`] extension is
/// present.
///
/// # Errors
///
/// - 429 Too Many Requests: bucket empty
/// - 503 Service Unavailable: Redis failure
pub async fn rate_limit_layer(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let rate_limit = RateLimit::for_plan(auth.plan);

    let result = check_rate_limit(&state.redis, auth.user_id, rate_limit).await?;

    if !result.ok {
        return Err(ApiError::RateLimitExceeded {
            retry_after: result.reset_after,
            message: format!(
                "Rate limit exceeded. Try again in {} seconds",
                result.reset_after
            ),
        });
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&rate_limit.requests_per_minute.to_string()) {
        headers.insert("X-RateLimit-Limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&result.remaining.to_string()) {
        headers.insert("X-RateLimit-Remaining", value);
    }

    Ok(response)
}

/// Checks the rate limit using the Redis token bucket
///
/// The Lua script refills, consumes, and stamps the bucket atomically so
/// concurrent requests from the same user cannot double-spend a token.
///
/// # Errors
///
/// Returns a 503-mapped error if Redis is unreachable.
async fn check_rate_limit(
    redis: &RedisClient,
    user_id: Uuid,
    rate_limit: RateLimit,
) -> Result<RateLimitResult, ApiError> {
    let mut conn = redis.get_connection();

    let key = format!("ratelimit:user:{}", user_id);
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ApiError::InternalError(format!("System clock error: {}", e)))?
        .as_secs();

    let script = redis::Script::new(
        r#"
        local key = KEYS[1]
        local capacity = tonumber(ARGV[1])
        local refill_rate = tonumber(ARGV[2])
        local now = tonumber(ARGV[3])

        local bucket = redis.call('HMGET', key, 'tokens', 'last_refill')
        local tokens = tonumber(bucket[1])
        local last_refill = tonumber(bucket[2])

        if not tokens then
            tokens = capacity
            last_refill = now
        end

        local elapsed = now - last_refill
        tokens = math.min(capacity, tokens + (elapsed * refill_rate))

        if tokens >= 1 then
            tokens = tokens - 1
            redis.call('HMSET', key, 'tokens', tokens, 'last_refill', now)
            redis.call('EXPIRE', key, 120)
            return {1, math.floor(tokens), 0}
        else
            return {0, 0, math.ceil((1 - tokens) / refill_rate)}
        end
        "#,
    );

    let result: Vec<i64> = script
        .key(&key)
        .arg(rate_limit.bucket_capacity)
        .arg(rate_limit.refill_rate)
        .arg(now)
        .invoke_async(&mut conn)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Rate limit script failed");
            ApiError::ServiceUnavailable("Rate limit service unavailable".to_string())
        })?;

    if result.len() != 3 {
        return Err(ApiError::InternalError(
            "Rate limit script returned unexpected shape".to_string(),
        ));
    }

    Ok(RateLimitResult {
        ok: result[0] == 1,
        remaining: result[1] as u32,
        reset_after: result[2] as u64,
    })
}
