/// Authentication endpoints
///
/// This module provides session-cookie authentication:
/// - Registration (creates the account and logs in)
/// - Login
/// - Logout
/// - Current-user profile
///
/// # Endpoints
///
/// - `POST /v1/auth/register` - Register new user, set session cookie
/// - `POST /v1/auth/login` - Verify password, set session cookie
/// - `POST /v1/auth/logout` - Destroy the session
/// - `GET  /v1/auth/me` - Current user profile
///
/// Sessions are opaque tokens stored hashed in Redis; the cookie is
/// HttpOnly and, in production, Secure.

use crate::{
    app::{AppState, SessionToken, SESSION_COOKIE},
    error::{ApiError, ApiResult, ValidationErrorDetail},
    routes::map_validation_errors,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use truetext_shared::auth::middleware::AuthContext;
use truetext_shared::auth::password;
use truetext_shared::models::user::{CreateUser, User};

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password (validated for strength before hashing)
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Email address
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    /// Password
    pub password: String,
}

/// Public view of a user account (no password hash)
#[derive(Debug, Serialize)]
pub struct UserProfile {
    /// User ID
    pub id: String,

    /// Email address
    pub email: String,

    /// Role ("user" or "admin")
    pub role: String,

    /// Stored plan ("free", "pro", "enterprise")
    pub plan: String,

    /// Whether a trial is currently active
    pub trial_active: bool,

    /// When the trial ends, if one was started
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Builds the public profile from a user row
    pub fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.clone(),
            plan: user.plan.clone(),
            trial_active: user.trial_active(now),
            trial_ends_at: user.trial_ends_at,
            created_at: user.created_at,
        }
    }
}

/// Auth response carrying the profile
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// The authenticated user
    pub user: UserProfile,
}

/// Builds the Set-Cookie value for a fresh session
fn session_cookie(token: &str, max_age_secs: u64, secure: bool) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{}",
        SESSION_COOKIE,
        token,
        max_age_secs,
        if secure { "; Secure" } else { "" }
    )
}

/// Builds the Set-Cookie value that clears the session cookie
fn clear_session_cookie(secure: bool) -> String {
    format!(
        "{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0{}",
        SESSION_COOKIE,
        if secure { "; Secure" } else { "" }
    )
}

/// Header map carrying one Set-Cookie value
fn set_cookie_headers(cookie: String) -> ApiResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    let value = HeaderValue::from_str(&cookie)
        .map_err(|e| ApiError::InternalError(format!("Invalid cookie value: {}", e)))?;
    headers.insert(header::SET_COOKIE, value);
    Ok(headers)
}

/// Register a new user
///
/// Creates a free-plan account and immediately issues a session cookie.
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "user@example.com",
///   "password": "SecureP@ss123"
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or weak password
/// - `409 Conflict`: Email already exists
/// - `503 Service Unavailable`: Session store down
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(HeaderMap, Json<AuthResponse>)> {
    req.validate().map_err(map_validation_errors)?;

    // Validate password strength
    password::validate_password_strength(&req.password).map_err(|e| {
        ApiError::ValidationError(vec![ValidationErrorDetail {
            field: "password".to_string(),
            message: e,
        }])
    })?;

    // Hash password
    let password_hash = password::hash_password(&req.password)?;

    // Create user (duplicate email surfaces as 409 via the sqlx mapping)
    let user = User::create(
        &state.db,
        CreateUser {
            email: req.email.to_lowercase(),
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, "User registered");

    // Issue session
    let token = state.sessions.create(user.id).await?;
    let headers = set_cookie_headers(session_cookie(
        &token,
        state.sessions.ttl_secs(),
        state.config.api.production,
    ))?;

    Ok((
        headers,
        Json(AuthResponse {
            user: UserProfile::from_user(&user, Utc::now()),
        }),
    ))
}

/// Login endpoint
///
/// Authenticates a user and issues a session cookie.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials (deliberately the same
///   message for unknown email and wrong password)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<(HeaderMap, Json<AuthResponse>)> {
    req.validate().map_err(map_validation_errors)?;

    // Find user by email
    let user = User::find_by_email(&state.db, &req.email)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid email or password".to_string()))?;

    // Verify password
    let valid = password::verify_password(&req.password, &user.password_hash)?;
    if !valid {
        return Err(ApiError::Unauthorized(
            "Invalid email or password".to_string(),
        ));
    }

    // Update last login
    User::update_last_login(&state.db, user.id).await?;

    // Issue session
    let token = state.sessions.create(user.id).await?;
    let headers = set_cookie_headers(session_cookie(
        &token,
        state.sessions.ttl_secs(),
        state.config.api.production,
    ))?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok((
        headers,
        Json(AuthResponse {
            user: UserProfile::from_user(&user, Utc::now()),
        }),
    ))
}

/// Logout endpoint
///
/// Destroys the current session and clears the cookie. Idempotent: logging
/// out an already-destroyed session still succeeds.
pub async fn logout(
    State(state): State<AppState>,
    Extension(token): Extension<SessionToken>,
) -> ApiResult<(HeaderMap, Json<serde_json::Value>)> {
    state.sessions.destroy(&token.0).await?;

    let headers = set_cookie_headers(clear_session_cookie(state.config.api.production))?;

    Ok((headers, Json(serde_json::json!({ "ok": true }))))
}

/// Current-user profile endpoint
///
/// # Errors
///
/// - `401 Unauthorized`: Missing or expired session
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<AuthResponse>> {
    let user = User::find_by_id(&state.db, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(AuthResponse {
        user: UserProfile::from_user(&user, Utc::now()),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_format() {
        let cookie = session_cookie("ttxs_abc", 3600, false);
        assert_eq!(
            cookie,
            "truetext_session=ttxs_abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600"
        );
    }

    #[test]
    fn test_session_cookie_secure_in_production() {
        let cookie = session_cookie("ttxs_abc", 3600, true);
        assert!(cookie.ends_with("; Secure"));
    }

    #[test]
    fn test_clear_cookie_zeroes_max_age() {
        let cookie = clear_session_cookie(false);
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.starts_with("truetext_session=;"));
    }
}
