/// Application state and router builder
///
/// This module defines the shared application state and provides
/// a function to build the Axum router with all routes and middleware.
///
/// # Example
///
/// ```no_run
/// use truetext_api::{app::AppState, config::Config};
/// use truetext_providers::ProviderRouter;
/// use truetext_shared::db::pool::create_pool;
/// use truetext_shared::redis::RedisClient;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let db = create_pool(config.database.clone()).await?;
/// let redis = RedisClient::new(config.redis.clone()).await?;
/// let providers = ProviderRouter::new(config.providers.clone())?;
/// let state = AppState::new(db, redis, providers, config);
/// let app = truetext_api::app::build_router(state);
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, error::ApiError, middleware::security::SecurityHeadersLayer};
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method},
    middleware::Next,
    response::Response,
    routing::{delete, get, patch, post, put},
    Router,
};
use chrono::Utc;
use sqlx::PgPool;
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use truetext_providers::ProviderRouter;
use truetext_shared::auth::middleware::{require_admin, AuthContext, AuthError};
use truetext_shared::models::user::User;
use truetext_shared::quota::QuotaEnforcer;
use truetext_shared::redis::{RedisClient, SessionStore};

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "truetext_session";

/// The raw session token of the current request, kept for logout
#[derive(Debug, Clone)]
pub struct SessionToken(pub String);

/// Shared application state
///
/// This is cloned for each request handler via Axum's `State` extractor.
/// Uses Arc internally for cheap cloning.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: PgPool,

    /// Redis client (rate limiting, health checks)
    pub redis: RedisClient,

    /// Session store
    pub sessions: SessionStore,

    /// Provider router for all AI features
    pub providers: Arc<ProviderRouter>,

    /// Daily quota enforcer
    pub quota: QuotaEnforcer,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Creates new application state
    pub fn new(
        db: PgPool,
        redis: RedisClient,
        providers: ProviderRouter,
        config: Config,
    ) -> Self {
        let sessions = SessionStore::new(redis.clone(), config.session.ttl_secs);
        let quota = QuotaEnforcer::new(db.clone());

        Self {
            db,
            redis,
            sessions,
            providers: Arc::new(providers),
            quota,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// # Architecture
///
/// ```text
/// /
/// ├── /health                       # Health check (public)
/// ├── /v1/
/// │   ├── /auth/
/// │   │   ├── POST /register        # Create account + session (public)
/// │   │   ├── POST /login           # Issue session cookie (public)
/// │   │   ├── POST /logout          # Destroy session (session)
/// │   │   └── GET  /me              # Current profile (session)
/// │   ├── /text/                    # Feature endpoints (session + rate limit)
/// │   │   ├── POST /humanize
/// │   │   ├── POST /paraphrase
/// │   │   ├── POST /detect
/// │   │   └── POST /assignment
/// │   ├── /trial/
/// │   │   ├── POST /start           # (session)
/// │   │   └── POST /cancel          # (session)
/// │   ├── GET /usage                # Caller's usage log (session)
/// │   └── /admin/                   # (session + admin role)
/// │       ├── GET    /users
/// │       ├── PATCH  /users/:id
/// │       ├── DELETE /users/:id
/// │       ├── GET    /settings
/// │       ├── PUT    /settings/:key
/// │       ├── DELETE /settings/:key
/// │       └── GET    /usage
/// ```
///
/// # Middleware Stack
///
/// Applied in order (outermost first): tracing, CORS, security headers;
/// per-nest: session auth, admin guard, per-plan rate limiting.
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    // Health check (public, no auth)
    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    // Public auth routes
    let auth_public = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    // Session-scoped auth routes
    let auth_session = Router::new()
        .route("/logout", post(routes::auth::logout))
        .route("/me", get(routes::auth::me))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Text feature routes (session auth + per-plan rate limiting)
    let text_routes = Router::new()
        .route("/humanize", post(routes::text::humanize::humanize))
        .route("/paraphrase", post(routes::text::paraphrase::paraphrase))
        .route("/detect", post(routes::text::detect::detect))
        .route("/assignment", post(routes::text::assignment::assignment))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            crate::middleware::rate_limit::rate_limit_layer,
        ))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Trial routes (session auth)
    let trial_routes = Router::new()
        .route("/start", post(routes::trial::start_trial))
        .route("/cancel", post(routes::trial::cancel_trial))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Usage route (session auth)
    let usage_routes = Router::new()
        .route("/usage", get(routes::usage::list_usage))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Admin routes (session auth + admin guard)
    let admin_routes = Router::new()
        .route("/users", get(routes::admin::list_users))
        .route("/users/:id", patch(routes::admin::update_user))
        .route("/users/:id", delete(routes::admin::delete_user))
        .route("/settings", get(routes::admin::list_settings))
        .route("/settings/:key", put(routes::admin::upsert_setting))
        .route("/settings/:key", delete(routes::admin::delete_setting))
        .route("/usage", get(routes::admin::usage_overview))
        .layer(axum::middleware::from_fn(admin_guard_layer))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            session_auth_layer,
        ));

    // Build complete v1 API
    let v1_routes = Router::new()
        .nest("/auth", auth_public.merge(auth_session))
        .nest("/text", text_routes)
        .nest("/trial", trial_routes)
        .merge(usage_routes)
        .nest("/admin", admin_routes);

    // Configure CORS based on environment
    let cors = if state.config.api.cors_origins.contains(&"*".to_string()) {
        // Development mode: permissive CORS
        CorsLayer::permissive()
    } else {
        let origins: Vec<HeaderValue> = state
            .config
            .api
            .cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::COOKIE])
            .allow_credentials(true)
            .max_age(std::time::Duration::from_secs(3600))
    };

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .layer(SecurityHeadersLayer::new(state.config.api.production))
        .with_state(state)
}

/// Session authentication middleware layer
///
/// Extracts the session cookie, resolves it against the Redis session
/// store, loads the user row, and injects [`AuthContext`] (and the raw
/// token, for logout) into request extensions.
pub async fn session_auth_layer(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token =
        session_token_from_headers(req.headers()).ok_or(AuthError::MissingCredentials)?;

    let user_id = state
        .sessions
        .get(&token)
        .await?
        .ok_or(AuthError::InvalidSession)?;

    let user = User::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AuthError::UserNotFound)?;

    let auth = AuthContext::from_user(&user, Utc::now());

    req.extensions_mut().insert(auth);
    req.extensions_mut().insert(SessionToken(token));

    Ok(next.run(req).await)
}

/// Admin guard middleware layer
///
/// Must run inside [`session_auth_layer`]; rejects non-admin sessions
/// with 403.
pub async fn admin_guard_layer(req: Request, next: Next) -> Result<Response, ApiError> {
    let auth = req
        .extensions()
        .get::<AuthContext>()
        .cloned()
        .ok_or_else(|| ApiError::Unauthorized("Missing session".to_string()))?;

    require_admin(&auth)?;

    Ok(next.run(req).await)
}

/// Extracts the session token from the Cookie header
///
/// Tolerates multiple cookies and surrounding whitespace; returns None when
/// the session cookie is absent.
pub fn session_token_from_headers(headers: &HeaderMap) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;

    cookie_header.split(';').find_map(|pair| {
        let (name, value) = pair.split_once('=')?;
        if name.trim() == SESSION_COOKIE {
            Some(value.trim().to_string())
        } else {
            None
        }
    })
}
