/// Common test utilities for integration tests
///
/// Shared infrastructure for the end-to-end tests:
/// - Test database and Redis connections (from the usual env vars)
/// - Test user creation with role/plan control
/// - Session issuance and cookie helpers
/// - Request/response helpers
///
/// The tests assume the schema documented on the models (users,
/// usage_logs, settings tables) exists in the target database.

use axum::body::Body;
use axum::http::{header, Request, Response};
use serde_json::Value;
use uuid::Uuid;

use truetext_api::app::{build_router, AppState, SESSION_COOKIE};
use truetext_api::config::Config;
use truetext_providers::ProviderRouter;
use truetext_shared::models::user::{CreateUser, PlanTier, UpdateUser, User, UserRole};
use truetext_shared::redis::RedisClient;
use sqlx::PgPool;

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: PgPool,
    pub redis: RedisClient,
    pub app: axum::Router,
    pub state: AppState,
}

impl TestContext {
    /// Creates a new test context against the configured database and Redis
    ///
    /// Provider keys are deliberately cleared so every feature exercises
    /// its full fallback chain deterministically, with no network calls.
    pub async fn new() -> anyhow::Result<Self> {
        let mut config = Config::from_env()?;
        config.providers = truetext_providers::ProviderSettings::unconfigured();

        let db = PgPool::connect(&config.database.url).await?;
        let redis = RedisClient::new(config.redis.clone()).await?;
        let providers = ProviderRouter::new(config.providers.clone())?;

        let state = AppState::new(db.clone(), redis.clone(), providers, config);
        let app = build_router(state.clone());

        Ok(TestContext {
            db,
            redis,
            app,
            state,
        })
    }

    /// Creates a test user with the given role and plan, returning the user
    /// and a valid session cookie
    pub async fn create_user(
        &self,
        role: UserRole,
        plan: PlanTier,
    ) -> anyhow::Result<(User, String)> {
        let user = User::create(
            &self.db,
            CreateUser {
                email: format!("test-{}@example.com", Uuid::new_v4()),
                password_hash: truetext_shared::auth::password::hash_password("Test!Pass123")?,
            },
        )
        .await?;

        // Signup defaults are user/free; raise as requested
        let user = if role != UserRole::User || plan != PlanTier::Free {
            User::update(
                &self.db,
                user.id,
                UpdateUser {
                    role: Some(role),
                    plan: Some(plan),
                    password_hash: None,
                },
            )
            .await?
            .expect("freshly created user exists")
        } else {
            user
        };

        let token = self.state.sessions.create(user.id).await?;
        let cookie = format!("{}={}", SESSION_COOKIE, token);

        Ok((user, cookie))
    }

    /// Sends a JSON request through the router
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        cookie: Option<&str>,
        body: Option<Value>,
    ) -> Response<Body> {
        use tower::ServiceExt as _;

        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.app
            .clone()
            .oneshot(request)
            .await
            .expect("router call is infallible")
    }

    /// Deletes a test user and its cascading rows
    pub async fn cleanup_user(&self, user_id: Uuid) -> anyhow::Result<()> {
        User::delete(&self.db, user_id).await?;
        Ok(())
    }
}

/// Reads a response body as JSON
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body is readable");
    serde_json::from_slice(&bytes).expect("body is JSON")
}
