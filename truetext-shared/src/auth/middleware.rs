/// Authentication context for request handlers
///
/// The API server's session layer resolves the session cookie against the
/// Redis session store, loads the user row, and inserts an [`AuthContext`]
/// into request extensions. Handlers extract it with Axum's `Extension`
/// extractor; the admin guard checks [`AuthContext::is_admin`].
///
/// # Example
///
/// ```
/// use truetext_shared::auth::middleware::{require_admin, AuthContext};
/// use truetext_shared::models::user::{PlanTier, UserRole};
/// use uuid::Uuid;
///
/// let auth = AuthContext {
///     user_id: Uuid::new_v4(),
///     role: UserRole::User,
///     plan: PlanTier::Free,
/// };
///
/// assert!(require_admin(&auth).is_err());
/// ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::user::{PlanTier, User, UserRole};
use chrono::{DateTime, Utc};

/// Authentication context added to request extensions
///
/// Carries the identity facts handlers need without re-reading the user
/// row: the user id, role, and the plan whose limits apply to this
/// request (trial-adjusted at session-resolution time).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,

    /// User role
    pub role: UserRole,

    /// Effective plan for this request (pro while a trial is active)
    pub plan: PlanTier,
}

impl AuthContext {
    /// Builds an auth context from a freshly loaded user row
    pub fn from_user(user: &User, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user.id,
            role: user.get_role(),
            plan: user.effective_plan(now),
        }
    }

    /// Whether this context belongs to an administrator
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Error type for authentication middleware
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing session cookie
    #[error("Missing session cookie")]
    MissingCredentials,

    /// Malformed session token
    #[error("Invalid session token format")]
    InvalidFormat,

    /// Session not found or expired
    #[error("Session expired or invalid")]
    InvalidSession,

    /// Session points at a user that no longer exists
    #[error("User not found for session")]
    UserNotFound,

    /// Session store failure
    #[error("Session store error: {0}")]
    StoreError(String),
}

/// Checks that the context belongs to an administrator
///
/// # Errors
///
/// Returns [`ForbiddenError`] when the caller is not an admin; the API
/// layer maps this to a 403 response.
pub fn require_admin(auth: &AuthContext) -> Result<(), ForbiddenError> {
    if auth.is_admin() {
        Ok(())
    } else {
        Err(ForbiddenError)
    }
}

/// The caller lacks the admin role
#[derive(Debug, thiserror::Error)]
#[error("Admin role required")]
pub struct ForbiddenError;
