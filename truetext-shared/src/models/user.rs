/// User model and database operations
///
/// This module provides the User model and CRUD operations for managing user
/// accounts, including role, subscription plan, and trial state.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email CITEXT NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     role VARCHAR(20) NOT NULL DEFAULT 'user',
///     plan VARCHAR(20) NOT NULL DEFAULT 'free',
///     trial_started_at TIMESTAMPTZ,
///     trial_ends_at TIMESTAMPTZ,
///     trial_used BOOLEAN NOT NULL DEFAULT FALSE,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     last_login_at TIMESTAMPTZ,
///     CONSTRAINT users_role_check CHECK (role IN ('user', 'admin')),
///     CONSTRAINT users_plan_check CHECK (plan IN ('free', 'pro', 'enterprise'))
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use truetext_shared::models::user::{User, CreateUser};
/// use truetext_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let user = User::create(
///     &pool,
///     CreateUser {
///         email: "user@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_email(&pool, "user@example.com").await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Number of days a trial grants premium access
pub const TRIAL_DAYS: i64 = 7;

/// User role for authorization decisions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular user
    User,

    /// Administrator (full access to the admin surface)
    Admin,
}

impl UserRole {
    /// Converts role to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }

    /// Parses role from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "user" => Some(UserRole::User),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }
}

/// Subscription plan tiers
///
/// Plans determine daily quotas and rate limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// Free plan (default on signup, limited daily requests)
    Free,

    /// Professional plan (paid, higher limits)
    Pro,

    /// Enterprise plan (custom pricing, unlimited requests)
    Enterprise,
}

impl PlanTier {
    /// Converts plan to string for database storage
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
            PlanTier::Enterprise => "enterprise",
        }
    }

    /// Parses plan from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "free" => Some(PlanTier::Free),
            "pro" => Some(PlanTier::Pro),
            "enterprise" => Some(PlanTier::Enterprise),
            _ => None,
        }
    }
}

/// Why a user is not eligible to start a trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialEligibility {
    /// The user may start a trial
    Eligible,

    /// The user has already consumed their one trial
    AlreadyUsed,

    /// A trial is currently running
    TrialActive,

    /// The user is already on a paid plan
    PaidPlan,
}

/// User model representing an account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address (case-insensitive via CITEXT)
    pub email: String,

    /// Argon2id password hash
    pub password_hash: String,

    /// Role ("user" or "admin")
    pub role: String,

    /// Subscription plan ("free", "pro", or "enterprise")
    pub plan: String,

    /// When the trial started (None if never started)
    pub trial_started_at: Option<DateTime<Utc>>,

    /// When the trial ends or ended
    pub trial_ends_at: Option<DateTime<Utc>>,

    /// Whether the one-time trial has been consumed
    pub trial_used: bool,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,

    /// When the user last logged in (None if never logged in)
    pub last_login_at: Option<DateTime<Utc>>,
}

/// Input for creating a new user
///
/// New users always start on the free plan with the regular role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Email address (stored lowercase via CITEXT)
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

/// Input for updating an existing user
///
/// All fields are optional. Only non-None fields will be updated.
/// Role and plan changes are admin operations.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    /// New role
    pub role: Option<UserRole>,

    /// New plan
    pub plan: Option<PlanTier>,

    /// New password hash
    pub password_hash: Option<String>,
}

impl User {
    /// Gets the parsed role enum
    ///
    /// Falls back to [`UserRole::User`] when the stored value is unknown.
    pub fn get_role(&self) -> UserRole {
        UserRole::from_str(&self.role).unwrap_or(UserRole::User)
    }

    /// Gets the parsed plan enum
    ///
    /// Falls back to [`PlanTier::Free`] when the stored value is unknown.
    pub fn get_plan(&self) -> PlanTier {
        PlanTier::from_str(&self.plan).unwrap_or(PlanTier::Free)
    }

    /// Whether a trial is currently active at `now`
    pub fn trial_active(&self, now: DateTime<Utc>) -> bool {
        match (self.trial_started_at, self.trial_ends_at) {
            (Some(start), Some(end)) => start <= now && now < end,
            _ => false,
        }
    }

    /// The plan whose limits apply at `now`
    ///
    /// A free-plan user with an active trial gets pro limits for the
    /// duration of the trial. Paid plans are unaffected by trial state.
    pub fn effective_plan(&self, now: DateTime<Utc>) -> PlanTier {
        match self.get_plan() {
            PlanTier::Free if self.trial_active(now) => PlanTier::Pro,
            other => other,
        }
    }

    /// Evaluates trial eligibility at `now`
    ///
    /// Pure function over the user row; the trial-start handler maps
    /// anything other than [`TrialEligibility::Eligible`] to a 400.
    pub fn trial_eligibility(&self, now: DateTime<Utc>) -> TrialEligibility {
        if self.get_plan() != PlanTier::Free {
            return TrialEligibility::PaidPlan;
        }
        if self.trial_active(now) {
            return TrialEligibility::TrialActive;
        }
        if self.trial_used {
            return TrialEligibility::AlreadyUsed;
        }
        TrialEligibility::Eligible
    }

    /// Creates a new user in the database
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Email already exists (unique constraint violation)
    /// - Database connection fails
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash)
            VALUES ($1, $2)
            RETURNING id, email, password_hash, role, plan,
                      trial_started_at, trial_ends_at, trial_used,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, plan,
                   trial_started_at, trial_ends_at, trial_used,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address
    ///
    /// Email lookup is case-insensitive (via CITEXT column type).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, plan,
                   trial_started_at, trial_ends_at, trial_used,
                   created_at, updated_at, last_login_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` will be updated. The `updated_at`
    /// timestamp is automatically set to the current time.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if user doesn't exist
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        // Build dynamic update query based on which fields are present
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.role.is_some() {
            bind_count += 1;
            query.push_str(&format!(", role = ${}", bind_count));
        }
        if data.plan.is_some() {
            bind_count += 1;
            query.push_str(&format!(", plan = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, password_hash, role, plan, \
             trial_started_at, trial_ends_at, trial_used, created_at, updated_at, last_login_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(role) = data.role {
            q = q.bind(role.as_str());
        }
        if let Some(plan) = data.plan {
            q = q.bind(plan.as_str());
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Starts the one-time trial for a user
    ///
    /// Stamps the trial window ([`TRIAL_DAYS`] from `now`) and marks the
    /// trial as consumed. The caller is responsible for checking
    /// [`User::trial_eligibility`] first.
    ///
    /// # Returns
    ///
    /// The updated user if found, None if user doesn't exist
    pub async fn start_trial(
        pool: &PgPool,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let ends_at = now + Duration::days(TRIAL_DAYS);

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET trial_started_at = $2,
                trial_ends_at = $3,
                trial_used = TRUE,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, role, plan,
                      trial_started_at, trial_ends_at, trial_used,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(now)
        .bind(ends_at)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Cancels an active trial by ending it at `now`
    ///
    /// The trial remains consumed; cancellation does not restore
    /// eligibility.
    pub async fn cancel_trial(
        pool: &PgPool,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET trial_ends_at = $2,
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, email, password_hash, role, plan,
                      trial_started_at, trial_ends_at, trial_used,
                      created_at, updated_at, last_login_at
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Updates the last login timestamp for a user
    ///
    /// Called after successful authentication.
    pub async fn update_last_login(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET last_login_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes a user by ID
    ///
    /// Permanently deletes the account; usage logs are removed via
    /// `ON DELETE CASCADE`.
    ///
    /// # Returns
    ///
    /// True if user was deleted, false if user didn't exist
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Lists all users with pagination
    ///
    /// # Returns
    ///
    /// Vector of users, ordered by creation date (newest first)
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<Self>, sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, role, plan,
                   trial_started_at, trial_ends_at, trial_used,
                   created_at, updated_at, last_login_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Counts total number of users
    pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(plan: PlanTier) -> User {
        User {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
            plan: plan.as_str().to_string(),
            trial_started_at: None,
            trial_ends_at: None,
            trial_used: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(UserRole::from_str("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_str("user"), Some(UserRole::User));
        assert_eq!(UserRole::from_str("root"), None);
        assert_eq!(UserRole::Admin.as_str(), "admin");
    }

    #[test]
    fn test_plan_round_trip() {
        assert_eq!(PlanTier::from_str("free"), Some(PlanTier::Free));
        assert_eq!(PlanTier::from_str("pro"), Some(PlanTier::Pro));
        assert_eq!(PlanTier::from_str("enterprise"), Some(PlanTier::Enterprise));
        assert_eq!(PlanTier::from_str("gold"), None);
    }

    #[test]
    fn test_unknown_role_falls_back_to_user() {
        let mut user = test_user(PlanTier::Free);
        user.role = "superuser".to_string();
        assert_eq!(user.get_role(), UserRole::User);
    }

    #[test]
    fn test_fresh_free_user_is_eligible() {
        let user = test_user(PlanTier::Free);
        assert_eq!(user.trial_eligibility(Utc::now()), TrialEligibility::Eligible);
    }

    #[test]
    fn test_used_trial_is_ineligible() {
        let mut user = test_user(PlanTier::Free);
        user.trial_used = true;
        assert_eq!(
            user.trial_eligibility(Utc::now()),
            TrialEligibility::AlreadyUsed
        );
    }

    #[test]
    fn test_active_trial_is_ineligible() {
        let now = Utc::now();
        let mut user = test_user(PlanTier::Free);
        user.trial_used = true;
        user.trial_started_at = Some(now - Duration::days(1));
        user.trial_ends_at = Some(now + Duration::days(6));
        assert_eq!(user.trial_eligibility(now), TrialEligibility::TrialActive);
    }

    #[test]
    fn test_paid_plan_is_ineligible() {
        let user = test_user(PlanTier::Pro);
        assert_eq!(user.trial_eligibility(Utc::now()), TrialEligibility::PaidPlan);
    }

    #[test]
    fn test_effective_plan_during_trial() {
        let now = Utc::now();
        let mut user = test_user(PlanTier::Free);
        user.trial_started_at = Some(now - Duration::days(1));
        user.trial_ends_at = Some(now + Duration::days(6));
        assert_eq!(user.effective_plan(now), PlanTier::Pro);

        // Expired trial drops back to free
        let later = now + Duration::days(30);
        assert_eq!(user.effective_plan(later), PlanTier::Free);
    }

    // Integration tests for database operations are in the truetext-api
    // tests/ directory.
}
