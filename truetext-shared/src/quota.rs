/// Quota enforcement for per-plan daily limits
///
/// This module enforces the daily feature-request allowance attached to
/// each subscription plan. The count comes from the append-only usage log,
/// so the quota window is the same UTC day the dashboard and billing use.
///
/// # Quota Limits by Plan
///
/// - **Free**: 20 requests/day
/// - **Pro**: 500 requests/day (also applies while a trial is active)
/// - **Enterprise**: unlimited
///
/// # Example
///
/// ```no_run
/// use truetext_shared::quota::QuotaEnforcer;
/// use truetext_shared::models::user::PlanTier;
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, user_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let enforcer = QuotaEnforcer::new(pool);
/// enforcer.check(user_id, PlanTier::Free).await?;
/// // Serve the request, then record it in the usage log
/// # Ok(())
/// # }
/// ```

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::usage::UsageLog;
use crate::models::user::PlanTier;

/// Quota enforcement error
#[derive(Debug, thiserror::Error)]
pub enum QuotaError {
    /// Daily request limit exceeded
    #[error("Daily request limit exceeded ({current}/{limit})")]
    LimitExceeded {
        /// Allowed requests per day
        limit: u32,
        /// Requests already made today
        current: u32,
    },

    /// Database error
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

/// Daily request allowance for a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyQuota {
    /// Maximum requests per UTC day (None = unlimited)
    pub requests_per_day: Option<u32>,
}

impl DailyQuota {
    /// Gets the quota configuration for a plan
    pub fn for_plan(plan: PlanTier) -> Self {
        match plan {
            PlanTier::Free => DailyQuota {
                requests_per_day: Some(20),
            },
            PlanTier::Pro => DailyQuota {
                requests_per_day: Some(500),
            },
            PlanTier::Enterprise => DailyQuota {
                requests_per_day: None,
            },
        }
    }

    /// Whether `current` consumed requests still leave room for one more
    pub fn allows(&self, current: u32) -> bool {
        match self.requests_per_day {
            Some(limit) => current < limit,
            None => true,
        }
    }
}

/// Enforces per-plan daily quotas against the usage log
#[derive(Clone)]
pub struct QuotaEnforcer {
    pool: PgPool,
}

impl QuotaEnforcer {
    /// Creates a new quota enforcer
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Checks whether the user may make one more feature request today
    ///
    /// The caller passes the user's *effective* plan so active trials get
    /// pro limits.
    ///
    /// # Errors
    ///
    /// - [`QuotaError::LimitExceeded`] when the day's allowance is spent
    /// - [`QuotaError::DatabaseError`] when the usage count query fails
    pub async fn check(&self, user_id: Uuid, plan: PlanTier) -> Result<(), QuotaError> {
        let quota = DailyQuota::for_plan(plan);

        // Unlimited plans skip the count query entirely
        let Some(limit) = quota.requests_per_day else {
            return Ok(());
        };

        let current = UsageLog::count_today(&self.pool, user_id).await? as u32;

        if current >= limit {
            tracing::info!(
                user_id = %user_id,
                plan = plan.as_str(),
                current,
                limit,
                "Daily quota exhausted"
            );
            return Err(QuotaError::LimitExceeded { limit, current });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_for_free() {
        let quota = DailyQuota::for_plan(PlanTier::Free);
        assert_eq!(quota.requests_per_day, Some(20));
    }

    #[test]
    fn test_quota_for_pro() {
        let quota = DailyQuota::for_plan(PlanTier::Pro);
        assert_eq!(quota.requests_per_day, Some(500));
    }

    #[test]
    fn test_quota_for_enterprise_is_unlimited() {
        let quota = DailyQuota::for_plan(PlanTier::Enterprise);
        assert_eq!(quota.requests_per_day, None);
        assert!(quota.allows(u32::MAX));
    }

    #[test]
    fn test_allows_under_limit() {
        let quota = DailyQuota::for_plan(PlanTier::Free);
        assert!(quota.allows(0));
        assert!(quota.allows(19));
        assert!(!quota.allows(20));
        assert!(!quota.allows(21));
    }

    #[test]
    fn test_limit_exceeded_display() {
        let err = QuotaError::LimitExceeded {
            limit: 20,
            current: 20,
        };
        assert_eq!(err.to_string(), "Daily request limit exceeded (20/20)");
    }

    // Integration tests for the live count are in the truetext-api tests/
    // directory.
}
