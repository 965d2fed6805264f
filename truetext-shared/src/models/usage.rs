/// Usage log model and database operations
///
/// This module provides the UsageLog model: an append-only record of every
/// billable feature invocation. Rows are used for the per-plan daily quota,
/// the user dashboard, and the admin usage overview.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE usage_logs (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     feature VARCHAR(32) NOT NULL,
///     tokens INTEGER NOT NULL DEFAULT 0,
///     engine VARCHAR(64) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// CREATE INDEX usage_logs_user_day_idx ON usage_logs (user_id, created_at);
/// ```
///
/// # Example
///
/// ```no_run
/// use truetext_shared::models::usage::{UsageLog, RecordUsage};
/// use truetext_shared::db::pool::{create_pool, DatabaseConfig};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// UsageLog::record(
///     &pool,
///     RecordUsage {
///         user_id: Uuid::new_v4(),
///         feature: "paraphrase".to_string(),
///         tokens: 512,
///         engine: "groq:llama-3.3-70b-versatile".to_string(),
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// One billable feature invocation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct UsageLog {
    /// Unique log entry ID
    pub id: Uuid,

    /// User who invoked the feature
    pub user_id: Uuid,

    /// Feature name ("humanize", "paraphrase", "detect", "assignment")
    pub feature: String,

    /// Token count attributed to the request (provider-reported or estimated)
    pub tokens: i32,

    /// Engine that actually served the request (provider id or "heuristic")
    pub engine: String,

    /// When the invocation happened
    pub created_at: DateTime<Utc>,
}

/// Input for recording a feature invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordUsage {
    /// User who invoked the feature
    pub user_id: Uuid,

    /// Feature name
    pub feature: String,

    /// Token count
    pub tokens: i32,

    /// Engine that served the request
    pub engine: String,
}

/// Per-feature totals for the admin overview
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct FeatureTotals {
    /// Feature name
    pub feature: String,

    /// Total invocations
    pub requests: i64,

    /// Total tokens across invocations
    pub tokens: i64,
}

impl UsageLog {
    /// Appends a usage record
    ///
    /// The log is append-only; there is no update operation.
    ///
    /// # Errors
    ///
    /// Returns an error if the database write fails or the user does not
    /// exist (foreign key violation).
    pub async fn record(pool: &PgPool, data: RecordUsage) -> Result<Self, sqlx::Error> {
        let log = sqlx::query_as::<_, UsageLog>(
            r#"
            INSERT INTO usage_logs (user_id, feature, tokens, engine)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, feature, tokens, engine, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.feature)
        .bind(data.tokens)
        .bind(data.engine)
        .fetch_one(pool)
        .await?;

        Ok(log)
    }

    /// Lists a user's usage records with pagination
    ///
    /// # Returns
    ///
    /// Vector of records ordered by time (newest first)
    pub async fn list_by_user(
        pool: &PgPool,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let logs = sqlx::query_as::<_, UsageLog>(
            r#"
            SELECT id, user_id, feature, tokens, engine, created_at
            FROM usage_logs
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(logs)
    }

    /// Counts a user's invocations since midnight UTC
    ///
    /// Used by the quota enforcer; the daily window matches the billing day.
    pub async fn count_today(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM usage_logs
            WHERE user_id = $1
              AND created_at >= date_trunc('day', NOW())
            "#,
        )
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(count)
    }

    /// Counts a user's total invocations
    pub async fn count_by_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM usage_logs WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }

    /// Aggregates totals per feature across all users
    ///
    /// Powers the admin usage overview.
    ///
    /// # Returns
    ///
    /// One row per feature, ordered by request count descending
    pub async fn totals_by_feature(pool: &PgPool) -> Result<Vec<FeatureTotals>, sqlx::Error> {
        let totals = sqlx::query_as::<_, FeatureTotals>(
            r#"
            SELECT feature,
                   COUNT(*) AS requests,
                   COALESCE(SUM(tokens), 0)::BIGINT AS tokens
            FROM usage_logs
            GROUP BY feature
            ORDER BY requests DESC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(totals)
    }

    /// Deletes usage records older than `before`
    ///
    /// For data retention policies.
    ///
    /// # Returns
    ///
    /// Number of records deleted
    pub async fn delete_before(
        pool: &PgPool,
        before: DateTime<Utc>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM usage_logs WHERE created_at < $1")
            .bind(before)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_usage_struct() {
        let record = RecordUsage {
            user_id: Uuid::new_v4(),
            feature: "detect".to_string(),
            tokens: 128,
            engine: "sapling".to_string(),
        };

        assert_eq!(record.feature, "detect");
        assert_eq!(record.tokens, 128);
    }

    // Integration tests for database operations are in the truetext-api
    // tests/ directory.
}
