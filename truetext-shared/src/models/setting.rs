/// Setting model and database operations
///
/// Admin-configurable key/value parameters (feature toggles, default model
/// aliases, support contact, and similar). Settings are read by the admin
/// surface; they do not participate in request routing at call time.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE settings (
///     key VARCHAR(64) PRIMARY KEY,
///     value TEXT NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One admin-configurable parameter
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    /// Setting key (unique)
    pub key: String,

    /// Setting value (free-form text)
    pub value: String,

    /// Human-readable description shown in the admin dashboard
    pub description: String,

    /// When the setting was last written
    pub updated_at: DateTime<Utc>,
}

/// Input for writing a setting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertSetting {
    /// Setting value
    pub value: String,

    /// Human-readable description
    pub description: String,
}

impl Setting {
    /// Creates or replaces a setting
    pub async fn upsert(
        pool: &PgPool,
        key: &str,
        data: UpsertSetting,
    ) -> Result<Self, sqlx::Error> {
        let setting = sqlx::query_as::<_, Setting>(
            r#"
            INSERT INTO settings (key, value, description)
            VALUES ($1, $2, $3)
            ON CONFLICT (key)
            DO UPDATE SET value = EXCLUDED.value,
                          description = EXCLUDED.description,
                          updated_at = NOW()
            RETURNING key, value, description, updated_at
            "#,
        )
        .bind(key)
        .bind(data.value)
        .bind(data.description)
        .fetch_one(pool)
        .await?;

        Ok(setting)
    }

    /// Finds a setting by key
    pub async fn find(pool: &PgPool, key: &str) -> Result<Option<Self>, sqlx::Error> {
        let setting = sqlx::query_as::<_, Setting>(
            "SELECT key, value, description, updated_at FROM settings WHERE key = $1",
        )
        .bind(key)
        .fetch_optional(pool)
        .await?;

        Ok(setting)
    }

    /// Lists all settings ordered by key
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let settings = sqlx::query_as::<_, Setting>(
            "SELECT key, value, description, updated_at FROM settings ORDER BY key",
        )
        .fetch_all(pool)
        .await?;

        Ok(settings)
    }

    /// Deletes a setting by key
    ///
    /// # Returns
    ///
    /// True if a setting was deleted, false if the key didn't exist
    pub async fn delete(pool: &PgPool, key: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM settings WHERE key = $1")
            .bind(key)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
