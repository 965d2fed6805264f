/// Redis integration for sessions and rate limiting
///
/// This module provides:
/// - Connection pooling with automatic reconnection
/// - The session store (opaque token hash → user id, with TTL)
///
/// # Architecture
///
/// ```text
/// ┌─────────────┐  SETEX session:{sha256}   ┌─────────┐
/// │  API login  │ ─────────────────────────>│  Redis  │
/// └─────────────┘                           └─────────┘
///        ▲                                       │
///        │ GET session:{sha256}                  │ TTL expiry
///        └───────────────────────────────────────┘
/// ```
///
/// Rate-limit buckets (`ratelimit:user:{id}`) are written by the API
/// middleware through the same client.
///
/// # Example
///
/// ```no_run
/// use truetext_shared::redis::{RedisClient, RedisConfig};
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = RedisConfig::from_env()?;
/// let client = RedisClient::new(config).await?;
///
/// let healthy = client.ping().await?;
/// println!("Redis healthy: {}", healthy);
/// # Ok(())
/// # }
/// ```

pub mod client;
pub mod sessions;

// Re-export common types for convenience
pub use client::{RedisClient, RedisClientError, RedisConfig, RedisStats};
pub use sessions::{SessionError, SessionStore};
