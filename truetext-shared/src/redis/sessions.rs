/// Redis-backed session store
///
/// Sessions are the only authentication credential: an opaque token issued
/// at login, carried in a cookie, and mapped to a user id here. Keys are
/// `session:{sha256(token)}` with a TTL, so expiry needs no sweeper and a
/// Redis dump never contains usable tokens.
///
/// # Example
///
/// ```no_run
/// use truetext_shared::redis::{RedisClient, RedisConfig, SessionStore};
/// use uuid::Uuid;
///
/// # async fn example() -> anyhow::Result<()> {
/// let client = RedisClient::new(RedisConfig::from_env()?).await?;
/// let store = SessionStore::new(client, 604_800); // 7 days
///
/// let token = store.create(Uuid::new_v4()).await?;
/// let user_id = store.get(&token).await?;
/// assert!(user_id.is_some());
///
/// store.destroy(&token).await?;
/// assert!(store.get(&token).await?.is_none());
/// # Ok(())
/// # }
/// ```

use redis::AsyncCommands;
use thiserror::Error;
use uuid::Uuid;

use super::client::RedisClient;
use crate::auth::session::{
    generate_session_token, hash_session_token, validate_session_token_format,
};

/// Session store errors
#[derive(Error, Debug)]
pub enum SessionError {
    /// Redis command failed
    #[error("Session store unavailable: {0}")]
    Store(#[from] redis::RedisError),

    /// Stored value was not a valid user id
    #[error("Corrupt session entry: {0}")]
    Corrupt(String),
}

/// Redis-backed session store with TTL expiry
#[derive(Clone)]
pub struct SessionStore {
    client: RedisClient,
    ttl_secs: u64,
}

impl SessionStore {
    /// Creates a new session store
    ///
    /// # Arguments
    ///
    /// * `client` - Shared Redis client
    /// * `ttl_secs` - Session lifetime in seconds
    pub fn new(client: RedisClient, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    /// Redis key for a token hash
    fn key(token_hash: &str) -> String {
        format!("session:{}", token_hash)
    }

    /// Creates a session for a user
    ///
    /// # Returns
    ///
    /// The plaintext session token to set as the cookie value. Only its
    /// hash is stored.
    pub async fn create(&self, user_id: Uuid) -> Result<String, SessionError> {
        let (token, token_hash) = generate_session_token();
        let mut conn = self.client.get_connection();

        let _: () = conn
            .set_ex(
                Self::key(&token_hash),
                user_id.to_string(),
                self.ttl_secs as u64,
            )
            .await?;

        tracing::debug!(user_id = %user_id, "Session created");
        Ok(token)
    }

    /// Resolves a session token to a user id
    ///
    /// Malformed tokens short-circuit without touching Redis. Expired
    /// sessions are absent (TTL) and resolve to `None`.
    pub async fn get(&self, token: &str) -> Result<Option<Uuid>, SessionError> {
        if !validate_session_token_format(token) {
            return Ok(None);
        }

        let token_hash = hash_session_token(token);
        let mut conn = self.client.get_connection();

        let value: Option<String> = conn.get(Self::key(&token_hash)).await?;

        match value {
            Some(raw) => {
                let user_id = Uuid::parse_str(&raw)
                    .map_err(|_| SessionError::Corrupt(format!("not a UUID: {}", raw)))?;
                Ok(Some(user_id))
            }
            None => Ok(None),
        }
    }

    /// Destroys a session (logout)
    ///
    /// # Returns
    ///
    /// True if a session was deleted, false if it was already gone.
    pub async fn destroy(&self, token: &str) -> Result<bool, SessionError> {
        if !validate_session_token_format(token) {
            return Ok(false);
        }

        let token_hash = hash_session_token(token);
        let mut conn = self.client.get_connection();

        let deleted: i64 = conn.del(Self::key(&token_hash)).await?;
        Ok(deleted > 0)
    }

    /// Session lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redis::client::RedisConfig;

    #[test]
    fn test_key_format() {
        let key = SessionStore::key("abc123");
        assert_eq!(key, "session:abc123");
    }

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    async fn test_session_lifecycle() {
        let client = RedisClient::new(RedisConfig::default_for_test())
            .await
            .unwrap();
        let store = SessionStore::new(client, 60);
        let user_id = Uuid::new_v4();

        let token = store.create(user_id).await.unwrap();
        assert_eq!(store.get(&token).await.unwrap(), Some(user_id));

        assert!(store.destroy(&token).await.unwrap());
        assert_eq!(store.get(&token).await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore] // Requires running Redis instance
    async fn test_garbage_token_resolves_to_none() {
        let client = RedisClient::new(RedisConfig::default_for_test())
            .await
            .unwrap();
        let store = SessionStore::new(client, 60);

        assert_eq!(store.get("not-a-token").await.unwrap(), None);
        assert!(!store.destroy("not-a-token").await.unwrap());
    }
}
