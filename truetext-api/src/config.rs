/// Configuration management for the API server
///
/// All configuration is read from environment variables exactly once at
/// process start and carried in a [`Config`] passed by reference to the
/// application; nothing reads the environment at request time.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `API_CORS_ORIGINS`: Comma-separated allowed origins (default: "*")
/// - `API_PRODUCTION`: Enable production hardening (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `REDIS_URL`: Redis connection string (required)
/// - `SESSION_TTL_SECS`: Session lifetime (default: 604800, 7 days)
/// - Provider keys: see `truetext_providers::config`
///
/// # Example
///
/// ```no_run
/// use truetext_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};
use std::env;

use truetext_providers::ProviderSettings;
use truetext_shared::db::pool::DatabaseConfig;
use truetext_shared::redis::RedisConfig;

/// Default session lifetime: 7 days
const DEFAULT_SESSION_TTL_SECS: u64 = 604_800;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis configuration
    pub redis: RedisConfig,

    /// Session configuration
    pub session: SessionConfig,

    /// Provider credentials and HTTP settings
    pub providers: ProviderSettings,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins ("*" = permissive, development only)
    pub cors_origins: Vec<String>,

    /// Whether production hardening (HSTS, secure cookies) is enabled
    pub production: bool,
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Session lifetime in seconds
    pub ttl_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or
    /// have invalid values.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let cors_origins = env::var("API_CORS_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let production = env::var("API_PRODUCTION")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let ttl_secs = env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
                production,
            },
            database: DatabaseConfig::from_env()?,
            redis: RedisConfig::from_env()?,
            session: SessionConfig { ttl_secs },
            providers: ProviderSettings::from_env(),
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: DatabaseConfig {
                url: "postgresql://localhost/test".to_string(),
                ..Default::default()
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                connection_timeout_secs: 5,
                command_timeout_secs: 10,
            },
            session: SessionConfig {
                ttl_secs: DEFAULT_SESSION_TTL_SECS,
            },
            providers: ProviderSettings::unconfigured(),
        }
    }

    #[test]
    fn test_bind_address() {
        let config = test_config();
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_default_session_ttl_is_seven_days() {
        let config = test_config();
        assert_eq!(config.session.ttl_secs, 7 * 24 * 60 * 60);
    }
}
