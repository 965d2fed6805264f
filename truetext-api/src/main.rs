//! # TrueText API Server
//!
//! This is the main API server for TrueText, providing the JSON endpoints
//! behind the text-processing SaaS: humanize, paraphrase, AI detection,
//! assignment generation, accounts, trials, usage, and the admin surface.
//!
//! ## Architecture
//!
//! The API server is built with Axum and provides:
//! - Session-cookie authentication backed by Redis
//! - Per-plan rate limiting and daily quotas
//! - Provider routing with per-feature fallback chains
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p truetext-api
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use truetext_api::app::{build_router, AppState};
use truetext_api::config::Config;
use truetext_providers::ProviderRouter;
use truetext_shared::db::pool::create_pool;
use truetext_shared::redis::RedisClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "truetext_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TrueText API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    // Load configuration once; handlers only ever see this struct
    let config = Config::from_env()?;

    // Initialize datastores
    let db = create_pool(config.database.clone()).await?;
    let redis = RedisClient::new(config.redis.clone()).await?;

    // Build the provider router
    let providers = ProviderRouter::new(config.providers.clone())?;

    // Build Axum application
    let bind_address = config.bind_address();
    let state = AppState::new(db, redis, providers, config);
    let app = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Resolves when Ctrl-C is received
async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    tracing::info!("Shutdown signal received, draining connections...");
}
