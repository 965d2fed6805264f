/// Database layer for TrueText
///
/// This module provides PostgreSQL connection pooling via sqlx.
///
/// # Modules
///
/// - [`pool`]: Connection pool creation and configuration

pub mod pool;

pub use pool::{create_pool, DatabaseConfig};
