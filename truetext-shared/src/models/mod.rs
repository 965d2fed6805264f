/// Database models for TrueText
///
/// This module contains all database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles, plans, and trial state
/// - `usage`: Append-only usage log for billable feature invocations
/// - `setting`: Admin-configurable key/value parameters
///
/// # Example
///
/// ```no_run
/// use truetext_shared::models::user::{User, CreateUser, UserRole, PlanTier};
/// use truetext_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let new_user = CreateUser {
///     email: "user@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// };
///
/// let user = User::create(&pool, new_user).await?;
/// # Ok(())
/// # }
/// ```

pub mod setting;
pub mod usage;
pub mod user;
