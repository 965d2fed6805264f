/// Authentication utilities for TrueText
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and validation
/// - [`session`]: Opaque session-token generation and hashing
/// - [`middleware`]: Request auth context and role guard
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 64 MB memory, 3 iterations,
///   verified in constant time
/// - **Session Tokens**: Secure random generation with SHA-256 hashing
///   before storage; the plaintext token lives only in the client cookie
///
/// # Example
///
/// ```
/// use truetext_shared::auth::password::{hash_password, verify_password};
/// use truetext_shared::auth::session::generate_session_token;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let (token, token_hash) = generate_session_token();
/// assert!(token.starts_with("ttxs_"));
/// assert_eq!(token_hash.len(), 64);
/// # Ok(())
/// # }
/// ```

pub mod middleware;
pub mod password;
pub mod session;
