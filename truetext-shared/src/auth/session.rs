/// Session token utilities
///
/// Sessions are authenticated with an opaque bearer token carried in a
/// cookie. The token is generated here; only its SHA-256 hash is ever
/// written to the session store, so a leaked Redis dump does not yield
/// usable credentials.
///
/// # Token Format
///
/// Session tokens follow the pattern `ttxs_{40_chars}` (45 chars total):
/// - Prefix: "ttxs_" (5 chars)
/// - Random part: 40 alphanumeric chars (base62: [A-Za-z0-9])
///
/// # Example
///
/// ```
/// use truetext_shared::auth::session::{
///     generate_session_token, hash_session_token, validate_session_token_format,
/// };
///
/// let (token, hash) = generate_session_token();
/// assert!(token.starts_with("ttxs_"));
/// assert_eq!(token.len(), 45);
/// assert!(validate_session_token_format(&token));
/// assert_eq!(hash, hash_session_token(&token));
/// ```

use rand::Rng;
use sha2::{Digest, Sha256};

/// Length of the random part of the session token (characters)
const TOKEN_RANDOM_LENGTH: usize = 40;

/// Session token prefix
const TOKEN_PREFIX: &str = "ttxs_";

/// Total length of a session token (prefix + random)
pub const SESSION_TOKEN_LENGTH: usize = TOKEN_PREFIX.len() + TOKEN_RANDOM_LENGTH;

/// Generates a new session token
///
/// Creates a cryptographically random token and its SHA-256 hash. The
/// plaintext token goes into the client cookie; the hash keys the Redis
/// session entry.
///
/// # Returns
///
/// Tuple of (plaintext_token, sha256_hash)
///
/// # Security
///
/// - Uses `rand::thread_rng()` for cryptographic randomness
/// - Key space: 62^40 ≈ 2^238 combinations
pub fn generate_session_token() -> (String, String) {
    let random_part = generate_random_string(TOKEN_RANDOM_LENGTH);
    let token = format!("{}{}", TOKEN_PREFIX, random_part);
    let hash = hash_session_token(&token);

    (token, hash)
}

/// Generates a random alphanumeric string
///
/// Uses base62 encoding (A-Z, a-z, 0-9) for cookie-safe tokens.
fn generate_random_string(length: usize) -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    let mut rng = rand::thread_rng();

    (0..length)
        .map(|_| {
            let idx = rng.gen_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Hashes a session token using SHA-256
///
/// # Returns
///
/// Hex-encoded SHA-256 hash (64 characters)
pub fn hash_session_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Validates session token format
///
/// Checks that the token:
/// - Starts with "ttxs_"
/// - Has correct length (45 chars)
/// - Contains only alphanumeric characters after the prefix
///
/// A failed format check short-circuits the Redis lookup for garbage
/// cookies.
pub fn validate_session_token_format(token: &str) -> bool {
    if token.len() != SESSION_TOKEN_LENGTH {
        return false;
    }

    if !token.starts_with(TOKEN_PREFIX) {
        return false;
    }

    let random_part = &token[TOKEN_PREFIX.len()..];
    random_part.chars().all(|c| c.is_ascii_alphanumeric())
}
