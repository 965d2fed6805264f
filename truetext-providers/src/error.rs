/// Provider error types
///
/// Every failure mode of an outbound provider call collapses into
/// [`ProviderError`]. The router treats any variant as "this tier failed,
/// try the next"; the API layer maps whatever survives the full chain to
/// a 502/503 response.

use thiserror::Error;

/// Provider call errors
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Network-level failure (DNS, connect, timeout, body read)
    #[error("Provider request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider answered with a non-2xx status
    #[error("Provider returned {status}: {message}")]
    Status {
        /// HTTP status code from the provider
        status: u16,
        /// Response body (truncated) for diagnostics
        message: String,
    },

    /// Provider answered 2xx but the payload is missing a required field
    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    /// Async task submission succeeded but polling never reached a result
    #[error("Provider task polling exhausted after {attempts} attempts")]
    PollExhausted {
        /// Number of poll attempts made
        attempts: u32,
    },

    /// Async task reached a terminal failure state
    #[error("Provider task failed: {0}")]
    TaskFailed(String),

    /// The provider's credential is absent from configuration
    #[error("Provider not configured: {0}")]
    NotConfigured(&'static str),
}

impl ProviderError {
    /// Builds a status error from a response, truncating long bodies
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = if body.len() > 512 {
            let mut end = 512;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}…", &body[..end])
        } else {
            body.to_string()
        };

        ProviderError::Status { status, message }
    }
}
