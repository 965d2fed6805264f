/// Provider configuration
///
/// All credentials and base URLs are read from the environment exactly once
/// at process start and carried in [`ProviderSettings`]; nothing in the
/// provider layer reads the environment at call time, and there are no
/// baked-in key fallbacks. A provider whose key is absent is simply
/// unconfigured, and the router skips it in favor of the next fallback
/// tier.
///
/// # Environment Variables
///
/// - `GROQ_API_KEY`: Groq chat completion key
/// - `GROQ_BASE_URL`: override for the Groq OpenAI-compatible endpoint
/// - `OPENAI_API_KEY`: OpenAI (or OpenRouter-compatible) chat key
/// - `OPENAI_BASE_URL`: override for the OpenAI-compatible endpoint
/// - `SAPLING_API_KEY`: Sapling AI-detection key
/// - `HUGGINGFACE_API_KEY`: HuggingFace inference key
/// - `HUMANIZEAI_API_KEY`: HumanizeAI task API key
/// - `HUMANIZEAI_BASE_URL`: override for the HumanizeAI endpoint
/// - `PROVIDER_TIMEOUT_SECS`: outbound request timeout (default: 30)

use serde::{Deserialize, Serialize};
use std::env;

/// Default Groq OpenAI-compatible endpoint
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default OpenAI endpoint
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default HumanizeAI endpoint
pub const DEFAULT_HUMANIZEAI_BASE_URL: &str = "https://api.humanizeai.pro/v1";

/// One OpenAI-compatible (or task-based) HTTP endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatEndpoint {
    /// Base URL without trailing slash
    pub base_url: String,

    /// API key (None = endpoint unavailable)
    pub api_key: Option<String>,
}

impl ChatEndpoint {
    /// Whether a key is configured for this endpoint
    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Credentials and HTTP settings for every provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderSettings {
    /// Groq chat endpoint (primary chat backend)
    pub groq: ChatEndpoint,

    /// OpenAI-compatible chat endpoint (fallback chat backend)
    pub openai: ChatEndpoint,

    /// Sapling detection key
    pub sapling_api_key: Option<String>,

    /// HuggingFace inference key
    pub huggingface_api_key: Option<String>,

    /// HumanizeAI task endpoint
    pub humanize_ai: ChatEndpoint,

    /// Outbound request timeout in seconds
    pub request_timeout_secs: u64,
}

impl ProviderSettings {
    /// Loads provider settings from environment variables
    ///
    /// Missing keys are not an error; the corresponding provider is
    /// unconfigured and its tier will be skipped at dispatch time.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let groq = ChatEndpoint {
            base_url: env::var("GROQ_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_GROQ_BASE_URL.to_string()),
            api_key: non_empty(env::var("GROQ_API_KEY").ok()),
        };

        let openai = ChatEndpoint {
            base_url: env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENAI_BASE_URL.to_string()),
            api_key: non_empty(env::var("OPENAI_API_KEY").ok()),
        };

        let humanize_ai = ChatEndpoint {
            base_url: env::var("HUMANIZEAI_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_HUMANIZEAI_BASE_URL.to_string()),
            api_key: non_empty(env::var("HUMANIZEAI_API_KEY").ok()),
        };

        let request_timeout_secs = env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(30);

        Self {
            groq,
            openai,
            sapling_api_key: non_empty(env::var("SAPLING_API_KEY").ok()),
            huggingface_api_key: non_empty(env::var("HUGGINGFACE_API_KEY").ok()),
            humanize_ai,
            request_timeout_secs,
        }
    }

    /// Settings with no providers configured
    ///
    /// Every feature falls straight through to its local heuristic (or
    /// fails, for assignment). Useful in tests.
    pub fn unconfigured() -> Self {
        Self {
            groq: ChatEndpoint {
                base_url: DEFAULT_GROQ_BASE_URL.to_string(),
                api_key: None,
            },
            openai: ChatEndpoint {
                base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
                api_key: None,
            },
            sapling_api_key: None,
            huggingface_api_key: None,
            humanize_ai: ChatEndpoint {
                base_url: DEFAULT_HUMANIZEAI_BASE_URL.to_string(),
                api_key: None,
            },
            request_timeout_secs: 30,
        }
    }
}

/// Treats empty strings as unset so `FOO=` in an env file does not look
/// like a configured key
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_filters_blank() {
        assert_eq!(non_empty(Some("".to_string())), None);
        assert_eq!(non_empty(Some("   ".to_string())), None);
        assert_eq!(non_empty(Some("key".to_string())), Some("key".to_string()));
        assert_eq!(non_empty(None), None);
    }

    #[test]
    fn test_unconfigured_has_no_keys() {
        let settings = ProviderSettings::unconfigured();
        assert!(!settings.groq.is_configured());
        assert!(!settings.openai.is_configured());
        assert!(settings.sapling_api_key.is_none());
        assert!(settings.huggingface_api_key.is_none());
        assert!(!settings.humanize_ai.is_configured());
    }

    #[test]
    fn test_default_base_urls() {
        let settings = ProviderSettings::unconfigured();
        assert_eq!(settings.groq.base_url, DEFAULT_GROQ_BASE_URL);
        assert_eq!(settings.openai.base_url, DEFAULT_OPENAI_BASE_URL);
    }
}
