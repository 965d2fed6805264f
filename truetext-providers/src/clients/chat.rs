/// OpenAI-compatible chat completion client
///
/// Works against any endpoint speaking the `/chat/completions` dialect:
/// OpenAI, Groq, and OpenRouter differ only in base URL and key. The
/// request carries exactly the sampling parameters the caller passes;
/// nothing is invented here.

use reqwest::Client;
use serde_json::json;

use crate::config::ChatEndpoint;
use crate::error::ProviderError;
use crate::normalize::{self, ChatCompletion};

/// One chat completion request
#[derive(Debug, Clone)]
pub struct ChatRequest<'a> {
    /// Provider model identifier
    pub model: &'a str,

    /// Optional system prompt
    pub system: Option<&'a str>,

    /// User prompt
    pub prompt: &'a str,

    /// Sampling temperature
    pub temperature: f64,

    /// Completion token cap
    pub max_tokens: u32,
}

/// Issues a chat completion request against an OpenAI-compatible endpoint
///
/// # Errors
///
/// - [`ProviderError::NotConfigured`] when the endpoint has no API key
/// - [`ProviderError::Http`] on network failure
/// - [`ProviderError::Status`] on a non-2xx response
/// - [`ProviderError::MalformedResponse`] when the payload lacks the
///   assistant message
pub async fn complete(
    http: &Client,
    endpoint: &ChatEndpoint,
    request: &ChatRequest<'_>,
) -> Result<ChatCompletion, ProviderError> {
    let api_key = endpoint
        .api_key
        .as_deref()
        .ok_or(ProviderError::NotConfigured("chat API key"))?;

    let mut messages = Vec::with_capacity(2);
    if let Some(system) = request.system {
        messages.push(json!({"role": "system", "content": system}));
    }
    messages.push(json!({"role": "user", "content": request.prompt}));

    let body = json!({
        "model": request.model,
        "messages": messages,
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    });

    let url = format!("{}/chat/completions", endpoint.base_url);

    tracing::debug!(model = request.model, url = %url, "Chat completion request");

    let response = http
        .post(&url)
        .bearer_auth(api_key)
        .json(&body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), &text));
    }

    let value: serde_json::Value = serde_json::from_str(&text)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    normalize::chat_completion(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unconfigured_endpoint_fails_without_network() {
        let http = Client::new();
        let endpoint = ChatEndpoint {
            base_url: "https://api.groq.com/openai/v1".to_string(),
            api_key: None,
        };
        let request = ChatRequest {
            model: "llama-3.3-70b-versatile",
            system: None,
            prompt: "hello",
            temperature: 0.7,
            max_tokens: 256,
        };

        let err = complete(&http, &endpoint, &request).await.unwrap_err();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }
}
