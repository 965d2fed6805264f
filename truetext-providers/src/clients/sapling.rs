/// Sapling AI-detection client
///
/// Sapling's `aidetect` endpoint takes the key in the request body and
/// answers with an overall `score` in [0, 1] plus per-sentence scores.

use reqwest::Client;
use serde_json::json;

use crate::error::ProviderError;
use crate::normalize;
use crate::types::DetectionReport;

/// Sapling AI-detection endpoint
const AIDETECT_URL: &str = "https://api.sapling.ai/api/v1/aidetect";

/// Scores text for AI authorship via Sapling
///
/// # Errors
///
/// - [`ProviderError::Http`] on network failure
/// - [`ProviderError::Status`] on a non-2xx response
/// - [`ProviderError::MalformedResponse`] when `score` is absent
pub async fn detect(
    http: &Client,
    api_key: &str,
    text: &str,
) -> Result<DetectionReport, ProviderError> {
    let body = json!({
        "key": api_key,
        "text": text,
        "sent_scores": true,
    });

    tracing::debug!(chars = text.len(), "Sapling detection request");

    let response = http.post(AIDETECT_URL).json(&body).send().await?;

    let status = response.status();
    let payload = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), &payload));
    }

    let value: serde_json::Value = serde_json::from_str(&payload)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    normalize::sapling_report(&value)
}
