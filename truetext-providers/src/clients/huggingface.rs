/// HuggingFace inference client
///
/// Used as the second detection tier. The hosted inference API takes
/// `{"inputs": text}` and a detector model answers with label rows
/// (`Fake`/`Real`) that the normalizer maps onto the detection contract.

use reqwest::Client;
use serde_json::json;

use crate::error::ProviderError;
use crate::normalize;
use crate::types::DetectionReport;

/// Hosted inference base URL
const INFERENCE_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Detector model queried for AI-authorship labels
const DETECTOR_MODEL: &str = "openai-community/roberta-base-openai-detector";

/// Scores text for AI authorship via HuggingFace inference
///
/// # Errors
///
/// - [`ProviderError::Http`] on network failure
/// - [`ProviderError::Status`] on a non-2xx response (503 while the model
///   is cold-loading is common and counts as a failure)
/// - [`ProviderError::MalformedResponse`] when no usable labels come back
pub async fn detect(
    http: &Client,
    api_key: &str,
    text: &str,
) -> Result<DetectionReport, ProviderError> {
    let url = format!("{}/{}", INFERENCE_BASE_URL, DETECTOR_MODEL);

    tracing::debug!(chars = text.len(), model = DETECTOR_MODEL, "HuggingFace detection request");

    let response = http
        .post(&url)
        .bearer_auth(api_key)
        .json(&json!({"inputs": text}))
        .send()
        .await?;

    let status = response.status();
    let payload = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), &payload));
    }

    let value: serde_json::Value = serde_json::from_str(&payload)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    normalize::huggingface_report(&value)
}
