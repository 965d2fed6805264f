/// HumanizeAI task client
///
/// HumanizeAI is asynchronous: a submit call returns a task id, then the
/// task is polled until it reports `done` or `failed`. Polling is bounded
/// to a fixed number of attempts with a short sleep; exhausting it counts
/// as a primary failure so the router moves to the next tier. There is no
/// retry of the submit call itself.

use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use tokio::time::sleep;

use crate::config::ChatEndpoint;
use crate::error::ProviderError;
use crate::normalize::{self, HumanizeTaskState};
use crate::types::HumanizeMode;

/// Maximum number of status polls per task
const MAX_POLL_ATTEMPTS: u32 = 10;

/// Delay between status polls
const POLL_INTERVAL: Duration = Duration::from_millis(1500);

/// Humanizes text via the HumanizeAI task API
///
/// Submits the task, then polls until a terminal state or attempt
/// exhaustion.
///
/// # Errors
///
/// - [`ProviderError::NotConfigured`] when no API key is set
/// - [`ProviderError::Http`] / [`ProviderError::Status`] on transport or
///   provider errors during submit or poll
/// - [`ProviderError::TaskFailed`] when the task reports failure
/// - [`ProviderError::PollExhausted`] when the task never finishes within
///   the allowed poll attempts
pub async fn humanize(
    http: &Client,
    endpoint: &ChatEndpoint,
    text: &str,
    mode: HumanizeMode,
) -> Result<String, ProviderError> {
    let api_key = endpoint
        .api_key
        .as_deref()
        .ok_or(ProviderError::NotConfigured("HUMANIZEAI_API_KEY"))?;

    let task_id = submit(http, &endpoint.base_url, api_key, text, mode).await?;

    tracing::debug!(task_id = %task_id, "HumanizeAI task submitted");

    for attempt in 1..=MAX_POLL_ATTEMPTS {
        sleep(POLL_INTERVAL).await;

        match poll(http, &endpoint.base_url, api_key, &task_id).await? {
            HumanizeTaskState::Pending => {
                tracing::debug!(task_id = %task_id, attempt, "HumanizeAI task still pending");
            }
            HumanizeTaskState::Done(output) => return Ok(output),
            HumanizeTaskState::Failed(message) => {
                return Err(ProviderError::TaskFailed(message));
            }
        }
    }

    Err(ProviderError::PollExhausted {
        attempts: MAX_POLL_ATTEMPTS,
    })
}

/// Submits a humanization task
async fn submit(
    http: &Client,
    base_url: &str,
    api_key: &str,
    text: &str,
    mode: HumanizeMode,
) -> Result<String, ProviderError> {
    let response = http
        .post(format!("{}/tasks", base_url))
        .header("x-api-key", api_key)
        .json(&json!({
            "text": text,
            "mode": mode.as_str(),
        }))
        .send()
        .await?;

    let status = response.status();
    let payload = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), &payload));
    }

    let value: serde_json::Value = serde_json::from_str(&payload)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    normalize::humanize_task_id(&value)
}

/// Polls a task's status once
async fn poll(
    http: &Client,
    base_url: &str,
    api_key: &str,
    task_id: &str,
) -> Result<HumanizeTaskState, ProviderError> {
    let response = http
        .get(format!("{}/tasks/{}", base_url, task_id))
        .header("x-api-key", api_key)
        .send()
        .await?;

    let status = response.status();
    let payload = response.text().await?;

    if !status.is_success() {
        return Err(ProviderError::from_status(status.as_u16(), &payload));
    }

    let value: serde_json::Value = serde_json::from_str(&payload)
        .map_err(|e| ProviderError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    normalize::humanize_task_state(&value)
}
