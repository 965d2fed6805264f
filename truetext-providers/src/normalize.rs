/// Response normalization
///
/// Each provider speaks its own JSON dialect; everything the rest of the
/// system sees goes through the functions here first. Normalization is
/// strict: a 2xx payload missing a required field is a
/// [`ProviderError::MalformedResponse`], which the router treats like any
/// other tier failure and the API ultimately maps to a 502.
///
/// Handled dialects:
/// - OpenAI-compatible chat: `choices[0].message.content` (+ optional
///   `usage.total_tokens`)
/// - Sapling: `score` in [0, 1], optional `sentence_scores`
/// - HuggingFace detector: `[[{label, score}, ...]]` label rows
/// - HumanizeAI: task submit (`task_id`/`id`) and task status
///   (`status` + `stylized_text`/`output`)

use serde_json::Value;

use crate::error::ProviderError;
use crate::types::DetectionReport;

/// Normalized chat completion payload
#[derive(Debug, Clone)]
pub struct ChatCompletion {
    /// Assistant message content
    pub content: String,

    /// Provider-reported total token usage, when present
    pub total_tokens: Option<i64>,
}

/// Extracts the assistant message from an OpenAI-compatible response
///
/// # Errors
///
/// Returns [`ProviderError::MalformedResponse`] when
/// `choices[0].message.content` is absent or not a string.
pub fn chat_completion(value: &Value) -> Result<ChatCompletion, ProviderError> {
    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ProviderError::MalformedResponse(
                "chat response missing choices[0].message.content".to_string(),
            )
        })?;

    let total_tokens = value.pointer("/usage/total_tokens").and_then(Value::as_i64);

    Ok(ChatCompletion {
        content: content.to_string(),
        total_tokens,
    })
}

/// Builds a detection report from a Sapling `aidetect` response
///
/// Sapling's `score` is already the AI probability in [0, 1].
///
/// # Errors
///
/// Returns [`ProviderError::MalformedResponse`] when `score` is absent or
/// not a number.
pub fn sapling_report(value: &Value) -> Result<DetectionReport, ProviderError> {
    let score = value
        .get("score")
        .and_then(Value::as_f64)
        .ok_or_else(|| {
            ProviderError::MalformedResponse("detection response missing score".to_string())
        })?;

    let ai_probability = score.clamp(0.0, 1.0);

    let analysis = match value.get("sentence_scores").and_then(Value::as_array) {
        Some(sentences) if !sentences.is_empty() => {
            let flagged = sentences
                .iter()
                .filter(|s| {
                    s.get("score")
                        .and_then(Value::as_f64)
                        .map(|v| v >= 0.5)
                        .unwrap_or(false)
                })
                .count();
            format!(
                "Estimated {:.0}% likelihood of AI generation; {} of {} sentences flagged.",
                ai_probability * 100.0,
                flagged,
                sentences.len()
            )
        }
        _ => format!(
            "Estimated {:.0}% likelihood of AI generation.",
            ai_probability * 100.0
        ),
    };

    Ok(DetectionReport {
        ai_probability,
        analysis,
        engine: "sapling".to_string(),
    })
}

/// Builds a detection report from a HuggingFace detector response
///
/// Detector models answer with label rows like
/// `[[{"label": "Fake", "score": 0.93}, {"label": "Real", "score": 0.07}]]`.
/// The "Fake" score is the AI probability; when only "Real" is present its
/// complement is used.
///
/// # Errors
///
/// Returns [`ProviderError::MalformedResponse`] when no usable label row
/// is present.
pub fn huggingface_report(value: &Value) -> Result<DetectionReport, ProviderError> {
    let rows = value
        .pointer("/0")
        .and_then(Value::as_array)
        .or_else(|| value.as_array())
        .ok_or_else(|| {
            ProviderError::MalformedResponse("inference response is not a label array".to_string())
        })?;

    let mut fake = None;
    let mut real = None;

    for row in rows {
        let label = row.get("label").and_then(Value::as_str).unwrap_or_default();
        let score = row.get("score").and_then(Value::as_f64);
        match label.to_ascii_lowercase().as_str() {
            "fake" | "ai" | "machine" => fake = score,
            "real" | "human" => real = score,
            _ => {}
        }
    }

    let ai_probability = match (fake, real) {
        (Some(f), _) => f,
        (None, Some(r)) => 1.0 - r,
        (None, None) => {
            return Err(ProviderError::MalformedResponse(
                "inference response has no Fake/Real labels".to_string(),
            ))
        }
    }
    .clamp(0.0, 1.0);

    Ok(DetectionReport {
        ai_probability,
        analysis: format!(
            "Estimated {:.0}% likelihood of AI generation.",
            ai_probability * 100.0
        ),
        engine: "huggingface".to_string(),
    })
}

/// Extracts the task id from a HumanizeAI submit response
///
/// # Errors
///
/// Returns [`ProviderError::MalformedResponse`] when neither `task_id` nor
/// `id` is present.
pub fn humanize_task_id(value: &Value) -> Result<String, ProviderError> {
    value
        .get("task_id")
        .or_else(|| value.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            ProviderError::MalformedResponse("task submit response missing task_id".to_string())
        })
}

/// State of a polled HumanizeAI task
#[derive(Debug, Clone, PartialEq)]
pub enum HumanizeTaskState {
    /// Still running; poll again
    Pending,

    /// Finished with the stylized text
    Done(String),

    /// Terminal failure reported by the provider
    Failed(String),
}

/// Interprets a HumanizeAI task status response
///
/// # Errors
///
/// Returns [`ProviderError::MalformedResponse`] when `status` is absent,
/// unknown, or a finished task carries no output text.
pub fn humanize_task_state(value: &Value) -> Result<HumanizeTaskState, ProviderError> {
    let status = value
        .get("status")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            ProviderError::MalformedResponse("task status response missing status".to_string())
        })?;

    match status {
        "pending" | "queued" | "processing" => Ok(HumanizeTaskState::Pending),
        "done" | "completed" | "success" => {
            let text = value
                .get("stylized_text")
                .or_else(|| value.get("output"))
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    ProviderError::MalformedResponse(
                        "finished task missing stylized_text".to_string(),
                    )
                })?;
            Ok(HumanizeTaskState::Done(text.to_string()))
        }
        "failed" | "error" => {
            let message = value
                .get("error")
                .and_then(Value::as_str)
                .unwrap_or("no error detail");
            Ok(HumanizeTaskState::Failed(message.to_string()))
        }
        other => Err(ProviderError::MalformedResponse(format!(
            "unknown task status: {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_chat_completion_happy_path() {
        let value = json!({
            "choices": [{"message": {"role": "assistant", "content": "rewritten text"}}],
            "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
        });

        let completion = chat_completion(&value).unwrap();
        assert_eq!(completion.content, "rewritten text");
        assert_eq!(completion.total_tokens, Some(30));
    }

    #[test]
    fn test_chat_completion_without_usage() {
        let value = json!({
            "choices": [{"message": {"content": "hello"}}]
        });

        let completion = chat_completion(&value).unwrap();
        assert_eq!(completion.total_tokens, None);
    }

    #[test]
    fn test_chat_completion_missing_content() {
        let value = json!({"choices": []});
        let err = chat_completion(&value).unwrap_err();
        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[test]
    fn test_sapling_report() {
        let value = json!({
            "score": 0.87,
            "sentence_scores": [
                {"score": 0.9, "sentence": "a"},
                {"score": 0.2, "sentence": "b"},
                {"score": 0.8, "sentence": "c"}
            ]
        });

        let report = sapling_report(&value).unwrap();
        assert!((report.ai_probability - 0.87).abs() < f64::EPSILON);
        assert!(report.analysis.contains("2 of 3 sentences"));
        assert_eq!(report.engine, "sapling");
    }

    #[test]
    fn test_sapling_report_clamps_score() {
        let value = json!({"score": 1.4});
        let report = sapling_report(&value).unwrap();
        assert_eq!(report.ai_probability, 1.0);
    }

    #[test]
    fn test_sapling_report_missing_score() {
        let value = json!({"sentences": []});
        assert!(sapling_report(&value).is_err());
    }

    #[test]
    fn test_huggingface_report_fake_label() {
        let value = json!([[
            {"label": "Fake", "score": 0.93},
            {"label": "Real", "score": 0.07}
        ]]);

        let report = huggingface_report(&value).unwrap();
        assert!((report.ai_probability - 0.93).abs() < f64::EPSILON);
        assert_eq!(report.engine, "huggingface");
    }

    #[test]
    fn test_huggingface_report_real_only() {
        let value = json!([[{"label": "Real", "score": 0.8}]]);
        let report = huggingface_report(&value).unwrap();
        assert!((report.ai_probability - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_huggingface_report_unusable() {
        let value = json!([[{"label": "Neutral", "score": 0.5}]]);
        assert!(huggingface_report(&value).is_err());
    }

    #[test]
    fn test_humanize_task_id_variants() {
        assert_eq!(
            humanize_task_id(&json!({"task_id": "t-1"})).unwrap(),
            "t-1"
        );
        assert_eq!(humanize_task_id(&json!({"id": "t-2"})).unwrap(), "t-2");
        assert!(humanize_task_id(&json!({"job": "t-3"})).is_err());
    }

    #[test]
    fn test_humanize_task_states() {
        assert_eq!(
            humanize_task_state(&json!({"status": "processing"})).unwrap(),
            HumanizeTaskState::Pending
        );
        assert_eq!(
            humanize_task_state(&json!({"status": "done", "stylized_text": "out"})).unwrap(),
            HumanizeTaskState::Done("out".to_string())
        );
        assert_eq!(
            humanize_task_state(&json!({"status": "failed", "error": "boom"})).unwrap(),
            HumanizeTaskState::Failed("boom".to_string())
        );
        assert!(humanize_task_state(&json!({"status": "done"})).is_err());
        assert!(humanize_task_state(&json!({"status": "weird"})).is_err());
    }
}
