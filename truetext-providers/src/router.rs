/// Provider routing and per-feature fallback chains
///
/// Routing is a static lookup table: feature (plus an optional client-facing
/// model alias) maps to a chat backend and provider model id, with a default
/// row when the alias is unknown. There is no health checking, no load
/// balancing, and no adaptive routing.
///
/// Dispatch implements the per-feature fallback chains:
///
/// ```text
/// humanize:   HumanizeAI ──> chat rewrite ──> local heuristic
/// paraphrase: chat (routed model) ──> chat (alternate model) ──> heuristic
/// detect:     Sapling ──> HuggingFace ──> heuristic ([Fallback Analysis])
/// assignment: chat (routed model) ──> chat (alternate model) ──> error
/// ```
///
/// Tiers run sequentially; a failure triggers at most the next tier. No
/// retry counters, no backoff, no failure state carried across requests.

use reqwest::Client;
use std::time::Duration;

use crate::clients::chat::{self, ChatRequest};
use crate::clients::{huggingface, humanize_ai, sapling};
use crate::config::{ChatEndpoint, ProviderSettings};
use crate::error::ProviderError;
use crate::fallback;
use crate::types::{
    estimate_tokens, DetectionReport, Feature, HumanizeMode, ParaphraseLevel, TextOutcome,
};

/// Chat backends an OpenAI-compatible route can target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatBackend {
    /// Groq (primary chat backend)
    Groq,

    /// OpenAI or an OpenRouter-compatible endpoint (fallback backend)
    OpenAi,
}

impl ChatBackend {
    /// Backend name used in engine identifiers
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatBackend::Groq => "groq",
            ChatBackend::OpenAi => "openai",
        }
    }
}

/// One resolved chat route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChatRoute {
    /// Which endpoint serves the call
    pub backend: ChatBackend,

    /// Provider model identifier
    pub model: &'static str,
}

impl ChatRoute {
    /// Engine identifier recorded in usage logs, e.g.
    /// "groq:llama-3.3-70b-versatile"
    pub fn engine(&self) -> String {
        format!("{}:{}", self.backend.as_str(), self.model)
    }
}

/// Alias used when the client names no model
const DEFAULT_ALIAS: &str = "standard";

/// Static routing table: (feature, alias) → (backend, model)
const CHAT_ROUTES: &[(Feature, &str, ChatBackend, &str)] = &[
    (Feature::Humanize, "standard", ChatBackend::Groq, "llama-3.3-70b-versatile"),
    (Feature::Paraphrase, "standard", ChatBackend::Groq, "llama-3.3-70b-versatile"),
    (Feature::Paraphrase, "swift", ChatBackend::Groq, "llama-3.1-8b-instant"),
    (Feature::Paraphrase, "premium", ChatBackend::OpenAi, "gpt-4o"),
    (Feature::Assignment, "standard", ChatBackend::Groq, "llama-3.3-70b-versatile"),
    (Feature::Assignment, "premium", ChatBackend::OpenAi, "gpt-4o"),
];

/// Model every feature falls back to when its routed model fails
const ALTERNATE_ROUTE: ChatRoute = ChatRoute {
    backend: ChatBackend::OpenAi,
    model: "gpt-4o-mini",
};

/// Resolves a feature and optional alias to a chat route
///
/// Unknown aliases resolve to the feature's default row; a feature with no
/// rows at all resolves to the standard Groq model.
pub fn chat_route(feature: Feature, alias: Option<&str>) -> ChatRoute {
    let alias = alias.unwrap_or(DEFAULT_ALIAS);

    let lookup = |wanted: &str| {
        CHAT_ROUTES
            .iter()
            .find(|(f, a, _, _)| *f == feature && *a == wanted)
            .map(|(_, _, backend, model)| ChatRoute {
                backend: *backend,
                model: *model,
            })
    };

    lookup(alias)
        .or_else(|| lookup(DEFAULT_ALIAS))
        .unwrap_or(ChatRoute {
            backend: ChatBackend::Groq,
            model: "llama-3.3-70b-versatile",
        })
}

/// The alternate route used as the second chat tier
pub fn alternate_chat_route(_feature: Feature) -> ChatRoute {
    ALTERNATE_ROUTE
}

/// Collapses an upstream detection result onto the deterministic detector
///
/// Any upstream failure yields the local heuristic report, whose analysis
/// carries the `[Fallback Analysis]` marker.
pub fn resolve_detection(
    upstream: Result<DetectionReport, ProviderError>,
    text: &str,
) -> DetectionReport {
    match upstream {
        Ok(report) => report,
        Err(err) => {
            tracing::warn!(error = %err, "Detection providers failed, using local heuristic");
            fallback::detect_heuristic(text)
        }
    }
}

const HUMANIZE_SYSTEM_PROMPT: &str = "You rewrite text so it reads as natural human writing. \
     Preserve the meaning, vary sentence rhythm, and avoid stock connectors. \
     Reply with the rewritten text only.";

const PARAPHRASE_SYSTEM_PROMPT: &str = "You paraphrase text. Preserve the meaning and \
     approximate length. Reply with the paraphrased text only.";

const ASSIGNMENT_SYSTEM_PROMPT: &str = "You write assignment drafts: a title, an introduction, \
     body sections, and a conclusion. Reply with the draft only.";

fn humanize_prompt(text: &str, mode: HumanizeMode) -> String {
    format!(
        "Rewrite the following text in a {} register so it reads like a person wrote it:\n\n{}",
        mode.as_str(),
        text
    )
}

fn paraphrase_prompt(text: &str, level: ParaphraseLevel) -> String {
    format!(
        "Paraphrase the following text with {} rewording:\n\n{}",
        level.as_str(),
        text
    )
}

fn assignment_prompt(topic: &str, word_count: u32, academic_level: &str) -> String {
    format!(
        "Write an approximately {}-word assignment at {} level on the topic:\n\n{}",
        word_count, academic_level, topic
    )
}

/// Routes feature requests to providers and walks the fallback chains
///
/// Built once at startup around a single `reqwest::Client` (with the
/// configured request timeout) and the immutable [`ProviderSettings`].
pub struct ProviderRouter {
    http: Client,
    settings: ProviderSettings,
}

impl ProviderRouter {
    /// Creates a router from settings
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(settings: ProviderSettings) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        Ok(Self { http, settings })
    }

    /// The endpoint backing a chat route
    fn endpoint(&self, backend: ChatBackend) -> &ChatEndpoint {
        match backend {
            ChatBackend::Groq => &self.settings.groq,
            ChatBackend::OpenAi => &self.settings.openai,
        }
    }

    /// Issues one chat call and normalizes it into a [`TextOutcome`]
    async fn chat(
        &self,
        route: ChatRoute,
        system: &str,
        prompt: &str,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<TextOutcome, ProviderError> {
        let completion = chat::complete(
            &self.http,
            self.endpoint(route.backend),
            &ChatRequest {
                model: route.model,
                system: Some(system),
                prompt,
                temperature,
                max_tokens,
            },
        )
        .await?;

        let tokens = completion
            .total_tokens
            .unwrap_or_else(|| estimate_tokens(&completion.content));

        Ok(TextOutcome {
            output: completion.content,
            engine: route.engine(),
            tokens,
        })
    }

    /// Humanizes text: HumanizeAI → chat rewrite → local heuristic
    ///
    /// Always produces an outcome; the engine field records which tier
    /// served it.
    pub async fn humanize(&self, text: &str, mode: HumanizeMode) -> TextOutcome {
        match humanize_ai::humanize(&self.http, &self.settings.humanize_ai, text, mode).await {
            Ok(output) => TextOutcome {
                tokens: estimate_tokens(&output),
                output,
                engine: "humanizeai".to_string(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "HumanizeAI failed, falling back to chat rewrite");

                let route = chat_route(Feature::Humanize, None);
                match self
                    .chat(route, HUMANIZE_SYSTEM_PROMPT, &humanize_prompt(text, mode), 0.9, 2048)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        tracing::warn!(error = %err, "Chat rewrite failed, using local heuristic");
                        let output = fallback::humanize_heuristic(text);
                        TextOutcome {
                            tokens: estimate_tokens(&output),
                            output,
                            engine: "heuristic".to_string(),
                        }
                    }
                }
            }
        }
    }

    /// Paraphrases text: routed model → alternate model → local heuristic
    ///
    /// The level's sampling temperature is forwarded to the provider;
    /// the heuristic tier is pure, so fallback-served requests are
    /// deterministic for a given `(text, level)`.
    pub async fn paraphrase(
        &self,
        text: &str,
        level: ParaphraseLevel,
        alias: Option<&str>,
    ) -> TextOutcome {
        let prompt = paraphrase_prompt(text, level);
        let route = chat_route(Feature::Paraphrase, alias);

        match self
            .chat(route, PARAPHRASE_SYSTEM_PROMPT, &prompt, level.temperature(), 2048)
            .await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    model = route.model,
                    "Primary paraphrase model failed, trying alternate"
                );

                let alternate = alternate_chat_route(Feature::Paraphrase);
                match self
                    .chat(alternate, PARAPHRASE_SYSTEM_PROMPT, &prompt, level.temperature(), 2048)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(err) => {
                        tracing::warn!(error = %err, "Alternate paraphrase model failed, using local heuristic");
                        let output = fallback::paraphrase_heuristic(text, level);
                        TextOutcome {
                            tokens: estimate_tokens(&output),
                            output,
                            engine: "heuristic".to_string(),
                        }
                    }
                }
            }
        }
    }

    /// Scores text for AI authorship: Sapling → HuggingFace → heuristic
    ///
    /// Always produces a report; fallback-served reports carry the
    /// `[Fallback Analysis]` marker in their analysis.
    pub async fn detect(&self, text: &str) -> DetectionReport {
        resolve_detection(self.detect_upstream(text).await, text)
    }

    /// Walks the upstream detection tiers
    async fn detect_upstream(&self, text: &str) -> Result<DetectionReport, ProviderError> {
        let primary = match &self.settings.sapling_api_key {
            Some(key) => sapling::detect(&self.http, key, text).await,
            None => Err(ProviderError::NotConfigured("SAPLING_API_KEY")),
        };

        match primary {
            Ok(report) => Ok(report),
            Err(err) => {
                tracing::warn!(error = %err, "Sapling detection failed, trying HuggingFace");
                match &self.settings.huggingface_api_key {
                    Some(key) => huggingface::detect(&self.http, key, text).await,
                    None => Err(ProviderError::NotConfigured("HUGGINGFACE_API_KEY")),
                }
            }
        }
    }

    /// Generates an assignment draft: routed model → alternate model
    ///
    /// No heuristic can write an assignment; when both models fail the
    /// final error surfaces to the API layer as an upstream failure.
    ///
    /// # Errors
    ///
    /// Returns the alternate tier's error when both chat tiers fail.
    pub async fn assignment(
        &self,
        topic: &str,
        word_count: u32,
        academic_level: &str,
    ) -> Result<TextOutcome, ProviderError> {
        let prompt = assignment_prompt(topic, word_count, academic_level);
        let max_tokens = (word_count * 2).clamp(512, 4096);
        let route = chat_route(Feature::Assignment, None);

        match self
            .chat(route, ASSIGNMENT_SYSTEM_PROMPT, &prompt, 0.7, max_tokens)
            .await
        {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    model = route.model,
                    "Primary assignment model failed, trying alternate"
                );

                let alternate = alternate_chat_route(Feature::Assignment);
                self.chat(alternate, ASSIGNMENT_SYSTEM_PROMPT, &prompt, 0.7, max_tokens)
                    .await
            }
        }
    }

    /// The settings this router was built with
    pub fn settings(&self) -> &ProviderSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_route_default_alias() {
        let route = chat_route(Feature::Paraphrase, None);
        assert_eq!(route.backend, ChatBackend::Groq);
        assert_eq!(route.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_chat_route_named_alias() {
        let route = chat_route(Feature::Paraphrase, Some("swift"));
        assert_eq!(route.model, "llama-3.1-8b-instant");

        let route = chat_route(Feature::Paraphrase, Some("premium"));
        assert_eq!(route.backend, ChatBackend::OpenAi);
        assert_eq!(route.model, "gpt-4o");
    }

    #[test]
    fn test_unknown_alias_falls_back_to_default() {
        let route = chat_route(Feature::Paraphrase, Some("turbo-max"));
        assert_eq!(route, chat_route(Feature::Paraphrase, None));
    }

    #[test]
    fn test_feature_without_rows_gets_standard_model() {
        // Detect has no chat rows; the lookup still yields a usable route
        let route = chat_route(Feature::Detect, None);
        assert_eq!(route.backend, ChatBackend::Groq);
        assert_eq!(route.model, "llama-3.3-70b-versatile");
    }

    #[test]
    fn test_alternate_route_differs_from_primary() {
        let primary = chat_route(Feature::Assignment, None);
        let alternate = alternate_chat_route(Feature::Assignment);
        assert_ne!(primary, alternate);
    }

    #[test]
    fn test_engine_identifier_format() {
        let route = chat_route(Feature::Paraphrase, Some("swift"));
        assert_eq!(route.engine(), "groq:llama-3.1-8b-instant");
    }

    #[test]
    fn test_resolve_detection_passes_provider_report_through() {
        let report = DetectionReport {
            ai_probability: 0.9,
            analysis: "Estimated 90% likelihood of AI generation.".to_string(),
            engine: "sapling".to_string(),
        };

        let resolved = resolve_detection(Ok(report.clone()), "irrelevant");
        assert_eq!(resolved.engine, "sapling");
        assert!(!resolved.analysis.contains("[Fallback Analysis]"));
    }

    #[test]
    fn test_resolve_detection_falls_back_on_error() {
        let resolved = resolve_detection(
            Err(ProviderError::from_status(502, "upstream down")),
            "Some text to inspect. It has a couple of sentences.",
        );

        assert_eq!(resolved.engine, "heuristic");
        assert!(resolved.analysis.contains("[Fallback Analysis]"));
    }

    #[tokio::test]
    async fn test_unconfigured_paraphrase_lands_on_heuristic() {
        let router = ProviderRouter::new(ProviderSettings::unconfigured()).unwrap();

        let outcome = router
            .paraphrase(
                "We utilize numerous tools.",
                ParaphraseLevel::Aggressive,
                None,
            )
            .await;

        assert_eq!(outcome.engine, "heuristic");
        assert_eq!(outcome.output, "We use many tools.");
    }

    #[tokio::test]
    async fn test_unconfigured_paraphrase_is_deterministic() {
        let router = ProviderRouter::new(ProviderSettings::unconfigured()).unwrap();
        let text = "The initial attempt did demonstrate sufficient progress.";

        let first = router
            .paraphrase(text, ParaphraseLevel::Balanced, None)
            .await;
        let second = router
            .paraphrase(text, ParaphraseLevel::Balanced, None)
            .await;

        assert_eq!(first.output, second.output);
    }

    #[tokio::test]
    async fn test_unconfigured_humanize_lands_on_heuristic() {
        let router = ProviderRouter::new(ProviderSettings::unconfigured()).unwrap();

        let outcome = router
            .humanize("It is clear that we cannot stop.", HumanizeMode::Natural)
            .await;

        assert_eq!(outcome.engine, "heuristic");
        assert!(outcome.output.contains("can't"));
    }

    #[tokio::test]
    async fn test_unconfigured_detect_lands_on_heuristic() {
        let router = ProviderRouter::new(ProviderSettings::unconfigured()).unwrap();

        let report = router.detect("Sentence one. Sentence two. Sentence three.").await;

        assert_eq!(report.engine, "heuristic");
        assert!(report.analysis.starts_with("[Fallback Analysis]"));
    }

    #[tokio::test]
    async fn test_unconfigured_assignment_is_an_error() {
        let router = ProviderRouter::new(ProviderSettings::unconfigured()).unwrap();

        let result = router
            .assignment("The industrial revolution", 500, "undergraduate")
            .await;

        assert!(matches!(result, Err(ProviderError::NotConfigured(_))));
    }
}
