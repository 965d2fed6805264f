/// Provider-agnostic types for the TrueText feature set
///
/// These are the normalized shapes that flow between the API handlers and
/// the provider layer. Handlers never see provider-specific JSON; the
/// normalizer maps every backend onto [`TextOutcome`] or
/// [`DetectionReport`].

use serde::{Deserialize, Serialize};

/// Billable features routed through the provider layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Feature {
    /// Rewrite AI-sounding text to read naturally
    Humanize,

    /// Rewrite text preserving meaning
    Paraphrase,

    /// Score text for AI authorship likelihood
    Detect,

    /// Generate an assignment draft from a topic
    Assignment,
}

impl Feature {
    /// Feature name as stored in usage logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::Humanize => "humanize",
            Feature::Paraphrase => "paraphrase",
            Feature::Detect => "detect",
            Feature::Assignment => "assignment",
        }
    }
}

/// Paraphrase intensity requested by the client
///
/// The level selects sampling parameters for the provider call and the
/// substitution depth of the local heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ParaphraseLevel {
    /// Minimal rewording
    Light,

    /// Standard rewording
    #[default]
    Balanced,

    /// Heavy restructuring
    Aggressive,
}

impl ParaphraseLevel {
    /// Sampling temperature forwarded to chat providers
    pub fn temperature(&self) -> f64 {
        match self {
            ParaphraseLevel::Light => 0.3,
            ParaphraseLevel::Balanced => 0.7,
            ParaphraseLevel::Aggressive => 1.0,
        }
    }

    /// How many substitution rules the local heuristic applies
    pub fn substitution_depth(&self) -> usize {
        match self {
            ParaphraseLevel::Light => 8,
            ParaphraseLevel::Balanced => 16,
            ParaphraseLevel::Aggressive => usize::MAX,
        }
    }

    /// Level name for prompts and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            ParaphraseLevel::Light => "light",
            ParaphraseLevel::Balanced => "balanced",
            ParaphraseLevel::Aggressive => "aggressive",
        }
    }
}

/// Humanization register requested by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HumanizeMode {
    /// Everyday prose
    #[default]
    Natural,

    /// Formal academic register
    Academic,

    /// Conversational register
    Casual,
}

impl HumanizeMode {
    /// Mode name for provider payloads and prompts
    pub fn as_str(&self) -> &'static str {
        match self {
            HumanizeMode::Natural => "natural",
            HumanizeMode::Academic => "academic",
            HumanizeMode::Casual => "casual",
        }
    }
}

/// Normalized result of a text-producing feature
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextOutcome {
    /// The produced text
    pub output: String,

    /// Engine that served the request, e.g. "humanizeai",
    /// "groq:llama-3.3-70b-versatile", or "heuristic"
    pub engine: String,

    /// Tokens attributed to the request (provider-reported when available,
    /// otherwise estimated from the output length)
    pub tokens: i64,
}

/// Normalized result of AI-content detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionReport {
    /// Probability the text is AI-generated, in [0, 1]
    pub ai_probability: f64,

    /// Human-readable explanation of the verdict
    pub analysis: String,

    /// Engine that served the request
    pub engine: String,
}

/// Estimates a token count from text length
///
/// Used when a provider does not report usage; roughly 4 characters per
/// token, never below 1.
pub fn estimate_tokens(text: &str) -> i64 {
    ((text.len() as i64) / 4).max(1)
}
