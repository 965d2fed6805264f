/// Provider HTTP clients
///
/// One module per third-party API. Clients are thin: build the request,
/// check the status, hand the JSON to the normalizer. They share the
/// router's single `reqwest::Client` and never read configuration or the
/// environment themselves.
///
/// - `chat`: OpenAI-compatible chat completion (OpenAI, Groq, OpenRouter)
/// - `sapling`: Sapling AI-detection
/// - `huggingface`: HuggingFace inference (detector models)
/// - `humanize_ai`: HumanizeAI task submit + poll

pub mod chat;
pub mod huggingface;
pub mod humanize_ai;
pub mod sapling;
