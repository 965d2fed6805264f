//! # TrueText Provider Layer
//!
//! Outbound AI integration for the TrueText API: provider clients, the
//! feature-to-provider routing table, per-feature fallback chains, and
//! response normalization into the stable contracts the API returns.
//!
//! ## Architecture
//!
//! ```text
//! handler ──> ProviderRouter ──> primary client  ──┐
//!                   │                              │ normalize
//!                   ├──(failure)──> alternate ─────┤
//!                   │                              │
//!                   └──(failure)──> local heuristic┘
//! ```
//!
//! Calls are sequential: a failure triggers at most the next tier, never
//! parallel racing. All credentials and base URLs come from
//! [`ProviderSettings`] built once at process start; an unconfigured
//! provider is skipped in favor of the next tier.
//!
//! ## Modules
//!
//! - `clients`: one module per third-party API
//! - `router`: static routing table and per-feature dispatch
//! - `fallback`: deterministic local heuristics
//! - `normalize`: provider JSON → stable output contracts
//! - `config`: provider credentials and HTTP settings
//! - `types`: normalized request/response types
//! - `error`: provider error taxonomy

pub mod clients;
pub mod config;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod router;
pub mod types;

pub use config::{ChatEndpoint, ProviderSettings};
pub use error::ProviderError;
pub use router::ProviderRouter;
pub use types::{DetectionReport, Feature, HumanizeMode, ParaphraseLevel, TextOutcome};
