//! # nichebot-runtime
//!
//! Guarded generation pipeline and auto-publish gate for NicheBot.
//!
//! `nichebot-core` scores content; this crate wraps the scoring in the
//! workflow around the LLM:
//!
//! - [`guard::GuardedGenerator`] calls the text-generation provider, runs the
//!   result through the gate, and on a block retries exactly once with an
//!   appended safety instruction before failing terminally.
//! - [`publish::PublishGate`] is the scheduler-facing check that compares a
//!   stored score against the configured minimum (and the daily limit)
//!   before unattended posting.
//! - [`providers`] defines the provider boundary plus OpenAI-compatible
//!   backends behind feature flags; tests swap in scripted providers.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use nichebot_runtime::{GuardedGenerator, RuntimeConfig};
//! use nichebot_runtime::providers::OpenAiProvider;
//! use nichebot_runtime::prompts::GenerationOptions;
//!
//! let config = RuntimeConfig::from_env()?;
//! let provider = Arc::new(OpenAiProvider::from_env()?);
//! let guard = GuardedGenerator::new(provider, &config);
//!
//! let outcome = guard
//!     .generate_post("yapay zeka", &GenerationOptions::default(), &recent)
//!     .await?;
//! println!("score {} after attempt {}", outcome.report.score, outcome.attempt.number());
//! ```

pub mod config;
pub mod generator;
pub mod guard;
pub mod prompts;
pub mod providers;
pub mod publish;
pub mod store;

// Re-export main types at crate root
pub use config::{ConfigError, Language, ProviderKind, RuntimeConfig};
pub use generator::{parse_post_response, parse_thread_response};
pub use guard::{Attempt, GenerationAttempt, GuardError, GuardedGenerator};
pub use prompts::GenerationOptions;
pub use providers::{ProviderError, TextGenerator};
pub use publish::{
    decide_auto_publish, PublishDecision, PublishGate, PublishReason, PublishVerdict, SkipReason,
};
pub use store::{DraftStore, HistoryStore, InMemoryStore, StoreError};
