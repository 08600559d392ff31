//! Guarded generation pipeline.
//!
//! One generation request walks an explicit two-state machine:
//!
//! ```text
//! FIRST_ATTEMPT --evaluate--> non-block --> SUCCEEDED
//!       |
//!       | block (retry signal emitted once)
//!       v
//! RETRY_ATTEMPT --evaluate--> non-block --> SUCCEEDED
//!       |
//!       | block
//!       v
//!    FAILED (QualityBlocked)
//! ```
//!
//! The provider is called at most twice, never zero times. A transport error
//! on either call aborts the whole request immediately; nothing here retries
//! transport failures. The pipeline holds no mutable state across requests,
//! so one instance can serve concurrent topics without locking.

use std::sync::Arc;
use thiserror::Error;

use nichebot_core::{
    evaluate_with, summarize_red_flags, Action, Catalog, ContentUnit, QualityReport, Thresholds,
};

use crate::config::RuntimeConfig;
use crate::generator::{parse_post_response, parse_thread_response};
use crate::prompts::{self, GenerationOptions};
use crate::providers::{ChatMessage, GenerationConfig, ProviderError, TextGenerator};

/// How many red flags a terminal failure message lists.
const BLOCK_SUMMARY_MAX_FLAGS: usize = 3;

/// Which pass of the state machine produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attempt {
    First,
    Retry,
}

impl Attempt {
    /// 1-based attempt number; the machine never goes past 2.
    pub fn number(self) -> u8 {
        match self {
            Attempt::First => 1,
            Attempt::Retry => 2,
        }
    }
}

/// A successful pass: the content that survived the gate and its report.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationAttempt {
    pub attempt: Attempt,
    pub unit: ContentUnit,
    pub report: QualityReport,
}

/// Terminal errors from the pipeline.
#[derive(Error, Debug)]
pub enum GuardError {
    /// The provider failed; propagated untouched, never retried here.
    #[error("Text generation failed: {0}")]
    Transport(#[from] ProviderError),

    /// Both attempts were blocked by the quality gate.
    #[error("Content blocked after retry; red flags: {summary}")]
    QualityBlocked { summary: String },
}

/// The guarded generation pipeline.
///
/// Construct one at process start and share it; every dependency is injected
/// here, nothing is looked up globally during a request.
pub struct GuardedGenerator {
    provider: Arc<dyn TextGenerator>,
    thresholds: Thresholds,
    catalog: Catalog,
    request: GenerationConfig,
}

impl GuardedGenerator {
    pub fn new(provider: Arc<dyn TextGenerator>, config: &RuntimeConfig) -> Self {
        Self {
            provider,
            thresholds: Thresholds::default(),
            catalog: Catalog::builtin().clone(),
            request: config.generation_config(),
        }
    }

    /// Override the evaluation thresholds.
    pub fn with_thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// Override the red-flag catalog (e.g. one loaded from a YAML extension).
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Generate a single post for `topic` and run it through the gate.
    ///
    /// `history` is the recent-texts slice used for the duplication signal;
    /// callers fetch it from their history store before calling in.
    pub async fn generate_post(
        &self,
        topic: &str,
        options: &GenerationOptions,
        history: &[String],
    ) -> Result<GenerationAttempt, GuardError> {
        let system = prompts::post_system_prompt(topic, options);
        let user = prompts::post_user_message(topic, options);
        self.run(system, user, parse_post_response, history).await
    }

    /// Generate a thread of `count` posts and run it through the gate.
    pub async fn generate_thread(
        &self,
        topic: &str,
        count: usize,
        options: &GenerationOptions,
        history: &[String],
    ) -> Result<GenerationAttempt, GuardError> {
        let system = prompts::thread_system_prompt(topic, count, options);
        let user = prompts::thread_user_message(topic, count);
        self.run(system, user, parse_thread_response, history).await
    }

    async fn run(
        &self,
        system: String,
        user: String,
        parse: fn(&str) -> ContentUnit,
        history: &[String],
    ) -> Result<GenerationAttempt, GuardError> {
        // FIRST_ATTEMPT
        let first = self.call_provider(&system, &user).await?;
        let unit = parse(&first);
        let report = evaluate_with(&unit, history, &self.thresholds, &self.catalog);

        if report.action != Action::Block {
            return Ok(GenerationAttempt {
                attempt: Attempt::First,
                unit,
                report,
            });
        }

        // The single retry signal between the two attempts.
        tracing::warn!(
            flags = %summarize_red_flags(&report.red_flags, BLOCK_SUMMARY_MAX_FLAGS),
            score = report.score,
            "first attempt blocked, retrying with safety instruction"
        );

        // RETRY_ATTEMPT
        let hardened = format!("{}\n\n{}", system, prompts::SAFETY_INSTRUCTION);
        let second = self.call_provider(&hardened, &user).await?;
        let unit = parse(&second);
        let report = evaluate_with(&unit, history, &self.thresholds, &self.catalog);

        if report.action != Action::Block {
            return Ok(GenerationAttempt {
                attempt: Attempt::Retry,
                unit,
                report,
            });
        }

        Err(GuardError::QualityBlocked {
            summary: summarize_red_flags(&report.red_flags, BLOCK_SUMMARY_MAX_FLAGS),
        })
    }

    async fn call_provider(&self, system: &str, user: &str) -> Result<String, GuardError> {
        let messages = vec![ChatMessage::system(system), ChatMessage::user(user)];
        let response = self.provider.complete(messages, &self.request).await?;
        Ok(response.content)
    }
}
