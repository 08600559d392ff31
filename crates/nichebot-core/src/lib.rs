//! # nichebot-core
//!
//! Deterministic content quality gate for LLM-generated social posts.
//!
//! This crate answers one question: may this generated content go out as-is,
//! should a human look at it first, or must it be blocked?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: same content + same history always produces the same
//!    report, bit for bit. No clock, no randomness, no hidden state.
//! 2. **No LLM calls**: evaluation is rule-based; the model that produced the
//!    text is never consulted about its quality.
//! 3. **Never fails**: malformed or empty input degrades to default signals
//!    instead of erroring.
//! 4. **Traceable**: every point lost is recorded as a [`CheckResult`] and
//!    every safety match as a [`RedFlag`].
//!
//! ## Example
//!
//! ```rust
//! use nichebot_core::{evaluate, Action, ContentUnit};
//!
//! let unit = ContentUnit::post(
//!     "Yapay zeka araçları ekip verimini nasıl değiştiriyor? Bugün denedik.",
//!     "#yapayzeka #verimlilik",
//! );
//! let report = evaluate(&unit, &[]);
//!
//! assert_eq!(report.action, Action::Allow);
//! assert!(report.red_flags.is_empty());
//! ```

pub mod catalog;
pub mod report;
pub mod resolver;
pub mod scorer;
pub mod signals;
pub mod types;

// Re-export main types at crate root
pub use catalog::{Catalog, CatalogError, RedFlagRule};
pub use report::summarize_red_flags;
pub use resolver::resolve_action;
pub use scorer::Thresholds;
pub use signals::Signals;
pub use types::{
    Action, CheckResult, ContentUnit, Grade, QualityReport, RedFlag, ReportSummary, Severity,
};

/// Evaluate a content unit with the default thresholds and the built-in
/// red-flag catalog.
///
/// `history` is the read-only list of recently published texts for the same
/// topic; it is only used for the near-duplicate similarity signal.
pub fn evaluate(unit: &ContentUnit, history: &[String]) -> QualityReport {
    evaluate_with(unit, history, &Thresholds::default(), Catalog::builtin())
}

/// Evaluate with explicit thresholds and catalog.
///
/// Both are passed in by reference so callers construct them once at startup
/// and share them; nothing here reaches for globals.
pub fn evaluate_with(
    unit: &ContentUnit,
    history: &[String],
    thresholds: &Thresholds,
    catalog: &Catalog,
) -> QualityReport {
    match unit {
        ContentUnit::Post { text, tags } => {
            let text = text.trim();
            let tags = tags.trim();
            let sig = signals::extract(text, tags, history);
            let red_flags = catalog.detect(&format!("{}\n{}", text, tags));
            let (score, checks) = scorer::score_post(text, &sig, &red_flags, thresholds);
            let summary = ReportSummary::Post {
                content_length: text.chars().count(),
                hashtag_count: sig.hashtags.len(),
                emoji_count: sig.emoji_count,
                uppercase_ratio: sig.uppercase_ratio,
                duplication_similarity: sig.similarity,
            };
            build_report(score, checks, red_flags, summary, thresholds)
        }
        ContentUnit::Thread { posts, tags } => {
            let posts: Vec<String> = posts.iter().map(|p| p.trim().to_string()).collect();
            let tags = tags.trim();
            let joined = posts.join("\n");
            let sig = signals::extract(&joined, tags, history);
            let red_flags = catalog.detect(&format!("{}\n{}", joined, tags));
            let (score, checks, over_limit) =
                scorer::score_thread(&posts, &sig, &red_flags, thresholds);
            let summary = ReportSummary::Thread {
                post_count: posts.len(),
                over_limit_count: over_limit,
                hashtag_count: sig.hashtags.len(),
                duplication_similarity: sig.similarity,
            };
            build_report(score, checks, red_flags, summary, thresholds)
        }
    }
}

fn build_report(
    score: u8,
    checks: Vec<CheckResult>,
    red_flags: Vec<RedFlag>,
    summary: ReportSummary,
    thresholds: &Thresholds,
) -> QualityReport {
    QualityReport {
        score,
        grade: Grade::from_score(score),
        action: resolver::resolve_action(score, &red_flags, thresholds),
        checks,
        red_flags,
        summary,
    }
}
