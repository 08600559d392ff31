//! Core data model for quality evaluation.
//!
//! Every type here is plain data: built once by the evaluator, never mutated
//! afterwards. Re-evaluating edited content always produces a brand-new
//! [`QualityReport`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// One generated piece of content, before or after evaluation.
///
/// A `Post` is a single text with an optional tag line; a `Thread` is an
/// ordered sequence of post texts sharing one tag line. Regeneration builds a
/// new `ContentUnit` rather than editing an old one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContentUnit {
    Post { text: String, tags: String },
    Thread { posts: Vec<String>, tags: String },
}

impl ContentUnit {
    pub fn post(text: impl Into<String>, tags: impl Into<String>) -> Self {
        Self::Post {
            text: text.into(),
            tags: tags.into(),
        }
    }

    pub fn thread(posts: Vec<String>, tags: impl Into<String>) -> Self {
        Self::Thread {
            posts,
            tags: tags.into(),
        }
    }

    /// The body text checks run against: the post text itself, or the thread
    /// posts joined with newlines.
    pub fn body(&self) -> String {
        match self {
            Self::Post { text, .. } => text.trim().to_string(),
            Self::Thread { posts, .. } => posts
                .iter()
                .map(|p| p.trim())
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    pub fn tags(&self) -> &str {
        match self {
            Self::Post { tags, .. } | Self::Thread { tags, .. } => tags,
        }
    }
}

/// Risk level of a matched red-flag rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Score penalty applied once per matched flag.
    pub const fn penalty(self) -> u32 {
        match self {
            Severity::High => 35,
            Severity::Medium => 16,
            Severity::Low => 8,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
        }
    }
}

/// The gate's disposition for a piece of content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Allow,
    Warn,
    Block,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Allow => write!(f, "allow"),
            Action::Warn => write!(f, "warn"),
            Action::Block => write!(f, "block"),
        }
    }
}

/// Letter grade derived from the final score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    pub fn from_score(score: u8) -> Self {
        match score {
            90..=u8::MAX => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Grade::A => write!(f, "A"),
            Grade::B => write!(f, "B"),
            Grade::C => write!(f, "C"),
            Grade::D => write!(f, "D"),
            Grade::F => write!(f, "F"),
        }
    }
}

/// Outcome of one structural or red-flag check. `penalty` is what was
/// actually subtracted, so it is zero whenever `passed` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckResult {
    pub code: String,
    pub passed: bool,
    pub penalty: u32,
    pub detail: String,
}

/// A safety/policy rule match. Absence of a flag for a given code means that
/// rule did not match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedFlag {
    pub code: String,
    pub severity: Severity,
    pub message: String,
    pub matched_text: String,
}

/// Derived metrics attached to a report, variant-specific.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportSummary {
    Post {
        content_length: usize,
        hashtag_count: usize,
        emoji_count: usize,
        uppercase_ratio: f64,
        duplication_similarity: f64,
    },
    Thread {
        post_count: usize,
        over_limit_count: usize,
        hashtag_count: usize,
        duplication_similarity: f64,
    },
}

/// Full structured output of evaluating a [`ContentUnit`].
///
/// Derived entirely from the content and the recent-history slice; evaluating
/// the same inputs twice yields identical reports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub score: u8,
    pub grade: Grade,
    pub action: Action,
    pub checks: Vec<CheckResult>,
    pub red_flags: Vec<RedFlag>,
    pub summary: ReportSummary,
}
