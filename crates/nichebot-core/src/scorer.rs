//! Structural checks and score accumulation.
//!
//! The score starts at 100 and every failed check subtracts its penalty, with
//! the running value clamped into `[0, 100]` after each subtraction. Red-flag
//! penalties go through the same path so they show up in the check list
//! alongside the structural checks.

use crate::signals::Signals;
use crate::types::{CheckResult, RedFlag};

pub const PENALTY_POST_LENGTH: u32 = 24;
pub const PENALTY_HASHTAG_COUNT: u32 = 12;
pub const PENALTY_EMOJI_DENSITY: u32 = 8;
pub const PENALTY_UPPERCASE_RATIO: u32 = 10;
pub const PENALTY_PUNCTUATION_NOISE: u32 = 8;
pub const PENALTY_DUPLICATION: u32 = 20;
pub const PENALTY_THREAD_POST_COUNT: u32 = 18;
pub const PENALTY_THREAD_OVER_LIMIT_EACH: u32 = 10;
pub const PENALTY_THREAD_OVER_LIMIT_CAP: u32 = 30;
pub const PENALTY_THREAD_HOOK: u32 = 8;
pub const PENALTY_THREAD_HASHTAG_COUNT: u32 = 10;

/// Heuristic limits used by the checks and the resolver.
///
/// The similarity cutoff and the opening-hook heuristic are tuned constants
/// carried over from the production bot; override fields instead of editing
/// them in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    /// Maximum characters for a single post (and each thread post).
    pub post_max_chars: usize,
    /// Inclusive hashtag range for a single post.
    pub post_min_hashtags: usize,
    pub post_max_hashtags: usize,
    /// Maximum emoji before the density check fails.
    pub max_emoji: usize,
    /// Maximum ratio of uppercase letters to all letters.
    pub max_uppercase_ratio: f64,
    /// Similarity at or above this counts as a near-duplicate.
    pub max_similarity: f64,
    /// Inclusive post-count range for a thread.
    pub thread_min_posts: usize,
    pub thread_max_posts: usize,
    /// Inclusive hashtag range for a thread.
    pub thread_min_hashtags: usize,
    pub thread_max_hashtags: usize,
    /// A first post without `!`/`?` still hooks if it is at least this long.
    pub hook_min_chars: usize,
    /// Scores below this warn even without red flags.
    pub warn_below: u8,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            post_max_chars: 270,
            post_min_hashtags: 2,
            post_max_hashtags: 4,
            max_emoji: 3,
            max_uppercase_ratio: 0.35,
            max_similarity: 0.72,
            thread_min_posts: 2,
            thread_max_posts: 10,
            thread_min_hashtags: 1,
            thread_max_hashtags: 4,
            hook_min_chars: 70,
            warn_below: 70,
        }
    }
}

/// Running score with its audit trail of checks.
struct ScoreCard {
    score: f64,
    checks: Vec<CheckResult>,
}

impl ScoreCard {
    fn new() -> Self {
        Self {
            score: 100.0,
            checks: Vec::new(),
        }
    }

    fn apply(&mut self, code: &str, passed: bool, penalty: u32, detail: String) {
        let applied = if passed { 0 } else { penalty };
        self.checks.push(CheckResult {
            code: code.to_string(),
            passed,
            penalty: applied,
            detail,
        });
        self.score = (self.score - applied as f64).clamp(0.0, 100.0);
    }

    fn apply_red_flags(&mut self, red_flags: &[RedFlag]) {
        for flag in red_flags {
            self.apply(
                &format!("RED_FLAG_{}", flag.code),
                false,
                flag.severity.penalty(),
                format!("{} ({})", flag.message, flag.matched_text),
            );
        }
    }

    fn finish(self) -> (u8, Vec<CheckResult>) {
        let score = self.score.round().clamp(0.0, 100.0) as u8;
        (score, self.checks)
    }
}

/// Run the single-post checks and fold in the red flags.
pub(crate) fn score_post(
    text: &str,
    signals: &Signals,
    red_flags: &[RedFlag],
    thresholds: &Thresholds,
) -> (u8, Vec<CheckResult>) {
    let mut card = ScoreCard::new();
    let length = text.chars().count();
    let hashtag_count = signals.hashtags.len();

    card.apply(
        "TWEET_LENGTH",
        length <= thresholds.post_max_chars,
        PENALTY_POST_LENGTH,
        format!(
            "Post is {} characters (limit {}).",
            length, thresholds.post_max_chars
        ),
    );

    card.apply(
        "HASHTAG_COUNT",
        hashtag_count >= thresholds.post_min_hashtags
            && hashtag_count <= thresholds.post_max_hashtags,
        PENALTY_HASHTAG_COUNT,
        format!(
            "Hashtag count is {} (recommended {}-{}).",
            hashtag_count, thresholds.post_min_hashtags, thresholds.post_max_hashtags
        ),
    );

    card.apply(
        "EMOJI_DENSITY",
        signals.emoji_count <= thresholds.max_emoji,
        PENALTY_EMOJI_DENSITY,
        format!(
            "Emoji count is {} (recommended <={}).",
            signals.emoji_count, thresholds.max_emoji
        ),
    );

    card.apply(
        "UPPERCASE_RATIO",
        signals.uppercase_ratio <= thresholds.max_uppercase_ratio,
        PENALTY_UPPERCASE_RATIO,
        format!("Uppercase ratio is {}.", signals.uppercase_ratio),
    );

    card.apply(
        "PUNCTUATION_NOISE",
        !signals.repeated_punctuation,
        PENALTY_PUNCTUATION_NOISE,
        if signals.repeated_punctuation {
            "Repeated punctuation detected (e.g. !!! or ???).".to_string()
        } else {
            "No repeated punctuation.".to_string()
        },
    );

    card.apply(
        "RECENT_DUPLICATION",
        signals.similarity < thresholds.max_similarity,
        PENALTY_DUPLICATION,
        format!("Similarity to recent posts is {}.", signals.similarity),
    );

    card.apply_red_flags(red_flags);
    card.finish()
}

/// Run the thread checks and fold in the red flags.
pub(crate) fn score_thread(
    posts: &[String],
    signals: &Signals,
    red_flags: &[RedFlag],
    thresholds: &Thresholds,
) -> (u8, Vec<CheckResult>, usize) {
    let mut card = ScoreCard::new();
    let hashtag_count = signals.hashtags.len();

    card.apply(
        "THREAD_TWEET_COUNT",
        posts.len() >= thresholds.thread_min_posts && posts.len() <= thresholds.thread_max_posts,
        PENALTY_THREAD_POST_COUNT,
        format!(
            "Thread has {} posts (recommended {}-{}).",
            posts.len(),
            thresholds.thread_min_posts,
            thresholds.thread_max_posts
        ),
    );

    let over_limit = posts
        .iter()
        .filter(|p| p.chars().count() > thresholds.post_max_chars)
        .count();
    card.apply(
        "THREAD_TWEET_LENGTH",
        over_limit == 0,
        (over_limit as u32 * PENALTY_THREAD_OVER_LIMIT_EACH).min(PENALTY_THREAD_OVER_LIMIT_CAP),
        format!("{} posts exceed the character limit.", over_limit),
    );

    let has_hook = posts.first().is_some_and(|first| {
        first.contains(['!', '?']) || first.chars().count() >= thresholds.hook_min_chars
    });
    card.apply(
        "THREAD_OPENING_HOOK",
        has_hook,
        PENALTY_THREAD_HOOK,
        if has_hook {
            "Opening post reads like a hook.".to_string()
        } else {
            "Opening post needs a stronger hook.".to_string()
        },
    );

    card.apply(
        "HASHTAG_COUNT",
        hashtag_count >= thresholds.thread_min_hashtags
            && hashtag_count <= thresholds.thread_max_hashtags,
        PENALTY_THREAD_HASHTAG_COUNT,
        format!(
            "Hashtag count is {} (recommended {}-{}).",
            hashtag_count, thresholds.thread_min_hashtags, thresholds.thread_max_hashtags
        ),
    );

    card.apply(
        "RECENT_DUPLICATION",
        signals.similarity < thresholds.max_similarity,
        PENALTY_DUPLICATION,
        format!("Similarity to recent posts is {}.", signals.similarity),
    );

    card.apply_red_flags(red_flags);
    let (score, checks) = card.finish();
    (score, checks, over_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals;

    fn clean_signals() -> Signals {
        Signals {
            hashtags: vec!["#ai".to_string(), "#tech".to_string()],
            emoji_count: 0,
            uppercase_ratio: 0.0,
            repeated_punctuation: false,
            similarity: 0.0,
        }
    }

    #[test]
    fn clean_post_scores_100() {
        let (score, checks) = score_post("short post", &clean_signals(), &[], &Thresholds::default());
        assert_eq!(score, 100);
        assert!(checks.iter().all(|c| c.passed && c.penalty == 0));
    }

    #[test]
    fn over_length_post_loses_24() {
        let text = "a".repeat(300);
        let (score, checks) = score_post(&text, &clean_signals(), &[], &Thresholds::default());
        assert_eq!(score, 76);
        let length_check = checks.iter().find(|c| c.code == "TWEET_LENGTH").unwrap();
        assert!(!length_check.passed);
        assert_eq!(length_check.penalty, PENALTY_POST_LENGTH);
    }

    #[test]
    fn score_clamps_at_zero() {
        let mut bad = clean_signals();
        bad.hashtags.clear();
        bad.emoji_count = 10;
        bad.uppercase_ratio = 0.9;
        bad.repeated_punctuation = true;
        bad.similarity = 0.95;
        let text = "A".repeat(400);
        let flags = high_flags(3);
        let (score, _) = score_post(&text, &bad, &flags, &Thresholds::default());
        assert_eq!(score, 0);
    }

    fn high_flags(n: usize) -> Vec<crate::types::RedFlag> {
        use crate::types::{RedFlag, Severity};
        (0..n)
            .map(|i| RedFlag {
                code: format!("X{}", i),
                severity: Severity::High,
                message: "m".into(),
                matched_text: "t".into(),
            })
            .collect()
    }

    #[test]
    fn thread_over_limit_penalty_is_capped() {
        let posts: Vec<String> = (0..5).map(|_| "b".repeat(300)).collect();
        let mut sig = clean_signals();
        sig.hashtags = vec!["#one".to_string()];
        let (_, checks, over) = score_thread(&posts, &sig, &[], &Thresholds::default());
        assert_eq!(over, 5);
        let length_check = checks.iter().find(|c| c.code == "THREAD_TWEET_LENGTH").unwrap();
        assert_eq!(length_check.penalty, PENALTY_THREAD_OVER_LIMIT_CAP);
    }

    #[test]
    fn hook_accepts_question_or_length() {
        let t = Thresholds::default();
        let question = vec!["Kısa ama soru var?".to_string(), "devam".to_string()];
        let mut sig = clean_signals();
        sig.hashtags = vec!["#x1".to_string()];
        let (_, checks, _) = score_thread(&question, &sig, &[], &t);
        assert!(checks.iter().find(|c| c.code == "THREAD_OPENING_HOOK").unwrap().passed);

        let long_first = vec!["a".repeat(70), "devam".to_string()];
        let (_, checks, _) = score_thread(&long_first, &sig, &[], &t);
        assert!(checks.iter().find(|c| c.code == "THREAD_OPENING_HOOK").unwrap().passed);

        let weak = vec!["kısa giriş".to_string(), "devam".to_string()];
        let (_, checks, _) = score_thread(&weak, &sig, &[], &t);
        assert!(!checks.iter().find(|c| c.code == "THREAD_OPENING_HOOK").unwrap().passed);
    }

    #[test]
    fn signals_module_integration() {
        // extract() output feeds the scorer without adjustment
        let sig = signals::extract("Merhaba #ai #tech dünyası", "", &[]);
        let (score, _) = score_post("Merhaba #ai #tech dünyası", &sig, &[], &Thresholds::default());
        assert_eq!(score, 100);
    }
}
