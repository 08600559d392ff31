//! Structural signal extraction.
//!
//! Pure measurements over text: hashtags, emoji density, uppercase ratio,
//! punctuation noise, and near-duplicate similarity against recent history.
//! No I/O, no clock, no shared state.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

lazy_static! {
    /// A tag token: `#` plus 2-50 word/number/underscore/hyphen characters,
    /// anchored to start-of-text or whitespace.
    static ref HASHTAG_PATTERN: Regex = Regex::new(r"(^|\s)(#[\p{L}\p{N}_-]{2,50})").unwrap();

    /// Pictographic code points (emoji and friends).
    static ref EMOJI_PATTERN: Regex = Regex::new(r"\p{Extended_Pictographic}").unwrap();

    /// Letters counted for the uppercase ratio: Latin plus the Turkish set.
    static ref LETTER_PATTERN: Regex = Regex::new(r"[A-Za-zÇĞİÖŞÜçğıöşü]").unwrap();

    static ref UPPERCASE_PATTERN: Regex = Regex::new(r"[A-ZÇĞİÖŞÜ]").unwrap();

    static ref URL_PATTERN: Regex = Regex::new(r"https?://\S+").unwrap();

    static ref NON_WORD_PATTERN: Regex = Regex::new(r"[^\p{L}\p{N}\s]").unwrap();
}

/// All structural measurements for one piece of content.
#[derive(Debug, Clone, PartialEq)]
pub struct Signals {
    pub hashtags: Vec<String>,
    pub emoji_count: usize,
    pub uppercase_ratio: f64,
    pub repeated_punctuation: bool,
    pub similarity: f64,
}

/// Extract every signal in one pass. Hashtags are scanned over the body and
/// the separate tag field; similarity compares the body against each history
/// entry.
pub fn extract(content: &str, tags: &str, history: &[String]) -> Signals {
    let combined = format!("{}\n{}", content, tags);
    Signals {
        hashtags: extract_hashtags(&combined),
        emoji_count: emoji_count(content),
        uppercase_ratio: uppercase_ratio(content),
        repeated_punctuation: has_repeated_punctuation(content),
        similarity: max_similarity(content, history),
    }
}

/// De-duplicated, lowercased hashtags in order of first appearance.
pub fn extract_hashtags(text: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in HASHTAG_PATTERN.captures_iter(text) {
        if let Some(tag) = caps.get(2) {
            let lowered = tag.as_str().to_lowercase();
            if !seen.contains(&lowered) {
                seen.push(lowered);
            }
        }
    }
    seen
}

/// Number of pictographic code points in the text.
pub fn emoji_count(text: &str) -> usize {
    EMOJI_PATTERN.find_iter(text).count()
}

/// Ratio of uppercase letters to all letters, 0 when the text has no letters.
/// Rounded to 3 decimals.
pub fn uppercase_ratio(text: &str) -> f64 {
    let letters = LETTER_PATTERN.find_iter(text).count();
    if letters == 0 {
        return 0.0;
    }
    let upper = UPPERCASE_PATTERN.find_iter(text).count();
    round3(upper as f64 / letters as f64)
}

/// True iff the text contains 3+ consecutive identical marks among `!?.,`.
/// The regex crate has no backreferences, so this is a plain scan.
pub fn has_repeated_punctuation(text: &str) -> bool {
    let mut run_char = '\0';
    let mut run_len = 0usize;
    for c in text.chars() {
        if matches!(c, '!' | '?' | '.' | ',') && c == run_char {
            run_len += 1;
            if run_len >= 3 {
                return true;
            }
        } else {
            run_char = c;
            run_len = 1;
        }
    }
    false
}

/// Tokens for similarity: lowercase alphanumeric runs of 3+ characters, with
/// URLs stripped first.
pub(crate) fn tokenize(text: &str) -> BTreeSet<String> {
    let lowered = text.to_lowercase();
    let without_urls = URL_PATTERN.replace_all(&lowered, " ");
    let words_only = NON_WORD_PATTERN.replace_all(&without_urls, " ");
    words_only
        .split_whitespace()
        .filter(|token| token.chars().count() >= 3)
        .map(|token| token.to_string())
        .collect()
}

/// Maximum Jaccard similarity between the content and each history entry.
/// 0 when the history is empty or either side tokenizes to nothing. Rounded
/// to 3 decimals.
pub fn max_similarity(content: &str, history: &[String]) -> f64 {
    let current = tokenize(content);
    if current.is_empty() {
        return 0.0;
    }

    let mut max = 0.0f64;
    for previous in history {
        let prev_tokens = tokenize(previous);
        if prev_tokens.is_empty() {
            continue;
        }

        let intersection = current.intersection(&prev_tokens).count();
        let union = current.len() + prev_tokens.len() - intersection;
        if union == 0 {
            continue;
        }

        let similarity = intersection as f64 / union as f64;
        if similarity > max {
            max = similarity;
        }
    }

    round3(max)
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
