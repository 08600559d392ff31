//! Response parsing.
//!
//! Providers return free text; these functions recover the structured
//! [`ContentUnit`] from the response-format contract in [`crate::prompts`].
//! Parsing is tolerant: a response without markers is treated as the whole
//! post body with no tags.

use lazy_static::lazy_static;
use nichebot_core::ContentUnit;
use regex::Regex;

lazy_static! {
    static ref TWEET_SECTION: Regex =
        Regex::new(r"(?s)TWEET:\s*(.+?)(?:\nHASHTAGS:|$)").unwrap();
    static ref THREAD_SECTION: Regex =
        Regex::new(r"(?s)THREAD:\s*(.+?)(?:\nHASHTAGS:|$)").unwrap();
    static ref HASHTAG_SECTION: Regex = Regex::new(r"HASHTAGS:\s*(.+)").unwrap();
    static ref THREAD_SPLIT: Regex = Regex::new(r"\n\d+/\s*").unwrap();
    static ref LEADING_NUMBER: Regex = Regex::new(r"^\d+/\s*").unwrap();
}

/// Parse a single-post response.
pub fn parse_post_response(response: &str) -> ContentUnit {
    let text = TWEET_SECTION
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| response.trim().to_string());

    let tags = extract_tags(response);
    ContentUnit::post(text, tags)
}

/// Parse a thread response into its ordered posts.
pub fn parse_thread_response(response: &str) -> ContentUnit {
    let section = THREAD_SECTION
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_else(|| response.trim().to_string());

    let posts: Vec<String> = THREAD_SPLIT
        .split(&section)
        .map(|part| LEADING_NUMBER.replace(part.trim(), "").trim().to_string())
        .filter(|part| !part.is_empty())
        .collect();

    let tags = extract_tags(response);
    ContentUnit::thread(posts, tags)
}

fn extract_tags(response: &str) -> String {
    HASHTAG_SECTION
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default()
}
