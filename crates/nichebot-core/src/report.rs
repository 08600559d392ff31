//! Report helpers shared by the runtime and the CLI.

use crate::types::RedFlag;

/// Compact `CODE:severity` listing for notifications and error messages,
/// capped for readability. Returns `"none"` when there are no flags.
pub fn summarize_red_flags(red_flags: &[RedFlag], max_items: usize) -> String {
    if red_flags.is_empty() {
        return "none".to_string();
    }
    red_flags
        .iter()
        .take(max_items)
        .map(|flag| format!("{}:{}", flag.code, flag.severity))
        .collect::<Vec<_>>()
        .join(", ")
}
