//! Action resolution.
//!
//! The decision table is fixed policy, evaluated strictly in priority order:
//! 1. Any high-severity flag blocks, regardless of score.
//! 2. Any remaining flag warns.
//! 3. A score below the warn threshold warns.
//! 4. Otherwise the content is allowed.

use crate::scorer::Thresholds;
use crate::types::{Action, RedFlag, Severity};

pub fn resolve_action(score: u8, red_flags: &[RedFlag], thresholds: &Thresholds) -> Action {
    if red_flags.iter().any(|f| f.severity == Severity::High) {
        return Action::Block;
    }
    if !red_flags.is_empty() {
        return Action::Warn;
    }
    if score < thresholds.warn_below {
        return Action::Warn;
    }
    Action::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(severity: Severity) -> RedFlag {
        RedFlag {
            code: "TEST".to_string(),
            severity,
            message: "m".to_string(),
            matched_text: "t".to_string(),
        }
    }

    #[test]
    fn high_flag_blocks_even_with_perfect_score() {
        let action = resolve_action(100, &[flag(Severity::High)], &Thresholds::default());
        assert_eq!(action, Action::Block);
    }

    #[test]
    fn medium_flag_warns_but_never_blocks() {
        let action = resolve_action(100, &[flag(Severity::Medium)], &Thresholds::default());
        assert_eq!(action, Action::Warn);
    }

    #[test]
    fn low_score_warns_without_flags() {
        assert_eq!(resolve_action(69, &[], &Thresholds::default()), Action::Warn);
        assert_eq!(resolve_action(70, &[], &Thresholds::default()), Action::Allow);
    }

    #[test]
    fn block_takes_priority_over_warn() {
        let flags = vec![flag(Severity::Low), flag(Severity::High)];
        assert_eq!(resolve_action(10, &flags, &Thresholds::default()), Action::Block);
    }
}
