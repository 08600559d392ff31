//! Auto-publish gate.
//!
//! The scheduler consults this before posting unattended. The decision reads
//! a stored quality score; it never re-evaluates content, never mutates a
//! report, and never triggers regeneration. Unattended publishing gets
//! exactly one evaluation, the one produced by the guarded pipeline.

use chrono::NaiveDate;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::RuntimeConfig;

/// Why an auto-publish decision came out the way it did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishReason {
    Ok,
    BelowThreshold,
}

/// Pure threshold decision for one stored score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishDecision {
    pub publish: bool,
    pub reason: PublishReason,
}

/// Compare a stored quality score against the configured minimum.
pub fn decide_auto_publish(stored_score: u8, min_score: u8) -> PublishDecision {
    if stored_score >= min_score {
        PublishDecision {
            publish: true,
            reason: PublishReason::Ok,
        }
    } else {
        PublishDecision {
            publish: false,
            reason: PublishReason::BelowThreshold,
        }
    }
}

/// Why a scheduled publish was skipped. Callers must record this so a
/// quality skip is distinguishable from a limit skip in logs and stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    QualityThreshold,
    DailyLimitExceeded,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::QualityThreshold => write!(f, "quality_threshold"),
            SkipReason::DailyLimitExceeded => write!(f, "daily_limit_exceeded"),
        }
    }
}

/// Outcome of a scheduler-side publish check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishVerdict {
    Publish,
    Skip(SkipReason),
}

struct DailyCounter {
    day: Option<NaiveDate>,
    count: u32,
}

/// Scheduler-facing gate combining the daily post limit with the quality
/// threshold.
///
/// Construct one at process start; the counter is date-bucketed, so the
/// count resets when a check arrives with a new date. The caller supplies
/// `today` rather than this gate reading the clock, which keeps checks
/// reproducible in tests.
pub struct PublishGate {
    min_score: u8,
    max_daily_posts: u32,
    counter: Mutex<DailyCounter>,
}

impl PublishGate {
    pub fn new(config: &RuntimeConfig) -> Self {
        Self {
            min_score: config.min_auto_publish_score,
            max_daily_posts: config.max_daily_posts,
            counter: Mutex::new(DailyCounter {
                day: None,
                count: 0,
            }),
        }
    }

    /// Decide whether a draft with `stored_score` may go out today.
    ///
    /// The daily limit is checked first, matching the scheduler's original
    /// order; a limit skip must not be misreported as a quality skip.
    pub fn check(&self, stored_score: u8, today: NaiveDate) -> PublishVerdict {
        {
            let mut counter = self.counter.lock();
            if counter.day != Some(today) {
                counter.day = Some(today);
                counter.count = 0;
            }
            if counter.count >= self.max_daily_posts {
                tracing::info!(limit = self.max_daily_posts, "daily post limit reached, skipping");
                return PublishVerdict::Skip(SkipReason::DailyLimitExceeded);
            }
        }

        let decision = decide_auto_publish(stored_score, self.min_score);
        if decision.publish {
            PublishVerdict::Publish
        } else {
            tracing::info!(
                score = stored_score,
                min_score = self.min_score,
                "quality below auto-publish threshold, skipping"
            );
            PublishVerdict::Skip(SkipReason::QualityThreshold)
        }
    }

    /// Record a successful publish so the daily limit advances.
    pub fn record_published(&self, today: NaiveDate) {
        let mut counter = self.counter.lock();
        if counter.day != Some(today) {
            counter.day = Some(today);
            counter.count = 0;
        }
        counter.count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(n: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, n).unwrap()
    }

    fn gate(min_score: u8, max_daily: u32) -> PublishGate {
        let config = RuntimeConfig {
            min_auto_publish_score: min_score,
            max_daily_posts: max_daily,
            ..Default::default()
        };
        PublishGate::new(&config)
    }

    #[test]
    fn decide_auto_publish_threshold() {
        assert!(decide_auto_publish(80, 65).publish);
        assert_eq!(decide_auto_publish(80, 65).reason, PublishReason::Ok);

        let below = decide_auto_publish(50, 65);
        assert!(!below.publish);
        assert_eq!(below.reason, PublishReason::BelowThreshold);
    }

    #[test]
    fn boundary_score_publishes() {
        assert!(decide_auto_publish(65, 65).publish);
        assert!(!decide_auto_publish(64, 65).publish);
    }

    #[test]
    fn quality_skip_is_distinct_from_limit_skip() {
        let gate = gate(65, 2);

        assert_eq!(
            gate.check(50, day(1)),
            PublishVerdict::Skip(SkipReason::QualityThreshold)
        );

        gate.record_published(day(1));
        gate.record_published(day(1));
        assert_eq!(
            gate.check(90, day(1)),
            PublishVerdict::Skip(SkipReason::DailyLimitExceeded)
        );
    }

    #[test]
    fn daily_limit_resets_on_a_new_day() {
        let gate = gate(65, 1);

        gate.record_published(day(1));
        assert_eq!(
            gate.check(90, day(1)),
            PublishVerdict::Skip(SkipReason::DailyLimitExceeded)
        );

        assert_eq!(gate.check(90, day(2)), PublishVerdict::Publish);
    }

    #[test]
    fn skip_reason_display_matches_log_keys() {
        assert_eq!(SkipReason::QualityThreshold.to_string(), "quality_threshold");
        assert_eq!(
            SkipReason::DailyLimitExceeded.to_string(),
            "daily_limit_exceeded"
        );
    }
}
