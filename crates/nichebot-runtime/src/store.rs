//! Collaborator traits for history and draft persistence.
//!
//! The pipeline does not own a database. Callers hand it recent texts and
//! receive evaluated drafts back through these traits; the in-memory
//! implementation backs tests and the CLI demo.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

use nichebot_core::{ContentUnit, RedFlag};

#[derive(Error, Debug)]
#[error("Store operation failed: {0}")]
pub struct StoreError(pub String);

/// Read-only source of recently published/drafted texts per topic.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Most recent texts for `topic`, newest first, at most `limit`.
    async fn recent_texts(&self, topic: &str, limit: usize) -> Result<Vec<String>, StoreError>;
}

/// Sink for evaluated drafts. The gate only requires that the content, its
/// score, and its red flags stay retrievable for later threshold checks.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_draft(
        &self,
        topic: &str,
        unit: &ContentUnit,
        score: u8,
        red_flags: &[RedFlag],
    ) -> Result<(), StoreError>;
}

#[derive(Debug, Clone)]
struct StoredDraft {
    body: String,
    score: u8,
    red_flag_codes: Vec<String>,
}

/// In-memory store keyed by topic. Newest entries first.
#[derive(Default)]
pub struct InMemoryStore {
    drafts: RwLock<HashMap<String, Vec<StoredDraft>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored score of the newest draft for `topic`, if any. Used by the
    /// publish gate demo and tests.
    pub fn latest_score(&self, topic: &str) -> Option<u8> {
        self.drafts
            .read()
            .get(topic)
            .and_then(|entries| entries.first())
            .map(|d| d.score)
    }

    /// Red-flag codes recorded with the newest draft for `topic`.
    pub fn latest_red_flags(&self, topic: &str) -> Option<Vec<String>> {
        self.drafts
            .read()
            .get(topic)
            .and_then(|entries| entries.first())
            .map(|d| d.red_flag_codes.clone())
    }
}

#[async_trait]
impl HistoryStore for InMemoryStore {
    async fn recent_texts(&self, topic: &str, limit: usize) -> Result<Vec<String>, StoreError> {
        Ok(self
            .drafts
            .read()
            .get(topic)
            .map(|entries| {
                entries
                    .iter()
                    .take(limit)
                    .map(|d| d.body.clone())
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[async_trait]
impl DraftStore for InMemoryStore {
    async fn save_draft(
        &self,
        topic: &str,
        unit: &ContentUnit,
        score: u8,
        red_flags: &[RedFlag],
    ) -> Result<(), StoreError> {
        let draft = StoredDraft {
            body: unit.body(),
            score,
            red_flag_codes: red_flags.iter().map(|f| f.code.clone()).collect(),
        };
        self.drafts
            .write()
            .entry(topic.to_string())
            .or_default()
            .insert(0, draft);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn drafts_round_trip_newest_first() {
        let store = InMemoryStore::new();
        let first = ContentUnit::post("ilk taslak", "#a1");
        let second = ContentUnit::post("ikinci taslak", "#a1");

        store.save_draft("ai", &first, 80, &[]).await.unwrap();
        store.save_draft("ai", &second, 90, &[]).await.unwrap();

        let texts = store.recent_texts("ai", 10).await.unwrap();
        assert_eq!(texts, vec!["ikinci taslak", "ilk taslak"]);
        assert_eq!(store.latest_score("ai"), Some(90));
    }

    #[tokio::test]
    async fn limit_is_respected() {
        let store = InMemoryStore::new();
        for i in 0..5 {
            let unit = ContentUnit::post(format!("taslak {}", i), "");
            store.save_draft("t", &unit, 70, &[]).await.unwrap();
        }
        let texts = store.recent_texts("t", 3).await.unwrap();
        assert_eq!(texts.len(), 3);
    }

    #[tokio::test]
    async fn unknown_topic_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.recent_texts("yok", 5).await.unwrap().is_empty());
        assert_eq!(store.latest_score("yok"), None);
    }

    #[tokio::test]
    async fn red_flag_codes_are_stored() {
        let store = InMemoryStore::new();
        let unit = ContentUnit::post("metin", "");
        let flags = vec![RedFlag {
            code: "SPAMMY_CTA".to_string(),
            severity: nichebot_core::Severity::Medium,
            message: "m".to_string(),
            matched_text: "t".to_string(),
        }];
        store.save_draft("t", &unit, 60, &flags).await.unwrap();

        let drafts = store.drafts.read();
        assert_eq!(drafts["t"][0].red_flag_codes, vec!["SPAMMY_CTA"]);
    }
}
