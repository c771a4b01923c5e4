//! Persistence for the live session snapshot and the candidate history.
//!
//! Storage is best-effort: [`InterviewStorage`] logs and swallows every store
//! failure. The worst case is losing the ability to resume, never a crash.

#[cfg(test)]
pub mod memory;
pub mod redis_store;

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

use crate::models::candidate::CandidateRecord;
use crate::models::session::SessionSnapshot;

#[cfg(test)]
pub use memory::MemoryStore;
pub use redis_store::RedisStore;

/// Key holding the single in-progress session snapshot.
pub const SESSION_KEY: &str = "interview:v1:session";
/// Key holding the candidate history, most recent first.
pub const CANDIDATES_KEY: &str = "interview:v1:candidates";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Raised by the failing test store.
    #[cfg(test)]
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Minimal string key-value store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    async fn clear(&self, key: &str) -> Result<(), StoreError>;
}

#[derive(Clone)]
pub struct InterviewStorage {
    store: Arc<dyn KeyValueStore>,
}

impl InterviewStorage {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn load_session(&self) -> Option<SessionSnapshot> {
        self.load_json(SESSION_KEY).await
    }

    pub async fn save_session(&self, snapshot: &SessionSnapshot) {
        if let Err(e) = self.write_json(SESSION_KEY, snapshot).await {
            warn!(error = %e, session_id = %snapshot.session_id, "Failed to save session snapshot");
        }
    }

    pub async fn clear_session(&self) {
        if let Err(e) = self.store.clear(SESSION_KEY).await {
            warn!(error = %e, "Failed to clear session snapshot");
        }
    }

    /// Inserts at the head of the history (read-modify-write, last write wins).
    pub async fn save_candidate(&self, record: CandidateRecord) {
        let mut history = self.load_candidates().await;
        history.insert(0, record);
        if let Err(e) = self.write_json(CANDIDATES_KEY, &history).await {
            warn!(error = %e, "Failed to save candidate record");
        }
    }

    pub async fn load_candidates(&self) -> Vec<CandidateRecord> {
        self.load_json(CANDIDATES_KEY).await.unwrap_or_default()
    }

    async fn load_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key).await {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, key, "Failed to read from store");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, key, "Discarding unreadable stored value");
                None
            }
        }
    }

    async fn write_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        let raw = serde_json::to_string(value)?;
        self.store.set(key, &raw).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::models::candidate::{CandidateProfile, ScoreResult};

    /// A store whose every operation fails.
    struct BrokenStore;

    #[async_trait]
    impl KeyValueStore for BrokenStore {
        async fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
        async fn clear(&self, _key: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("down".to_string()))
        }
    }

    fn snapshot() -> SessionSnapshot {
        SessionSnapshot {
            session_id: "s-1".to_string(),
            profile: CandidateProfile::demo(),
            current_index: 2,
            answers: vec!["a".to_string(), "b".to_string(), String::new()],
            time_remaining: 41,
            timestamp: Utc::now(),
        }
    }

    fn record(score: u32) -> CandidateRecord {
        CandidateRecord::new(
            &CandidateProfile::demo(),
            &ScoreResult {
                score,
                summary: "s".to_string(),
            },
            vec![],
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_session_save_load_clear() {
        let storage = InterviewStorage::new(Arc::new(MemoryStore::default()));
        assert!(storage.load_session().await.is_none());

        let stored = snapshot();
        storage.save_session(&stored).await;
        assert_eq!(storage.load_session().await, Some(stored));

        storage.clear_session().await;
        assert!(storage.load_session().await.is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins() {
        let storage = InterviewStorage::new(Arc::new(MemoryStore::default()));
        storage.save_session(&snapshot()).await;
        let mut newer = snapshot();
        newer.current_index = 3;
        storage.save_session(&newer).await;
        assert_eq!(storage.load_session().await.unwrap().current_index, 3);
    }

    #[tokio::test]
    async fn test_candidates_most_recent_first() {
        let storage = InterviewStorage::new(Arc::new(MemoryStore::default()));
        storage.save_candidate(record(10)).await;
        storage.save_candidate(record(20)).await;
        storage.save_candidate(record(30)).await;

        let scores: Vec<u32> = storage.load_candidates().await.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![30, 20, 10]);
    }

    #[tokio::test]
    async fn test_failures_are_swallowed() {
        let storage = InterviewStorage::new(Arc::new(BrokenStore));
        storage.save_session(&snapshot()).await;
        storage.clear_session().await;
        storage.save_candidate(record(5)).await;
        assert!(storage.load_session().await.is_none());
        assert!(storage.load_candidates().await.is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_ignored() {
        let store = Arc::new(MemoryStore::default());
        store.set(SESSION_KEY, "{not json").await.unwrap();
        let storage = InterviewStorage::new(store);
        assert!(storage.load_session().await.is_none());
    }
}
