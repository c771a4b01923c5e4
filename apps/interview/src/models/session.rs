use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::candidate::CandidateProfile;

/// Serialized in-progress interview, enough to resume after a restart.
/// At most one is persisted at a time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    pub profile: CandidateProfile,
    pub current_index: usize,
    /// One slot per question; unanswered slots are empty strings.
    pub answers: Vec<String>,
    /// Seconds left on the current question. Zero or missing means "full budget".
    #[serde(default)]
    pub time_remaining: i64,
    pub timestamp: DateTime<Utc>,
}
