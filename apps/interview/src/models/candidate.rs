use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identity fields for the person being interviewed.
/// Produced by the field extractor or typed in manually; missing fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl CandidateProfile {
    /// Fixed profile offered to users who want to try the flow without a resume.
    pub fn demo() -> Self {
        Self {
            name: "Demo Candidate".to_string(),
            email: "demo@example.com".to_string(),
            phone: "9999999999".to_string(),
        }
    }

    /// Email is the one field a candidate cannot progress without.
    pub fn has_email(&self) -> bool {
        !self.email.trim().is_empty()
    }

    /// Name shown in history: name, else email, else "Unknown".
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else if self.has_email() {
            &self.email
        } else {
            "Unknown"
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u32,
    pub summary: String,
}

/// A finished interview. Written once, at finish, and never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    /// Finish time in epoch milliseconds.
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub score: u32,
    pub summary: String,
    pub answers: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl CandidateRecord {
    pub fn new(
        profile: &CandidateProfile,
        result: &ScoreResult,
        answers: Vec<String>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: finished_at.timestamp_millis(),
            name: profile.display_name().to_string(),
            email: profile.email.clone(),
            phone: profile.phone.clone(),
            score: result.score,
            summary: result.summary.clone(),
            answers,
            timestamp: finished_at,
        }
    }
}
