//! Finalization: turns a finished answer set into a score.
//!
//! The remote scoring service is preferred; any failure falls back, silently,
//! to the deterministic [`fallback`] formula. Callers never see a scoring error.

pub mod client;
pub mod fallback;
pub mod finalize;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::candidate::{CandidateProfile, ScoreResult};

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Scoring service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Malformed scoring response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A scoring backend. Swappable without touching the session runtime.
#[async_trait]
pub trait ScoringService: Send + Sync {
    async fn score(
        &self,
        profile: &CandidateProfile,
        answers: &[String],
    ) -> Result<ScoreResult, ScoringError>;
}
