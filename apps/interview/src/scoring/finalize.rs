use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::models::candidate::{CandidateProfile, CandidateRecord, ScoreResult};
use crate::scoring::fallback::local_score;
use crate::scoring::ScoringService;
use crate::storage::InterviewStorage;

/// Scores a finished interview and appends it to the candidate history.
#[derive(Clone)]
pub struct Finalizer {
    remote: Option<Arc<dyn ScoringService>>,
    storage: InterviewStorage,
}

impl Finalizer {
    /// `remote: None` means every interview is scored locally.
    pub fn new(remote: Option<Arc<dyn ScoringService>>, storage: InterviewStorage) -> Self {
        Self { remote, storage }
    }

    /// Never fails: a missing or failing scoring service yields the local score.
    pub async fn finalize(&self, profile: &CandidateProfile, answers: &[String]) -> ScoreResult {
        let result = match &self.remote {
            Some(remote) => match remote.score(profile, answers).await {
                Ok(result) => {
                    info!(score = result.score, "Interview scored by scoring service");
                    result
                }
                Err(e) => {
                    warn!(error = %e, "Scoring service failed, using local fallback");
                    local_score(answers)
                }
            },
            None => local_score(answers),
        };

        let record = CandidateRecord::new(profile, &result, answers.to_vec(), Utc::now());
        self.storage.save_candidate(record).await;
        result
    }
}
