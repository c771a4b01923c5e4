//! Remote scoring client. POSTs `{ profile, answers }` and expects `{ score, summary }`.
//!
//! Any status outside 2xx, transport failure, or body that does not match the
//! response shape is an error; the finalizer turns every error into the local fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

use crate::models::candidate::{CandidateProfile, ScoreResult};
use crate::scoring::{ScoringError, ScoringService};

#[derive(Debug, Serialize)]
struct ScoreRequest<'a> {
    profile: &'a CandidateProfile,
    answers: &'a [String],
}

#[derive(Clone)]
pub struct RemoteScorer {
    client: Client,
    url: String,
}

impl RemoteScorer {
    pub fn new(url: String, timeout: Duration) -> Result<Self, ScoringError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ScoringService for RemoteScorer {
    async fn score(
        &self,
        profile: &CandidateProfile,
        answers: &[String],
    ) -> Result<ScoreResult, ScoringError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ScoreRequest { profile, answers })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ScoringError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let result: ScoreResult = serde_json::from_str(&body)?;
        debug!(score = result.score, "Scoring service responded");
        Ok(result)
    }
}
