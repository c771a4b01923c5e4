//! Axum route handlers for the Interview API.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::interview::questions::{Difficulty, QUESTION_BANK};
use crate::interview::runtime::SessionView;
use crate::models::candidate::{CandidateProfile, CandidateRecord};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionEntry {
    pub index: usize,
    pub text: &'static str,
    pub difficulty: Difficulty,
    pub budget_secs: i64,
}

/// GET /api/v1/questions
pub async fn handle_list_questions() -> Json<Vec<QuestionEntry>> {
    Json(
        QUESTION_BANK
            .iter()
            .enumerate()
            .map(|(index, q)| QuestionEntry {
                index,
                text: q.text,
                difficulty: q.difficulty,
                budget_secs: q.budget_secs(),
            })
            .collect(),
    )
}

/// POST /api/v1/interview/start
///
/// Requires an email. If an unfinished session is stored, the response is in
/// `awaiting_resume_choice` and the client must call resume or fresh.
pub async fn handle_start(
    State(state): State<AppState>,
    Json(profile): Json<CandidateProfile>,
) -> Result<Json<SessionView>, AppError> {
    if !profile.has_email() {
        return Err(AppError::Validation(
            "Please provide an email before continuing".to_string(),
        ));
    }
    let profile = CandidateProfile {
        name: profile.name.trim().to_string(),
        email: profile.email.trim().to_string(),
        phone: profile.phone.trim().to_string(),
    };
    Ok(Json(state.interview.start(profile).await?))
}

/// POST /api/v1/interview/resume
pub async fn handle_resume(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interview.resume().await?))
}

/// POST /api/v1/interview/fresh
pub async fn handle_start_fresh(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interview.start_fresh().await?))
}

/// POST /api/v1/interview/pause
pub async fn handle_toggle_pause(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interview.toggle_pause().await?))
}

/// PUT /api/v1/interview/answer
pub async fn handle_set_answer(
    State(state): State<AppState>,
    Json(req): Json<AnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interview.set_answer(req.text).await?))
}

/// POST /api/v1/interview/submit
///
/// Submitting the last question waits for scoring; the result is in the response.
pub async fn handle_submit(State(state): State<AppState>) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interview.submit().await?))
}

/// GET /api/v1/interview
pub async fn handle_get_session(
    State(state): State<AppState>,
) -> Result<Json<SessionView>, AppError> {
    Ok(Json(state.interview.current().await?))
}

/// GET /api/v1/candidates
pub async fn handle_list_candidates(State(state): State<AppState>) -> Json<Vec<CandidateRecord>> {
    Json(state.storage.load_candidates().await)
}
