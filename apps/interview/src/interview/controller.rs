//! The timed, resumable interview state machine.
//!
//! ```text
//! AwaitingResumeChoice ──resume/start_fresh──▶ Active ⇄ Paused
//!                                                │ submit / tick timeout
//!                                                ▼
//!                                    Active (next question) | Finished
//! ```
//!
//! The controller never touches storage or clocks. Every operation returns a
//! [`Transition`] telling the caller what to persist and whether the interview
//! just finished; ticks are fed in by whoever owns the timer.

use chrono::Utc;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::interview::questions::Question;
use crate::models::candidate::CandidateProfile;
use crate::models::session::SessionSnapshot;

/// Stored in place of an empty answer when the question timed out.
pub const TIMED_OUT_ANSWER: &str = "(no answer - timed out)";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    AwaitingResumeChoice,
    Active,
    Paused,
    Finished,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {operation} while the session is {state:?}")]
    InvalidTransition {
        operation: &'static str,
        state: SessionState,
    },
}

/// What the caller must do with persistence after a transition.
#[derive(Debug, Clone, PartialEq)]
pub enum Persist {
    Unchanged,
    Write(SessionSnapshot),
    Clear,
}

/// Handed to finalization exactly once, when the last question is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct FinishedInterview {
    pub session_id: String,
    pub profile: CandidateProfile,
    pub answers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub persist: Persist,
    pub finished: Option<FinishedInterview>,
}

impl Transition {
    fn none() -> Self {
        Self {
            persist: Persist::Unchanged,
            finished: None,
        }
    }

    fn write(snapshot: SessionSnapshot) -> Self {
        Self {
            persist: Persist::Write(snapshot),
            finished: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionController {
    session_id: String,
    profile: CandidateProfile,
    /// Profile used if the candidate declines to resume.
    fresh_profile: CandidateProfile,
    questions: &'static [Question],
    current_index: usize,
    answers: Vec<String>,
    time_remaining: i64,
    state: SessionState,
}

impl SessionController {
    /// Starts a session. With an existing snapshot the candidate must first
    /// choose between [`resume`](Self::resume) and [`start_fresh`](Self::start_fresh).
    pub fn start(
        profile: CandidateProfile,
        existing: Option<SessionSnapshot>,
        questions: &'static [Question],
    ) -> (Self, Transition) {
        match existing {
            Some(snapshot) => (Self::awaiting(snapshot, profile, questions), Transition::none()),
            None => Self::fresh(profile, questions),
        }
    }

    /// A brand-new session at question 0 with the timer running.
    pub fn fresh(profile: CandidateProfile, questions: &'static [Question]) -> (Self, Transition) {
        let mut controller = Self {
            session_id: String::new(),
            profile: profile.clone(),
            fresh_profile: profile,
            questions,
            current_index: 0,
            answers: Vec::new(),
            time_remaining: 0,
            state: SessionState::Active,
        };
        controller.reset();
        let transition = Transition::write(controller.snapshot());
        (controller, transition)
    }

    /// A session restored from storage, waiting for the resume choice.
    /// The snapshot is normalized so the answer/index invariants hold even for stale data.
    pub fn awaiting(
        snapshot: SessionSnapshot,
        fresh_profile: CandidateProfile,
        questions: &'static [Question],
    ) -> Self {
        let count = questions.len();
        let mut answers = snapshot.answers;
        answers.truncate(count);
        answers.resize(count, String::new());

        Self {
            session_id: snapshot.session_id,
            profile: snapshot.profile,
            fresh_profile,
            questions,
            current_index: snapshot.current_index.min(count),
            answers,
            time_remaining: snapshot.time_remaining,
            state: SessionState::AwaitingResumeChoice,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn profile(&self) -> &CandidateProfile {
        &self.profile
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn time_remaining(&self) -> i64 {
        self.time_remaining
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// `None` once every question has been submitted.
    pub fn current_question(&self) -> Option<&'static Question> {
        self.questions.get(self.current_index)
    }

    /// Replaces the profile a fresh start would use. Only meaningful while awaiting the resume choice.
    pub fn set_fresh_profile(&mut self, profile: CandidateProfile) {
        self.fresh_profile = profile;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            session_id: self.session_id.clone(),
            profile: self.profile.clone(),
            current_index: self.current_index,
            answers: self.answers.clone(),
            time_remaining: self.time_remaining,
            timestamp: Utc::now(),
        }
    }

    /// Continues the stored session verbatim. A zero `time_remaining` restarts
    /// the current question's full budget; a session stored past its last
    /// question finishes immediately.
    pub fn resume(&mut self) -> Result<Transition, SessionError> {
        self.require(&[SessionState::AwaitingResumeChoice], "resume")?;

        if self.current_index >= self.question_count() {
            return Ok(self.finish());
        }

        if self.time_remaining == 0 {
            self.time_remaining = self.budget_for(self.current_index);
        }
        self.state = SessionState::Active;
        Ok(Transition::write(self.snapshot()))
    }

    /// Discards the stored session and starts over at question 0.
    pub fn start_fresh(&mut self) -> Result<Transition, SessionError> {
        self.require(&[SessionState::AwaitingResumeChoice], "start fresh")?;

        self.profile = self.fresh_profile.clone();
        self.reset();
        self.state = SessionState::Active;
        Ok(Transition::write(self.snapshot()))
    }

    /// One second elapsed. No-op unless `Active`; at zero the answer is auto-submitted.
    pub fn tick(&mut self) -> Transition {
        if self.state != SessionState::Active {
            return Transition::none();
        }

        self.time_remaining -= 1;
        if self.time_remaining <= 0 {
            return self.advance(true);
        }
        Transition::write(self.snapshot())
    }

    /// `Active ⇄ Paused`. Time and answers are left untouched.
    pub fn toggle_pause(&mut self) -> Result<Transition, SessionError> {
        self.state = match self.state {
            SessionState::Active => SessionState::Paused,
            SessionState::Paused => SessionState::Active,
            state => {
                return Err(SessionError::InvalidTransition {
                    operation: "toggle pause",
                    state,
                })
            }
        };
        Ok(Transition::none())
    }

    /// Overwrites the current answer verbatim. Empty is allowed.
    pub fn set_answer(&mut self, text: impl Into<String>) -> Result<Transition, SessionError> {
        self.require(&[SessionState::Active, SessionState::Paused], "set an answer")?;

        self.answers[self.current_index] = text.into();
        Ok(Transition::write(self.snapshot()))
    }

    /// Submits the current answer and moves on. `auto` marks a timeout, which
    /// replaces a blank answer with [`TIMED_OUT_ANSWER`].
    pub fn submit(&mut self, auto: bool) -> Result<Transition, SessionError> {
        self.require(&[SessionState::Active, SessionState::Paused], "submit")?;
        Ok(self.advance(auto))
    }

    fn advance(&mut self, auto: bool) -> Transition {
        let slot = &mut self.answers[self.current_index];
        if slot.trim().is_empty() {
            *slot = if auto {
                TIMED_OUT_ANSWER.to_string()
            } else {
                String::new()
            };
        }

        self.current_index += 1;
        if self.current_index >= self.question_count() {
            return self.finish();
        }

        self.time_remaining = self.budget_for(self.current_index);
        self.state = SessionState::Active;
        Transition::write(self.snapshot())
    }

    fn finish(&mut self) -> Transition {
        self.current_index = self.question_count();
        self.state = SessionState::Finished;
        Transition {
            persist: Persist::Clear,
            finished: Some(FinishedInterview {
                session_id: self.session_id.clone(),
                profile: self.profile.clone(),
                answers: self.answers.clone(),
            }),
        }
    }

    fn reset(&mut self) {
        self.session_id = Uuid::new_v4().to_string();
        self.current_index = 0;
        self.answers = vec![String::new(); self.question_count()];
        self.time_remaining = self.budget_for(0);
    }

    fn budget_for(&self, index: usize) -> i64 {
        self.questions.get(index).map_or(0, Question::budget_secs)
    }

    fn require(&self, allowed: &[SessionState], operation: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                operation,
                state: self.state,
            })
        }
    }
}
