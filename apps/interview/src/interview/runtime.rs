//! Interview runtime. Owns the single live session.
//!
//! Every transition, whether from an HTTP call or a timer tick, runs under one
//! async mutex, so a manual submit and a timeout can never both advance the
//! same question. After each transition the runtime applies the controller's
//! persistence instruction, starts or cancels the tick timer, and awaits
//! finalization when the interview has just finished.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::interview::controller::{
    Persist, SessionController, SessionError, SessionState, Transition,
};
use crate::interview::questions::{Difficulty, Question};
use crate::interview::timer::{TickGuard, TickTimer};
use crate::models::candidate::{CandidateProfile, ScoreResult};
use crate::scoring::finalize::Finalizer;
use crate::storage::InterviewStorage;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("No interview session has been started")]
    NoSession,

    #[error("An interview is already in progress")]
    SessionInProgress,

    #[error(transparent)]
    Transition(#[from] SessionError),
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionView {
    pub text: &'static str,
    pub difficulty: Difficulty,
    pub budget_secs: i64,
}

impl From<&Question> for QuestionView {
    fn from(q: &Question) -> Self {
        Self {
            text: q.text,
            difficulty: q.difficulty,
            budget_secs: q.budget_secs(),
        }
    }
}

/// What a client needs to render the interview screen.
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub state: SessionState,
    pub profile: CandidateProfile,
    pub question: Option<QuestionView>,
    pub current_index: usize,
    pub question_count: usize,
    pub time_remaining: i64,
    pub answer: Option<String>,
    pub progress_percent: u32,
    pub result: Option<ScoreResult>,
}

#[derive(Default)]
struct RuntimeInner {
    controller: Option<SessionController>,
    ticker: Option<TickGuard>,
    /// Bumped whenever a timer starts; ticks from older timers are ignored.
    epoch: u64,
    /// When the running timer is due to tick next.
    next_tick_at: Option<Instant>,
    /// Time left until the next tick when the timer was stopped by a pause.
    carried: Option<Duration>,
    result: Option<ScoreResult>,
}

#[derive(Clone)]
pub struct InterviewRuntime {
    inner: Arc<Mutex<RuntimeInner>>,
    storage: InterviewStorage,
    finalizer: Finalizer,
    timer: TickTimer,
    questions: &'static [Question],
}

impl InterviewRuntime {
    pub fn new(
        storage: InterviewStorage,
        finalizer: Finalizer,
        timer: TickTimer,
        questions: &'static [Question],
    ) -> Self {
        Self {
            inner: Arc::new(Mutex::new(RuntimeInner::default())),
            storage,
            finalizer,
            timer,
            questions,
        }
    }

    /// Picks up a session left behind by a previous process. The candidate
    /// then chooses between resuming it and starting fresh.
    pub async fn restore(&self) {
        let mut inner = self.inner.lock().await;
        if inner.controller.is_some() {
            return;
        }
        if let Some(snapshot) = self.storage.load_session().await {
            info!(
                session_id = %snapshot.session_id,
                current_index = snapshot.current_index,
                "Found unfinished interview session"
            );
            let profile = snapshot.profile.clone();
            inner.controller = Some(SessionController::awaiting(snapshot, profile, self.questions));
        }
    }

    /// Starts an interview for `profile`, or surfaces the pending resume choice.
    pub async fn start(&self, profile: CandidateProfile) -> Result<SessionView, RuntimeError> {
        let mut inner = self.inner.lock().await;

        if let Some(controller) = inner.controller.as_mut() {
            match controller.state() {
                SessionState::AwaitingResumeChoice => {
                    controller.set_fresh_profile(profile);
                    return current_view(&inner);
                }
                SessionState::Active | SessionState::Paused => {
                    return Err(RuntimeError::SessionInProgress);
                }
                SessionState::Finished => {}
            }
        }

        let existing = self.storage.load_session().await;
        let (controller, transition) = SessionController::start(profile, existing, self.questions);
        match controller.state() {
            SessionState::AwaitingResumeChoice => {
                info!(session_id = %controller.session_id(), "Unfinished session found, awaiting resume choice")
            }
            _ => info!(session_id = %controller.session_id(), "Interview started"),
        }
        inner.controller = Some(controller);
        inner.result = None;
        self.apply(&mut inner, transition, None).await;
        current_view(&inner)
    }

    pub async fn resume(&self) -> Result<SessionView, RuntimeError> {
        self.transition(SessionController::resume).await
    }

    pub async fn start_fresh(&self) -> Result<SessionView, RuntimeError> {
        self.transition(SessionController::start_fresh).await
    }

    pub async fn toggle_pause(&self) -> Result<SessionView, RuntimeError> {
        self.transition(SessionController::toggle_pause).await
    }

    pub async fn set_answer(&self, text: String) -> Result<SessionView, RuntimeError> {
        self.transition(move |c| c.set_answer(text)).await
    }

    pub async fn submit(&self) -> Result<SessionView, RuntimeError> {
        self.transition(|c| c.submit(false)).await
    }

    pub async fn current(&self) -> Result<SessionView, RuntimeError> {
        let inner = self.inner.lock().await;
        current_view(&inner)
    }

    /// Timer callback. Ticks from a cancelled timer are dropped.
    async fn on_tick(&self, epoch: u64) {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch {
            debug!(epoch, current = inner.epoch, "Ignoring stale tick");
            return;
        }
        let Some(controller) = inner.controller.as_mut() else {
            return;
        };
        let before = controller.current_index();
        let transition = controller.tick();
        inner.next_tick_at = Some(Instant::now() + self.timer.period());
        self.apply(&mut inner, transition, Some(before)).await;
    }

    async fn transition<F>(&self, op: F) -> Result<SessionView, RuntimeError>
    where
        F: FnOnce(&mut SessionController) -> Result<Transition, SessionError> + Send,
    {
        let mut inner = self.inner.lock().await;
        let controller = inner.controller.as_mut().ok_or(RuntimeError::NoSession)?;
        let before = controller.current_index();
        let transition = op(controller)?;
        self.apply(&mut inner, transition, Some(before)).await;
        current_view(&inner)
    }

    /// Persists, re-arms the timer, and finalizes, in that order.
    async fn apply(&self, inner: &mut RuntimeInner, transition: Transition, index_before: Option<usize>) {
        match &transition.persist {
            Persist::Write(snapshot) => self.storage.save_session(snapshot).await,
            Persist::Clear => self.storage.clear_session().await,
            Persist::Unchanged => {}
        }

        self.sync_timer(inner, index_before);

        if let Some(finished) = transition.finished {
            let result = self
                .finalizer
                .finalize(&finished.profile, &finished.answers)
                .await;
            info!(
                session_id = %finished.session_id,
                score = result.score,
                "Interview finished"
            );
            inner.result = Some(result);
        }
    }

    /// Keeps exactly one timer running while the session is `Active`, restarted per question.
    /// Stopping for a pause keeps the part of the period already elapsed, so the
    /// first tick after unpausing comes early rather than a full period later.
    fn sync_timer(&self, inner: &mut RuntimeInner, index_before: Option<usize>) {
        let question_changed = inner
            .controller
            .as_ref()
            .map_or(true, |c| index_before != Some(c.current_index()));
        if question_changed {
            inner.carried = None;
        }

        let active = inner
            .controller
            .as_ref()
            .is_some_and(|c| c.state() == SessionState::Active);
        if !active {
            if inner.ticker.take().is_some() && !question_changed {
                inner.carried = inner
                    .next_tick_at
                    .map(|at| at.saturating_duration_since(Instant::now()));
            }
            inner.next_tick_at = None;
            return;
        }

        if inner.ticker.is_some() && !question_changed {
            return;
        }

        let period = self.timer.period();
        let first_delay = inner.carried.take().unwrap_or(period).min(period);
        if let Some(controller) = inner.controller.as_ref() {
            debug!(
                current_index = controller.current_index(),
                time_remaining = controller.time_remaining(),
                first_tick_ms = first_delay.as_millis() as u64,
                "Starting question timer"
            );
        }
        inner.ticker = None;
        inner.epoch += 1;
        inner.next_tick_at = Some(Instant::now() + first_delay);
        let epoch = inner.epoch;
        let runtime = self.clone();
        inner.ticker = Some(self.timer.start_after(first_delay, move || {
            let runtime = runtime.clone();
            async move { runtime.on_tick(epoch).await }
        }));
    }
}

fn current_view(inner: &RuntimeInner) -> Result<SessionView, RuntimeError> {
    let controller = inner.controller.as_ref().ok_or(RuntimeError::NoSession)?;
    let count = controller.question_count();
    let index = controller.current_index();
    let progress_percent = if count == 0 {
        100
    } else {
        ((index as f64 / count as f64) * 100.0).round() as u32
    };

    Ok(SessionView {
        session_id: controller.session_id().to_string(),
        state: controller.state(),
        profile: controller.profile().clone(),
        question: controller.current_question().map(QuestionView::from),
        current_index: index,
        question_count: count,
        time_remaining: controller.time_remaining(),
        answer: controller.answers().get(index).cloned(),
        progress_percent,
        result: inner.result.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::Utc;

    use crate::interview::controller::TIMED_OUT_ANSWER;
    use crate::interview::questions::QUESTION_BANK;
    use crate::models::session::SessionSnapshot;
    use crate::scoring::fallback::FALLBACK_SUMMARY;
    use crate::storage::MemoryStore;

    static TWO_QUESTIONS: [Question; 2] = [
        Question {
            text: "Quick one",
            difficulty: Difficulty::Easy,
        },
        Question {
            text: "Another quick one",
            difficulty: Difficulty::Easy,
        },
    ];

    fn profile() -> CandidateProfile {
        CandidateProfile {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            phone: "9876543210".to_string(),
        }
    }

    fn runtime_with(questions: &'static [Question]) -> (InterviewRuntime, InterviewStorage) {
        let storage = InterviewStorage::new(Arc::new(MemoryStore::default()));
        let finalizer = Finalizer::new(None, storage.clone());
        let runtime = InterviewRuntime::new(storage.clone(), finalizer, TickTimer::default(), questions);
        (runtime, storage)
    }

    fn stored(index: usize, answers: Vec<&str>, time_remaining: i64) -> SessionSnapshot {
        SessionSnapshot {
            session_id: "left-behind".to_string(),
            profile: profile(),
            current_index: index,
            answers: answers.into_iter().map(String::from).collect(),
            time_remaining,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fresh_start_persists_and_ticks() {
        let (runtime, storage) = runtime_with(&QUESTION_BANK);
        let view = runtime.start(profile()).await.unwrap();
        assert_eq!(view.state, SessionState::Active);
        assert_eq!(view.time_remaining, 20);
        assert_eq!(view.progress_percent, 0);

        tokio::time::sleep(Duration::from_millis(3500)).await;

        let view = runtime.current().await.unwrap();
        assert_eq!(view.time_remaining, 17);
        assert_eq!(storage.load_session().await.unwrap().time_remaining, 17);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_auto_submits_and_moves_on() {
        let (runtime, storage) = runtime_with(&QUESTION_BANK);
        runtime.start(profile()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(20_500)).await;

        let view = runtime.current().await.unwrap();
        assert_eq!(view.current_index, 1);
        assert_eq!(view.time_remaining, 20);
        let snapshot = storage.load_session().await.unwrap();
        assert_eq!(snapshot.answers[0], TIMED_OUT_ANSWER);
        assert_eq!(snapshot.current_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_the_clock() {
        let (runtime, _) = runtime_with(&QUESTION_BANK);
        runtime.start(profile()).await.unwrap();
        runtime.set_answer("draft".to_string()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        let paused = runtime.toggle_pause().await.unwrap();
        assert_eq!(paused.state, SessionState::Paused);
        tokio::time::sleep(Duration::from_secs(60)).await;

        let resumed = runtime.toggle_pause().await.unwrap();
        assert_eq!(resumed.state, SessionState::Active);
        assert_eq!(resumed.time_remaining, paused.time_remaining);
        assert_eq!(resumed.time_remaining, 18);
        assert_eq!(resumed.answer.as_deref(), Some("draft"));
        assert_eq!(resumed.current_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rapid_pause_toggling_keeps_partial_seconds() {
        let (runtime, _) = runtime_with(&QUESTION_BANK);
        runtime.start(profile()).await.unwrap();

        for _ in 0..5 {
            tokio::time::sleep(Duration::from_millis(900)).await;
            runtime.toggle_pause().await.unwrap();
            runtime.toggle_pause().await.unwrap();
        }

        // 4.5s active: ticks at 1, 2, 3 and 4 seconds.
        let view = runtime.current().await.unwrap();
        assert_eq!(view.current_index, 0);
        assert_eq!(view.time_remaining, 16);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_toggling_cannot_outlast_the_budget() {
        let (runtime, storage) = runtime_with(&QUESTION_BANK);
        runtime.start(profile()).await.unwrap();

        for _ in 0..30 {
            tokio::time::sleep(Duration::from_millis(900)).await;
            runtime.toggle_pause().await.unwrap();
            runtime.toggle_pause().await.unwrap();
        }

        let view = runtime.current().await.unwrap();
        assert_eq!(view.current_index, 1);
        let snapshot = storage.load_session().await.unwrap();
        assert_eq!(snapshot.answers[0], TIMED_OUT_ANSWER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_manual_submit_restarts_full_budget() {
        let (runtime, _) = runtime_with(&QUESTION_BANK);
        runtime.start(profile()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(19_500)).await;

        // One second left on question 0; the submit wins and the pending timer is discarded.
        let view = runtime.submit().await.unwrap();
        assert_eq!(view.current_index, 1);
        assert_eq!(view.answer.as_deref(), Some(""));

        tokio::time::sleep(Duration::from_millis(1500)).await;
        let view = runtime.current().await.unwrap();
        assert_eq!(view.current_index, 1);
        assert_eq!(view.time_remaining, 19);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_tick_is_ignored() {
        let (runtime, _) = runtime_with(&QUESTION_BANK);
        runtime.start(profile()).await.unwrap();
        let stale_epoch = runtime.inner.lock().await.epoch;
        runtime.submit().await.unwrap();

        runtime.on_tick(stale_epoch).await;
        assert_eq!(runtime.current().await.unwrap().time_remaining, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_scores_clears_and_records() {
        let (runtime, storage) = runtime_with(&TWO_QUESTIONS);
        runtime.start(profile()).await.unwrap();
        runtime.set_answer("x".repeat(45)).await.unwrap();
        runtime.submit().await.unwrap();
        let view = runtime.submit().await.unwrap();

        assert_eq!(view.state, SessionState::Finished);
        assert_eq!(view.progress_percent, 100);
        assert!(view.question.is_none());
        let result = view.result.unwrap();
        assert_eq!(result.score, 2);
        assert_eq!(result.summary, FALLBACK_SUMMARY);

        assert!(storage.load_session().await.is_none());
        let history = storage.load_candidates().await;
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].answers, vec!["x".repeat(45), String::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_finish_by_timeout_finalizes() {
        let (runtime, storage) = runtime_with(&TWO_QUESTIONS);
        runtime.start(profile()).await.unwrap();

        tokio::time::sleep(Duration::from_millis(40_500)).await;

        let view = runtime.current().await.unwrap();
        assert_eq!(view.state, SessionState::Finished);
        // The timed-out placeholder itself is worth one point per answer.
        assert_eq!(view.result.map(|r| r.score), Some(2));
        let history = storage.load_candidates().await;
        assert_eq!(history[0].answers, vec![TIMED_OUT_ANSWER.to_string(); 2]);

        // No timer survives the finish.
        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(storage.load_candidates().await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restore_then_resume() {
        let (runtime, storage) = runtime_with(&QUESTION_BANK);
        let snapshot = stored(2, vec!["a", "b", "half", "", "", ""], 33);
        storage.save_session(&snapshot).await;

        runtime.restore().await;
        let view = runtime.current().await.unwrap();
        assert_eq!(view.state, SessionState::AwaitingResumeChoice);

        // No ticking while the choice is pending.
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(runtime.current().await.unwrap().time_remaining, 33);

        let view = runtime.resume().await.unwrap();
        assert_eq!(view.state, SessionState::Active);
        assert_eq!(view.session_id, "left-behind");
        assert_eq!(view.current_index, 2);
        assert_eq!(view.time_remaining, 33);
        assert_eq!(view.answer.as_deref(), Some("half"));
        assert_eq!(storage.load_session().await.unwrap().answers, snapshot.answers);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_with_snapshot_then_start_fresh() {
        let (runtime, storage) = runtime_with(&QUESTION_BANK);
        storage.save_session(&stored(3, vec!["a", "b", "c", "", "", ""], 10)).await;

        let newcomer = CandidateProfile {
            name: "Alan Turing".to_string(),
            email: "alan@example.com".to_string(),
            phone: String::new(),
        };
        let view = runtime.start(newcomer.clone()).await.unwrap();
        assert_eq!(view.state, SessionState::AwaitingResumeChoice);

        let view = runtime.start_fresh().await.unwrap();
        assert_eq!(view.state, SessionState::Active);
        assert_eq!(view.current_index, 0);
        assert_eq!(view.time_remaining, 20);
        assert_eq!(view.profile, newcomer);

        let snapshot = storage.load_session().await.unwrap();
        assert_ne!(snapshot.session_id, "left-behind");
        assert_eq!(snapshot.current_index, 0);
        assert!(snapshot.answers.iter().all(String::is_empty));
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_of_completed_snapshot_finalizes() {
        let (runtime, storage) = runtime_with(&TWO_QUESTIONS);
        storage.save_session(&stored(2, vec!["x".repeat(20).as_str(), "y"], 0)).await;
        runtime.restore().await;

        let view = runtime.resume().await.unwrap();
        assert_eq!(view.state, SessionState::Finished);
        assert_eq!(view.result.unwrap().score, 1);
        assert!(storage.load_session().await.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_conflicts_until_finished() {
        let (runtime, _) = runtime_with(&TWO_QUESTIONS);
        runtime.start(profile()).await.unwrap();
        assert!(matches!(
            runtime.start(profile()).await,
            Err(RuntimeError::SessionInProgress)
        ));

        runtime.submit().await.unwrap();
        runtime.submit().await.unwrap();
        let view = runtime.start(profile()).await.unwrap();
        assert_eq!(view.state, SessionState::Active);
        assert!(view.result.is_none());
    }

    #[tokio::test]
    async fn test_operations_without_session() {
        let (runtime, _) = runtime_with(&QUESTION_BANK);
        assert!(matches!(runtime.current().await, Err(RuntimeError::NoSession)));
        assert!(matches!(runtime.submit().await, Err(RuntimeError::NoSession)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_transition_is_reported() {
        let (runtime, _) = runtime_with(&QUESTION_BANK);
        runtime.start(profile()).await.unwrap();
        assert!(matches!(
            runtime.resume().await,
            Err(RuntimeError::Transition(SessionError::InvalidTransition { .. }))
        ));
    }
}
