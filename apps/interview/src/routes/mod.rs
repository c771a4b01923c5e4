pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};

use crate::interview::handlers as interview;
use crate::profile::handlers as profile;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Profile intake
        .route(
            "/api/v1/profile/parse",
            post(profile::handle_parse_resume).layer(upload_limit),
        )
        .route("/api/v1/profile/extract", post(profile::handle_extract_fields))
        .route("/api/v1/profile/demo", get(profile::handle_demo_profile))
        // Interview session
        .route("/api/v1/questions", get(interview::handle_list_questions))
        .route("/api/v1/interview", get(interview::handle_get_session))
        .route("/api/v1/interview/start", post(interview::handle_start))
        .route("/api/v1/interview/resume", post(interview::handle_resume))
        .route("/api/v1/interview/fresh", post(interview::handle_start_fresh))
        .route("/api/v1/interview/pause", post(interview::handle_toggle_pause))
        .route("/api/v1/interview/answer", put(interview::handle_set_answer))
        .route("/api/v1/interview/submit", post(interview::handle_submit))
        // History
        .route("/api/v1/candidates", get(interview::handle_list_candidates))
        .with_state(state)
}
