use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns a simple status object with service version and scoring mode.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let scoring = if state.config.scoring_url.is_some() {
        "remote"
    } else {
        "local"
    };
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "interview-api",
        "scoring": scoring
    }))
}
