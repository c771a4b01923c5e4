mod config;
mod errors;
mod interview;
mod models;
mod profile;
mod routes;
mod scoring;
mod state;
mod storage;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::interview::questions::QUESTION_BANK;
use crate::interview::runtime::InterviewRuntime;
use crate::interview::timer::TickTimer;
use crate::profile::document::PdfTextExtractor;
use crate::routes::build_router;
use crate::scoring::client::RemoteScorer;
use crate::scoring::finalize::Finalizer;
use crate::scoring::ScoringService;
use crate::state::AppState;
use crate::storage::{InterviewStorage, RedisStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let storage = InterviewStorage::new(Arc::new(RedisStore::connect(&redis).await?));

    // Remote scorer is optional; without it every interview is scored locally
    let remote: Option<Arc<dyn ScoringService>> = match &config.scoring_url {
        Some(url) => {
            let scorer = RemoteScorer::new(url.clone(), config.scoring_timeout)?;
            info!("Scoring service: {}", scorer.url());
            Some(Arc::new(scorer))
        }
        None => {
            info!("SCORING_URL not set, using local fallback scoring");
            None
        }
    };
    let finalizer = Finalizer::new(remote, storage.clone());

    let timer = TickTimer::new(config.tick_interval);
    info!("Question timer period: {:?}", timer.period());
    let interview = InterviewRuntime::new(storage.clone(), finalizer, timer, &QUESTION_BANK);
    interview.restore().await;

    // Build app state
    let state = AppState {
        config: config.clone(),
        storage,
        interview,
        extractor: Arc::new(PdfTextExtractor),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
