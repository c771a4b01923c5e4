use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub redis_url: String,
    /// Remote scoring endpoint. When unset every interview is scored locally.
    pub scoring_url: Option<String>,
    pub scoring_timeout: Duration,
    pub tick_interval: Duration,
    pub port: u16,
    pub rust_log: String,
    /// Largest accepted resume upload, in bytes. Default 10 MiB.
    pub max_upload_bytes: usize,
}

pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: require_env("REDIS_URL")?,
            scoring_url: std::env::var("SCORING_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            scoring_timeout: Duration::from_secs(parse_env("SCORING_TIMEOUT_SECS", 30)?),
            tick_interval: Duration::from_millis(parse_env("TICK_INTERVAL_MS", 1000)?),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}
