use std::sync::Arc;

use crate::config::Config;
use crate::interview::runtime::InterviewRuntime;
use crate::profile::document::DocumentExtractor;
use crate::storage::InterviewStorage;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub storage: InterviewStorage,
    /// The single live interview. All session transitions go through it.
    pub interview: InterviewRuntime,
    /// Pluggable document-to-text backend. Default: PdfTextExtractor.
    pub extractor: Arc<dyn DocumentExtractor>,
}
