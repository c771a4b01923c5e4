//! Axum route handlers for the Profile API.

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::AppError;
use crate::models::candidate::CandidateProfile;
use crate::profile::document::UploadedDocument;
use crate::profile::extractor::extract_fields;
use crate::state::AppState;

/// Longest extracted text returned to the client for inspection.
const MAX_TEXT_CHARS: usize = 20_000;
/// Characters of extracted text written to the debug log.
const LOG_PREVIEW_CHARS: usize = 1_200;

#[derive(Debug, Deserialize)]
pub struct ExtractRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ParsedResumeResponse {
    pub profile: CandidateProfile,
    /// Extracted plain text, so the client can check what the heuristics saw.
    pub text: String,
    /// Set when the document could not be read; the client should fall back to manual entry.
    pub extraction_error: Option<String>,
}

/// POST /api/v1/profile/parse
///
/// Multipart upload with a `file` field. Non-PDF uploads are rejected (415),
/// bodies over `MAX_UPLOAD_BYTES` get 413, and a PDF that fails to parse
/// still returns 200 with empty fields.
pub async fn handle_parse_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ParsedResumeResponse>, AppError> {
    let document = read_file_field(&mut multipart, state.config.max_upload_bytes).await?;
    if !document.is_pdf() {
        return Err(AppError::UnsupportedMediaType(format!(
            "Please upload a PDF file (got '{}')",
            document.file_name
        )));
    }

    let response = match state.extractor.extract(&document).await {
        Ok(text) => {
            debug!(
                preview = %text.chars().take(LOG_PREVIEW_CHARS).collect::<String>(),
                "Parsed resume text"
            );
            let profile = extract_fields(&text);
            debug!(?profile, "Heuristic profile fields");
            ParsedResumeResponse {
                profile,
                text: text.chars().take(MAX_TEXT_CHARS).collect(),
                extraction_error: None,
            }
        }
        Err(e) => {
            warn!(error = %e, file = %document.file_name, "Resume text extraction failed");
            ParsedResumeResponse {
                profile: CandidateProfile::default(),
                text: String::new(),
                extraction_error: Some(
                    "Failed to parse PDF. You can enter details manually.".to_string(),
                ),
            }
        }
    };

    Ok(Json(response))
}

/// POST /api/v1/profile/extract
pub async fn handle_extract_fields(Json(req): Json<ExtractRequest>) -> Json<CandidateProfile> {
    Json(extract_fields(&req.text))
}

/// GET /api/v1/profile/demo
pub async fn handle_demo_profile() -> Json<CandidateProfile> {
    Json(CandidateProfile::demo())
}

async fn read_file_field(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<UploadedDocument, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error(e, max_bytes))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(|e| upload_error(e, max_bytes))?;
        return Ok(UploadedDocument {
            file_name,
            content_type,
            content,
        });
    }
    Err(AppError::Validation("Missing 'file' field".to_string()))
}

fn upload_error(e: MultipartError, max_bytes: usize) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        warn!(max_bytes, "Rejected oversized upload");
        return AppError::PayloadTooLarge(format!(
            "Upload exceeds the {} MiB limit",
            max_bytes / (1024 * 1024)
        ));
    }
    AppError::Validation(format!("Invalid multipart body: {}", e.body_text()))
}
