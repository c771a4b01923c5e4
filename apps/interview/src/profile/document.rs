//! Document → plain text. Only text-based PDFs are supported; scanned-image PDFs
//! may come back empty or garbled and the caller falls back to manual entry.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

const PDF_MIME: &str = "application/pdf";

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Unsupported document type: {0}")]
    Unsupported(String),

    #[error("Failed to parse PDF: {0}")]
    Pdf(#[from] pdf_extract::OutputError),

    #[error("Extraction task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// An uploaded file as received from the client.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: String,
    pub content_type: Option<String>,
    pub content: Bytes,
}

impl UploadedDocument {
    /// MIME/extension sniffing. Either signal is enough.
    pub fn is_pdf(&self) -> bool {
        self.content_type.as_deref() == Some(PDF_MIME)
            || self.file_name.to_lowercase().ends_with(".pdf")
    }
}

#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError>;
}

/// `pdf-extract` backed extractor. Parsing is CPU-bound and runs on the blocking pool.
pub struct PdfTextExtractor;

#[async_trait]
impl DocumentExtractor for PdfTextExtractor {
    async fn extract(&self, document: &UploadedDocument) -> Result<String, ExtractionError> {
        if !document.is_pdf() {
            return Err(ExtractionError::Unsupported(document.file_name.clone()));
        }

        // pdf-extract panics on some malformed inputs; the blocking task turns that into a JoinError.
        let content = document.content.clone();
        let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&content))
            .await??;

        debug!(chars = text.chars().count(), file = %document.file_name, "Extracted text from PDF");
        Ok(text.trim().to_string())
    }
}
