//! Resume text extraction.

use async_trait::async_trait;
use bytes::Bytes;
use tracing::{debug, warn};

use crate::document::DocumentError;

/// Document bytes in, plain text out. Carried in `AppState` as `Arc<dyn TextExtractor>`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, document: Bytes) -> Result<String, DocumentError>;
}

/// Extracts the text of every page of a PDF, in page order, via `pdf-extract`.
pub struct PdfTextExtractor;

#[async_trait]
impl TextExtractor for PdfTextExtractor {
    async fn extract(&self, document: Bytes) -> Result<String, DocumentError> {
        let size = document.len();

        // pdf-extract is synchronous and can be slow on large scans.
        let text = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem(&document)
                .map_err(|e| DocumentError::Extraction(e.to_string()))
        })
        .await
        .map_err(|e| {
            // pdf-extract panics on some malformed files instead of returning an error.
            if e.is_panic() {
                warn!(bytes = size, "PDF parser panicked on upload");
                DocumentError::Extraction("malformed PDF".to_string())
            } else {
                DocumentError::Task(e)
            }
        })??;

        if text.trim().is_empty() {
            return Err(DocumentError::NoText);
        }

        debug!(bytes = size, chars = text.len(), "Extracted resume text");
        Ok(text)
    }
}
