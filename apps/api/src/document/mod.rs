// Document collaborators: PDF text extraction for uploads and PDF rendering for downloads.
// Both are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod extract;
pub mod render;

use thiserror::Error;

pub use extract::{PdfTextExtractor, TextExtractor};
pub use render::render_resume_pdf_blocking;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("Could not read the PDF: {0}")]
    Extraction(String),

    #[error("The PDF contains no extractable text")]
    NoText,

    #[error("PDF generation failed: {0}")]
    Render(String),

    #[error("Document task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
