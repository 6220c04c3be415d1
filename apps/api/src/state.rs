use std::sync::Arc;

use crate::analysis::ReplyParser;
use crate::config::Config;
use crate::document::TextExtractor;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Model backend. Default: GeminiClient.
    pub generator: Arc<dyn TextGenerator>,
    /// Resume text extraction. Default: PdfTextExtractor.
    pub extractor: Arc<dyn TextExtractor>,
    /// Reply decomposition. Default: MarkerReplyParser.
    pub parser: Arc<dyn ReplyParser>,
    pub config: Config,
}
