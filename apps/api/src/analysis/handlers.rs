//! Axum route handlers for the Analysis API.

use axum::{
    extract::{Multipart, State},
    http::header,
    response::IntoResponse,
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::analysis::analyzer::{analyse_resume, AnalysisRequest};
use crate::analysis::AnalysisResult;
use crate::document::render_resume_pdf_blocking;
use crate::errors::AppError;
use crate::state::AppState;

const RESUME_FIELD: &str = "resume";
const JOB_DESCRIPTION_FIELD: &str = "job_description";
const DOWNLOAD_FILENAME: &str = "updated_resume.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    /// Correlates this response with server logs; nothing is stored under it.
    pub analysis_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub result: AnalysisResult,
}

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    #[serde(default)]
    pub updated_resume: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze
///
/// Multipart upload: `resume` (PDF file) and `job_description` (text).
/// Extracts the resume text, then runs the analysis pipeline.
pub async fn handle_analyze_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut resume: Option<Bytes> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            RESUME_FIELD => resume = Some(field.bytes().await.map_err(invalid_multipart)?),
            JOB_DESCRIPTION_FIELD => {
                job_description = Some(field.text().await.map_err(invalid_multipart)?)
            }
            _ => {}
        }
    }

    let resume = resume
        .filter(|b| !b.is_empty())
        .ok_or_else(|| AppError::Validation("Please upload a PDF resume".to_string()))?;
    let job_description = job_description
        .filter(|jd| !jd.trim().is_empty())
        .ok_or_else(|| AppError::Validation("job_description cannot be empty".to_string()))?;

    let resume_text = state.extractor.extract(resume).await?;

    run_analysis(
        &state,
        AnalysisRequest {
            resume_text,
            job_description,
        },
    )
    .await
}

/// POST /api/v1/analyze/text
///
/// Same pipeline as the upload route for callers that already hold plain text.
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    run_analysis(&state, request).await
}

/// POST /api/v1/resumes/download
///
/// Renders the rewritten resume sent back by the caller as a PDF attachment.
pub async fn handle_download(
    Json(request): Json<DownloadRequest>,
) -> Result<impl IntoResponse, AppError> {
    if request.updated_resume.is_empty() {
        return Err(AppError::Validation("No updated resume found".to_string()));
    }

    let pdf = render_resume_pdf_blocking(request.updated_resume).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{DOWNLOAD_FILENAME}\""),
            ),
        ],
        pdf,
    ))
}

async fn run_analysis(
    state: &AppState,
    request: AnalysisRequest,
) -> Result<Json<AnalyzeResponse>, AppError> {
    request.validate()?;

    let analysis_id = Uuid::new_v4();
    let result = analyse_resume(&request, state.generator.as_ref(), state.parser.as_ref())
        .instrument(info_span!("analysis", %analysis_id))
        .await?;

    Ok(Json(AnalyzeResponse {
        analysis_id,
        analyzed_at: Utc::now(),
        result,
    }))
}

fn invalid_multipart(err: axum::extract::multipart::MultipartError) -> AppError {
    AppError::Validation(format!("Invalid multipart body: {err}"))
}
