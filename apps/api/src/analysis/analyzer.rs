//! Analysis pipeline — prompt → model → parsed result.

use serde::Deserialize;
use tracing::{debug, info};

use crate::analysis::parser::{AnalysisResult, ReplyParser};
use crate::analysis::prompts::build_analysis_prompt;
use crate::errors::AppError;
use crate::llm_client::TextGenerator;

/// One resume/job-description pair to analyse. Never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct AnalysisRequest {
    pub resume_text: String,
    pub job_description: String,
}

impl AnalysisRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.resume_text.trim().is_empty() {
            return Err(AppError::Validation(
                "resume_text cannot be empty".to_string(),
            ));
        }
        if self.job_description.trim().is_empty() {
            return Err(AppError::Validation(
                "job_description cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Runs one analysis:
/// 1. Build the prompt from resume text and job description
/// 2. Call the model (the only await point)
/// 3. Trim the reply and parse it — parsing never fails
pub async fn analyse_resume(
    request: &AnalysisRequest,
    generator: &dyn TextGenerator,
    parser: &dyn ReplyParser,
) -> Result<AnalysisResult, AppError> {
    let prompt = build_analysis_prompt(&request.resume_text, &request.job_description);
    debug!(
        resume_chars = request.resume_text.chars().count(),
        jd_chars = request.job_description.chars().count(),
        "Sending analysis prompt"
    );

    let reply = generator
        .generate(&prompt)
        .await
        .map_err(|e| AppError::Llm(format!("Resume analysis failed: {e}")))?;

    let result = parser.parse(reply.trim());

    info!(
        score = result.score,
        resume_recovered = result.resume_recovered,
        "Resume analysis complete"
    );

    Ok(result)
}
