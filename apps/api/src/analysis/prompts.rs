// Prompt text for resume analysis.
// The output template is a contract with `analysis::parser`: the score phrase
// and both markers must be emitted verbatim or the parser falls back to defaults.

/// Opens the rewritten-resume block in the model reply.
pub const RESUME_START_MARKER: &str = "<<<START_UPDATED_RESUME>>>";

/// Closes the rewritten-resume block in the model reply.
pub const RESUME_END_MARKER: &str = "<<<END_UPDATED_RESUME>>>";

/// Builds the analysis prompt sent to the model.
///
/// Placeholders are substituted in a single pass, so braces or template text
/// inside the resume or job description are never re-expanded.
pub fn build_analysis_prompt(resume_text: &str, job_description: &str) -> String {
    format!(
        r#"
You are a professional resume analyzer and resume writer.

Resume:
{resume_text}

Job Description:
{job_description}

Tasks:
- Analyze the resume against the job description
- Give an ATS match score out of 100
- Identify missing skills
- Suggest improvements
- Rewrite the resume in a professional, ATS-optimized format

Return the result in EXACTLY this format:

Match Score: XX/100

Missing Skills:
- ...

Suggestions:
- ...

Summary:
- ...

{RESUME_START_MARKER}
(full rewritten ATS-optimized resume text)
{RESUME_END_MARKER}
"#
    )
}
