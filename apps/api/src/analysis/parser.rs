//! Reply parser — turns a free-form model reply into an `AnalysisResult`.
//!
//! The reply is untrusted text that may or may not follow the template in
//! `analysis::prompts`. Parsing never fails: missing structure degrades to
//! documented defaults (score 0, fallback resume text).
//!
//! `AppState` holds an `Arc<dyn ReplyParser>` so the regex strategy can be
//! replaced by a structured-output parser without touching handlers.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::analysis::prompts::{RESUME_END_MARKER, RESUME_START_MARKER};

/// Rewritten resume used when the reply carries no complete marker block.
pub const RESUME_FALLBACK: &str = "Updated resume could not be generated.";

/// Markdown artifacts the model leaves in the rewritten resume.
const MARKDOWN_ARTIFACTS: [char; 2] = ['#', '*'];

static SCORE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Match Score:\s*([0-9]{1,3})/100").expect("score pattern is a valid regex")
});

static RESUME_BLOCK_PATTERN: Lazy<Regex> = Lazy::new(|| {
    let pattern = format!(
        "(?s){}(.*?){}",
        regex::escape(RESUME_START_MARKER),
        regex::escape(RESUME_END_MARKER)
    );
    Regex::new(&pattern).expect("resume block pattern is a valid regex")
});

// ────────────────────────────────────────────────────────────────────────────
// Output data model
// ────────────────────────────────────────────────────────────────────────────

/// Structured view of one model reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalysisResult {
    /// Match score as written by the model. Not clamped: `101/100` yields 101.
    pub score: u32,
    /// The reply minus the first rewritten-resume block, trimmed.
    pub analysis_text: String,
    /// Trimmed block contents with `#` and `*` removed, or `RESUME_FALLBACK`.
    pub rewritten_resume: String,
    /// Whether a complete marker block was found. Log-only, never serialized.
    #[serde(skip)]
    pub resume_recovered: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Decomposes a model reply. Implementations must be total.
pub trait ReplyParser: Send + Sync {
    fn parse(&self, reply: &str) -> AnalysisResult;
}

/// Default parser: matches the `Match Score: N/100` line and the
/// `<<<START_UPDATED_RESUME>>>` / `<<<END_UPDATED_RESUME>>>` block.
/// Only the first occurrence of each is honoured.
pub struct MarkerReplyParser;

impl ReplyParser for MarkerReplyParser {
    fn parse(&self, reply: &str) -> AnalysisResult {
        parse_reply(reply)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Core extraction
// ────────────────────────────────────────────────────────────────────────────

pub fn parse_reply(reply: &str) -> AnalysisResult {
    let score = extract_score(reply);

    let block = RESUME_BLOCK_PATTERN.captures(reply);

    let rewritten_resume = block
        .as_ref()
        .and_then(|caps| caps.get(1))
        .map(|inner| strip_markdown_artifacts(inner.as_str().trim()))
        .unwrap_or_else(|| RESUME_FALLBACK.to_string());

    let analysis_text = match block.as_ref().and_then(|caps| caps.get(0)) {
        Some(span) => {
            let mut remainder = String::with_capacity(reply.len() - span.len());
            remainder.push_str(&reply[..span.start()]);
            remainder.push_str(&reply[span.end()..]);
            remainder.trim().to_string()
        }
        None => reply.trim().to_string(),
    };

    AnalysisResult {
        score,
        analysis_text,
        rewritten_resume,
        resume_recovered: block.is_some(),
    }
}

/// First `Match Score: N/100` in the reply, or 0.
fn extract_score(reply: &str) -> u32 {
    SCORE_PATTERN
        .captures(reply)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
        .unwrap_or(0)
}

/// Removes every `#` and `*`. Whitespace and line breaks are left alone.
pub fn strip_markdown_artifacts(text: &str) -> String {
    text.chars()
        .filter(|c| !MARKDOWN_ARTIFACTS.contains(c))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const WELL_FORMED_REPLY: &str = "Match Score: 87/100

Missing Skills:
- Kubernetes
- Terraform

Suggestions:
- Quantify the migration project

Summary:
- Strong backend profile

<<<START_UPDATED_RESUME>>>
## Jane Smith
**Senior Backend Engineer**

* Led migration of 40 services to Rust
<<<END_UPDATED_RESUME>>>";

    #[test]
    fn test_well_formed_reply_extracts_all_fields() {
        let result = parse_reply(WELL_FORMED_REPLY);

        assert_eq!(result.score, 87);
        assert_eq!(
            result.rewritten_resume,
            " Jane Smith\nSenior Backend Engineer\n\n Led migration of 40 services to Rust"
        );
        assert!(result.analysis_text.starts_with("Match Score: 87/100"));
        assert!(result.analysis_text.ends_with("- Strong backend profile"));
    }

    #[test]
    fn test_example_reply_with_markdown_in_block() {
        let reply = "Match Score: 42/100\n\nMissing Skills:\n- SQL\n\n<<<START_UPDATED_RESUME>>>\nJohn Doe\n#Experience\n*Lead*\n<<<END_UPDATED_RESUME>>>";
        let result = parse_reply(reply);

        assert_eq!(result.score, 42);
        assert_eq!(result.rewritten_resume, "John Doe\nExperience\nLead");
        assert_eq!(
            result.analysis_text,
            "Match Score: 42/100\n\nMissing Skills:\n- SQL"
        );
    }

    #[test]
    fn test_unstructured_reply_uses_defaults() {
        let result = parse_reply("No structured output here.");

        assert_eq!(result.score, 0);
        assert_eq!(result.rewritten_resume, RESUME_FALLBACK);
        assert_eq!(result.analysis_text, "No structured output here.");
    }

    #[test]
    fn test_score_above_hundred_is_not_clamped() {
        let result = parse_reply("Match Score: 101/100");
        assert_eq!(result.score, 101);
    }

    #[test]
    fn test_empty_reply() {
        let result = parse_reply("");

        assert_eq!(result.score, 0);
        assert_eq!(result.rewritten_resume, RESUME_FALLBACK);
        assert_eq!(result.analysis_text, "");
    }

    #[test]
    fn test_score_with_whitespace_and_newline_before_digits() {
        assert_eq!(parse_reply("Match Score:     7/100").score, 7);
        assert_eq!(parse_reply("Match Score:\n55/100").score, 55);
        assert_eq!(parse_reply("Match Score:0/100").score, 0);
    }

    #[test]
    fn test_four_digit_score_does_not_match() {
        assert_eq!(parse_reply("Match Score: 1234/100").score, 0);
    }

    #[test]
    fn test_score_digits_are_ascii_only() {
        assert_eq!(parse_reply("Match Score: ４２/100").score, 0);
        assert_eq!(parse_reply("Match Score: ٧٥/100").score, 0);
        assert_eq!(
            parse_reply("Match Score: ４２/100\nMatch Score: 42/100").score,
            42
        );
    }

    #[test]
    fn test_score_must_be_out_of_hundred() {
        assert_eq!(parse_reply("Match Score: 8/10").score, 0);
        assert_eq!(parse_reply("match score: 80/100").score, 0);
    }

    #[test]
    fn test_first_score_wins() {
        let result = parse_reply("Match Score: 30/100\nRevised Match Score: 90/100");
        assert_eq!(result.score, 30);
        assert!(result.analysis_text.contains("Revised Match Score: 90/100"));
    }

    #[test]
    fn test_unterminated_block_falls_back_and_keeps_text() {
        let reply = "Match Score: 60/100\n<<<START_UPDATED_RESUME>>>\nJane Smith\nEngineer";
        let result = parse_reply(reply);

        assert_eq!(result.score, 60);
        assert_eq!(result.rewritten_resume, RESUME_FALLBACK);
        assert_eq!(result.analysis_text, reply);
    }

    #[test]
    fn test_end_marker_before_start_marker_is_not_a_block() {
        let reply = "<<<END_UPDATED_RESUME>>> text <<<START_UPDATED_RESUME>>>";
        let result = parse_reply(reply);

        assert_eq!(result.rewritten_resume, RESUME_FALLBACK);
        assert_eq!(result.analysis_text, reply);
    }

    #[test]
    fn test_single_block_markers_removed_from_analysis() {
        let result = parse_reply(WELL_FORMED_REPLY);

        assert!(!result.analysis_text.contains(RESUME_START_MARKER));
        assert!(!result.analysis_text.contains(RESUME_END_MARKER));
        assert!(!result.analysis_text.contains("Jane Smith"));
    }

    #[test]
    fn test_second_block_is_left_in_analysis() {
        let reply = "Match Score: 70/100\n\
            <<<START_UPDATED_RESUME>>>first<<<END_UPDATED_RESUME>>>\n\
            Summary:\n- ok\n\
            <<<START_UPDATED_RESUME>>>second<<<END_UPDATED_RESUME>>>";
        let result = parse_reply(reply);

        assert_eq!(result.rewritten_resume, "first");
        assert_eq!(
            result.analysis_text,
            "Match Score: 70/100\n\nSummary:\n- ok\n<<<START_UPDATED_RESUME>>>second<<<END_UPDATED_RESUME>>>"
        );
    }

    #[test]
    fn test_block_is_non_greedy_across_lines() {
        let reply = "<<<START_UPDATED_RESUME>>>\na\n<<<END_UPDATED_RESUME>>>\nmiddle\n<<<END_UPDATED_RESUME>>>";
        let result = parse_reply(reply);

        assert_eq!(result.rewritten_resume, "a");
        assert_eq!(result.analysis_text, "middle\n<<<END_UPDATED_RESUME>>>");
    }

    #[test]
    fn test_block_before_score_line() {
        let reply = "<<<START_UPDATED_RESUME>>>Resume<<<END_UPDATED_RESUME>>>\n\nMatch Score: 12/100";
        let result = parse_reply(reply);

        assert_eq!(result.score, 12);
        assert_eq!(result.rewritten_resume, "Resume");
        assert_eq!(result.analysis_text, "Match Score: 12/100");
    }

    #[test]
    fn test_resume_recovered_tracks_block_presence() {
        assert!(parse_reply(WELL_FORMED_REPLY).resume_recovered);
        assert!(!parse_reply("Match Score: 50/100").resume_recovered);

        let literal_fallback = format!(
            "<<<START_UPDATED_RESUME>>>{RESUME_FALLBACK}<<<END_UPDATED_RESUME>>>"
        );
        let result = parse_reply(&literal_fallback);
        assert_eq!(result.rewritten_resume, RESUME_FALLBACK);
        assert!(result.resume_recovered);
    }

    #[test]
    fn test_recovery_flag_is_not_serialized() {
        let value = serde_json::to_value(parse_reply(WELL_FORMED_REPLY)).unwrap();
        assert!(value.get("resume_recovered").is_none());
        assert_eq!(value["score"], 87);
    }

    #[test]
    fn test_empty_block_yields_empty_resume() {
        let result = parse_reply("<<<START_UPDATED_RESUME>>>\n   \n<<<END_UPDATED_RESUME>>>");
        assert_eq!(result.rewritten_resume, "");
    }

    #[test]
    fn test_trim_happens_before_artifact_removal() {
        let result = parse_reply("<<<START_UPDATED_RESUME>>>\n# Title\n<<<END_UPDATED_RESUME>>>");
        assert_eq!(result.rewritten_resume, " Title");
    }

    #[test]
    fn test_strip_markdown_artifacts_keeps_layout() {
        assert_eq!(
            strip_markdown_artifacts("**Skills**\n\t- Rust # systems\r\n"),
            "Skills\n\t- Rust  systems\r\n"
        );
    }

    #[test]
    fn test_strip_markdown_artifacts_is_idempotent() {
        let once = strip_markdown_artifacts("### *Header* ##\n* bullet");
        assert_eq!(strip_markdown_artifacts(&once), once);
    }

    #[test]
    fn test_non_ascii_content_survives() {
        let reply = "Match Score: 90/100\n<<<START_UPDATED_RESUME>>>José Müller — Ingénieur<<<END_UPDATED_RESUME>>>";
        let result = parse_reply(reply);

        assert_eq!(result.rewritten_resume, "José Müller — Ingénieur");
        assert_eq!(result.analysis_text, "Match Score: 90/100");
    }

    #[test]
    fn test_marker_parser_delegates_to_parse_reply() {
        let parser = MarkerReplyParser;
        assert_eq!(
            parser.parse(WELL_FORMED_REPLY),
            parse_reply(WELL_FORMED_REPLY)
        );
    }
}
