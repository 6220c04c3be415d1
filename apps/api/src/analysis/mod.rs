// Resume analysis: prompt assembly, model call, reply parsing.
// All model calls go through llm_client::TextGenerator — no direct Gemini calls here.

pub mod analyzer;
pub mod handlers;
pub mod parser;
pub mod prompts;

pub use parser::{AnalysisResult, MarkerReplyParser, ReplyParser};
