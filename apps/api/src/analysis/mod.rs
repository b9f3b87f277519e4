// Job description analysis.
// One best-effort LLM round trip with a fixed fallback; never fails the request.

pub mod analyzer;
pub mod handlers;
pub mod prompts;
