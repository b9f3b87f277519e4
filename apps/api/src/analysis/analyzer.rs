//! Job analyzer. Summarizes a job description and suggests three skills.
//!
//! The LLM result is an enhancement: any failure (no backend configured,
//! transport error, unparseable reply) yields `JobAnalysis::fallback()` and the
//! cause is logged for operators only.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::prompts::{ANALYSIS_PROMPT_TEMPLATE, ANALYSIS_SYSTEM};
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{LlmClient, LlmError};

pub const FALLBACK_SUMMARY: &str = "Unable to analyze job description at this time. \
    Please check your analysis provider configuration.";
pub const FALLBACK_SKILLS: [&str; 3] = ["Communication", "Problem Solving", "Technical Skills"];
const SKILL_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobAnalysis {
    pub summary: String,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl JobAnalysis {
    pub fn fallback() -> Self {
        JobAnalysis {
            summary: FALLBACK_SUMMARY.to_string(),
            skills: fallback_skills(),
        }
    }

    /// Tidies a model reply. `None` means the reply is unusable.
    fn normalize(self) -> Option<Self> {
        let summary = self.summary.trim().to_string();
        if summary.is_empty() {
            return None;
        }

        let mut skills: Vec<String> = self
            .skills
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .take(SKILL_COUNT)
            .collect();
        if skills.is_empty() {
            skills = fallback_skills();
        }

        Some(JobAnalysis { summary, skills })
    }
}

fn fallback_skills() -> Vec<String> {
    FALLBACK_SKILLS.iter().map(|s| s.to_string()).collect()
}

/// Which branch produced an analysis.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Enhanced(JobAnalysis),
    Default(JobAnalysis),
}

impl AnalysisOutcome {
    pub fn into_analysis(self) -> JobAnalysis {
        match self {
            AnalysisOutcome::Enhanced(a) | AnalysisOutcome::Default(a) => a,
        }
    }
}

/// Holds the optional LLM client. Without one every call returns the fallback.
#[derive(Clone, Default)]
pub struct JobAnalyzer {
    llm: Option<LlmClient>,
}

impl JobAnalyzer {
    pub fn new(llm: Option<LlmClient>) -> Self {
        Self { llm }
    }

    pub fn is_enabled(&self) -> bool {
        self.llm.is_some()
    }

    /// Analyzes `job_description`. Never returns an error.
    pub async fn analyze(&self, job_description: &str) -> AnalysisOutcome {
        let Some(llm) = &self.llm else {
            debug!("No analysis provider configured, returning fallback analysis");
            return AnalysisOutcome::Default(JobAnalysis::fallback());
        };

        match request_analysis(llm, job_description).await {
            Ok(analysis) => AnalysisOutcome::Enhanced(analysis),
            Err(e) => {
                warn!(
                    "Job analysis via {} failed, returning fallback: {e}",
                    llm.provider()
                );
                AnalysisOutcome::Default(JobAnalysis::fallback())
            }
        }
    }
}

async fn request_analysis(
    llm: &LlmClient,
    job_description: &str,
) -> Result<JobAnalysis, LlmError> {
    let prompt = ANALYSIS_PROMPT_TEMPLATE.replace("{job_description}", job_description);
    let system = format!("{ANALYSIS_SYSTEM} {JSON_ONLY_SYSTEM}");

    llm.call_json::<JobAnalysis>(&prompt, &system)
        .await?
        .normalize()
        .ok_or(LlmError::EmptyContent)
}
