use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::Deserialize;
use tracing::info;

use crate::analysis::analyzer::{AnalysisOutcome, JobAnalysis};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub job_description: Option<String>,
}

/// POST /analyze
///
/// Always answers 200 with some analysis once the description is present;
/// provider failures turn into the fixed fallback payload.
pub async fn handle_analyze(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<JobAnalysis>, AppError> {
    let Json(request) = payload?;
    let description = request
        .job_description
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Job description is required".to_string()))?;

    let outcome = state.analyzer.analyze(&description).await;
    if let AnalysisOutcome::Enhanced(_) = &outcome {
        info!("Analyzed job description ({} chars)", description.len());
    }

    Ok(Json(outcome.into_analysis()))
}
