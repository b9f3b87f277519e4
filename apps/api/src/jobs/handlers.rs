use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use tracing::info;

use crate::errors::AppError;
use crate::jobs::models::{CreateJobRequest, Job, JobUpdate, NewJob, UpdateJobRequest};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// GET /jobs
pub async fn handle_list_jobs(State(state): State<AppState>) -> Json<Vec<Job>> {
    Json(state.store.list().await)
}

/// POST /jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    payload: Result<Json<CreateJobRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Job>), AppError> {
    let Json(request) = payload?;
    let new_job = NewJob::try_from(request).map_err(AppError::Validation)?;
    let job = state.store.create(new_job).await?;
    info!("Created job {} ({} at {})", job.id, job.title, job.company);
    Ok((StatusCode::CREATED, Json(job)))
}

/// PUT /jobs/:id
pub async fn handle_update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateJobRequest>, JsonRejection>,
) -> Result<Json<Job>, AppError> {
    let Json(request) = payload?;
    let update = JobUpdate::try_from(request).map_err(AppError::Validation)?;
    let job = state.store.update(&id, update).await?;
    info!("Updated job {} (status {})", job.id, job.status);
    Ok(Json(job))
}

/// DELETE /jobs/:id
pub async fn handle_delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    state.store.delete(&id).await?;
    info!("Deleted job {id}");
    Ok(Json(MessageResponse {
        message: "Job deleted successfully".to_string(),
    }))
}
