//! Record store for job applications.
//!
//! `JobStore` is the only way handlers read or mutate the collection.
//! `FileJobStore` persists to a JSON file; `InMemoryJobStore` keeps the same
//! contract in process memory.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::jobs::models::{Job, JobUpdate, NewJob};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Job {0} not found")]
    NotFound(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize job collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Job collection at {path} is not valid JSON: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The record store trait. Handlers only ever see `Arc<dyn JobStore>`.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Full collection in insertion order. Read failures yield an empty list.
    async fn list(&self) -> Vec<Job>;

    async fn create(&self, new_job: NewJob) -> Result<Job, StoreError>;

    async fn update(&self, id: &str, update: JobUpdate) -> Result<Job, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Collection mutations shared by every backend
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn insert_job(jobs: &mut Vec<Job>, new_job: NewJob) -> Result<Job, StoreError> {
    new_job.validate().map_err(StoreError::Validation)?;

    let mut id = Uuid::new_v4().to_string();
    while jobs.iter().any(|j| j.id == id) {
        id = Uuid::new_v4().to_string();
    }

    let job = Job::new(id, new_job, Utc::now());
    jobs.push(job.clone());
    Ok(job)
}

pub(crate) fn update_job(
    jobs: &mut [Job],
    id: &str,
    update: JobUpdate,
) -> Result<Job, StoreError> {
    let job = jobs
        .iter_mut()
        .find(|j| j.id == id)
        .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
    job.apply(update, Utc::now());
    Ok(job.clone())
}

pub(crate) fn remove_job(jobs: &mut Vec<Job>, id: &str) -> Result<(), StoreError> {
    let before = jobs.len();
    jobs.retain(|j| j.id != id);
    if jobs.len() == before {
        return Err(StoreError::NotFound(id.to_string()));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// InMemoryJobStore
// ────────────────────────────────────────────────────────────────────────────

/// Process-local store. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: RwLock<Vec<Job>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn list(&self) -> Vec<Job> {
        self.jobs.read().await.clone()
    }

    async fn create(&self, new_job: NewJob) -> Result<Job, StoreError> {
        insert_job(&mut *self.jobs.write().await, new_job)
    }

    async fn update(&self, id: &str, update: JobUpdate) -> Result<Job, StoreError> {
        update_job(&mut self.jobs.write().await, id, update)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        remove_job(&mut *self.jobs.write().await, id)
    }
}
