use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::jobs::models::{Job, JobUpdate, NewJob};
use crate::jobs::store::{insert_job, remove_job, update_job, JobStore, StoreError};

/// Job store backed by a single pretty-printed JSON array on disk.
///
/// Every mutation reads the whole file, changes it in memory and writes the
/// whole file back through a temp file + rename. Mutations from this process
/// are serialized by `write_lock`; other processes writing the same file are not
/// coordinated with and can lose updates.
pub struct FileJobStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileJobStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the collection. A missing file is an empty collection.
    async fn read_all(&self) -> Result<Vec<Job>, StoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    async fn write_all(&self, jobs: &[Job]) -> Result<(), StoreError> {
        let io_err = |source: std::io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }

        let body = serde_json::to_vec_pretty(jobs)?;
        replace_file(&self.path, &body).await.map_err(io_err)?;

        debug!("Wrote {} jobs to {}", jobs.len(), self.path.display());
        Ok(())
    }
}

/// Writes `body` to a sibling temp file and renames it over `path`.
/// On failure `path` keeps its old content and the temp file is removed.
async fn replace_file(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let tmp = path.with_extension("json.tmp");
    let result = match tokio::fs::write(&tmp, body).await {
        Ok(()) => tokio::fs::rename(&tmp, path).await,
        Err(e) => Err(e),
    };
    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&tmp).await {
            if e.kind() != ErrorKind::NotFound {
                debug!("Could not remove {}: {e}", tmp.display());
            }
        }
    }
    result
}

#[async_trait]
impl JobStore for FileJobStore {
    async fn list(&self) -> Vec<Job> {
        match self.read_all().await {
            Ok(jobs) => jobs,
            Err(e) => {
                warn!("Failed to read jobs, returning empty list: {e}");
                Vec::new()
            }
        }
    }

    async fn create(&self, new_job: NewJob) -> Result<Job, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.read_all().await?;
        let job = insert_job(&mut jobs, new_job)?;
        self.write_all(&jobs).await?;
        Ok(job)
    }

    async fn update(&self, id: &str, update: JobUpdate) -> Result<Job, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.read_all().await?;
        let job = update_job(&mut jobs, id, update)?;
        self.write_all(&jobs).await?;
        Ok(job)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut jobs = self.read_all().await?;
        remove_job(&mut jobs, id)?;
        self.write_all(&jobs).await?;
        Ok(())
    }
}
