use std::sync::Arc;

use crate::analysis::analyzer::JobAnalyzer;
use crate::jobs::store::JobStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Pluggable record store. `FileJobStore` unless `JOB_STORE=memory`.
    pub store: Arc<dyn JobStore>,
    /// Falls back to static content when no provider is configured.
    pub analyzer: JobAnalyzer,
}
