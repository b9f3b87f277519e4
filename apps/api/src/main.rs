mod analysis;
mod config;
mod errors;
mod jobs;
mod llm_client;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::analyzer::JobAnalyzer;
use crate::config::{Config, StoreBackend};
use crate::jobs::file_store::FileJobStore;
use crate::jobs::store::{InMemoryJobStore, JobStore};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting jobtrack API v{}", env!("CARGO_PKG_VERSION"));

    let store: Arc<dyn JobStore> = match config.job_store {
        StoreBackend::File => {
            let store = FileJobStore::new(config.jobs_file.clone());
            info!("Job store: file ({})", store.path().display());
            Arc::new(store)
        }
        StoreBackend::Memory => {
            info!("Job store: in-memory (records are lost on restart)");
            Arc::new(InMemoryJobStore::new())
        }
    };

    let analyzer = JobAnalyzer::new(LlmClient::from_config(&config));
    if !analyzer.is_enabled() {
        info!("Job analysis will serve fallback content only");
    }

    let state = AppState { store, analyzer };

    // The presentation layer is served from a different origin
    let app = build_router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()),
    );

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
