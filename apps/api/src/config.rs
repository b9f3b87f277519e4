use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

/// Which `JobStore` backend the server runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    File,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StoreBackend::File),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(anyhow!("unknown job store '{other}' (expected 'file' or 'memory')")),
        }
    }
}

/// Hosted model provider used for job description analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisProvider {
    Groq,
    OpenAi,
    Anthropic,
    None,
}

impl AnalysisProvider {
    /// Environment variable holding the provider's API key.
    pub fn api_key_var(&self) -> Option<&'static str> {
        match self {
            AnalysisProvider::Groq => Some("GROQ_API_KEY"),
            AnalysisProvider::OpenAi => Some("OPENAI_API_KEY"),
            AnalysisProvider::Anthropic => Some("ANTHROPIC_API_KEY"),
            AnalysisProvider::None => None,
        }
    }
}

impl FromStr for AnalysisProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "groq" => Ok(AnalysisProvider::Groq),
            "openai" => Ok(AnalysisProvider::OpenAi),
            "anthropic" => Ok(AnalysisProvider::Anthropic),
            "none" | "off" => Ok(AnalysisProvider::None),
            other => Err(anyhow!(
                "unknown analysis provider '{other}' (expected groq, openai, anthropic or none)"
            )),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Only malformed values fail startup; a missing API key just disables analysis.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub jobs_file: PathBuf,
    pub job_store: StoreBackend,
    pub analysis_provider: AnalysisProvider,
    pub analysis_api_key: Option<String>,
    pub analysis_base_url: Option<String>,
    pub analysis_model: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let analysis_provider: AnalysisProvider = env_or("ANALYSIS_PROVIDER", "groq")
            .parse()
            .context("ANALYSIS_PROVIDER is invalid")?;

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            jobs_file: PathBuf::from(env_or("JOBS_FILE", "data/jobs.json")),
            job_store: env_or("JOB_STORE", "file")
                .parse()
                .context("JOB_STORE is invalid")?,
            analysis_api_key: analysis_provider.api_key_var().and_then(optional_env),
            analysis_provider,
            analysis_base_url: optional_env("ANALYSIS_BASE_URL"),
            analysis_model: optional_env("ANALYSIS_MODEL"),
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
