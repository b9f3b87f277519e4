//! LLM Client: the single point of entry for hosted language-model calls.
//!
//! No other module talks to a provider API directly. Providers plug in behind
//! `LlmBackend`; which one runs is decided once at startup from `Config`.
//!
//! Every call is exactly one HTTP request. There is no retry and no backoff.
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{AnalysisProvider, Config};

pub mod anthropic;
pub mod chat_completions;
pub mod prompts;

pub use anthropic::AnthropicBackend;
pub use chat_completions::ChatCompletionsBackend;

/// Sampling temperature for every provider. Results are not reproducible.
pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 500;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// Where a backend sends requests and which model it asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub base_url: String,
    pub model: String,
}

impl Endpoint {
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            model: model.to_string(),
        }
    }

    /// Applies `ANALYSIS_BASE_URL` / `ANALYSIS_MODEL` style overrides.
    pub fn with_overrides(mut self, base_url: Option<String>, model: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    /// `{base_url}/{path}`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }
}

/// A hosted text-generation provider.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Short provider name for logs.
    fn name(&self) -> &str;

    /// Sends one system + user prompt pair and returns the raw reply text.
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Cheap-to-clone handle over the configured backend.
#[derive(Clone)]
pub struct LlmClient {
    backend: Arc<dyn LlmBackend>,
}

impl LlmClient {
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    /// Builds the client selected by config.
    /// Returns `None` when analysis is switched off or the provider key is missing.
    pub fn from_config(config: &Config) -> Option<Self> {
        let api_key = match (config.analysis_provider, &config.analysis_api_key) {
            (AnalysisProvider::None, _) => {
                info!("Job analysis disabled (ANALYSIS_PROVIDER=none)");
                return None;
            }
            (provider, None) => {
                warn!(
                    "{} is not set; job analysis will return fallback content",
                    provider.api_key_var().unwrap_or("API key")
                );
                return None;
            }
            (_, Some(key)) => key.clone(),
        };

        // No timeout override: the transport default applies.
        let http = Client::new();
        let endpoint = |defaults: Endpoint| {
            defaults.with_overrides(
                config.analysis_base_url.clone(),
                config.analysis_model.clone(),
            )
        };

        let backend: Arc<dyn LlmBackend> = match config.analysis_provider {
            AnalysisProvider::Groq => Arc::new(ChatCompletionsBackend::groq(
                http,
                api_key,
                endpoint(chat_completions::groq_endpoint()),
            )),
            AnalysisProvider::OpenAi => Arc::new(ChatCompletionsBackend::openai(
                http,
                api_key,
                endpoint(chat_completions::openai_endpoint()),
            )),
            AnalysisProvider::Anthropic => Arc::new(AnthropicBackend::new(
                http,
                api_key,
                endpoint(anthropic::default_endpoint()),
            )),
            AnalysisProvider::None => return None,
        };

        info!("LLM client initialized (provider: {})", backend.name());
        Some(Self::new(backend))
    }

    pub fn provider(&self) -> &str {
        self.backend.name()
    }

    /// Raw reply text from the backend.
    pub async fn call(&self, prompt: &str, system: &str) -> Result<String, LlmError> {
        let text = self.backend.complete(system, prompt).await?;
        debug!(
            "LLM call to {} returned {} chars",
            self.backend.name(),
            text.len()
        );
        Ok(text)
    }

    /// Calls the LLM and deserializes the reply as JSON.
    /// The prompt must instruct the model to return valid JSON.
    pub async fn call_json<T: DeserializeOwned>(
        &self,
        prompt: &str,
        system: &str,
    ) -> Result<T, LlmError> {
        let text = self.call(prompt, system).await?;

        // Strip markdown code fences if the model wraps JSON in them
        let text = strip_json_fences(&text);
        if text.is_empty() {
            return Err(LlmError::EmptyContent);
        }

        serde_json::from_str(text).map_err(LlmError::Parse)
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));
    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim()),
        None => text,
    }
}

/// Pulls the provider's error message out of a JSON error body, if there is one.
pub(crate) fn api_error_message(body: String) -> String {
    #[derive(serde::Deserialize)]
    struct ErrorEnvelope {
        error: ErrorBody,
    }

    #[derive(serde::Deserialize)]
    struct ErrorBody {
        message: String,
    }

    serde_json::from_str::<ErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body)
}
