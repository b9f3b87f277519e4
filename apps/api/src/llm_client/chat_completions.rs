//! OpenAI-compatible Chat Completions backend (Groq, OpenAI).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{api_error_message, Endpoint, LlmBackend, LlmError, MAX_TOKENS, TEMPERATURE};

const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
const GROQ_MODEL: &str = "llama3-70b-8192";
const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENAI_MODEL: &str = "gpt-3.5-turbo";

/// How the provider spells the completion token cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenCap {
    MaxTokens,
    MaxCompletionTokens,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

pub fn groq_endpoint() -> Endpoint {
    Endpoint::new(GROQ_BASE_URL, GROQ_MODEL)
}

pub fn openai_endpoint() -> Endpoint {
    Endpoint::new(OPENAI_BASE_URL, OPENAI_MODEL)
}

pub struct ChatCompletionsBackend {
    client: Client,
    api_key: String,
    endpoint: Endpoint,
    provider: &'static str,
    token_cap: TokenCap,
}

impl ChatCompletionsBackend {
    pub fn groq(client: Client, api_key: String, endpoint: Endpoint) -> Self {
        Self {
            client,
            api_key,
            endpoint,
            provider: "groq",
            token_cap: TokenCap::MaxTokens,
        }
    }

    pub fn openai(client: Client, api_key: String, endpoint: Endpoint) -> Self {
        Self {
            client,
            api_key,
            endpoint,
            provider: "openai",
            token_cap: TokenCap::MaxCompletionTokens,
        }
    }

    fn request_body<'a>(&'a self, system: &'a str, prompt: &'a str) -> ChatRequest<'a> {
        let (max_tokens, max_completion_tokens) = match self.token_cap {
            TokenCap::MaxTokens => (Some(MAX_TOKENS), None),
            TokenCap::MaxCompletionTokens => (None, Some(MAX_TOKENS)),
        };
        ChatRequest {
            model: &self.endpoint.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens,
            max_completion_tokens,
        }
    }
}

#[async_trait]
impl LlmBackend for ChatCompletionsBackend {
    fn name(&self) -> &str {
        self.provider
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        let response = self
            .client
            .post(self.endpoint.url("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&self.request_body(system, prompt))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Api {
                status: status.as_u16(),
                message: api_error_message(body),
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

#[cfg(test)]
mod tests {
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};

    use super::*;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[test]
    fn test_groq_request_uses_max_tokens() {
        let backend = ChatCompletionsBackend::groq(Client::new(), "k".to_string(), groq_endpoint());
        let body = serde_json::to_value(backend.request_body("sys", "user")).unwrap();
        assert_eq!(body["model"], GROQ_MODEL);
        assert_eq!(body["max_tokens"], MAX_TOKENS);
        assert!(body.get("max_completion_tokens").is_none());
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "user");
    }

    #[test]
    fn test_openai_request_uses_max_completion_tokens() {
        let backend =
            ChatCompletionsBackend::openai(Client::new(), "k".to_string(), openai_endpoint());
        let body = serde_json::to_value(backend.request_body("sys", "user")).unwrap();
        assert_eq!(body["model"], OPENAI_MODEL);
        assert_eq!(body["max_completion_tokens"], MAX_TOKENS);
        assert!(body.get("max_tokens").is_none());
    }

    #[tokio::test]
    async fn test_complete_returns_first_choice_content() {
        let router = Router::new().route(
            "/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["messages"][0]["role"], "system");
                Json(json!({
                    "choices": [{"message": {"role": "assistant", "content": "{\"summary\": \"ok\"}"}}]
                }))
            }),
        );
        let base = serve(router).await;
        let endpoint = groq_endpoint().with_overrides(Some(base), None);
        let backend = ChatCompletionsBackend::groq(Client::new(), "k".to_string(), endpoint);

        let text = backend.complete("sys", "user").await.unwrap();
        assert_eq!(text, "{\"summary\": \"ok\"}");
    }

    #[tokio::test]
    async fn test_complete_maps_error_status() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async {
                (
                    axum::http::StatusCode::UNAUTHORIZED,
                    Json(json!({"error": {"message": "Invalid API Key"}})),
                )
            }),
        );
        let base = serve(router).await;
        let endpoint = openai_endpoint().with_overrides(Some(base), None);
        let backend = ChatCompletionsBackend::openai(Client::new(), "bad".to_string(), endpoint);

        let err = backend.complete("sys", "user").await.unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Invalid API Key");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_complete_without_choices_is_empty_content() {
        let router = Router::new().route(
            "/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let base = serve(router).await;
        let endpoint = groq_endpoint().with_overrides(Some(base), None);
        let backend = ChatCompletionsBackend::groq(Client::new(), "k".to_string(), endpoint);

        let err = backend.complete("sys", "user").await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyContent));
    }
}
