//! Ollama chat provider.
//!
//! Talks to a local Ollama server via its chat API:
//! https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{ChatOutput, ChatRequest, ChatResponse, LlmClient};
use ragd_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Request timeout in seconds. One bounded round trip, no retries.
const REQUEST_TIMEOUT_SECS: u64 = 120;

/// One message in the Ollama chat payload.
#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: &'static str,
    content: String,
}

/// Ollama chat API request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
}

/// The parts of the Ollama chat response we rely on. The full body is
/// parsed as JSON first so a missing text field degrades to a raw
/// rendering instead of a parse error.
#[derive(Debug, Deserialize)]
struct OllamaChatMessage {
    content: String,
}

/// Ollama chat client.
pub struct OllamaClient {
    /// Base URL for the Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with the default local endpoint.
    pub fn new() -> AppResult<Self> {
        Self::with_base_url("http://127.0.0.1:11434")
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// Convert a [`ChatRequest`] into the Ollama wire format.
    fn to_ollama_request(&self, request: &ChatRequest) -> OllamaChatRequest {
        OllamaChatRequest {
            model: request.model.clone(),
            messages: vec![
                OllamaMessage {
                    role: "system",
                    content: request.system.clone(),
                },
                OllamaMessage {
                    role: "user",
                    content: request.prompt.clone(),
                },
            ],
            stream: false,
        }
    }

    /// Decide once whether the response body carries chat text.
    fn classify_body(body: serde_json::Value) -> ChatOutput {
        match body.get("message") {
            Some(message) => {
                match serde_json::from_value::<OllamaChatMessage>(message.clone()) {
                    Ok(parsed) => ChatOutput::Text {
                        text: parsed.content,
                    },
                    Err(_) => ChatOutput::Raw { raw: body },
                }
            }
            None => ChatOutput::Raw { raw: body },
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending chat request to Ollama (model: {})", request.model);

        let ollama_request = self.to_ollama_request(request);
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&ollama_request)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        let model = body
            .get("model")
            .and_then(|m| m.as_str())
            .unwrap_or(&request.model)
            .to_string();

        let output = Self::classify_body(body);

        tracing::debug!("Received chat response from Ollama (model: {})", model);

        Ok(ChatResponse { output, model })
    }
}
