//! Chat client abstraction and request/response types.

use ragd_core::AppResult;
use serde::{Deserialize, Serialize};

/// A single chat completion request: a fixed system instruction plus
/// one user message, sent as a two-message conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    /// System instruction
    pub system: String,

    /// User message text
    pub prompt: String,

    /// Model identifier (e.g., "qwen2.5:3b")
    pub model: String,
}

impl ChatRequest {
    /// Create a new chat request.
    pub fn new(
        system: impl Into<String>,
        prompt: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            model: model.into(),
        }
    }
}

/// Model output, tagged at the provider boundary.
///
/// Providers decide once, while parsing the HTTP body, whether the
/// response carried a text field. Callers never probe response shapes
/// themselves.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatOutput {
    /// The backend returned a well-formed text completion.
    Text { text: String },

    /// The backend returned something without a text field; kept
    /// verbatim so callers can degrade to a string rendering.
    Raw { raw: serde_json::Value },
}

impl ChatOutput {
    /// Render the output as plain text.
    ///
    /// `Raw` falls back to the JSON rendering of the whole body: a
    /// malformed backend response degrades, it never crashes.
    pub fn into_text(self) -> String {
        match self {
            ChatOutput::Text { text } => text,
            ChatOutput::Raw { raw } => raw.to_string(),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The model output
    pub output: ChatOutput,

    /// Model that generated the response
    pub model: String,
}

/// Trait for chat-model providers.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Get the provider name (e.g., "ollama").
    fn provider_name(&self) -> &str;

    /// Perform a single synchronous chat round trip.
    ///
    /// Backend failures (unreachable, non-2xx) are propagated to the
    /// caller unmodified; there are no retries.
    async fn chat(&self, request: &ChatRequest) -> AppResult<ChatResponse>;
}
