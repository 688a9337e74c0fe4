//! Chat-model client abstraction for ragd.
//!
//! Defines the provider-agnostic [`LlmClient`] trait and the Ollama
//! implementation used by the answer pipeline.

pub mod client;
pub mod ollama;

pub use client::{ChatOutput, ChatRequest, ChatResponse, LlmClient};
pub use ollama::OllamaClient;
