//! Configuration for the ragd service.
//!
//! The configuration is read from environment variables once at process
//! start and then passed by reference into every component. There is no
//! ambient global lookup inside pipeline logic.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{AppError, AppResult};

/// Name of the single persisted vector collection.
pub const COLLECTION_NAME: &str = "personal_rag";

/// Service configuration, environment-sourced with defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Base URL of the Ollama server (chat + embeddings)
    pub ollama_base_url: String,

    /// Chat model identifier
    pub llm_model: String,

    /// Embedding model identifier
    pub embed_model: String,

    /// Embedding vector dimension
    pub embedding_dim: usize,

    /// Directory holding the persisted vector index
    pub index_dir: PathBuf,

    /// Root of the code/text corpus
    pub code_root: PathBuf,

    /// Directory of PDF documents
    pub pdf_root: PathBuf,

    /// Number of chunks to retrieve per question
    pub top_k: usize,

    /// Maximum chunk size in characters
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,

    /// Character budget for the prompt context block
    pub max_context_chars: usize,

    /// HTTP bind address for the server
    pub bind: String,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            ollama_base_url: "http://127.0.0.1:11434".to_string(),
            llm_model: "qwen2.5:3b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            embedding_dim: 768,
            index_dir: PathBuf::from("./rag_index"),
            code_root: PathBuf::from("./knowledge/code"),
            pdf_root: PathBuf::from("./knowledge/pdfs"),
            top_k: 4,
            chunk_size: 1200,
            chunk_overlap: 200,
            max_context_chars: 8000,
            bind: "127.0.0.1:8000".to_string(),
        }
    }
}

impl RagConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults for anything unset.
    ///
    /// Environment variables:
    /// - `OLLAMA_BASE_URL`: Ollama server URL
    /// - `LLM_MODEL`: chat model identifier
    /// - `EMBED_MODEL`: embedding model identifier
    /// - `EMBEDDING_DIM`: embedding vector dimension
    /// - `INDEX_DIR`: vector index directory
    /// - `CODE_ROOT`, `PDF_ROOT`: corpus roots
    /// - `TOP_K`, `CHUNK_SIZE`, `CHUNK_OVERLAP`, `MAX_CONTEXT_CHARS`
    /// - `RAGD_BIND`: HTTP bind address
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("OLLAMA_BASE_URL") {
            config.ollama_base_url = url;
        }
        if let Ok(model) = std::env::var("LLM_MODEL") {
            config.llm_model = model;
        }
        if let Ok(model) = std::env::var("EMBED_MODEL") {
            config.embed_model = model;
        }
        if let Ok(dir) = std::env::var("INDEX_DIR") {
            config.index_dir = PathBuf::from(dir);
        }
        if let Ok(root) = std::env::var("CODE_ROOT") {
            config.code_root = PathBuf::from(root);
        }
        if let Ok(root) = std::env::var("PDF_ROOT") {
            config.pdf_root = PathBuf::from(root);
        }
        if let Ok(bind) = std::env::var("RAGD_BIND") {
            config.bind = bind;
        }

        config.embedding_dim = parse_env("EMBEDDING_DIM", config.embedding_dim)?;
        config.top_k = parse_env("TOP_K", config.top_k)?;
        config.chunk_size = parse_env("CHUNK_SIZE", config.chunk_size)?;
        config.chunk_overlap = parse_env("CHUNK_OVERLAP", config.chunk_overlap)?;
        config.max_context_chars = parse_env("MAX_CONTEXT_CHARS", config.max_context_chars)?;

        Ok(config)
    }

    /// Validate configuration bounds.
    ///
    /// The overlap check is load-bearing: with `chunk_overlap >=
    /// chunk_size` the chunker's window would never advance.
    pub fn validate(&self) -> AppResult<()> {
        if self.top_k < 1 {
            return Err(AppError::Config("TOP_K must be >= 1".to_string()));
        }
        if self.chunk_size == 0 {
            return Err(AppError::Config("CHUNK_SIZE must be > 0".to_string()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(AppError::Config(format!(
                "CHUNK_OVERLAP ({}) must be smaller than CHUNK_SIZE ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.embedding_dim == 0 {
            return Err(AppError::Config("EMBEDDING_DIM must be > 0".to_string()));
        }
        Ok(())
    }
}

/// Parse an integer-valued environment variable, keeping the default
/// when unset.
fn parse_env(name: &str, default: usize) -> AppResult<usize> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map_err(|e| AppError::Config(format!("Invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RagConfig::default();
        assert_eq!(config.llm_model, "qwen2.5:3b");
        assert_eq!(config.embed_model, "nomic-embed-text");
        assert_eq!(config.top_k, 4);
        assert_eq!(config.chunk_size, 1200);
        assert_eq!(config.chunk_overlap, 200);
        assert_eq!(config.max_context_chars, 8000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_top_k() {
        let mut config = RagConfig::default();
        config.top_k = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_overlap_ge_chunk_size() {
        let mut config = RagConfig::default();
        config.chunk_overlap = config.chunk_size;
        assert!(config.validate().is_err());

        config.chunk_overlap = config.chunk_size + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_chunk_size() {
        let mut config = RagConfig::default();
        config.chunk_size = 0;
        assert!(config.validate().is_err());
    }
}
