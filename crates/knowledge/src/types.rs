//! Knowledge system type definitions.

use serde::{Deserialize, Serialize};

/// A unit of ingested text: the raw content of one file (or one PDF
/// page) plus the path it came from. Immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Raw text content
    pub content: String,

    /// Source path or identifier
    pub source: String,
}

/// A bounded slice of a document, carrying its source verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Chunk text (at most the configured chunk size)
    pub text: String,

    /// Source inherited from the parent document
    pub source: String,
}

/// One similarity-search hit, ranked ascending by distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedChunk {
    /// Stored chunk text
    pub text: String,

    /// Stored source path
    pub source: String,

    /// Cosine distance to the query (smaller is more relevant)
    pub distance: f32,
}

/// A citation entry returned alongside an answer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceRef {
    /// Source file or document path
    pub source: String,

    /// Short single-line snippet of the retrieved chunk
    pub snippet: String,
}

/// The result of answering one question. Ephemeral, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The question as asked
    pub question: String,

    /// The model's answer text
    pub answer: String,

    /// Citations for every retrieved chunk
    pub sources: Vec<SourceRef>,

    /// How many chunks the similarity search returned
    pub retrieved_chunks: usize,

    /// Chat model identifier
    pub llm_model: String,

    /// Embedding model identifier
    pub embed_model: String,
}

/// Summary of one full index rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexSummary {
    /// Number of code/text documents loaded
    pub code_docs: usize,

    /// Number of PDF page documents loaded
    pub pdf_docs: usize,

    /// Total documents chunked
    pub total_docs: usize,

    /// Number of chunks written to the index
    pub chunks_indexed: usize,

    /// Resolved index directory
    pub index_dir: String,

    /// Collection name
    pub collection: String,

    /// Embedding model identifier
    pub embed_model: String,

    /// Chat model identifier
    pub llm_model: String,
}
