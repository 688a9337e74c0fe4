//! Knowledge system for ragd: corpus loading, chunking, embedding,
//! vector storage, and the two pipelines built on top of them
//! (full index rebuild and question answering).

pub mod chunker;
pub mod context;
pub mod embeddings;
pub mod loader;
pub mod prompts;
pub mod store;
pub mod types;

pub use chunker::Chunker;
pub use embeddings::{EmbeddingProvider, MockEmbedder, OllamaEmbedder};
pub use store::{DeleteOutcome, VectorStore};
pub use types::{Answer, Chunk, Document, IndexSummary, RetrievedChunk, SourceRef};

use ragd_core::{RagConfig, COLLECTION_NAME};
use ragd_llm::{ChatRequest, LlmClient};
use tracing::{info, warn};

/// Rebuild the vector index from scratch.
///
/// Drops the existing collection, reloads both corpora (code first,
/// then PDFs), chunks and embeds everything, and writes the result in
/// one batch. The summary reports what was loaded and indexed.
pub async fn reindex_all(
    config: &RagConfig,
    embedder: &dyn EmbeddingProvider,
) -> ragd_core::AppResult<IndexSummary> {
    info!("Starting full index rebuild");

    let store = VectorStore::open(&config.index_dir, COLLECTION_NAME, config.embedding_dim).await?;
    match store.delete_collection().await {
        DeleteOutcome::Deleted => info!("Dropped previous collection"),
        DeleteOutcome::NotFound => info!("No previous collection to drop"),
        DeleteOutcome::Failed(reason) => {
            warn!("Could not drop previous collection: {}", reason)
        }
    }
    let store = VectorStore::open(&config.index_dir, COLLECTION_NAME, config.embedding_dim).await?;

    let code_docs = loader::load_code_documents(&config.code_root);
    let pdf_docs = loader::load_pdf_documents(&config.pdf_root);
    info!(
        "Loaded {} code documents, {} PDF page documents",
        code_docs.len(),
        pdf_docs.len()
    );

    let mut documents = code_docs;
    let code_count = documents.len();
    let pdf_count = pdf_docs.len();
    documents.extend(pdf_docs);

    let chunker = Chunker::new(config.chunk_size, config.chunk_overlap)?;
    let chunks = chunker.split_documents(&documents);

    if !chunks.is_empty() {
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        store.add_chunks(&chunks, &embeddings).await?;
    }

    info!("Indexed {} chunks from {} documents", chunks.len(), documents.len());

    Ok(IndexSummary {
        code_docs: code_count,
        pdf_docs: pdf_count,
        total_docs: documents.len(),
        chunks_indexed: chunks.len(),
        index_dir: config.index_dir.display().to_string(),
        collection: COLLECTION_NAME.to_string(),
        embed_model: config.embed_model.clone(),
        llm_model: config.llm_model.clone(),
    })
}

/// Answer a question against the current index.
///
/// Embeds the question, retrieves the nearest chunks, formats them into
/// a bounded context block, and asks the chat model. When retrieval
/// comes back empty the model is still asked, with an empty context;
/// the system prompt then steers it to the refusal sentence.
pub async fn ask(
    config: &RagConfig,
    embedder: &dyn EmbeddingProvider,
    llm: &dyn LlmClient,
    question: &str,
) -> ragd_core::AppResult<Answer> {
    info!("Answering question ({} chars)", question.len());

    let store = VectorStore::open(&config.index_dir, COLLECTION_NAME, config.embedding_dim).await?;

    let query_embedding = embedder.embed(question).await?;
    let retrieved = store.search(&query_embedding, config.top_k).await?;
    info!("Retrieved {} chunks", retrieved.len());

    let (context, sources) = context::format_context(&retrieved, config.max_context_chars);
    let user_prompt = prompts::build_user_prompt(question, &context);

    let request = ChatRequest::new(prompts::SYSTEM_PROMPT, user_prompt, &config.llm_model);
    let response = llm.chat(&request).await?;

    Ok(Answer {
        question: question.to_string(),
        answer: response.output.into_text(),
        sources,
        retrieved_chunks: retrieved.len(),
        llm_model: config.llm_model.clone(),
        embed_model: config.embed_model.clone(),
    })
}
