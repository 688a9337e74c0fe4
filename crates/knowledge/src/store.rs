//! LanceDB-backed vector store.
//!
//! One connection, one table. The table schema is flat: chunk id,
//! source path, chunk text, and a fixed-size embedding vector.

use arrow_array::{Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray};
use arrow_schema::{DataType, Field, Schema};
use futures::TryStreamExt;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::{Connection, Table};
use ragd_core::{AppError, AppResult};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use crate::types::{Chunk, RetrievedChunk};

/// Result of a collection delete. Callers see exactly what happened;
/// "already gone" and "gone now" are different facts.
#[derive(Debug, Clone, PartialEq)]
pub enum DeleteOutcome {
    /// The collection existed and was removed.
    Deleted,

    /// There was no collection to remove.
    NotFound,

    /// The backend refused to remove it.
    Failed(String),
}

/// Vector store over a LanceDB table.
pub struct VectorStore {
    conn: Connection,
    table: Table,
    collection: String,
    embedding_dim: usize,
}

impl VectorStore {
    /// Connect to the store at `index_dir`, creating the directory and
    /// the collection table if they do not exist yet.
    pub async fn open(index_dir: &Path, collection: &str, embedding_dim: usize) -> AppResult<Self> {
        std::fs::create_dir_all(index_dir)
            .map_err(|e| AppError::Index(format!("Failed to create index directory: {}", e)))?;

        let uri = index_dir.to_string_lossy().to_string();
        let conn = lancedb::connect(&uri)
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to connect to LanceDB: {}", e)))?;

        let table_names = conn
            .table_names()
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to list tables: {}", e)))?;

        let table = if table_names.contains(&collection.to_string()) {
            conn.open_table(collection)
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to open table: {}", e)))?
        } else {
            let schema = Self::schema(embedding_dim);
            let empty = RecordBatch::new_empty(schema.clone());
            conn.create_table(collection, RecordBatchIterator::new(vec![Ok(empty)], schema))
                .execute()
                .await
                .map_err(|e| AppError::Index(format!("Failed to create table: {}", e)))?
        };

        debug!("Opened vector store at {}", index_dir.display());

        Ok(Self {
            conn,
            table,
            collection: collection.to_string(),
            embedding_dim,
        })
    }

    fn schema(embedding_dim: usize) -> Arc<Schema> {
        Arc::new(Schema::new(vec![
            Field::new("id", DataType::Utf8, false),
            Field::new("source", DataType::Utf8, false),
            Field::new("text", DataType::Utf8, false),
            Field::new(
                "embedding",
                DataType::FixedSizeList(
                    Arc::new(Field::new("item", DataType::Float32, true)),
                    embedding_dim as i32,
                ),
                false,
            ),
        ]))
    }

    /// Append chunks with their embeddings. Inputs are parallel arrays;
    /// an empty batch is a no-op. Every embedding must match the table
    /// dimension.
    pub async fn add_chunks(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> AppResult<()> {
        if chunks.len() != embeddings.len() {
            return Err(AppError::Index(format!(
                "Chunk/embedding count mismatch: {} chunks, {} embeddings",
                chunks.len(),
                embeddings.len()
            )));
        }
        if chunks.is_empty() {
            return Ok(());
        }

        for embedding in embeddings {
            if embedding.len() != self.embedding_dim {
                return Err(AppError::Index(format!(
                    "Embedding dimension mismatch: expected {}, got {}",
                    self.embedding_dim,
                    embedding.len()
                )));
            }
        }

        let batch = self.to_batch(chunks, embeddings)?;
        self.table
            .add(RecordBatchIterator::new(vec![Ok(batch.clone())], batch.schema()))
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to add chunks: {}", e)))?;

        debug!("Inserted {} chunks into {}", chunks.len(), self.collection);
        Ok(())
    }

    /// Build one record batch covering the whole insert.
    fn to_batch(&self, chunks: &[Chunk], embeddings: &[Vec<f32>]) -> AppResult<RecordBatch> {
        let ids: Vec<String> = chunks.iter().map(|_| Uuid::new_v4().to_string()).collect();
        let id_array = StringArray::from(ids);
        let source_array = StringArray::from(
            chunks.iter().map(|c| c.source.as_str()).collect::<Vec<_>>(),
        );
        let text_array =
            StringArray::from(chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>());

        let flat: Vec<f32> = embeddings.iter().flatten().copied().collect();
        let embedding_array = FixedSizeListArray::new(
            Arc::new(Field::new("item", DataType::Float32, true)),
            self.embedding_dim as i32,
            Arc::new(Float32Array::from(flat)),
            None,
        );

        RecordBatch::try_new(
            Self::schema(self.embedding_dim),
            vec![
                Arc::new(id_array),
                Arc::new(source_array),
                Arc::new(text_array),
                Arc::new(embedding_array),
            ],
        )
        .map_err(|e| AppError::Index(format!("Failed to build record batch: {}", e)))
    }

    /// Similarity search: the `top_k` stored chunks nearest to
    /// `query_embedding`, ascending by cosine distance.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
    ) -> AppResult<Vec<RetrievedChunk>> {
        if query_embedding.len() != self.embedding_dim {
            return Err(AppError::Index(format!(
                "Query embedding dimension mismatch: expected {}, got {}",
                self.embedding_dim,
                query_embedding.len()
            )));
        }

        let batches = self
            .table
            .query()
            .nearest_to(query_embedding.to_vec())
            .map_err(|e| AppError::Index(format!("Failed to build query: {}", e)))?
            .limit(top_k)
            .execute()
            .await
            .map_err(|e| AppError::Index(format!("Failed to execute search: {}", e)))?
            .try_collect::<Vec<_>>()
            .await
            .map_err(|e| AppError::Index(format!("Failed to collect results: {}", e)))?;

        let mut results = Vec::new();
        for batch in &batches {
            for row in 0..batch.num_rows() {
                let (source, text, embedding) = Self::read_row(batch, row)?;
                let distance = 1.0 - cosine_similarity(query_embedding, &embedding);
                results.push(RetrievedChunk {
                    text,
                    source,
                    distance,
                });
            }
        }

        results.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(top_k);

        debug!("Retrieved {} chunks (requested top-{})", results.len(), top_k);
        Ok(results)
    }

    fn read_row(batch: &RecordBatch, row: usize) -> AppResult<(String, String, Vec<f32>)> {
        let source = batch
            .column(1)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| AppError::Index("Invalid source column".to_string()))?
            .value(row)
            .to_string();

        let text = batch
            .column(2)
            .as_any()
            .downcast_ref::<StringArray>()
            .ok_or_else(|| AppError::Index("Invalid text column".to_string()))?
            .value(row)
            .to_string();

        let list = batch
            .column(3)
            .as_any()
            .downcast_ref::<FixedSizeListArray>()
            .ok_or_else(|| AppError::Index("Invalid embedding column".to_string()))?;
        let values = list.value(row);
        let values = values
            .as_any()
            .downcast_ref::<Float32Array>()
            .ok_or_else(|| AppError::Index("Invalid embedding values".to_string()))?;
        let embedding: Vec<f32> = (0..values.len()).map(|i| values.value(i)).collect();

        Ok((source, text, embedding))
    }

    /// Number of stored chunks.
    pub async fn count(&self) -> AppResult<usize> {
        self.table
            .count_rows(None)
            .await
            .map_err(|e| AppError::Index(format!("Failed to count rows: {}", e)))
    }

    /// Drop the collection table. Consumes the store: a dropped table
    /// leaves nothing valid to hold onto, callers reopen instead.
    pub async fn delete_collection(self) -> DeleteOutcome {
        let table_names = match self.conn.table_names().execute().await {
            Ok(names) => names,
            Err(e) => return DeleteOutcome::Failed(format!("Failed to list tables: {}", e)),
        };

        if !table_names.contains(&self.collection) {
            return DeleteOutcome::NotFound;
        }

        match self.conn.drop_table(&self.collection, &[]).await {
            Ok(()) => {
                info!("Dropped collection {}", self.collection);
                DeleteOutcome::Deleted
            }
            Err(e) => DeleteOutcome::Failed(format!("Failed to drop table: {}", e)),
        }
    }
}

/// Cosine similarity, 0.0 for degenerate vectors.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{EmbeddingProvider, MockEmbedder};
    use tempfile::TempDir;

    const DIM: usize = 32;

    fn chunk(source: &str, text: &str) -> Chunk {
        Chunk {
            text: text.to_string(),
            source: source.to_string(),
        }
    }

    async fn embed_all(texts: &[&str]) -> Vec<Vec<f32>> {
        let embedder = MockEmbedder::new(DIM);
        let mut out = Vec::new();
        for text in texts {
            out.push(embedder.embed(text).await.unwrap());
        }
        out
    }

    #[tokio::test]
    async fn test_open_creates_table_and_starts_empty() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_and_count() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();

        let chunks = vec![chunk("a.rs", "alpha text"), chunk("b.rs", "beta text")];
        let embeddings = embed_all(&["alpha text", "beta text"]).await;
        store.add_chunks(&chunks, &embeddings).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_empty_add_is_a_noop() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        store.add_chunks(&[], &[]).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_rejects_wrong_dimension() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();

        let result = store
            .add_chunks(&[chunk("a.rs", "text")], &[vec![0.5; DIM + 1]])
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_search_orders_by_distance() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        let embedder = MockEmbedder::new(DIM);

        let texts = [
            "rust ownership and borrowing rules",
            "annual financial report for the year",
            "rust ownership explained in depth",
        ];
        let chunks: Vec<Chunk> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| chunk(&format!("doc{}.txt", i), t))
            .collect();
        let embeddings = embed_all(&texts).await;
        store.add_chunks(&chunks, &embeddings).await.unwrap();

        let query = embedder.embed("rust ownership").await.unwrap();
        let results = store.search(&query, 2).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].distance <= results[1].distance);
        assert!(results[0].text.contains("ownership"));
    }

    #[tokio::test]
    async fn test_search_on_empty_table_returns_nothing() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        let embedder = MockEmbedder::new(DIM);

        let query = embedder.embed("anything").await.unwrap();
        let results = store.search(&query, 4).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_search_rejects_wrong_query_dimension() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        assert!(store.search(&vec![0.1; DIM - 1], 4).await.is_err());
    }

    #[tokio::test]
    async fn test_delete_existing_collection() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        assert_eq!(store.delete_collection().await, DeleteOutcome::Deleted);

        // Reopen recreates the table from scratch.
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_reports_not_found_after_external_drop() {
        let dir = TempDir::new().unwrap();
        let store = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();
        let second = VectorStore::open(dir.path(), "personal_rag", DIM).await.unwrap();

        assert_eq!(store.delete_collection().await, DeleteOutcome::Deleted);
        assert_eq!(second.delete_collection().await, DeleteOutcome::NotFound);
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
    }
}
