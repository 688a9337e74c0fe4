//! Document chunking.
//!
//! Splits documents into overlapping, boundary-aware windows sized in
//! characters. Splitting prefers natural breaks (paragraphs, then
//! sentences, then words) over hard cuts mid-word.

use ragd_core::{AppError, AppResult};
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::debug;

use crate::types::{Chunk, Document};

/// Character-based splitter with a fixed size and overlap.
pub struct Chunker {
    splitter: TextSplitter<text_splitter::Characters>,
}

impl Chunker {
    /// Create a chunker.
    ///
    /// Fails fast when `overlap >= size`: such a window would never
    /// advance through the text.
    pub fn new(size: usize, overlap: usize) -> AppResult<Self> {
        let config = ChunkConfig::new(size).with_overlap(overlap).map_err(|e| {
            AppError::Knowledge(format!(
                "Invalid chunking parameters (size {}, overlap {}): {}",
                size, overlap, e
            ))
        })?;

        Ok(Self {
            splitter: TextSplitter::new(config),
        })
    }

    /// Split one document into chunks, each inheriting the document's
    /// source. Documents with no non-whitespace content produce zero
    /// chunks.
    pub fn split_document(&self, document: &Document) -> Vec<Chunk> {
        if document.content.trim().is_empty() {
            return Vec::new();
        }

        self.splitter
            .chunks(&document.content)
            .map(|text| Chunk {
                text: text.to_string(),
                source: document.source.clone(),
            })
            .collect()
    }

    /// Split a batch of documents, preserving document order.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = documents
            .iter()
            .flat_map(|doc| self.split_document(doc))
            .collect();

        debug!(
            "Chunked {} documents into {} chunks",
            documents.len(),
            chunks.len()
        );

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(source: &str, content: &str) -> Document {
        Document {
            content: content.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_rejects_overlap_not_smaller_than_size() {
        assert!(Chunker::new(100, 100).is_err());
        assert!(Chunker::new(100, 150).is_err());
        assert!(Chunker::new(100, 99).is_ok());
    }

    #[test]
    fn test_short_document_yields_single_chunk() {
        let chunker = Chunker::new(1200, 200).unwrap();
        let chunks = chunker.split_document(&doc("a.rs", "fn main() {}"));

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "fn main() {}");
        assert_eq!(chunks[0].source, "a.rs");
    }

    #[test]
    fn test_whitespace_only_document_yields_no_chunks() {
        let chunker = Chunker::new(1200, 200).unwrap();
        assert!(chunker.split_document(&doc("blank.txt", "  \n\t\n ")).is_empty());
        assert!(chunker.split_document(&doc("empty.txt", "")).is_empty());
    }

    #[test]
    fn test_long_document_respects_chunk_size() {
        let chunker = Chunker::new(20, 5).unwrap();
        let content = "All widgets are blue. Blue is the only widget color.";
        let chunks = chunker.split_document(&doc("widgets.txt", content));

        assert!(chunks.len() >= 2);
        for chunk in &chunks {
            assert!(chunk.text.chars().count() <= 20, "oversized chunk: {:?}", chunk.text);
            assert_eq!(chunk.source, "widgets.txt");
        }
    }

    #[test]
    fn test_consecutive_chunks_share_overlap() {
        // Words are short enough that the overlap window always has
        // room for at least the previous chunk's last word.
        let overlap = 5;
        let chunker = Chunker::new(12, overlap).unwrap();
        let content = "ab cd ef gh ij kl mn op qr st uv wx yz";
        let chunks = chunker.split_document(&doc("pairs.txt", content));
        assert!(chunks.len() >= 3);

        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].text.chars().collect();
            let next = &pair[1].text;
            let shared = (1..=overlap.min(prev.len()))
                .rev()
                .map(|n| prev[prev.len() - n..].iter().collect::<String>())
                .find(|suffix| next.starts_with(suffix.as_str()));
            assert!(
                shared.is_some(),
                "chunk {:?} does not begin with a trailing slice (<= {} chars) of {:?}",
                next,
                overlap,
                pair[0].text
            );
        }
    }

    #[test]
    fn test_chunks_cover_the_document() {
        let chunker = Chunker::new(30, 10).unwrap();
        let content = "one two three four five six seven eight nine ten eleven twelve";
        let chunks = chunker.split_document(&doc("n.txt", content));

        for word in content.split_whitespace() {
            assert!(
                chunks.iter().any(|c| c.text.contains(word)),
                "word {:?} missing from all chunks",
                word
            );
        }
    }

    #[test]
    fn test_split_documents_preserves_order() {
        let chunker = Chunker::new(1200, 200).unwrap();
        let docs = vec![doc("a.txt", "first"), doc("b.txt", "second")];
        let chunks = chunker.split_documents(&docs);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].source, "a.txt");
        assert_eq!(chunks[1].source, "b.txt");
    }
}
