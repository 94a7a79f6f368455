//! In-memory vector index using cosine similarity.
//!
//! [`InMemoryIndex`] keeps every chunk in a `Vec` behind a
//! `tokio::sync::RwLock`: read-only after the build phase, safely shareable
//! across callers, rebuilt from scratch on restart.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::document::{Chunk, SearchResult};
use crate::error::{RagError, Result};
use crate::vectorstore::VectorStore;

/// An in-memory vector index using cosine similarity for search.
///
/// Storage order is insertion order, and search uses a stable sort, so tie
/// ordering is deterministic within one build.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc_rag::{InMemoryIndex, VectorStore};
///
/// let index = InMemoryIndex::new();
/// index.add(chunks).await?;
/// let results = index.search(&query_embedding, 5).await?;
/// ```
#[derive(Debug, Default)]
pub struct InMemoryIndex {
    chunks: RwLock<Vec<Chunk>>,
}

impl InMemoryIndex {
    /// Create a new empty index.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorStore for InMemoryIndex {
    async fn add(&self, mut new_chunks: Vec<Chunk>) -> Result<()> {
        let mut chunks = self.chunks.write().await;

        let expected = chunks
            .first()
            .or_else(|| new_chunks.first())
            .map(|chunk| chunk.embedding.len())
            .unwrap_or(0);
        for chunk in &new_chunks {
            if chunk.embedding.len() != expected || chunk.embedding.is_empty() {
                return Err(RagError::IndexError {
                    backend: "InMemory".to_string(),
                    message: format!(
                        "chunk '{}' has embedding of length {}, expected {expected}",
                        chunk.id,
                        chunk.embedding.len()
                    ),
                });
            }
        }

        chunks.append(&mut new_chunks);
        Ok(())
    }

    async fn search(&self, embedding: &[f32], top_n: usize) -> Result<Vec<SearchResult>> {
        let chunks = self.chunks.read().await;

        let mut scored: Vec<SearchResult> = chunks
            .iter()
            .map(|chunk| SearchResult {
                chunk: chunk.clone(),
                score: cosine_similarity(&chunk.embedding, embedding),
            })
            .collect();

        // Stable sort: ties keep insertion order, reproducible within a build
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(top_n);
        Ok(scored)
    }

    async fn len(&self) -> usize {
        self.chunks.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMeta;

    fn chunk(id: &str, embedding: Vec<f32>) -> Chunk {
        Chunk {
            id: id.to_string(),
            text: format!("text for {id}"),
            embedding,
            meta: DocumentMeta::file("test.txt"),
            document_id: "test.txt".to_string(),
        }
    }

    #[test]
    fn cosine_of_identical_vectors_is_one() {
        let v = vec![0.5, 0.5, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_orthogonal_vectors_is_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0])).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[tokio::test]
    async fn search_orders_by_descending_similarity() {
        let index = InMemoryIndex::new();
        index
            .add(vec![
                chunk("far", vec![0.0, 1.0]),
                chunk("near", vec![1.0, 0.0]),
                chunk("mid", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let results = index.search(&[1.0, 0.0], 3).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.chunk.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "far"]);
    }

    #[tokio::test]
    async fn search_never_exceeds_index_size() {
        let index = InMemoryIndex::new();
        index.add(vec![chunk("only", vec![1.0, 0.0])]).await.unwrap();

        let results = index.search(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn empty_index_yields_empty_results() {
        let index = InMemoryIndex::new();
        assert!(index.search(&[1.0, 0.0], 5).await.unwrap().is_empty());
        assert!(index.is_empty().await);
    }

    #[tokio::test]
    async fn mismatched_dimensions_are_rejected() {
        let index = InMemoryIndex::new();
        index.add(vec![chunk("a", vec![1.0, 0.0])]).await.unwrap();

        let err = index.add(vec![chunk("b", vec![1.0, 0.0, 0.0])]).await.unwrap_err();
        assert!(matches!(err, RagError::IndexError { .. }));
    }
}
