//! Vector store trait for storing and searching chunk embeddings.

use async_trait::async_trait;

use crate::document::{Chunk, SearchResult};
use crate::error::Result;

/// A storage backend for chunk embeddings with similarity search.
///
/// The index is write-once per process lifetime: the pipeline fills it at
/// startup and only reads from it while serving queries. There is no
/// incremental update or deletion; a restart rebuilds from scratch.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Add chunks to the index. Chunks must have embeddings attached, all of
    /// the same dimensionality.
    async fn add(&self, chunks: Vec<Chunk>) -> Result<()>;

    /// Search for the `top_n` chunks most similar to the given embedding.
    ///
    /// Returns results ordered by descending similarity score, never more
    /// than the index holds; an empty index yields an empty result.
    async fn search(&self, embedding: &[f32], top_n: usize) -> Result<Vec<SearchResult>>;

    /// Number of stored chunks.
    async fn len(&self) -> usize;

    /// Whether the index holds no chunks.
    async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
