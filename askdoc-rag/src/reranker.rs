//! Reranker trait for re-scoring search results.

use async_trait::async_trait;

use crate::document::SearchResult;
use crate::error::Result;

/// A second-stage scorer that reorders retrieved candidates by fine-grained
/// relevance to the query.
///
/// Implementations score (query, candidate-text) pairs with a model distinct
/// from the vector-similarity metric, e.g. a cross-encoder. The pipeline
/// treats the reranker as optional: when none is configured, candidates pass
/// through in vector-search order.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank `candidates` against `query`, returning at most `top_k`
    /// results ordered by descending relevance. Candidates' scores are
    /// overwritten with reranker scores; ties keep the incoming order.
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
