//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates vector embeddings from text input.
///
/// Queries and passages are embedded through separate methods because some
/// model families (E5, BGE) prepend different instructions to each side of
/// the retrieval pair. For a fixed model configuration both methods are
/// deterministic pure functions of their input, modulo floating-point
/// accumulation order.
///
/// # Example
///
/// ```rust,ignore
/// use askdoc_rag::EmbeddingProvider;
///
/// let provider = FastEmbedder::new(EmbeddingModelId::default(), Device::Cpu, 32)?;
/// let query = provider.embed_query("what is the refund window?").await?;
/// assert_eq!(query.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embed a single search query.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed a batch of passages for indexing.
    ///
    /// Order-preserving and one-to-one: the `i`-th vector corresponds to the
    /// `i`-th input text.
    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
