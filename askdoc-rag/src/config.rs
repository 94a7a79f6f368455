//! Configuration for the RAG pipeline.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Embedding models wired for local inference.
///
/// The set is closed so dimensionality is known statically; all vectors in
/// one index share the dimensionality of the configured model.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum EmbeddingModelId {
    /// `intfloat/multilingual-e5-large`, 1024 dimensions.
    #[default]
    MultilingualE5Large,
    /// `sentence-transformers/all-MiniLM-L6-v2`, 384 dimensions.
    AllMiniLmL6V2,
    /// `BAAI/bge-small-en-v1.5`, 384 dimensions.
    BgeSmallEnV15,
    /// `BAAI/bge-large-en-v1.5`, 1024 dimensions.
    BgeLargeEnV15,
}

impl EmbeddingModelId {
    /// Dimensionality of the vectors this model produces.
    pub fn dimensions(self) -> usize {
        match self {
            Self::MultilingualE5Large | Self::BgeLargeEnV15 => 1024,
            Self::AllMiniLmL6V2 | Self::BgeSmallEnV15 => 384,
        }
    }

    /// The model's canonical name, for logging.
    pub fn model_name(self) -> &'static str {
        match self {
            Self::MultilingualE5Large => "intfloat/multilingual-e5-large",
            Self::AllMiniLmL6V2 => "sentence-transformers/all-MiniLM-L6-v2",
            Self::BgeSmallEnV15 => "BAAI/bge-small-en-v1.5",
            Self::BgeLargeEnV15 => "BAAI/bge-large-en-v1.5",
        }
    }

    /// Whether this model expects E5-style `query:`/`passage:` prefixes.
    pub fn uses_e5_prefixes(self) -> bool {
        matches!(self, Self::MultilingualE5Large)
    }
}

/// Compute device for local inference.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum Device {
    /// CPU execution.
    #[default]
    Cpu,
    /// CUDA GPU execution.
    Cuda,
}

/// Configuration parameters for the RAG pipeline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Folder the loader scans for PDF and text documents.
    pub docs_folder: PathBuf,
    /// Maximum chunk size in bytes.
    pub chunk_size: usize,
    /// Number of bytes shared by consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of candidates surviving to generation and citation.
    pub top_k: usize,
    /// Number of candidates fetched from the vector index before reranking
    /// or truncation. Must be at least `top_k`.
    pub retrieval_breadth: usize,
    /// Minimum vector-similarity score for retrieved candidates; candidates
    /// below it are dropped before reranking. Zero disables the cutoff.
    pub similarity_cutoff: f32,
    /// The embedding model to load.
    pub embedding_model: EmbeddingModelId,
    /// Compute device for local inference.
    pub device: Device,
    /// Batch size for passage embedding. Throughput tuning only.
    pub embedding_batch_size: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            docs_folder: PathBuf::from("data/sample_policies"),
            chunk_size: 1024,
            chunk_overlap: 128,
            top_k: 5,
            retrieval_breadth: 10,
            similarity_cutoff: 0.0,
            embedding_model: EmbeddingModelId::default(),
            device: Device::default(),
            embedding_batch_size: 32,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the folder to load documents from.
    pub fn docs_folder(mut self, folder: impl Into<PathBuf>) -> Self {
        self.config.docs_folder = folder.into();
        self
    }

    /// Set the maximum chunk size in bytes.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in bytes.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of candidates surviving to generation.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the number of candidates fetched from the vector index.
    pub fn retrieval_breadth(mut self, breadth: usize) -> Self {
        self.config.retrieval_breadth = breadth;
        self
    }

    /// Set the minimum similarity score for retrieved candidates.
    pub fn similarity_cutoff(mut self, cutoff: f32) -> Self {
        self.config.similarity_cutoff = cutoff;
        self
    }

    /// Set the embedding model.
    pub fn embedding_model(mut self, model: EmbeddingModelId) -> Self {
        self.config.embedding_model = model;
        self
    }

    /// Set the compute device for local inference.
    pub fn device(mut self, device: Device) -> Self {
        self.config.device = device;
        self
    }

    /// Set the passage-embedding batch size.
    pub fn embedding_batch_size(mut self, batch_size: usize) -> Self {
        self.config.embedding_batch_size = batch_size;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0` or `chunk_overlap >= chunk_size`
    /// - `top_k == 0` or `retrieval_breadth < top_k`
    /// - `embedding_batch_size == 0`
    pub fn build(self) -> Result<RagConfig> {
        let config = self.config;
        if config.chunk_size == 0 {
            return Err(RagError::ConfigError("chunk_size must be greater than zero".to_string()));
        }
        if config.chunk_overlap >= config.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                config.chunk_overlap, config.chunk_size
            )));
        }
        if config.top_k == 0 {
            return Err(RagError::ConfigError("top_k must be greater than zero".to_string()));
        }
        if config.retrieval_breadth < config.top_k {
            return Err(RagError::ConfigError(format!(
                "retrieval_breadth ({}) must be at least top_k ({})",
                config.retrieval_breadth, config.top_k
            )));
        }
        if config.embedding_batch_size == 0 {
            return Err(RagError::ConfigError(
                "embedding_batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(config)
    }
}
