//! # askdoc-rag
//!
//! Retrieval-augmented question answering over a local folder of PDF and
//! text documents.
//!
//! ## Overview
//!
//! At startup the pipeline loads every readable document from a folder,
//! splits it into overlapping chunks, embeds each chunk, and holds the
//! vectors in an in-memory index. At query time it embeds the query,
//! retrieves the nearest chunks, optionally reranks them with a
//! cross-encoder, and asks a language model to answer from the retrieved
//! passages — returning the answer with source citations
//! (`policy.pdf (page 3)` style).
//!
//! The index lives for the process lifetime and is rebuilt on restart;
//! there is no persistence layer.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askdoc_model::{OllamaClient, OllamaConfig};
//! use askdoc_rag::{Device, EmbeddingModelId, FastEmbedder, RagConfig, RagPipeline};
//!
//! let config = RagConfig::builder().docs_folder("data/policies").build()?;
//! let embedder = FastEmbedder::new(EmbeddingModelId::default(), Device::Cpu, 32)?;
//! let llm = OllamaClient::new(OllamaConfig::new("llama3.2:1b"))?;
//!
//! let pipeline = RagPipeline::builder()
//!     .config(config)
//!     .embedder(Arc::new(embedder))
//!     .language_model(Arc::new(llm))
//!     .build()?;
//!
//! pipeline.build_index().await?;
//! let response = pipeline.ask("How long do refunds take?").await;
//! ```
//!
//! ## Degraded modes
//!
//! - No reranker configured: candidates keep their vector-search order.
//! - Index build failed or never ran: `ask` answers
//!   "Query engine not initialized." instead of failing.
//! - Retrieval or generation error: `ask` answers
//!   "Failed to process query." — the error is logged, never propagated.

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod index;
pub mod loader;
#[cfg(feature = "local")]
pub mod local;
pub mod pipeline;
pub mod reranker;
pub mod telemetry;
pub mod vectorstore;

pub use chunking::{Chunker, RecursiveChunker, split_documents};
pub use config::{Device, EmbeddingModelId, RagConfig, RagConfigBuilder};
pub use document::{AskResponse, ChatTurn, Chunk, Document, DocumentMeta, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use index::InMemoryIndex;
pub use loader::{LoadReport, SkippedFile, load_documents};
#[cfg(feature = "local")]
pub use local::{FastEmbedReranker, FastEmbedder};
pub use pipeline::{IndexStats, RagPipeline, RagPipelineBuilder, SYSTEM_PROMPT};
pub use reranker::Reranker;
pub use vectorstore::VectorStore;
