//! RAG pipeline orchestrator.
//!
//! [`RagPipeline`] coordinates the full workflow: at startup,
//! [`build_index`](RagPipeline::build_index) runs load → split → embed →
//! store; at query time, [`ask`](RagPipeline::ask) runs embed → search →
//! rerank → generate → cite. `ask` never fails — every error below it is
//! caught, logged once, and converted to a fallback answer.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use askdoc_rag::{RagConfig, RagPipeline};
//!
//! let pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(embedder))
//!     .language_model(Arc::new(llm))
//!     .reranker(Arc::new(reranker))  // optional
//!     .build()?;
//!
//! pipeline.build_index().await?;
//! let response = pipeline.ask("What is the refund window?").await;
//! println!("{} {:?}", response.answer, response.citations);
//! ```

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, error, info, warn};

use askdoc_model::LanguageModel;

use crate::chunking::{Chunker, RecursiveChunker, split_documents};
use crate::config::RagConfig;
use crate::document::{AskResponse, ChatTurn, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::index::InMemoryIndex;
use crate::loader::load_documents;
use crate::reranker::Reranker;
use crate::vectorstore::VectorStore;

/// The fixed system instruction for the generation call.
pub const SYSTEM_PROMPT: &str = "You are a factual QA assistant.\n\
    - Answer ONLY based on the retrieved context.\n\
    - Cite the source document (filename) for every factual statement.\n\
    - If the answer is unknown, say 'I don't know.'\n\
    - Keep answers concise and precise.";

/// Answer returned before a successful [`RagPipeline::build_index`].
const NOT_INITIALIZED_ANSWER: &str = "Query engine not initialized.";

/// Answer returned when retrieval or generation fails.
const FAILED_ANSWER: &str = "Failed to process query.";

/// Counts reported by a successful index build.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexStats {
    /// Source documents loaded (one per readable file or PDF page).
    pub documents: usize,
    /// Chunks embedded and stored.
    pub chunks: usize,
    /// Files that produced no documents.
    pub skipped_files: usize,
}

/// The RAG pipeline orchestrator.
///
/// Owns the retrieval stack and the conversation history. The vector index
/// and reranker are read-only after initialization and safe to share; the
/// history is guarded for append.
pub struct RagPipeline {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    language_model: Arc<dyn LanguageModel>,
    reranker: Option<Arc<dyn Reranker>>,
    ready: AtomicBool,
    history: RwLock<Vec<ChatTurn>>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Whether the index was built successfully.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Build the vector index from the configured documents folder:
    /// load → split → embed → store.
    ///
    /// On failure the pipeline stays unindexed and [`ask`](Self::ask)
    /// answers in degraded mode. An empty folder builds a valid, empty
    /// index.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`RagError`] if loading, embedding, or
    /// storage fails.
    pub async fn build_index(&self) -> Result<IndexStats> {
        let started = Instant::now();
        info!(folder = %self.config.docs_folder.display(), "building vector index");

        let report = load_documents(&self.config.docs_folder)?;
        let documents = report.documents;

        let mut chunks = split_documents(&documents, self.chunker.as_ref());

        let texts: Vec<&str> = chunks.iter().map(|chunk| chunk.text.as_str()).collect();
        let embeddings = self.embedder.embed_documents(&texts).await.map_err(|e| {
            error!(error = %e, "embedding failed during index build");
            e
        })?;
        if embeddings.len() != chunks.len() {
            return Err(RagError::PipelineError(format!(
                "embedding count mismatch: {} embeddings for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let stats = IndexStats {
            documents: documents.len(),
            chunks: chunks.len(),
            skipped_files: report.skipped.len(),
        };

        if !chunks.is_empty() {
            self.store.add(chunks).await.map_err(|e| {
                error!(error = %e, "failed to store chunks during index build");
                e
            })?;
        }

        self.ready.store(true, Ordering::Release);
        info!(
            documents = stats.documents,
            chunks = stats.chunks,
            skipped_files = stats.skipped_files,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "vector index built"
        );
        Ok(stats)
    }

    /// Answer a query from the indexed documents.
    ///
    /// Never fails: an unbuilt index yields a "not initialized" answer, and
    /// any retrieval or generation error yields a "failed to process"
    /// answer, each with empty citations. Every call appends one
    /// [`ChatTurn`] to the history.
    pub async fn ask(&self, query: &str) -> AskResponse {
        let started = Instant::now();
        info!(query, "received query");

        let response = if !self.is_ready() {
            warn!("query engine not initialized");
            AskResponse { answer: NOT_INITIALIZED_ANSWER.to_string(), citations: Vec::new() }
        } else {
            match self.answer(query).await {
                Ok(response) => response,
                Err(e) => {
                    error!(query, error = %e, "failed to process query");
                    AskResponse { answer: FAILED_ANSWER.to_string(), citations: Vec::new() }
                }
            }
        };

        debug!(
            query,
            citations = response.citations.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "query finished"
        );

        self.history.write().await.push(ChatTurn {
            query: query.to_string(),
            answer: response.answer.clone(),
            citations: response.citations.clone(),
        });

        response
    }

    async fn answer(&self, query: &str) -> Result<AskResponse> {
        let query_embedding = self.embedder.embed_query(query).await?;

        let candidates =
            self.store.search(&query_embedding, self.config.retrieval_breadth).await?;
        debug!(candidates = candidates.len(), "retrieved candidates");

        let cutoff = self.config.similarity_cutoff;
        let candidates: Vec<SearchResult> =
            candidates.into_iter().filter(|candidate| candidate.score >= cutoff).collect();

        let surviving = self.select_candidates(query, candidates).await;

        let prompt = build_prompt(query, &surviving);
        let answer = self.language_model.generate(Some(SYSTEM_PROMPT), &prompt).await?;
        let citations = collect_citations(&surviving);

        Ok(AskResponse { answer, citations })
    }

    /// Reduce retrieved candidates to the final `top_k`: rerank when a
    /// reranker is configured, otherwise keep the vector-search order. A
    /// reranker failure degrades to truncation rather than failing the
    /// query.
    async fn select_candidates(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
    ) -> Vec<SearchResult> {
        let top_k = self.config.top_k;
        match &self.reranker {
            Some(reranker) => match reranker.rerank(query, candidates.clone(), top_k).await {
                Ok(reranked) => reranked,
                Err(e) => {
                    error!(error = %e, "reranking failed, keeping vector-search order");
                    truncated(candidates, top_k)
                }
            },
            None => {
                warn!("reranker not configured, keeping vector-search order");
                truncated(candidates, top_k)
            }
        }
    }

    /// The conversation history, oldest first.
    pub async fn history(&self) -> Vec<ChatTurn> {
        self.history.read().await.clone()
    }

    /// Clear the conversation history.
    pub async fn clear_history(&self) {
        self.history.write().await.clear();
    }
}

fn truncated(mut candidates: Vec<SearchResult>, top_k: usize) -> Vec<SearchResult> {
    candidates.truncate(top_k);
    candidates
}

/// Assemble the generation prompt from the retrieved candidates and the
/// query. Each passage is headed by its citation so the model can attribute
/// statements.
fn build_prompt(query: &str, candidates: &[SearchResult]) -> String {
    let mut prompt = String::from("Context:\n");
    if candidates.is_empty() {
        prompt.push_str("(no relevant passages retrieved)\n");
    }
    for candidate in candidates {
        prompt.push_str(&format!(
            "[{}]\n{}\n\n",
            candidate.chunk.meta.citation(),
            candidate.chunk.text
        ));
    }
    prompt.push_str(&format!("Question: {query}\nAnswer:"));
    prompt
}

/// Citations from the surviving candidates, deduplicated in first-seen
/// order.
fn collect_citations(candidates: &[SearchResult]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut citations = Vec::new();
    for candidate in candidates {
        let citation = candidate.chunk.meta.citation();
        if seen.insert(citation.clone()) {
            citations.push(citation);
        }
    }
    citations
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedder`, and `language_model` are required; the vector
/// store defaults to [`InMemoryIndex`] and the chunker to
/// [`RecursiveChunker`] with the configured sizes. The reranker is
/// optional — leaving it unset selects the pass-through degraded mode.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Set the language model used for generation.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the vector store backend. Defaults to [`InMemoryIndex`].
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the document chunker. Defaults to [`RecursiveChunker`] with the
    /// configured chunk size and overlap.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set an optional reranker for post-search reordering.
    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Build the [`RagPipeline`], validating that required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `config`, `embedder`, or
    /// `language_model` is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        let embedder = self
            .embedder
            .ok_or_else(|| RagError::ConfigError("embedder is required".to_string()))?;
        let language_model = self
            .language_model
            .ok_or_else(|| RagError::ConfigError("language_model is required".to_string()))?;
        let store = self.store.unwrap_or_else(|| Arc::new(InMemoryIndex::new()));
        let chunker = self.chunker.unwrap_or_else(|| {
            Arc::new(RecursiveChunker::new(config.chunk_size, config.chunk_overlap))
        });

        Ok(RagPipeline {
            config,
            embedder,
            store,
            chunker,
            language_model,
            reranker: self.reranker,
            ready: AtomicBool::new(false),
            history: RwLock::new(Vec::new()),
        })
    }
}
