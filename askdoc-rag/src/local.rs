//! Local inference via ONNX runtime.
//!
//! [`FastEmbedder`] and [`FastEmbedReranker`] run the embedding bi-encoder
//! and the cross-encoder reranker in-process through the `fastembed` crate.
//! Models are downloaded on first use and cached by the runtime.
//!
//! This module is only available when the `local` feature is enabled
//! (the default).

use std::sync::Mutex;

use async_trait::async_trait;
use fastembed::{
    EmbeddingModel, InitOptions, RerankInitOptions, RerankerModel, TextEmbedding, TextRerank,
};
use tracing::{error, info};

use crate::config::{Device, EmbeddingModelId};
use crate::document::SearchResult;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::reranker::Reranker;

/// The cross-encoder model used for reranking.
const RERANKER_MODEL_NAME: &str = "BAAI/bge-reranker-base";

fn to_fastembed(model: EmbeddingModelId) -> EmbeddingModel {
    match model {
        EmbeddingModelId::MultilingualE5Large => EmbeddingModel::MultilingualE5Large,
        EmbeddingModelId::AllMiniLmL6V2 => EmbeddingModel::AllMiniLML6V2,
        EmbeddingModelId::BgeSmallEnV15 => EmbeddingModel::BGESmallENV15,
        EmbeddingModelId::BgeLargeEnV15 => EmbeddingModel::BGELargeENV15,
    }
}

/// An [`EmbeddingProvider`] running a sentence-transformer locally.
///
/// The batch size tunes throughput only; it does not change output vectors
/// beyond floating-point accumulation order. E5-family models get their
/// `query:`/`passage:` instruction prefixes here, so stored text stays
/// prefix-free.
pub struct FastEmbedder {
    // ONNX session needs exclusive access
    model: Mutex<TextEmbedding>,
    id: EmbeddingModelId,
    batch_size: usize,
}

impl FastEmbedder {
    /// Load the embedding model.
    ///
    /// Downloads model weights on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] for a device the bundled runtime is
    /// not wired for, and [`RagError::EmbeddingError`] if the model fails to
    /// initialize. Either is fatal to index building.
    pub fn new(id: EmbeddingModelId, device: Device, batch_size: usize) -> Result<Self> {
        if device != Device::Cpu {
            return Err(RagError::ConfigError(format!(
                "device {device:?} requires an ONNX execution provider this build does not include; use Cpu"
            )));
        }

        info!(model = id.model_name(), ?device, batch_size, "initializing embedding model");
        let options = InitOptions::new(to_fastembed(id)).with_show_download_progress(true);
        let model = TextEmbedding::try_new(options).map_err(|e| {
            error!(model = id.model_name(), error = %e, "failed to initialize embeddings");
            RagError::EmbeddingError { provider: id.model_name().to_string(), message: e.to_string() }
        })?;

        info!(model = id.model_name(), "embeddings initialized");
        Ok(Self { model: Mutex::new(model), id, batch_size })
    }

    fn embed_batch(&self, inputs: Vec<String>, batch_size: Option<usize>) -> Result<Vec<Vec<f32>>> {
        let model = self.model.lock().map_err(|_| RagError::EmbeddingError {
            provider: self.id.model_name().to_string(),
            message: "embedding model lock poisoned".to_string(),
        })?;
        model.embed(inputs, batch_size).map_err(|e| RagError::EmbeddingError {
            provider: self.id.model_name().to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedder {
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let input = if self.id.uses_e5_prefixes() {
            format!("query: {text}")
        } else {
            text.to_string()
        };

        self.embed_batch(vec![input], None)?.into_iter().next().ok_or_else(|| {
            RagError::EmbeddingError {
                provider: self.id.model_name().to_string(),
                message: "model returned no embeddings".to_string(),
            }
        })
    }

    async fn embed_documents(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let inputs: Vec<String> = if self.id.uses_e5_prefixes() {
            texts.iter().map(|text| format!("passage: {text}")).collect()
        } else {
            texts.iter().map(|text| text.to_string()).collect()
        };

        let embeddings = self.embed_batch(inputs, Some(self.batch_size))?;
        if embeddings.len() != texts.len() {
            return Err(RagError::EmbeddingError {
                provider: self.id.model_name().to_string(),
                message: format!(
                    "model returned {} embeddings for {} inputs",
                    embeddings.len(),
                    texts.len()
                ),
            });
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.id.dimensions()
    }
}

/// A [`Reranker`] running a cross-encoder locally.
///
/// Scores each (query, chunk-text) pair jointly, which is more precise on
/// fine-grained relevance than bi-encoder similarity.
pub struct FastEmbedReranker {
    // ONNX session needs exclusive access
    model: Mutex<TextRerank>,
}

impl FastEmbedReranker {
    /// Load the reranker model.
    ///
    /// Downloads model weights on first use.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::RerankerError`] if the model fails to initialize.
    /// The pipeline treats an absent reranker as a degraded mode, not a
    /// startup failure.
    pub fn new() -> Result<Self> {
        info!(model = RERANKER_MODEL_NAME, "initializing reranker");
        let options =
            RerankInitOptions::new(RerankerModel::BGERerankerBase).with_show_download_progress(true);
        let model = TextRerank::try_new(options).map_err(|e| {
            error!(model = RERANKER_MODEL_NAME, error = %e, "failed to initialize reranker");
            RagError::RerankerError {
                reranker: RERANKER_MODEL_NAME.to_string(),
                message: e.to_string(),
            }
        })?;

        info!(model = RERANKER_MODEL_NAME, "reranker initialized");
        Ok(Self { model: Mutex::new(model) })
    }
}

#[async_trait]
impl Reranker for FastEmbedReranker {
    async fn rerank(
        &self,
        query: &str,
        candidates: Vec<SearchResult>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        if candidates.is_empty() {
            return Ok(candidates);
        }

        // Slots let chunks move out by index after the model reorders them
        let mut slots: Vec<Option<SearchResult>> = candidates.into_iter().map(Some).collect();
        let texts: Vec<&str> = slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|result| result.chunk.text.as_str()))
            .collect();

        let ranked = {
            let model = self.model.lock().map_err(|_| RagError::RerankerError {
                reranker: RERANKER_MODEL_NAME.to_string(),
                message: "reranker model lock poisoned".to_string(),
            })?;
            model.rerank(query, &texts, false, None).map_err(|e| RagError::RerankerError {
                reranker: RERANKER_MODEL_NAME.to_string(),
                message: e.to_string(),
            })?
        };

        Ok(ranked
            .into_iter()
            .take(top_k)
            .filter_map(|result| {
                slots[result.index].take().map(|mut candidate| {
                    candidate.score = result.score;
                    candidate
                })
            })
            .collect())
    }
}
