//! # askdoc-model
//!
//! Language model clients for askdoc.
//!
//! ## Overview
//!
//! This crate defines the [`LanguageModel`] trait — the generation seam the
//! RAG pipeline calls with a system instruction and an assembled prompt — and
//! two implementations:
//!
//! - [`OllamaClient`] - local models served by Ollama (`llama3.2:1b`, etc.)
//! - [`MockLlm`] - deterministic canned responses for testing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use askdoc_model::{LanguageModel, OllamaClient, OllamaConfig};
//!
//! let model = OllamaClient::new(OllamaConfig::new("llama3.2:1b"))?;
//! let answer = model.generate(Some("You are terse."), "Why is the sky blue?").await?;
//! ```

pub mod error;
pub mod mock;
pub mod model;
pub mod ollama;

pub use error::{ModelError, Result};
pub use mock::MockLlm;
pub use model::LanguageModel;
pub use ollama::{OllamaClient, OllamaConfig};
