//! Data types for documents, chunks, search results, and chat turns.

use serde::{Deserialize, Serialize};

/// Provenance of a piece of text: the originating file, and the page number
/// for paginated sources.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DocumentMeta {
    /// The originating filename.
    pub source: String,
    /// 1-based page number, present only for paginated sources.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

impl DocumentMeta {
    /// Metadata for a whole-file source (no page number).
    pub fn file(source: impl Into<String>) -> Self {
        Self { source: source.into(), page: None }
    }

    /// Metadata for one page of a paginated source.
    pub fn page(source: impl Into<String>, page: u32) -> Self {
        Self { source: source.into(), page: Some(page) }
    }

    /// Render the citation string: `source`, or `source (page N)` when a
    /// page number is present.
    pub fn citation(&self) -> String {
        match self.page {
            Some(page) => format!("{} (page {page})", self.source),
            None => self.source.clone(),
        }
    }
}

/// A source document: one readable text file, or one PDF page with
/// extractable text.
///
/// Text is never blank — whitespace-only content is discarded at load time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier, derived from the source filename and page.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Provenance metadata.
    pub meta: DocumentMeta,
}

impl Document {
    /// Create a document, deriving its id from the metadata.
    pub fn new(text: impl Into<String>, meta: DocumentMeta) -> Self {
        let id = match meta.page {
            Some(page) => format!("{}#page{page}", meta.source),
            None => meta.source.clone(),
        };
        Self { id, text: text.into(), meta }
    }
}

/// A segment of a [`Document`] with its vector embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text. Empty until the pipeline
    /// attaches one at index-build time.
    pub embedding: Vec<f32>,
    /// Provenance inherited verbatim from the parent document.
    pub meta: DocumentMeta,
    /// The ID of the parent [`Document`].
    pub document_id: String,
}

/// A retrieved [`Chunk`] paired with a relevance score.
///
/// The score starts as vector similarity and may be overwritten by a
/// reranker. Rank position is the element's index in the surrounding
/// sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// The relevance score (higher is more relevant).
    pub score: f32,
}

/// One completed exchange in the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatTurn {
    /// The user's query text.
    pub query: String,
    /// The generated answer text.
    pub answer: String,
    /// Citations for the answer, deduplicated in first-seen order.
    pub citations: Vec<String>,
}

/// The result of one `ask` call: an answer and its source citations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    /// The generated answer text, or a fallback message.
    pub answer: String,
    /// Citations for the answer; empty for fallback answers.
    pub citations: Vec<String>,
}
