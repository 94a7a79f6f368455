//! Document chunking.
//!
//! [`RecursiveChunker`] splits text into overlapping windows, preferring to
//! break at a paragraph boundary, then a line break, then sentence-ending
//! punctuation, and only then at a raw character boundary.

use tracing::{debug, info};

use crate::document::{Chunk, Document};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings. Embeddings are attached later by the pipeline.
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document has empty text. Each returned
    /// chunk has an empty embedding vector.
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

/// Splits text into windows of at most `chunk_size` bytes, with consecutive
/// windows from the same document sharing exactly `chunk_overlap` bytes.
///
/// Each window ends at the best separator available inside it — paragraph
/// break, line break, or sentence-ending `.`/`!`/`?` — and falls back to the
/// raw character boundary when none fits. A document no longer than
/// `chunk_size` yields itself as a single chunk.
///
/// Chunk IDs are generated as `{document_id}_{chunk_index}`; every chunk
/// inherits the parent document's metadata unmodified.
#[derive(Debug, Clone)]
pub struct RecursiveChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl RecursiveChunker {
    /// Create a new `RecursiveChunker`.
    ///
    /// # Arguments
    ///
    /// * `chunk_size` — maximum number of bytes per chunk
    /// * `chunk_overlap` — number of bytes shared by consecutive chunks
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self { chunk_size, chunk_overlap }
    }
}

impl Chunker for RecursiveChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        split_text(&document.text, self.chunk_size, self.chunk_overlap)
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                id: format!("{}_{i}", document.id),
                text,
                embedding: Vec::new(),
                meta: document.meta.clone(),
                document_id: document.id.clone(),
            })
            .collect()
    }
}

/// Split a batch of documents. Per-document isolation: an empty document
/// contributes nothing, and no document can abort the batch.
pub fn split_documents(documents: &[Document], chunker: &dyn Chunker) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for document in documents {
        let mut produced = chunker.chunk(document);
        debug!(document_id = %document.id, count = produced.len(), "split document");
        chunks.append(&mut produced);
    }
    info!(total = chunks.len(), "document chunks created");
    chunks
}

fn split_text(text: &str, chunk_size: usize, chunk_overlap: usize) -> Vec<String> {
    if text.is_empty() || chunk_size == 0 {
        return Vec::new();
    }
    if text.len() <= chunk_size {
        return vec![text.to_string()];
    }

    // Config validation enforces overlap < size; clamp so a bad caller
    // still terminates.
    let overlap = chunk_overlap.min(chunk_size - 1);

    let mut chunks = Vec::new();
    let mut start = 0;
    loop {
        let mut hard_end = floor_char_boundary(text, (start + chunk_size).min(text.len()));
        if hard_end <= start {
            // A single multibyte char can exceed a sub-4-byte budget.
            hard_end = ceil_char_boundary(text, (start + 1).min(text.len()));
        }
        let end = if hard_end == text.len() {
            hard_end
        } else {
            best_break(text, start, hard_end, overlap)
        };
        chunks.push(text[start..end].to_string());
        if end == text.len() {
            break;
        }
        let next_start = floor_char_boundary(text, end.saturating_sub(overlap));
        if next_start <= start {
            // Degenerate overlap would stall; give up the overlap for this step.
            start = end;
        } else {
            start = next_start;
        }
    }
    chunks
}

/// Find the end of the window starting at `start`, preferring the largest
/// separator whose break point still leaves the chunk advancing past the
/// overlap region. Falls back to `hard_end` (the raw character boundary).
fn best_break(text: &str, start: usize, hard_end: usize, overlap: usize) -> usize {
    let window = &text[start..hard_end];
    let min_end = start + overlap + 1;

    if let Some(pos) = window.rfind("\n\n") {
        let end = start + pos + 2;
        if end >= min_end {
            return end;
        }
    }
    if let Some(pos) = window.rfind('\n') {
        let end = start + pos + 1;
        if end >= min_end {
            return end;
        }
    }
    if let Some(pos) = window.rfind(['.', '!', '?']) {
        let end = start + pos + 1;
        if end >= min_end {
            return end;
        }
    }
    hard_end
}

fn floor_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

fn ceil_char_boundary(text: &str, mut index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    while !text.is_char_boundary(index) {
        index += 1;
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMeta;

    fn doc(text: &str) -> Document {
        Document::new(text, DocumentMeta::file("test.txt"))
    }

    #[test]
    fn empty_document_yields_no_chunks() {
        let chunker = RecursiveChunker::new(100, 10);
        assert!(chunker.chunk(&doc("")).is_empty());
    }

    #[test]
    fn short_document_yields_itself() {
        let chunker = RecursiveChunker::new(100, 10);
        let chunks = chunker.chunk(&doc("short text"));
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "short text");
        assert_eq!(chunks[0].id, "test.txt_0");
    }

    #[test]
    fn unbroken_text_splits_with_exact_overlap() {
        // Varied content so overlap equality actually checks alignment
        let text: String = (0..2000u32).map(|i| char::from(b'a' + (i % 17) as u8)).collect();
        let chunks = split_text(&text, 1024, 128);

        // 2000 bytes at a 1024-byte window and 896-byte stride
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(chunk.len() <= 1024);
        }
        for pair in chunks.windows(2) {
            let tail = &pair[0][pair[0].len() - 128..];
            let head = &pair[1][..128];
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn chunks_reassemble_to_original_text() {
        let text: String =
            (0..500).map(|i| format!("word{i} ")).collect::<String>() + "final sentence.";
        let chunks = split_text(&text, 256, 32);

        let mut rebuilt = chunks[0].clone();
        for chunk in &chunks[1..] {
            rebuilt.push_str(&chunk[32..]);
        }
        assert_eq!(rebuilt, text);
    }

    #[test]
    fn prefers_paragraph_break_over_raw_split() {
        let text = format!("{}\n\n{}", "a".repeat(500), "b".repeat(500));
        let chunks = split_text(&text, 600, 50);

        assert_eq!(chunks[0], format!("{}\n\n", "a".repeat(500)));
    }

    #[test]
    fn prefers_sentence_break_when_no_newline_fits() {
        let text = format!("{}. {}", "a".repeat(400), "b".repeat(400));
        let chunks = split_text(&text, 500, 50);

        assert_eq!(chunks[0], format!("{}.", "a".repeat(400)));
    }

    #[test]
    fn metadata_is_inherited_verbatim() {
        let document = Document::new("x".repeat(300), DocumentMeta::page("manual.pdf", 7));
        let chunker = RecursiveChunker::new(128, 16);
        let chunks = chunker.chunk(&document);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert_eq!(chunk.meta, document.meta);
            assert_eq!(chunk.document_id, document.id);
        }
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "é".repeat(300);
        let chunks = split_text(&text, 100, 10);

        for chunk in &chunks {
            assert!(chunk.len() <= 100);
            assert!(!chunk.is_empty());
        }
    }
}
