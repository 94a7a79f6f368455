//! Property tests for in-memory index search ordering.

use askdoc_rag::document::{Chunk, DocumentMeta};
use askdoc_rag::index::InMemoryIndex;
use askdoc_rag::vectorstore::VectorStore;
use proptest::prelude::*;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

/// Generate a chunk with a normalized embedding.
fn arb_chunk(dim: usize) -> impl Strategy<Value = Chunk> {
    ("[a-z]{3,8}", "[a-z ]{5,30}", arb_normalized_embedding(dim)).prop_map(
        |(id, text, embedding)| Chunk {
            id,
            text,
            embedding,
            meta: DocumentMeta::file("doc.txt"),
            document_id: "doc.txt".to_string(),
        },
    )
}

mod prop_search_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any set of stored chunks, search returns results ordered by
        /// descending cosine similarity, bounded by both `top_n` and the
        /// index size.
        #[test]
        fn results_ordered_descending_and_bounded_by_top_n(
            chunks in proptest::collection::vec(arb_chunk(DIM), 1..20),
            query in arb_normalized_embedding(DIM),
            top_n in 1usize..25,
        ) {
            let count = chunks.len();
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let index = InMemoryIndex::new();
                index.add(chunks).await.unwrap();
                index.search(&query, top_n).await.unwrap()
            });

            // Result count is at most top_n and at most the number of stored chunks
            prop_assert!(results.len() <= top_n);
            prop_assert!(results.len() <= count);

            // Results are ordered by descending score
            for window in results.windows(2) {
                prop_assert!(
                    window[0].score >= window[1].score,
                    "results not in descending order: {} < {}",
                    window[0].score,
                    window[1].score,
                );
            }
        }
    }
}

mod prop_chunk_windows {
    use super::*;
    use askdoc_rag::chunking::{Chunker, RecursiveChunker};
    use askdoc_rag::document::Document;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// For any ASCII text and any overlap smaller than the chunk size,
        /// no chunk exceeds the size and every adjacent pair shares exactly
        /// the overlap region.
        #[test]
        fn chunks_bounded_with_exact_overlap(
            text in "[ -~]{0,3000}",
            chunk_size in 16usize..512,
            overlap_frac in 0usize..100,
        ) {
            let overlap = chunk_size * overlap_frac / 200; // always < chunk_size / 2
            let document = Document::new(text.clone(), DocumentMeta::file("doc.txt"));
            let chunker = RecursiveChunker::new(chunk_size, overlap);
            let chunks = chunker.chunk(&document);

            if text.is_empty() {
                prop_assert!(chunks.is_empty());
            } else if text.len() <= chunk_size {
                prop_assert_eq!(chunks.len(), 1);
                prop_assert_eq!(&chunks[0].text, &text);
            } else {
                for chunk in &chunks {
                    prop_assert!(chunk.text.len() <= chunk_size);
                }
                for pair in chunks.windows(2) {
                    let first = &pair[0].text;
                    let second = &pair[1].text;
                    prop_assert!(first.len() >= overlap && second.len() >= overlap);
                    prop_assert_eq!(&first[first.len() - overlap..], &second[..overlap]);
                }
            }
        }
    }
}
