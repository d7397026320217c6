//! Build-once, in-memory vector index with cosine-similarity search.
//!
//! The index is immutable after [`VectorIndex::build`]: there is no
//! insert or delete path, so concurrent readers need no locking. On a
//! corpus change the pipeline builds a fresh index and swaps it in
//! wholesale.

use tracing::debug;

use crate::document::{Chunk, RetrievalResult};
use crate::error::{RagError, Result};

/// An immutable nearest-neighbor index over chunk embeddings.
///
/// The similarity metric is cosine similarity; higher scores are more
/// relevant throughout the pipeline. Ties are broken by ascending
/// chunk id, so search results are fully deterministic.
#[derive(Debug)]
pub struct VectorIndex {
    chunks: Vec<Chunk>,
    dimensions: usize,
}

impl VectorIndex {
    /// Build an index over the given chunks.
    ///
    /// Chunk ids are reassigned densely as `0..N-1` in input order, so
    /// ids are unique and stable within one build regardless of the
    /// per-document ids the chunkers emitted.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if `chunks` is empty, any chunk has
    /// an empty embedding, or embedding dimensions are mismatched.
    pub fn build(mut chunks: Vec<Chunk>) -> Result<Self> {
        if chunks.is_empty() {
            return Err(RagError::Index("cannot build an index over zero chunks".into()));
        }

        let dimensions = chunks[0].embedding.len();
        if dimensions == 0 {
            return Err(RagError::Index(format!(
                "chunk from document '{}' has no embedding",
                chunks[0].document_id
            )));
        }
        for (i, chunk) in chunks.iter_mut().enumerate() {
            if chunk.embedding.len() != dimensions {
                return Err(RagError::Index(format!(
                    "mismatched embedding dimensions: chunk from document '{}' has {}, expected {}",
                    chunk.document_id,
                    chunk.embedding.len(),
                    dimensions
                )));
            }
            chunk.id = i;
        }

        debug!(chunk_count = chunks.len(), dimensions, "built vector index");
        Ok(Self { chunks, dimensions })
    }

    /// Search for the `k` chunks most similar to `query`.
    ///
    /// Returns at most `k` results ordered by descending cosine
    /// similarity, ties broken by ascending chunk id. If `k` exceeds
    /// the index size, all chunks are returned ranked.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Index`] if the query dimensionality does not
    /// match the indexed embeddings.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<RetrievalResult>> {
        if query.len() != self.dimensions {
            return Err(RagError::Index(format!(
                "query has {} dimensions, index has {}",
                query.len(),
                self.dimensions
            )));
        }

        let mut scored: Vec<RetrievalResult> = self
            .chunks
            .iter()
            .map(|chunk| RetrievalResult {
                chunk: chunk.clone(),
                score: cosine_similarity(&chunk.embedding, query),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.chunk.id.cmp(&b.chunk.id))
        });
        scored.truncate(k);
        Ok(scored)
    }

    /// Number of chunks in the index.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// True if the index holds no chunks (never the case after a
    /// successful [`build`](VectorIndex::build)).
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Dimensionality of the indexed embeddings.
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Compute cosine similarity between two vectors of equal length.
///
/// Returns 0.0 if either vector has zero magnitude.
pub(crate) fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
