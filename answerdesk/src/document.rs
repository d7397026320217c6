//! Data types for documents, chunks, retrieval results, and answers.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A source document containing text content and metadata.
///
/// Produced by a [`DocumentSource`](crate::loader::DocumentSource) (or
/// constructed directly) and consumed by the ingestion pipeline. The
/// pipeline never cares how the text was extracted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document (filename, URL, ...).
    pub id: String,
    /// The plain-text content of the document.
    pub text: String,
    /// Key-value metadata associated with the document.
    pub metadata: HashMap<String, String>,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with no metadata.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self { id: id.into(), text: text.into(), metadata: HashMap::new(), source_uri: None }
    }
}

/// A contiguous slice of a [`Document`]'s text, sized for embedding
/// and retrieval.
///
/// Chunkers emit chunks with empty embeddings and per-document ids;
/// [`VectorIndex::build`](crate::index::VectorIndex::build) attaches a
/// dense id `0..N-1` over the whole corpus, unique within one build.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Dense numeric identifier, stable within one index build.
    pub id: usize,
    /// The ID of the parent [`Document`] (back-reference, not ownership).
    pub document_id: String,
    /// The text content of the chunk.
    pub text: String,
    /// The vector embedding for this chunk's text.
    pub embedding: Vec<f32>,
    /// Metadata inherited from the parent document plus chunk-specific fields.
    pub metadata: HashMap<String, String>,
}

/// A retrieved [`Chunk`] paired with a relevance score.
///
/// Scores are cosine similarities: higher is more relevant, everywhere
/// in the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Cosine similarity to the query (higher is more relevant).
    pub score: f32,
}

/// A generated answer together with the passages it was grounded on.
///
/// `supporting_chunks` are exactly the retrieval results the generator
/// received, in rank order, so callers can display provenance without
/// re-deriving it. The fixed no-information answer carries an empty
/// vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Answer {
    /// The generated answer text.
    pub text: String,
    /// The retrieval results the answer was grounded on, in rank order.
    pub supporting_chunks: Vec<RetrievalResult>,
}
