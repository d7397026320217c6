//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] composes an [`EmbeddingProvider`], a
//! [`LanguageModel`], and a [`Chunker`] into the full
//! ingest-and-answer workflow:
//!
//! - ingestion: documents → chunk → embed → [`VectorIndex::build`]
//! - query: embed → search → threshold filter → answer generation
//!
//! The built index is immutable; [`ingest`](RagPipeline::ingest)
//! replaces it wholesale with an atomic swap, so in-flight queries
//! keep reading the index they started with.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use answerdesk::{RagPipeline, RagConfig, FixedSizeChunker};
//!
//! let config = RagConfig::default();
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(embedder))
//!     .language_model(Arc::new(model))
//!     .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?))
//!     .build()?;
//!
//! pipeline.ingest(&documents).await?;
//! let answer = pipeline.answer_query("What are the support hours?").await?;
//! ```

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document, RetrievalResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generator::AnswerGenerator;
use crate::index::VectorIndex;
use crate::model::LanguageModel;
use crate::query;

/// Summary of one ingestion run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestStats {
    /// Number of documents that produced at least one chunk.
    pub documents: usize,
    /// Total chunks indexed.
    pub chunks: usize,
    /// Embedding dimensionality of the built index.
    pub dimensions: usize,
}

/// The RAG pipeline orchestrator.
///
/// Owns the built [`VectorIndex`] explicitly (no ambient global
/// state), so several independent pipelines can coexist in one
/// process. Construct one via [`RagPipeline::builder()`].
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    chunker: Arc<dyn Chunker>,
    generator: AnswerGenerator,
    index: RwLock<Option<Arc<VectorIndex>>>,
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

    /// Build the index from a document set: chunk → embed → index.
    ///
    /// Rebuilds from scratch and atomically swaps the new index in.
    /// On failure the previous index (if any) stays live.
    ///
    /// # Errors
    ///
    /// - [`RagError::Index`] if the documents yield no chunks.
    /// - [`RagError::Embedding`] if the embedding backend fails; the
    ///   build is aborted, nothing is partially indexed.
    pub async fn ingest(&self, documents: &[Document]) -> Result<IngestStats> {
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut contributing = 0;
        for document in documents {
            let document_chunks = self.chunker.chunk(document);
            debug!(document.id = %document.id, count = document_chunks.len(), "chunked document");
            if !document_chunks.is_empty() {
                contributing += 1;
            }
            chunks.extend(document_chunks);
        }

        if chunks.is_empty() {
            return Err(RagError::Index(format!(
                "{} document(s) yielded no chunks to index",
                documents.len()
            )));
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = self.embedding_provider.embed_batch(&texts).await.inspect_err(|e| {
            error!(error = %e, "embedding failed during ingestion, keeping previous index");
        })?;
        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        let index = VectorIndex::build(chunks)?;
        let stats = IngestStats {
            documents: contributing,
            chunks: index.len(),
            dimensions: index.dimensions(),
        };

        *self.index.write().await = Some(Arc::new(index));
        info!(
            documents = stats.documents,
            chunks = stats.chunks,
            dimensions = stats.dimensions,
            "ingestion complete"
        );
        Ok(stats)
    }

    /// Retrieve the passages most relevant to `query`.
    ///
    /// Returns at most `top_k` results, each with cosine similarity of
    /// at least `min_relevance`, ordered by descending score with
    /// chunk id as tie-break. An empty result means "nothing relevant
    /// in the corpus" and is not an error; implausible (mashed-key)
    /// queries short-circuit to an empty result without an embedding
    /// call.
    ///
    /// # Errors
    ///
    /// - [`RagError::Index`] if called before a successful
    ///   [`ingest`](RagPipeline::ingest).
    /// - [`RagError::Embedding`] if embedding the query fails.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<RetrievalResult>> {
        let index = self
            .index
            .read()
            .await
            .clone()
            .ok_or_else(|| RagError::Index("no index built yet; call ingest first".into()))?;

        if !query::is_plausible(query) {
            debug!(query, "query rejected as implausible");
            return Ok(Vec::new());
        }

        let query_embedding = self.embedding_provider.embed(query).await.inspect_err(|e| {
            error!(error = %e, "query embedding failed");
        })?;

        let results = index.search(&query_embedding, self.config.top_k)?;
        let kept: Vec<RetrievalResult> =
            results.into_iter().filter(|r| r.score >= self.config.min_relevance).collect();

        debug!(query, kept = kept.len(), "retrieval complete");
        Ok(kept)
    }

    /// Answer a support question: retrieve, then generate.
    ///
    /// The single entry point for front-ends. Returns an [`Answer`]
    /// with at most `top_k` supporting passages; when nothing clears
    /// the relevance threshold, the fixed no-information answer comes
    /// back and the language model is never invoked.
    ///
    /// # Errors
    ///
    /// Propagates every query-time failure ([`RagError::Index`],
    /// [`RagError::Embedding`], [`RagError::Generation`]) to the
    /// caller; nothing is silently degraded.
    pub async fn answer_query(&self, query: &str) -> Result<Answer> {
        let results = self.retrieve(query).await?;
        self.generator.generate(query, results).await
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// All parts are required. Call [`build()`](RagPipelineBuilder::build)
/// to validate and produce the pipeline.
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    language_model: Option<Arc<dyn LanguageModel>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the language model used for answer generation.
    pub fn language_model(mut self, model: Arc<dyn LanguageModel>) -> Self {
        self.language_model = Some(model);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all parts are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required part is missing.
    pub fn build(self) -> Result<RagPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let language_model = self
            .language_model
            .ok_or_else(|| RagError::Config("language_model is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        let generator = AnswerGenerator::new(language_model, config.max_context_chars);

        Ok(RagPipeline {
            config,
            embedding_provider,
            chunker,
            generator,
            index: RwLock::new(None),
        })
    }
}
