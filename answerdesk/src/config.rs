//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
///
/// All validation happens in [`RagConfigBuilder::build`], so an
/// in-hand `RagConfig` is always internally consistent and query-time
/// code never re-validates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RagConfig {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Maximum number of supporting passages per answer.
    pub top_k: usize,
    /// Minimum cosine similarity a retrieved chunk must reach to count
    /// as relevant. Results below this are filtered out.
    pub min_relevance: f32,
    /// Maximum number of characters of retrieved context handed to the
    /// language model.
    pub max_context_chars: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1500,
            chunk_overlap: 200,
            top_k: 3,
            min_relevance: 0.3,
            max_context_chars: 800,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Set the maximum chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the maximum number of supporting passages per answer.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the minimum cosine similarity for retrieved chunks.
    pub fn min_relevance(mut self, threshold: f32) -> Self {
        self.config.min_relevance = threshold;
        self
    }

    /// Set the context budget handed to the language model, in characters.
    pub fn max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `min_relevance` is not a finite number
    /// - `max_context_chars == 0`
    pub fn build(self) -> Result<RagConfig> {
        let c = &self.config;
        if c.chunk_size == 0 {
            return Err(RagError::Config("chunk_size must be greater than zero".into()));
        }
        if c.chunk_overlap >= c.chunk_size {
            return Err(RagError::Config(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                c.chunk_overlap, c.chunk_size
            )));
        }
        if c.top_k == 0 {
            return Err(RagError::Config("top_k must be greater than zero".into()));
        }
        if !c.min_relevance.is_finite() {
            return Err(RagError::Config(format!(
                "min_relevance must be finite, got {}",
                c.min_relevance
            )));
        }
        if c.max_context_chars == 0 {
            return Err(RagError::Config("max_context_chars must be greater than zero".into()));
        }
        Ok(self.config)
    }
}
