//! Error types for the `answerdesk` crate.

use thiserror::Error;

/// Errors that can occur while building or querying the knowledge base.
#[derive(Debug, Error)]
pub enum RagError {
    /// A document source could not be loaded.
    ///
    /// Load failures are isolated per source during batch ingestion:
    /// the failing source is skipped and reported, the batch continues.
    #[error("failed to load source '{source_id}': {message}")]
    Load {
        /// Identifier of the source that failed.
        source_id: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration parameter failed validation.
    ///
    /// Raised at construction time, never at query time.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The embedding backend failed to produce a vector.
    #[error("embedding failed ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// A structural failure in the vector index (empty corpus,
    /// mismatched dimensions, querying before a build).
    #[error("index error: {0}")]
    Index(String),

    /// The language-model backend failed to produce an answer.
    #[error("generation failed ({provider}): {message}")]
    Generation {
        /// The language model that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
