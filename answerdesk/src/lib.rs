//! # answerdesk
//!
//! Retrieval-augmented question answering over a support document
//! corpus.
//!
//! ## Overview
//!
//! Documents are split into overlapping chunks, embedded, and indexed
//! in an immutable in-memory cosine-similarity index. A query is
//! embedded, the top-k most similar chunks above a relevance threshold
//! are retrieved, and a language model synthesizes a grounded answer
//! from them. When nothing in the corpus is relevant, a fixed
//! no-information answer is returned without consulting the model.
//!
//! The embedding and generation backends are capability traits
//! ([`EmbeddingProvider`], [`LanguageModel`]), so any backend — a
//! remote API or a local model — plugs in without touching the
//! retrieval logic. An OpenAI implementation of both ships behind the
//! `openai` feature.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use answerdesk::{
//!     Document, FixedSizeChunker, GenerationOptions, RagConfig, RagPipeline,
//! };
//! use answerdesk::openai::{OpenAiChatModel, OpenAiEmbedder};
//!
//! let config = RagConfig::default();
//! let pipeline = RagPipeline::builder()
//!     .config(config.clone())
//!     .embedding_provider(Arc::new(OpenAiEmbedder::from_env()?))
//!     .language_model(Arc::new(OpenAiChatModel::from_env(GenerationOptions::default())?))
//!     .chunker(Arc::new(FixedSizeChunker::new(config.chunk_size, config.chunk_overlap)?))
//!     .build()?;
//!
//! pipeline.ingest(&[Document::new("faq", "Support hours are 9am-6pm.")]).await?;
//! let answer = pipeline.answer_query("When is support available?").await?;
//! println!("{}", answer.text);
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generator;
pub mod index;
pub mod loader;
pub mod model;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
mod query;

pub use chunking::{Chunker, FixedSizeChunker, SeparatorChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, RetrievalResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generator::{AnswerGenerator, NO_ANSWER_TEXT};
pub use index::VectorIndex;
pub use loader::{DocumentSource, LoadFailure, TextFileSource, load_documents};
pub use model::{GenerationOptions, LanguageModel};
pub use pipeline::{IngestStats, RagPipeline, RagPipelineBuilder};
