//! Document sources and failure-isolating batch loading.
//!
//! The pipeline consumes plain [`Document`]s; how the text was
//! extracted (PDF parsing, HTML scraping, ...) is the source's
//! business. Implement [`DocumentSource`] to plug any extractor in.
//! [`load_documents`] loads a batch, skipping and reporting sources
//! that fail instead of aborting the whole ingestion.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::document::Document;
use crate::error::{RagError, Result};

/// A provider of one raw document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Identifier for this source, used as the document id and in
    /// failure reports.
    fn id(&self) -> &str;

    /// Load the source and return its text as a [`Document`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Load`] if the source is unreadable or
    /// yields no usable text.
    async fn load(&self) -> Result<Document>;
}

/// A source that failed to load, reported alongside the batch result.
#[derive(Debug)]
pub struct LoadFailure {
    /// Identifier of the failing source.
    pub source_id: String,
    /// The error the source returned.
    pub error: RagError,
}

/// Load every source, isolating per-source failures.
///
/// A failing source is skipped with a warning and collected into the
/// returned failure list; it never aborts the batch. The documents
/// come back in source order.
pub async fn load_documents(
    sources: &[Arc<dyn DocumentSource>],
) -> (Vec<Document>, Vec<LoadFailure>) {
    let mut documents = Vec::new();
    let mut failures = Vec::new();

    for source in sources {
        match source.load().await {
            Ok(document) => documents.push(document),
            Err(error) => {
                warn!(source = source.id(), %error, "skipping unreadable source");
                failures.push(LoadFailure { source_id: source.id().to_string(), error });
            }
        }
    }

    info!(loaded = documents.len(), failed = failures.len(), "loaded document batch");
    (documents, failures)
}

/// A plain-text file on disk.
///
/// The reference [`DocumentSource`]: reads the file as UTF-8 with
/// `tokio::fs`. PDF and web sources follow the same shape with their
/// extractor of choice.
pub struct TextFileSource {
    id: String,
    path: PathBuf,
}

impl TextFileSource {
    /// Create a source for the file at `path`, identified by `id`.
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self { id: id.into(), path: path.into() }
    }
}

#[async_trait]
impl DocumentSource for TextFileSource {
    fn id(&self) -> &str {
        &self.id
    }

    async fn load(&self) -> Result<Document> {
        let text =
            tokio::fs::read_to_string(&self.path).await.map_err(|e| RagError::Load {
                source_id: self.id.clone(),
                message: format!("{}: {e}", self.path.display()),
            })?;

        let mut metadata = HashMap::new();
        metadata.insert("type".to_string(), "text".to_string());

        Ok(Document {
            id: self.id.clone(),
            text,
            metadata,
            source_uri: Some(self.path.display().to_string()),
        })
    }
}
