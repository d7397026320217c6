//! Document chunking strategies.
//!
//! This module provides the [`Chunker`] trait and two implementations:
//!
//! - [`FixedSizeChunker`] — sliding character windows with configurable overlap
//! - [`SeparatorChunker`] — splits on a separator, then packs segments up to
//!   the chunk size
//!
//! Sizes and overlaps are counted in Unicode scalar values (`char`s),
//! so chunk boundaries never land inside a multi-byte sequence.
//! Chunking is fully deterministic: identical input always yields
//! identical boundaries.

use crate::document::{Chunk, Document};
use crate::error::{RagError, Result};

/// A strategy for splitting documents into chunks.
///
/// Implementations produce [`Chunk`]s with text and metadata but no
/// embeddings; embeddings are attached later by the pipeline. Chunk ids
/// are per-document positions here and are renumbered densely over the
/// whole corpus by [`VectorIndex::build`](crate::index::VectorIndex::build).
pub trait Chunker: Send + Sync {
    /// Split a document into chunks.
    ///
    /// Returns an empty `Vec` if the document text is empty or
    /// whitespace-only (that is not an error).
    fn chunk(&self, document: &Document) -> Vec<Chunk>;
}

fn into_chunks(document: &Document, texts: Vec<String>) -> Vec<Chunk> {
    texts
        .into_iter()
        .enumerate()
        .map(|(i, text)| {
            let mut metadata = document.metadata.clone();
            metadata.insert("chunk_index".to_string(), i.to_string());
            Chunk {
                id: i,
                document_id: document.id.clone(),
                text,
                embedding: Vec::new(),
                metadata,
            }
        })
        .collect()
}

/// Sliding character windows over the text, advancing by
/// `chunk_size - overlap` per step. The final window may be shorter
/// and is kept if non-empty.
fn window_split(chars: &[char], chunk_size: usize, overlap: usize) -> Vec<String> {
    let step = chunk_size - overlap;
    let mut out = Vec::new();
    let mut start = 0;
    while start < chars.len() {
        let end = (start + chunk_size).min(chars.len());
        out.push(chars[start..end].iter().collect());
        if end == chars.len() {
            break;
        }
        start += step;
    }
    out
}

/// Splits text into fixed-size chunks by character count with
/// configurable overlap.
///
/// # Example
///
/// ```rust,ignore
/// use answerdesk::FixedSizeChunker;
///
/// let chunker = FixedSizeChunker::new(1500, 200)?;
/// let chunks = chunker.chunk(&document);
/// ```
#[derive(Debug, Clone)]
pub struct FixedSizeChunker {
    chunk_size: usize,
    overlap: usize,
}

impl FixedSizeChunker {
    /// Create a new `FixedSizeChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] unless `0 < chunk_size` and
    /// `overlap < chunk_size`.
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        validate_window(chunk_size, overlap)?;
        Ok(Self { chunk_size, overlap })
    }
}

impl Chunker for FixedSizeChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }
        let chars: Vec<char> = document.text.chars().collect();
        into_chunks(document, window_split(&chars, self.chunk_size, self.overlap))
    }
}

/// Splits text on a separator, then greedily packs segments into
/// chunks of at most `chunk_size` characters.
///
/// Segments are rejoined with the separator. When a chunk fills up,
/// the next chunk starts with the trailing segments of the previous
/// one, up to `overlap` characters, so context is shared across the
/// boundary. A single segment longer than `chunk_size` falls back to
/// fixed character windows.
///
/// With `separator = "\n"` this matches the ingestion behavior of
/// newline-structured support documents (FAQ pages, extracted PDFs).
#[derive(Debug, Clone)]
pub struct SeparatorChunker {
    separator: String,
    chunk_size: usize,
    overlap: usize,
}

impl SeparatorChunker {
    /// Create a new `SeparatorChunker`.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] unless `0 < chunk_size`,
    /// `overlap < chunk_size`, and `separator` is non-empty.
    pub fn new(separator: impl Into<String>, chunk_size: usize, overlap: usize) -> Result<Self> {
        let separator = separator.into();
        if separator.is_empty() {
            return Err(RagError::Config("separator must not be empty".into()));
        }
        validate_window(chunk_size, overlap)?;
        Ok(Self { separator, chunk_size, overlap })
    }

    fn pack(&self, text: &str) -> Vec<String> {
        let sep_len = self.separator.chars().count();
        let mut out: Vec<String> = Vec::new();
        // Segments making up the chunk currently being packed, with
        // their char lengths.
        let mut current: Vec<(String, usize)> = Vec::new();
        let mut current_len = 0;

        for segment in text.split(self.separator.as_str()) {
            let seg = segment.trim_end_matches(['\r']);
            if seg.trim().is_empty() {
                continue;
            }
            let seg_len = seg.chars().count();

            if seg_len > self.chunk_size {
                // Oversize segment: flush what we have, then window it.
                if !current.is_empty() {
                    out.push(join_segments(&current, &self.separator));
                    current.clear();
                    current_len = 0;
                }
                let chars: Vec<char> = seg.chars().collect();
                out.extend(window_split(&chars, self.chunk_size, self.overlap));
                continue;
            }

            let extra = if current.is_empty() { seg_len } else { seg_len + sep_len };
            if current_len + extra > self.chunk_size && !current.is_empty() {
                out.push(join_segments(&current, &self.separator));
                // Carry trailing segments into the next chunk, up to
                // `overlap` chars but never more than the incoming
                // segment leaves room for within the budget.
                let carry_budget =
                    self.overlap.min(self.chunk_size.saturating_sub(seg_len + sep_len));
                let mut carried: Vec<(String, usize)> = Vec::new();
                let mut carried_len = 0;
                for (s, l) in current.iter().rev() {
                    let cost = if carried.is_empty() { *l } else { *l + sep_len };
                    if carried_len + cost > carry_budget {
                        break;
                    }
                    carried_len += cost;
                    carried.push((s.clone(), *l));
                }
                carried.reverse();
                current = carried;
                current_len = carried_len;
            }

            let extra = if current.is_empty() { seg_len } else { seg_len + sep_len };
            current.push((seg.to_string(), seg_len));
            current_len += extra;
        }

        if !current.is_empty() {
            out.push(join_segments(&current, &self.separator));
        }
        out
    }
}

fn join_segments(segments: &[(String, usize)], separator: &str) -> String {
    segments.iter().map(|(s, _)| s.as_str()).collect::<Vec<_>>().join(separator)
}

impl Chunker for SeparatorChunker {
    fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            return Vec::new();
        }
        into_chunks(document, self.pack(&document.text))
    }
}

fn validate_window(chunk_size: usize, overlap: usize) -> Result<()> {
    if chunk_size == 0 {
        return Err(RagError::Config("chunk_size must be greater than zero".into()));
    }
    if overlap >= chunk_size {
        return Err(RagError::Config(format!(
            "overlap ({overlap}) must be less than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}
