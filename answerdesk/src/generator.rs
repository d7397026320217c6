//! Answer synthesis from retrieved passages.

use std::sync::Arc;

use tracing::{debug, info};

use crate::document::{Answer, RetrievalResult};
use crate::error::Result;
use crate::model::LanguageModel;

/// The fixed answer returned when no passage clears the relevance
/// threshold. The language model is never consulted in that case.
pub const NO_ANSWER_TEXT: &str =
    "I don't have enough information in the knowledge base to answer that. \
     Please ask about topics covered by the indexed documents.";

/// Combines retrieved passages with the user query into a prompt and
/// invokes a [`LanguageModel`] to produce a grounded answer.
///
/// When the retrieval results are empty, a fixed no-information
/// [`Answer`] is returned without calling the model at all, so the
/// model can never hallucinate an answer with no grounding.
pub struct AnswerGenerator {
    model: Arc<dyn LanguageModel>,
    max_context_chars: usize,
}

impl AnswerGenerator {
    /// Create a generator over the given model.
    ///
    /// `max_context_chars` caps the size of the context block embedded
    /// in the prompt; rank-ordered passages beyond the cap are cut off.
    pub fn new(model: Arc<dyn LanguageModel>, max_context_chars: usize) -> Self {
        Self { model, max_context_chars }
    }

    /// Generate an answer for `query` grounded in `results`.
    ///
    /// The returned [`Answer`]'s `supporting_chunks` are exactly the
    /// input results, unmodified and in rank order.
    ///
    /// # Errors
    ///
    /// Propagates [`RagError::Generation`](crate::error::RagError::Generation)
    /// from the model; the answer is never silently replaced with a
    /// placeholder on failure.
    pub async fn generate(&self, query: &str, results: Vec<RetrievalResult>) -> Result<Answer> {
        if results.is_empty() {
            debug!("no passages cleared the relevance threshold, returning fixed answer");
            return Ok(Answer { text: NO_ANSWER_TEXT.to_string(), supporting_chunks: Vec::new() });
        }

        let context = self.build_context(&results);
        let prompt = format!(
            "Answer the question based on the context.\n\n\
             Context: {context}\n\n\
             Question: {query}\n\n\
             Answer:"
        );

        let text = self.model.complete(&prompt).await?;
        info!(model = self.model.name(), passages = results.len(), "generated answer");

        Ok(Answer { text: text.trim().to_string(), supporting_chunks: results })
    }

    /// Concatenate passage texts in rank order, collapse whitespace,
    /// and truncate to the configured context budget.
    fn build_context(&self, results: &[RetrievalResult]) -> String {
        let mut context = String::new();
        for result in results {
            let cleaned: String =
                result.chunk.text.split_whitespace().collect::<Vec<_>>().join(" ");
            if cleaned.is_empty() {
                continue;
            }
            if !context.is_empty() {
                context.push(' ');
            }
            context.push_str(&cleaned);
        }

        if context.chars().count() > self.max_context_chars {
            context = context.chars().take(self.max_context_chars).collect();
        }
        context
    }
}
