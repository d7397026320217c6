//! Language-model capability trait and generation options.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A black-box text-completion capability.
///
/// The pipeline's entire contract with a language model is one call:
/// prompt in, free text out. Failures (timeout, quota, malformed
/// response) surface as
/// [`RagError::Generation`](crate::error::RagError::Generation) and
/// are never swallowed.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// A short name identifying the backing model, for logs and errors.
    fn name(&self) -> &str;

    /// Produce a completion for the given prompt.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Sampling and output-length options for a language-model backend.
///
/// These are the recognized knobs; backends map them onto whatever
/// their API calls them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerationOptions {
    /// Which model to call (backend-specific identifier).
    pub model: String,
    /// Truncate the generated output to this many tokens.
    pub max_tokens: u32,
    /// Sampling temperature: 0.0 is (near-)deterministic, higher is
    /// more diverse.
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { model: "gpt-4o-mini".into(), max_tokens: 512, temperature: 0.2 }
    }
}

impl GenerationOptions {
    /// Set the model identifier.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the maximum output length in tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
