//! Factory for creating embedding providers.

use std::sync::Arc;

use benchnote_core::error::BenchResult;
use benchnote_core::traits::{Embedder, EmbedderConfig};

use crate::openai::OpenAiEmbedder;

/// Factory for creating embedding providers.
pub struct EmbedderFactory;

impl EmbedderFactory {
    /// Create an OpenAI embedder from the given configuration.
    pub fn openai(config: EmbedderConfig) -> BenchResult<Arc<dyn Embedder>> {
        let embedder = OpenAiEmbedder::new(config)?;
        Ok(Arc::new(embedder))
    }

    /// Create an OpenAI embedder with a specific model.
    pub fn openai_with_model(model: impl Into<String>) -> BenchResult<Arc<dyn Embedder>> {
        let config = EmbedderConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::openai(config)
    }
}
