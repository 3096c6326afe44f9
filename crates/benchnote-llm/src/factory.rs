//! Factory for creating LLM providers.

use std::sync::Arc;

use benchnote_core::error::{BenchError, BenchResult};
use benchnote_core::traits::{Llm, LlmConfig, LlmProvider};

use crate::openai::OpenAiLlm;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn create(provider: LlmProvider, config: LlmConfig) -> BenchResult<Arc<dyn Llm>> {
        match provider {
            LlmProvider::OpenAI => {
                let llm = OpenAiLlm::new(config)?;
                Ok(Arc::new(llm))
            }
            _ => Err(BenchError::UnsupportedProvider {
                provider: format!("{provider:?}"),
            }),
        }
    }

    /// Create an OpenAI LLM provider with default configuration.
    pub fn openai() -> BenchResult<Arc<dyn Llm>> {
        Self::create(LlmProvider::OpenAI, LlmConfig::default())
    }

    /// Create an OpenAI LLM provider with a specific model.
    pub fn openai_with_model(model: impl Into<String>) -> BenchResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::create(LlmProvider::OpenAI, config)
    }
}
