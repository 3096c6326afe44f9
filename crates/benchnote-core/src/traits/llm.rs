//! LLM trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BenchResult;

/// Core LLM trait - all LLM providers implement this.
///
/// The pipeline only ever needs single-prompt completion; query planning,
/// focus classification, and comparison summarization all go through
/// `invoke`.
#[async_trait]
pub trait Llm: Send + Sync {
    /// Generate a completion for a single prompt.
    async fn invoke(&self, prompt: &str) -> BenchResult<String>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}

/// LLM configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Model name/identifier.
    pub model: String,
    /// Sampling temperature. Ignored by reasoning models.
    #[serde(default)]
    pub temperature: f32,
    /// Fixed sampling seed for reproducible query generation.
    #[serde(default = "default_seed", skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// API key (if not using environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_seed() -> Option<u64> {
    Some(42)
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
            seed: default_seed(),
            api_key: None,
            base_url: None,
        }
    }
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    AzureOpenAI,
    Ollama,
}
