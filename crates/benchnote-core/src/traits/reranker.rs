//! Reranker trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BenchResult;

/// One entry of a rerank response: the index into the submitted document
/// list, plus the cross-encoder relevance score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RerankedEntry {
    /// Index into the original document list.
    pub index: usize,
    /// Cross-encoder relevance score.
    pub relevance_score: f32,
}

/// Core Reranker trait - all reranker providers implement this.
#[async_trait]
pub trait Reranker: Send + Sync {
    /// Rerank documents by relevance to the query.
    ///
    /// The returned order IS the new rank order (entry 0 = best). Entries
    /// reference documents by their index in `documents`.
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> BenchResult<Vec<RerankedEntry>>;

    /// Get the model name.
    fn model_name(&self) -> &str;
}

/// Reranker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Provider type.
    pub provider: RerankerProvider,
    /// Model name/identifier.
    pub model: String,
    /// API key (if not using environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            provider: RerankerProvider::Cohere,
            model: "rerank-multilingual-v3.0".to_string(),
            api_key: None,
        }
    }
}

/// Reranker provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RerankerProvider {
    #[default]
    Cohere,
}
