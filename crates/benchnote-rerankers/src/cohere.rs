//! Cohere reranker implementation.

use async_trait::async_trait;

use benchnote_core::error::{BenchError, BenchResult};
use benchnote_core::traits::{RerankedEntry, Reranker, RerankerConfig};

use reqwest::Client;
use serde::{Deserialize, Serialize};

/// Cohere reranker implementation.
pub struct CohereReranker {
    client: Client,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct CohereRerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
    top_n: usize,
    return_documents: bool,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResponse {
    results: Vec<CohereRerankResult>,
}

#[derive(Debug, Deserialize)]
struct CohereRerankResult {
    index: usize,
    relevance_score: f32,
}

impl CohereReranker {
    /// Create a new Cohere reranker.
    pub fn new(config: RerankerConfig) -> BenchResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("COHERE_API_KEY").ok())
            .ok_or_else(|| {
                BenchError::Configuration(
                    "Cohere API key required. Set COHERE_API_KEY or provide api_key.".to_string(),
                )
            })?;

        let model = config.model;
        let client = Client::new();

        Ok(Self {
            client,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Reranker for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> BenchResult<Vec<RerankedEntry>> {
        if documents.is_empty() {
            return Ok(vec![]);
        }

        let request = CohereRerankRequest {
            model: self.model.clone(),
            query: query.to_string(),
            documents: documents.to_vec(),
            top_n: top_n.min(documents.len()),
            return_documents: false,
        };

        let response = self
            .client
            .post("https://api.cohere.ai/v1/rerank")
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| BenchError::reranker(format!("Failed to call Cohere API: {e}")))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BenchError::reranker(format!("Cohere API error: {error}")));
        }

        let result: CohereRerankResponse = response
            .json()
            .await
            .map_err(|e| BenchError::reranker(format!("Failed to parse response: {e}")))?;

        // Response order is the new rank order; indices point back into
        // the submitted document list.
        Ok(result
            .results
            .into_iter()
            .map(|r| RerankedEntry {
                index: r.index,
                relevance_score: r.relevance_score,
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
