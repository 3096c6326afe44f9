//! OpenAI embedding provider implementation.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use benchnote_core::error::{BenchError, BenchResult};
use benchnote_core::traits::{Embedder, EmbedderConfig};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// OpenAI embedding provider.
pub struct OpenAiEmbedder {
    client: Client,
    config: EmbedderConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: EmbeddingInput<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum EmbeddingInput<'a> {
    Single(&'a str),
    Batch(&'a [String]),
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create a new OpenAI embedder.
    pub fn new(config: EmbedderConfig) -> BenchResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                BenchError::Configuration(
                    "OpenAI API key not found. Set OPENAI_API_KEY environment variable or provide api_key in config.".to_string(),
                )
            })?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            "authorization",
            format!("Bearer {api_key}")
                .parse()
                .map_err(|_| BenchError::Configuration("Invalid API key format".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BenchError::Configuration(format!("Failed to create HTTP client: {e}")))?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| OPENAI_API_URL.to_string());

        Ok(Self {
            client,
            config,
            base_url,
        })
    }

    async fn request(&self, input: EmbeddingInput<'_>) -> BenchResult<Vec<Vec<f32>>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| BenchError::embedding(format!("OpenAI embedding error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BenchError::embedding(format!(
                "OpenAI embedding error {status}: {body}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| BenchError::embedding(format!("Failed to parse response: {e}")))?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> BenchResult<Vec<f32>> {
        self.request(EmbeddingInput::Single(text))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::embedding("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[String]) -> BenchResult<Vec<Vec<f32>>> {
        self.request(EmbeddingInput::Batch(texts)).await
    }

    fn dimension(&self) -> usize {
        self.config.embedding_dims
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
