//! OpenAI-compatible chat-completions provider.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use benchnote_core::error::{BenchError, BenchResult};
use benchnote_core::traits::{Llm, LlmConfig};

const OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// OpenAI (and OpenAI-compatible endpoint) LLM provider.
pub struct OpenAiLlm {
    client: Client,
    config: LlmConfig,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u64>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

impl OpenAiLlm {
    /// Create a new OpenAI LLM provider.
    pub fn new(config: LlmConfig) -> BenchResult<Self> {
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
        headers.insert(
            "content-type",
            "application/json"
                .parse()
                .map_err(|_| BenchError::Configuration("Invalid content type".to_string()))?,
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

    /// Reasoning models reject sampling parameters.
    fn is_reasoning_model(&self) -> bool {
        let model_lower = self.config.model.to_lowercase();
        ["o1", "o3", "gpt-5"]
            .iter()
            .any(|m| model_lower.contains(m))
    }
}

#[async_trait]
impl Llm for OpenAiLlm {
    async fn invoke(&self, prompt: &str) -> BenchResult<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: prompt.to_string(),
            }],
            temperature: if self.is_reasoning_model() {
                None
            } else {
                Some(self.config.temperature)
            },
            seed: self.config.seed,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| BenchError::llm(format!("OpenAI API error: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BenchError::llm(format!("OpenAI API error {status}: {body}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| BenchError::llm(format!("Failed to parse response: {e}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::llm("No response choices returned"))?;

        Ok(choice.message.content.unwrap_or_default())
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reasoning_model_detection() {
        let config = LlmConfig {
            model: "o1-mini".to_string(),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let llm = OpenAiLlm::new(config).unwrap();
        assert!(llm.is_reasoning_model());

        let config = LlmConfig {
            model: "gpt-4o-mini".to_string(),
            api_key: Some("key".to_string()),
            ..Default::default()
        };
        let llm = OpenAiLlm::new(config).unwrap();
        assert!(!llm.is_reasoning_model());
    }

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        std::env::remove_var("OPENAI_API_KEY");
        let result = OpenAiLlm::new(LlmConfig::default());
        assert!(matches!(result, Err(BenchError::Configuration(_))));
    }
}
