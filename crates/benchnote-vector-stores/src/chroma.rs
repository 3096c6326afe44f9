//! Chroma vector index implementation.
//!
//! Queries are embedded client-side through the configured [`Embedder`];
//! Chroma only ever sees vectors.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use benchnote_core::error::{BenchError, BenchResult};
use benchnote_core::traits::{Embedder, VectorIndex, VectorIndexConfig};
use benchnote_core::types::{NoteDocument, ScoredDocument};

/// Chroma-backed document collection.
pub struct ChromaIndex {
    client: Client,
    base_url: String,
    tenant: String,
    database: String,
    collection_name: String,
    embedder: Arc<dyn Embedder>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChromaCollection {
    id: String,
    name: String,
    metadata: Option<HashMap<String, serde_json::Value>>,
}

impl ChromaIndex {
    /// Create a new Chroma index over one collection.
    pub fn new(config: VectorIndexConfig, embedder: Arc<dyn Embedder>) -> Self {
        let base_url = config
            .url
            .clone()
            .unwrap_or_else(|| "http://localhost:8000".to_string());
        let tenant = config
            .tenant
            .clone()
            .unwrap_or_else(|| "default_tenant".to_string());
        let database = config
            .database
            .clone()
            .unwrap_or_else(|| "default_database".to_string());

        Self {
            client: Client::new(),
            base_url,
            tenant,
            database,
            collection_name: config.collection_name,
            embedder,
        }
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    async fn collection_id(&self) -> BenchResult<String> {
        let url = self.api_url(&format!(
            "/tenants/{}/databases/{}/collections/{}",
            self.tenant, self.database, self.collection_name
        ));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to get collection: {e}")))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BenchError::vector_index(format!(
                "Failed to get collection '{}': {error}",
                self.collection_name
            )));
        }

        let collection: ChromaCollection = response
            .json()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to parse response: {e}")))?;

        Ok(collection.id)
    }

    fn documents_from_columns(
        documents: &[serde_json::Value],
        metadatas: &[serde_json::Value],
    ) -> Vec<NoteDocument> {
        documents
            .iter()
            .enumerate()
            .map(|(i, content)| {
                let metadata: HashMap<String, serde_json::Value> = metadatas
                    .get(i)
                    .and_then(|m| m.as_object())
                    .map(|m| m.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
                    .unwrap_or_default();
                NoteDocument {
                    content: content.as_str().unwrap_or_default().to_string(),
                    metadata,
                }
            })
            .collect()
    }
}

#[async_trait]
impl VectorIndex for ChromaIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> BenchResult<Vec<ScoredDocument>> {
        let query_embedding = self.embedder.embed(query).await?;
        let collection_id = self.collection_id().await?;

        let url = self.api_url(&format!("/collections/{collection_id}/query"));
        let body = json!({
            "query_embeddings": [query_embedding],
            "n_results": k,
            "include": ["documents", "metadatas", "distances"]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to query: {e}")))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BenchError::vector_index(format!("Failed to query: {error}")));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to parse response: {e}")))?;

        let documents = result["documents"][0].as_array().cloned().unwrap_or_default();
        let metadatas = result["metadatas"][0].as_array().cloned().unwrap_or_default();
        let distances = result["distances"][0].as_array().cloned().unwrap_or_default();

        let docs = Self::documents_from_columns(&documents, &metadatas);
        Ok(docs
            .into_iter()
            .zip(distances)
            .map(|(doc, distance)| {
                // Cosine distance to relevance score.
                let score = 1.0 - distance.as_f64().unwrap_or(1.0) as f32;
                ScoredDocument::new(doc, score)
            })
            .collect())
    }

    async fn count(&self) -> BenchResult<usize> {
        let collection_id = self.collection_id().await?;
        let url = self.api_url(&format!("/collections/{collection_id}/count"));

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to count: {e}")))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BenchError::vector_index(format!("Failed to count: {error}")));
        }

        response
            .json::<usize>()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to parse count: {e}")))
    }

    async fn get_all_documents(&self) -> BenchResult<Vec<NoteDocument>> {
        let collection_id = self.collection_id().await?;
        let url = self.api_url(&format!("/collections/{collection_id}/get"));
        let body = json!({
            "include": ["documents", "metadatas"]
        });

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to get documents: {e}")))?;

        if !response.status().is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(BenchError::vector_index(format!(
                "Failed to get documents: {error}"
            )));
        }

        let result: serde_json::Value = response
            .json()
            .await
            .map_err(|e| BenchError::vector_index(format!("Failed to parse response: {e}")))?;

        let documents = result["documents"].as_array().cloned().unwrap_or_default();
        let metadatas = result["metadatas"].as_array().cloned().unwrap_or_default();

        Ok(Self::documents_from_columns(&documents, &metadatas))
    }

    fn collection_name(&self) -> &str {
        &self.collection_name
    }
}
