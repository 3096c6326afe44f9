//! Vector index trait and related types.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BenchResult;
use crate::types::{NoteDocument, ScoredDocument};

/// A searchable document collection backed by an embedding index.
///
/// Keyword (BM25) search operates over `get_all_documents`, so it sees
/// exactly the documents the configured collection currently holds - there
/// is no separate text index to drift out of sync.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Similarity search returning documents with relevance scores
    /// (higher = more relevant), sorted descending.
    async fn similarity_search(&self, query: &str, k: usize) -> BenchResult<Vec<ScoredDocument>>;

    /// Number of documents in the collection.
    async fn count(&self) -> BenchResult<usize>;

    /// All documents in the collection, used to build the BM25 corpus.
    async fn get_all_documents(&self) -> BenchResult<Vec<NoteDocument>>;

    /// Get the collection name.
    fn collection_name(&self) -> &str;
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    /// Provider type.
    pub provider: VectorIndexProvider,
    /// Collection name.
    pub collection_name: String,
    /// Service URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Tenant (Chroma multi-tenancy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant: Option<String>,
    /// Database (Chroma multi-tenancy).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
}

impl Default for VectorIndexConfig {
    fn default() -> Self {
        Self {
            provider: VectorIndexProvider::Chroma,
            collection_name: "combined_collection".to_string(),
            url: None,
            tenant: None,
            database: None,
        }
    }
}

/// Vector index provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VectorIndexProvider {
    #[default]
    Chroma,
}
