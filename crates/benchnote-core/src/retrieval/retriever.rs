//! Retrieval adapter: mode dispatch over a collection topology.
//!
//! Maps each retrieval axis to a collection, dispatches semantic / keyword
//! / hybrid search, and wraps every retrieval in the synonym-expansion
//! merge. Retrieval is fail-soft throughout: an unreachable or empty
//! collection yields an empty candidate list, which downstream stages
//! treat as a valid "no candidates" outcome.

use std::collections::HashMap;
use std::sync::Arc;

use ordered_float::OrderedFloat;
use tracing::{debug, warn};

use crate::config::SearchMode;
use crate::synonym::SynonymDictionary;
use crate::traits::VectorIndex;
use crate::types::{Axis, ScoredDocument};

use super::bm25::Bm25;
use super::hybrid;

/// Which collections exist, and which collection serves which axis.
///
/// Ingestion layout changed over time; retrieval is parameterized over the
/// layout instead of branching on version history.
#[derive(Clone)]
pub enum CollectionTopology {
    /// One collection serves every axis.
    LegacySingle { combined: Arc<dyn VectorIndex> },
    /// Material and method axes share a materials+methods collection;
    /// the combined axis has its own. Current ingestion produces this.
    TwoSection {
        materials_methods: Arc<dyn VectorIndex>,
        combined: Arc<dyn VectorIndex>,
    },
    /// Separate collections per section.
    ThreeSection {
        materials: Arc<dyn VectorIndex>,
        methods: Arc<dyn VectorIndex>,
        combined: Arc<dyn VectorIndex>,
    },
}

impl CollectionTopology {
    /// Collection serving an axis.
    pub fn index_for_axis(&self, axis: Axis) -> &Arc<dyn VectorIndex> {
        match self {
            CollectionTopology::LegacySingle { combined } => combined,
            CollectionTopology::TwoSection {
                materials_methods,
                combined,
            } => match axis {
                Axis::Material | Axis::Method => materials_methods,
                Axis::Combined => combined,
            },
            CollectionTopology::ThreeSection {
                materials,
                methods,
                combined,
            } => match axis {
                Axis::Material => materials,
                Axis::Method => methods,
                Axis::Combined => combined,
            },
        }
    }

    /// Collection used for single-query search.
    pub fn primary(&self) -> &Arc<dyn VectorIndex> {
        self.index_for_axis(Axis::Combined)
    }
}

/// Retrieval adapter over a collection topology.
pub struct Retriever {
    topology: CollectionTopology,
    bm25: Bm25,
    synonyms: Arc<SynonymDictionary>,
}

impl Retriever {
    /// Create a retriever. The synonym dictionary is the per-request
    /// snapshot; management edits build a new `Arc` rather than mutating
    /// this one.
    pub fn new(topology: CollectionTopology, synonyms: Arc<SynonymDictionary>) -> Self {
        Self {
            topology,
            bm25: Bm25::default(),
            synonyms,
        }
    }

    /// The configured topology.
    pub fn topology(&self) -> &CollectionTopology {
        &self.topology
    }

    /// Search with synonym expansion: run every expanded query, keep each
    /// document once at its maximum observed score, return the merged set
    /// sorted descending, truncated to `k`.
    pub async fn search_with_expansion(
        &self,
        index: &Arc<dyn VectorIndex>,
        query: &str,
        mode: SearchMode,
        alpha: f32,
        k: usize,
    ) -> Vec<ScoredDocument> {
        let expanded = self.synonyms.expand_query(query);
        if expanded.len() > 1 {
            debug!(queries = expanded.len(), "synonym expansion applied");
        }

        let mut merged: HashMap<String, ScoredDocument> = HashMap::new();
        for expanded_query in &expanded {
            let results = self.retrieve(index, expanded_query, mode, alpha, k).await;
            for scored in results {
                let identity = scored.doc.identity_key();
                match merged.get(&identity) {
                    Some(existing) if existing.score >= scored.score => {}
                    _ => {
                        merged.insert(identity, scored);
                    }
                }
            }
        }

        let mut results: Vec<ScoredDocument> = merged.into_values().collect();
        results.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
        results.truncate(k);
        results
    }

    /// One retrieval without expansion, dispatched on mode. Failures are
    /// absorbed into an empty result.
    pub async fn retrieve(
        &self,
        index: &Arc<dyn VectorIndex>,
        query: &str,
        mode: SearchMode,
        alpha: f32,
        k: usize,
    ) -> Vec<ScoredDocument> {
        match mode {
            SearchMode::Semantic => self.semantic_search(index, query, k).await,
            SearchMode::Keyword => self.keyword_search(index, query, k).await,
            SearchMode::Hybrid => {
                let semantic = self.semantic_search(index, query, k).await;
                let keyword = self.keyword_search(index, query, k).await;
                let mut blended = hybrid::blend(&semantic, &keyword, alpha);
                blended.truncate(k);
                blended
            }
        }
    }

    async fn semantic_search(
        &self,
        index: &Arc<dyn VectorIndex>,
        query: &str,
        k: usize,
    ) -> Vec<ScoredDocument> {
        match index.similarity_search(query, k).await {
            Ok(results) => results,
            Err(e) => {
                warn!(
                    collection = index.collection_name(),
                    error = %e,
                    "similarity search failed, continuing with no candidates"
                );
                Vec::new()
            }
        }
    }

    /// BM25 over the full collection contents. The corpus is whatever the
    /// collection currently holds; there is no separate text index.
    async fn keyword_search(
        &self,
        index: &Arc<dyn VectorIndex>,
        query: &str,
        k: usize,
    ) -> Vec<ScoredDocument> {
        let docs = match index.get_all_documents().await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(
                    collection = index.collection_name(),
                    error = %e,
                    "corpus fetch failed, continuing with no candidates"
                );
                return Vec::new();
            }
        };
        if docs.is_empty() {
            return Vec::new();
        }

        let corpus: Vec<String> = docs.iter().map(|d| d.content.clone()).collect();
        let mut scored: Vec<ScoredDocument> = self
            .bm25
            .score(&corpus, query)
            .into_iter()
            .map(|(i, score)| ScoredDocument::new(docs[i].clone(), score))
            .collect();

        scored.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
        scored.truncate(k);
        scored
    }
}
