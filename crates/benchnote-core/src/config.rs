//! Configuration for the retrieval pipeline.

use serde::{Deserialize, Serialize};

use crate::retrieval::{AxisWeights, FusionMethod, DEFAULT_RRF_K};
use crate::types::Axis;

/// Retrieval mode for one (collection, query) search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Embedding similarity search.
    #[default]
    Semantic,
    /// BM25 over the collection contents.
    Keyword,
    /// Weighted blend of semantic and keyword scores.
    Hybrid,
}

/// Where the reranker is applied in multi-axis mode.
///
/// The two positions are mutually exclusive per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RerankPosition {
    /// Independently per axis, before fusion.
    PerAxis,
    /// Once over the fused ranking.
    #[default]
    AfterFusion,
}

/// Per-axis retrieval modes used in multi-axis search.
///
/// The material axis defaults to keyword search: exact reagent names
/// matter more than embedding proximity there.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisSearchModes {
    pub material: SearchMode,
    pub method: SearchMode,
    pub combined: SearchMode,
}

impl Default for AxisSearchModes {
    fn default() -> Self {
        Self {
            material: SearchMode::Keyword,
            method: SearchMode::Semantic,
            combined: SearchMode::Semantic,
        }
    }
}

impl AxisSearchModes {
    /// Get the mode for an axis.
    pub fn get(&self, axis: Axis) -> SearchMode {
        match axis {
            Axis::Material => self.material,
            Axis::Method => self.method,
            Axis::Combined => self.combined,
        }
    }
}

/// Pipeline configuration.
///
/// All fields are caller-supplied with defaults; a plain
/// `SearchConfig::default()` reproduces the production settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Retrieval mode for single-query search.
    pub search_mode: SearchMode,
    /// Semantic weight for hybrid search, in [0, 1].
    pub hybrid_alpha: f32,
    /// Enable the three-axis flow.
    pub multi_axis_enabled: bool,
    /// Cross-axis fusion method.
    pub fusion_method: FusionMethod,
    /// Per-axis fusion weights.
    pub axis_weights: AxisWeights,
    /// K parameter for RRF fusion.
    pub rrf_k: f32,
    /// Reranker position in multi-axis mode.
    pub rerank_position: RerankPosition,
    /// Enable reranking.
    pub rerank_enabled: bool,
    /// Per-axis retrieval modes in multi-axis mode.
    pub axis_search_modes: AxisSearchModes,
    /// Candidate pool size per retrieval (sized for dedup headroom).
    pub candidate_pool: usize,
    /// Rerank pool size; also the dedup scan cap.
    pub rerank_top_n: usize,
    /// Display limit in normal mode.
    pub display_top_n: usize,
    /// Display limit in evaluation mode.
    pub evaluation_top_n: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            search_mode: SearchMode::Semantic,
            hybrid_alpha: 0.7,
            multi_axis_enabled: true,
            fusion_method: FusionMethod::Rrf,
            axis_weights: AxisWeights::default(),
            rrf_k: DEFAULT_RRF_K,
            rerank_position: RerankPosition::AfterFusion,
            rerank_enabled: true,
            axis_search_modes: AxisSearchModes::default(),
            candidate_pool: 30,
            rerank_top_n: 20,
            display_top_n: 3,
            evaluation_top_n: 10,
        }
    }
}

impl SearchConfig {
    /// Display limit for a request.
    pub fn display_limit(&self, evaluation_mode: bool) -> usize {
        if evaluation_mode {
            self.evaluation_top_n
        } else {
            self.display_top_n
        }
    }

    /// Set the hybrid alpha, clamped to [0, 1].
    pub fn with_hybrid_alpha(mut self, alpha: f32) -> Self {
        self.hybrid_alpha = alpha.clamp(0.0, 1.0);
        self
    }

    /// Enable or disable multi-axis search.
    pub fn with_multi_axis(mut self, enabled: bool) -> Self {
        self.multi_axis_enabled = enabled;
        self
    }

    /// Set the single-query search mode.
    pub fn with_search_mode(mut self, mode: SearchMode) -> Self {
        self.search_mode = mode;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_production_settings() {
        let config = SearchConfig::default();
        assert_eq!(config.candidate_pool, 30);
        assert_eq!(config.rerank_top_n, 20);
        assert_eq!(config.display_limit(false), 3);
        assert_eq!(config.display_limit(true), 10);
        assert!((config.hybrid_alpha - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.axis_search_modes.get(Axis::Material), SearchMode::Keyword);
        assert_eq!(config.axis_search_modes.get(Axis::Combined), SearchMode::Semantic);
    }

    #[test]
    fn test_serde_snake_case_modes() {
        let mode: SearchMode = serde_json::from_str("\"hybrid\"").unwrap();
        assert_eq!(mode, SearchMode::Hybrid);
        let pos: RerankPosition = serde_json::from_str("\"per_axis\"").unwrap();
        assert_eq!(pos, RerankPosition::PerAxis);
    }

    #[test]
    fn test_partial_config_deserializes_with_defaults() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"multi_axis_enabled": false, "hybrid_alpha": 0.5}"#).unwrap();
        assert!(!config.multi_axis_enabled);
        assert!((config.hybrid_alpha - 0.5).abs() < f32::EPSILON);
        assert_eq!(config.display_top_n, 3);
    }
}
