//! Offline relevance evaluation.
//!
//! Computes ranking metrics (nDCG@k, precision@k, recall@k, MRR) for a
//! retrieved ranking against graded ground truth. Pipeline runs in
//! evaluation mode feed their top-10 cut here; evaluation has no side
//! effects, so batches can run concurrently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One relevance judgment: note id plus graded relevance (0 = irrelevant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroundTruth {
    pub note_id: String,
    pub relevance: f64,
}

/// A stored evaluation test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestCase {
    pub id: String,
    pub name: String,
    /// Query fields: purpose, materials, methods.
    pub query: HashMap<String, String>,
    pub ground_truth: Vec<GroundTruth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Metrics for one evaluated ranking.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub ndcg_10: f64,
    pub precision_3: f64,
    pub precision_5: f64,
    pub precision_10: f64,
    pub recall_10: f64,
    pub mrr: f64,
}

/// Relevance evaluator.
///
/// Constructed explicitly and passed by reference; holds no global state.
#[derive(Debug, Clone, Default)]
pub struct Evaluator;

impl Evaluator {
    /// Create an evaluator.
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a ranked list of note ids against ground truth.
    pub fn evaluate(&self, ranking: &[String], ground_truth: &[GroundTruth]) -> EvaluationMetrics {
        let relevance: HashMap<&str, f64> = ground_truth
            .iter()
            .map(|gt| (gt.note_id.as_str(), gt.relevance))
            .collect();

        EvaluationMetrics {
            ndcg_10: ndcg_at(ranking, &relevance, 10),
            precision_3: precision_at(ranking, &relevance, 3),
            precision_5: precision_at(ranking, &relevance, 5),
            precision_10: precision_at(ranking, &relevance, 10),
            recall_10: recall_at(ranking, &relevance, 10),
            mrr: mrr(ranking, &relevance),
        }
    }
}

/// Normalized Discounted Cumulative Gain at `k`.
pub fn ndcg_at(ranking: &[String], relevance: &HashMap<&str, f64>, k: usize) -> f64 {
    let dcg: f64 = ranking
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, id)| {
            let gain = relevance.get(id.as_str()).copied().unwrap_or(0.0);
            gain / ((i + 2) as f64).log2()
        })
        .sum();

    let mut ideal: Vec<f64> = relevance.values().copied().filter(|&r| r > 0.0).collect();
    ideal.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    let idcg: f64 = ideal
        .iter()
        .take(k)
        .enumerate()
        .map(|(i, gain)| gain / ((i + 2) as f64).log2())
        .sum();

    if idcg > 0.0 {
        dcg / idcg
    } else {
        0.0
    }
}

/// Fraction of the top `k` that is relevant.
pub fn precision_at(ranking: &[String], relevance: &HashMap<&str, f64>, k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }
    let hits = ranking
        .iter()
        .take(k)
        .filter(|id| relevance.get(id.as_str()).copied().unwrap_or(0.0) > 0.0)
        .count();
    hits as f64 / k as f64
}

/// Fraction of all relevant notes found in the top `k`.
pub fn recall_at(ranking: &[String], relevance: &HashMap<&str, f64>, k: usize) -> f64 {
    let total_relevant = relevance.values().filter(|&&r| r > 0.0).count();
    if total_relevant == 0 {
        return 0.0;
    }
    let hits = ranking
        .iter()
        .take(k)
        .filter(|id| relevance.get(id.as_str()).copied().unwrap_or(0.0) > 0.0)
        .count();
    hits as f64 / total_relevant as f64
}

/// Reciprocal rank of the first relevant note; 0 when none appears.
pub fn mrr(ranking: &[String], relevance: &HashMap<&str, f64>) -> f64 {
    ranking
        .iter()
        .position(|id| relevance.get(id.as_str()).copied().unwrap_or(0.0) > 0.0)
        .map(|i| 1.0 / (i + 1) as f64)
        .unwrap_or(0.0)
}
