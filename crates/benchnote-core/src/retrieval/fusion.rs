//! Cross-axis score fusion.
//!
//! Merges the material, method, and combined axis rankings into a single
//! ranking keyed by document identity. Supports weighted Reciprocal Rank
//! Fusion (robust to incomparable score scales) and weighted linear
//! combination (requires comparable per-axis scores).
//!
//! RRF reference: Cormack, Clarke & Buettcher (2009)

use std::collections::HashMap;

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::types::{Axis, NoteDocument, ScoredDocument};

/// Default RRF K constant.
pub const DEFAULT_RRF_K: f32 = 60.0;

/// Per-axis fusion weights.
///
/// Caller-supplied; the weights need not sum to 1.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AxisWeights {
    pub material: f32,
    pub method: f32,
    pub combined: f32,
}

impl Default for AxisWeights {
    fn default() -> Self {
        Self {
            material: 0.3,
            method: 0.4,
            combined: 0.3,
        }
    }
}

impl AxisWeights {
    /// Get the weight for an axis.
    pub fn get(&self, axis: Axis) -> f32 {
        match axis {
            Axis::Material => self.material,
            Axis::Method => self.method,
            Axis::Combined => self.combined,
        }
    }
}

/// Score fusion method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FusionMethod {
    /// Reciprocal Rank Fusion: `sum(weight / (K + rank))` over axes where
    /// the document appeared.
    #[default]
    Rrf,
    /// Weighted linear combination of raw axis scores. Assumes each axis's
    /// scores are already comparable; no re-normalization happens here.
    Linear,
}

/// Per-document aggregate built while merging the axis rankings.
///
/// Holds up to one document reference and one (rank, score) pair per axis.
/// Built fresh per request and discarded after the final ranking.
#[derive(Debug, Clone, Default)]
struct FusionEntry {
    docs: [Option<NoteDocument>; 3],
    scores: [Option<f32>; 3],
    ranks: [Option<usize>; 3],
}

impl FusionEntry {
    fn record(&mut self, axis: Axis, doc: &NoteDocument, score: f32, rank: usize) {
        let i = axis as usize;
        self.docs[i] = Some(doc.clone());
        self.scores[i] = Some(score);
        self.ranks[i] = Some(rank);
    }

    /// The document rendered downstream: combined-axis copy preferred as
    /// the most contextually complete, else method, else material.
    fn best_doc(self) -> Option<NoteDocument> {
        let [material, method, combined] = self.docs;
        combined.or(method).or(material)
    }
}

/// A fused result: document, fused score, identity key.
#[derive(Debug, Clone)]
pub struct FusedDocument {
    pub doc: NoteDocument,
    pub score: f32,
    pub identity: String,
}

/// Fusion engine merging three axis-specific rankings into one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusionEngine {
    /// Fusion method.
    pub method: FusionMethod,
    /// Per-axis weights.
    pub weights: AxisWeights,
    /// K parameter for RRF. Higher K flattens the rank discount.
    pub rrf_k: f32,
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self {
            method: FusionMethod::Rrf,
            weights: AxisWeights::default(),
            rrf_k: DEFAULT_RRF_K,
        }
    }
}

impl FusionEngine {
    /// Create a fusion engine.
    pub fn new(method: FusionMethod, weights: AxisWeights, rrf_k: f32) -> Self {
        Self {
            method,
            weights,
            rrf_k,
        }
    }

    /// Fuse the three axis rankings into one ranking sorted descending.
    ///
    /// Each input list must be sorted descending by its own score; ranks
    /// are taken from list positions (1-indexed). Ties in the fused score
    /// retain merge-insertion order (material, method, combined).
    pub fn fuse(
        &self,
        material: &[ScoredDocument],
        method: &[ScoredDocument],
        combined: &[ScoredDocument],
    ) -> Vec<FusedDocument> {
        let mut entries: HashMap<String, FusionEntry> = HashMap::new();
        let mut insertion_order: Vec<String> = Vec::new();

        for (axis, results) in [
            (Axis::Material, material),
            (Axis::Method, method),
            (Axis::Combined, combined),
        ] {
            for (rank0, scored) in results.iter().enumerate() {
                let identity = scored.doc.identity_key();
                if !entries.contains_key(&identity) {
                    insertion_order.push(identity.clone());
                }
                entries
                    .entry(identity)
                    .or_default()
                    .record(axis, &scored.doc, scored.score, rank0 + 1);
            }
        }

        let mut fused: Vec<FusedDocument> = insertion_order
            .into_iter()
            .filter_map(|identity| {
                let entry = entries.remove(&identity)?;
                let score = match self.method {
                    FusionMethod::Rrf => self.rrf_score(&entry),
                    FusionMethod::Linear => self.linear_score(&entry),
                };
                entry.best_doc().map(|doc| FusedDocument {
                    doc,
                    score,
                    identity,
                })
            })
            .collect();

        // Stable sort keeps insertion order for equal scores.
        fused.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
        fused
    }

    fn rrf_score(&self, entry: &FusionEntry) -> f32 {
        Axis::ALL
            .iter()
            .filter_map(|&axis| {
                entry.ranks[axis as usize]
                    .map(|rank| self.weights.get(axis) / (self.rrf_k + rank as f32))
            })
            .sum()
    }

    fn linear_score(&self, entry: &FusionEntry) -> f32 {
        Axis::ALL
            .iter()
            .filter_map(|&axis| {
                entry.scores[axis as usize].map(|score| self.weights.get(axis) * score)
            })
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str) -> NoteDocument {
        NoteDocument::new(format!("note {id}")).with_meta("note_id", id)
    }

    fn scored(id: &str, score: f32) -> ScoredDocument {
        ScoredDocument::new(doc(id), score)
    }

    #[test]
    fn test_rrf_single_axis_exact_value() {
        let engine = FusionEngine::default();
        let fused = engine.fuse(&[scored("a", 9.9)], &[], &[]);

        assert_eq!(fused.len(), 1);
        // material weight 0.3, rank 1, K 60
        assert!((fused[0].score - 0.3 / 61.0).abs() < 1e-7);
    }

    #[test]
    fn test_rrf_all_axes_beats_single_axis() {
        let engine = FusionEngine::default();
        let fused = engine.fuse(
            &[scored("a", 1.0), scored("b", 0.5)],
            &[scored("a", 1.0)],
            &[scored("a", 1.0)],
        );

        assert_eq!(fused[0].identity, "a");
        let expected = (0.3 + 0.4 + 0.3) / 61.0;
        assert!((fused[0].score - expected).abs() < 1e-6);
        // b appears only in material at rank 2
        assert!((fused[1].score - 0.3 / 62.0).abs() < 1e-6);
        assert!(fused[0].score > fused[1].score);
    }

    #[test]
    fn test_linear_missing_axis_omits_term() {
        let engine = FusionEngine::new(FusionMethod::Linear, AxisWeights::default(), DEFAULT_RRF_K);
        let fused = engine.fuse(&[scored("a", 0.8)], &[], &[scored("a", 0.6)]);

        // 0.3*0.8 + 0.3*0.6, no zero-score term for the missing method axis
        assert!((fused[0].score - (0.3 * 0.8 + 0.3 * 0.6)).abs() < 1e-6);
    }

    #[test]
    fn test_combined_doc_preferred_for_rendering() {
        let engine = FusionEngine::default();
        let material_doc = ScoredDocument::new(
            NoteDocument::new("materials only").with_meta("note_id", "a"),
            1.0,
        );
        let combined_doc = ScoredDocument::new(
            NoteDocument::new("full note").with_meta("note_id", "a"),
            1.0,
        );
        let fused = engine.fuse(&[material_doc], &[], &[combined_doc]);

        assert_eq!(fused[0].doc.content, "full note");
    }

    #[test]
    fn test_tie_break_keeps_axis_insertion_order() {
        let weights = AxisWeights {
            material: 0.5,
            method: 0.5,
            combined: 0.0,
        };
        let engine = FusionEngine::new(FusionMethod::Rrf, weights, DEFAULT_RRF_K);
        // a from material and b from method both land at rank 1 with equal
        // weight; material is merged first.
        let fused = engine.fuse(&[scored("a", 1.0)], &[scored("b", 1.0)], &[]);

        assert_eq!(fused[0].identity, "a");
        assert_eq!(fused[1].identity, "b");
    }

    #[test]
    fn test_empty_inputs() {
        let engine = FusionEngine::default();
        assert!(engine.fuse(&[], &[], &[]).is_empty());
    }
}
