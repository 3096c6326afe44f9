//! Hybrid score blending for one query against one collection.
//!
//! BM25 scores and cosine-derived relevance scores live on incomparable
//! scales, so each result set is min-max normalized independently before
//! the weighted combination. A document present in only one set gets 0 for
//! the missing side, which biases the blend toward documents both engines
//! agree on.

use std::collections::HashMap;

use ordered_float::OrderedFloat;

use crate::types::{NoteDocument, ScoredDocument};

#[derive(Debug)]
struct BlendSlot {
    doc: NoteDocument,
    semantic: f32,
    keyword: f32,
}

/// Blend semantic and keyword result sets with semantic weight `alpha`.
///
/// Returns the merged set sorted descending by
/// `alpha * semantic_norm + (1 - alpha) * keyword_norm`, keyed by document
/// identity. With `alpha = 1.0` the order reproduces the semantic-only
/// order; with `alpha = 0.0`, the keyword-only order.
pub fn blend(
    semantic: &[ScoredDocument],
    keyword: &[ScoredDocument],
    alpha: f32,
) -> Vec<ScoredDocument> {
    let mut slots: HashMap<String, BlendSlot> = HashMap::new();

    for (scored, normalized) in semantic.iter().zip(min_max_normalize(semantic)) {
        let slot = slots
            .entry(scored.doc.identity_key())
            .or_insert_with(|| BlendSlot {
                doc: scored.doc.clone(),
                semantic: 0.0,
                keyword: 0.0,
            });
        slot.semantic = normalized;
    }

    for (scored, normalized) in keyword.iter().zip(min_max_normalize(keyword)) {
        let slot = slots
            .entry(scored.doc.identity_key())
            .or_insert_with(|| BlendSlot {
                doc: scored.doc.clone(),
                semantic: 0.0,
                keyword: 0.0,
            });
        slot.keyword = normalized;
    }

    let mut blended: Vec<ScoredDocument> = slots
        .into_values()
        .map(|slot| {
            let score = alpha * slot.semantic + (1.0 - alpha) * slot.keyword;
            ScoredDocument::new(slot.doc, score)
        })
        .collect();

    blended.sort_by(|a, b| OrderedFloat(b.score).cmp(&OrderedFloat(a.score)));
    blended
}

/// Min-max normalize a result set's scores to [0, 1].
///
/// A set whose scores are all equal normalizes to 0.5 everywhere: there is
/// no ordering information to preserve, and 0.5 keeps the source from
/// either dominating or vanishing in the blend.
fn min_max_normalize(results: &[ScoredDocument]) -> Vec<f32> {
    let Some(first) = results.first() else {
        return Vec::new();
    };

    let mut min = first.score;
    let mut max = first.score;
    for scored in results {
        min = min.min(scored.score);
        max = max.max(scored.score);
    }

    let range = max - min;
    results
        .iter()
        .map(|scored| {
            if range > 0.0 {
                (scored.score - min) / range
            } else {
                0.5
            }
        })
        .collect()
}
