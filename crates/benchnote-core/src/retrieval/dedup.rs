//! Identity-based result deduplication for presentation.
//!
//! Section-split ingestion can surface the same note several times in one
//! ranking. Only the first (highest-ranked) occurrence of each identity is
//! kept, and a skipped duplicate never consumes a display slot.

use std::collections::HashSet;

use crate::types::NoteDocument;

/// Deduplication policy.
#[derive(Debug, Clone, Copy)]
pub struct DedupPolicy {
    /// Maximum number of unique documents to return.
    pub display_limit: usize,
    /// Maximum number of unique documents to examine. Larger than
    /// `display_limit` so duplicate skips cannot starve the final cut.
    pub scan_cap: usize,
}

impl DedupPolicy {
    /// Create a policy.
    pub fn new(display_limit: usize, scan_cap: usize) -> Self {
        Self {
            display_limit,
            scan_cap,
        }
    }

    /// Select up to `display_limit` unique documents from a ranked list.
    ///
    /// Input must be sorted descending; iteration stops after `scan_cap`
    /// unique documents have been seen.
    pub fn select<I>(&self, ranked: I) -> Vec<(NoteDocument, f32, String)>
    where
        I: IntoIterator<Item = (NoteDocument, f32, String)>,
    {
        let mut selected = Vec::with_capacity(self.display_limit);
        let mut seen: HashSet<String> = HashSet::new();
        let mut unique_count = 0usize;

        for (doc, score, identity) in ranked {
            if seen.contains(&identity) {
                continue;
            }
            seen.insert(identity.clone());
            unique_count += 1;

            if selected.len() < self.display_limit {
                selected.push((doc, score, identity));
            }
            if unique_count >= self.scan_cap {
                break;
            }
        }

        selected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, score: f32) -> (NoteDocument, f32, String) {
        (
            NoteDocument::new(format!("note {id}")).with_meta("note_id", id),
            score,
            id.to_string(),
        )
    }

    #[test]
    fn test_duplicate_does_not_consume_slot() {
        let policy = DedupPolicy::new(3, 20);
        let ranked = vec![
            entry("a", 0.9),
            entry("a", 0.8), // duplicate of the rank-1 note
            entry("b", 0.7),
            entry("c", 0.6),
        ];

        let selected = policy.select(ranked);
        let ids: Vec<&str> = selected.iter().map(|(_, _, id)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
        // The kept occurrence is the higher-ranked one.
        assert!((selected[0].1 - 0.9).abs() < f32::EPSILON);
    }

    #[test]
    fn test_display_limit_bounds_output() {
        let policy = DedupPolicy::new(2, 20);
        let ranked = vec![entry("a", 0.9), entry("b", 0.8), entry("c", 0.7)];
        assert_eq!(policy.select(ranked).len(), 2);
    }

    #[test]
    fn test_scan_cap_stops_iteration() {
        let policy = DedupPolicy::new(10, 3);
        let ranked = (0..20).map(|i| entry(&format!("n{i}"), 1.0 - i as f32 * 0.01));
        assert_eq!(policy.select(ranked).len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let policy = DedupPolicy::new(3, 20);
        assert!(policy.select(Vec::new()).is_empty());
    }
}
