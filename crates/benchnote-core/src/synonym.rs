//! Synonym dictionary and query expansion.
//!
//! Groups equivalent reagent/apparatus spellings under one canonical form
//! and expands a search query into lexical variants. The dictionary is
//! edited by management operations outside a retrieval; during retrieval a
//! request holds an `Arc` snapshot, so edits never interleave with
//! expansion.
//!
//! Expansion is approximate by design: candidate terms are matched as
//! substrings longest-first, overlapping matches lose to the first
//! accepted range, and a term occurring at several positions is expanded
//! only at the first position found. Equal-length candidates break ties
//! lexicographically by term, then by group canonical, so expansion is
//! deterministic regardless of dictionary file order.

use std::collections::HashMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

/// A group of interchangeable terms with one canonical representative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynonymGroup {
    /// Canonical (representative) form.
    pub canonical: String,
    /// Variant spellings.
    #[serde(default)]
    pub variants: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl SynonymGroup {
    /// Create a group stamped with the current time.
    pub fn new(canonical: impl Into<String>, variants: Vec<String>) -> Self {
        let now = Utc::now().to_rfc3339();
        Self {
            canonical: canonical.into(),
            variants,
            created_at: Some(now.clone()),
            updated_at: Some(now),
        }
    }

    /// Canonical plus all variants, canonical first.
    pub fn all_terms(&self) -> Vec<&str> {
        let mut terms = Vec::with_capacity(1 + self.variants.len());
        terms.push(self.canonical.as_str());
        terms.extend(self.variants.iter().map(String::as_str));
        terms
    }
}

/// YAML document shape: `groups: [{canonical, variants}, ...]`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct DictionaryFile {
    #[serde(default)]
    groups: Vec<SynonymGroup>,
}

/// Synonym dictionary with a term-to-group reverse index.
///
/// Invariant: a term belongs to at most one group. If the source document
/// registers a term twice, the first group wins on index rebuild.
#[derive(Debug, Clone, Default)]
pub struct SynonymDictionary {
    groups: Vec<SynonymGroup>,
    term_to_group: HashMap<String, usize>,
}

impl SynonymDictionary {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dictionary from groups.
    pub fn from_groups(groups: Vec<SynonymGroup>) -> Self {
        let mut dict = Self {
            groups,
            term_to_group: HashMap::new(),
        };
        dict.rebuild_index();
        dict
    }

    /// Parse a YAML dictionary document.
    pub fn from_yaml(content: &str) -> BenchResult<Self> {
        let file: DictionaryFile = serde_yaml::from_str(content)
            .map_err(|e| BenchError::parse(format!("invalid synonym dictionary: {e}")))?;
        Ok(Self::from_groups(file.groups))
    }

    /// Serialize to the YAML dictionary document format.
    pub fn to_yaml(&self) -> BenchResult<String> {
        serde_yaml::to_string(&DictionaryFile {
            groups: self.groups.clone(),
        })
        .map_err(|e| BenchError::Internal(format!("failed to serialize dictionary: {e}")))
    }

    fn rebuild_index(&mut self) {
        self.term_to_group.clear();
        for (i, group) in self.groups.iter().enumerate() {
            for term in group.all_terms() {
                self.term_to_group.entry(term.to_string()).or_insert(i);
            }
        }
    }

    /// All groups.
    pub fn groups(&self) -> &[SynonymGroup] {
        &self.groups
    }

    /// Look up a group by its canonical form.
    pub fn get_group(&self, canonical: &str) -> Option<&SynonymGroup> {
        self.groups.iter().find(|g| g.canonical == canonical)
    }

    /// Look up the group a term belongs to.
    pub fn find_group_for_term(&self, term: &str) -> Option<&SynonymGroup> {
        self.term_to_group.get(term).map(|&i| &self.groups[i])
    }

    /// Canonical form of a term; the term itself if unregistered.
    pub fn get_canonical<'a>(&'a self, term: &'a str) -> &'a str {
        self.find_group_for_term(term)
            .map(|g| g.canonical.as_str())
            .unwrap_or(term)
    }

    /// Expand a single term to its full synonym set.
    pub fn expand_term(&self, term: &str) -> Vec<String> {
        match self.find_group_for_term(term) {
            Some(group) => group.all_terms().iter().map(|t| t.to_string()).collect(),
            None => vec![term.to_string()],
        }
    }

    // --- management operations ---

    /// Add a new group. Fails if the canonical already names a group.
    pub fn add_group(&mut self, canonical: &str, variants: Vec<String>) -> BenchResult<()> {
        if self.get_group(canonical).is_some() {
            return Err(BenchError::Configuration(format!(
                "synonym group already exists: {canonical}"
            )));
        }
        self.groups.push(SynonymGroup::new(canonical, variants));
        self.rebuild_index();
        Ok(())
    }

    /// Update a group's canonical and/or variants.
    pub fn update_group(
        &mut self,
        canonical: &str,
        new_canonical: Option<String>,
        variants: Option<Vec<String>>,
    ) -> BenchResult<()> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.canonical == canonical)
            .ok_or_else(|| {
                BenchError::Configuration(format!("synonym group not found: {canonical}"))
            })?;
        if let Some(new_canonical) = new_canonical {
            group.canonical = new_canonical;
        }
        if let Some(variants) = variants {
            group.variants = variants;
        }
        group.updated_at = Some(Utc::now().to_rfc3339());
        self.rebuild_index();
        Ok(())
    }

    /// Delete a group by canonical.
    pub fn delete_group(&mut self, canonical: &str) -> BenchResult<()> {
        let before = self.groups.len();
        self.groups.retain(|g| g.canonical != canonical);
        if self.groups.len() == before {
            return Err(BenchError::Configuration(format!(
                "synonym group not found: {canonical}"
            )));
        }
        self.rebuild_index();
        Ok(())
    }

    /// Add a variant to an existing group. Adding an already-present
    /// variant is a no-op, not an error.
    pub fn add_variant(&mut self, canonical: &str, variant: &str) -> BenchResult<()> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.canonical == canonical)
            .ok_or_else(|| {
                BenchError::Configuration(format!("synonym group not found: {canonical}"))
            })?;
        if !group.variants.iter().any(|v| v == variant) {
            group.variants.push(variant.to_string());
            group.updated_at = Some(Utc::now().to_rfc3339());
            self.rebuild_index();
        }
        Ok(())
    }

    /// Remove a variant from a group.
    pub fn remove_variant(&mut self, canonical: &str, variant: &str) -> BenchResult<()> {
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.canonical == canonical)
            .ok_or_else(|| {
                BenchError::Configuration(format!("synonym group not found: {canonical}"))
            })?;
        if group.variants.iter().any(|v| v == variant) {
            group.variants.retain(|v| v != variant);
            group.updated_at = Some(Utc::now().to_rfc3339());
            self.rebuild_index();
        }
        Ok(())
    }

    // --- query expansion ---

    /// Expand a query into lexical variants. The original query is always
    /// first; the rest are deduplicated variant substitutions.
    pub fn expand_query(&self, query: &str) -> Vec<String> {
        let mut expanded = vec![query.to_string()];

        // Candidate terms longest-first; ties break lexicographically by
        // term, then by group canonical.
        let mut candidates: Vec<(&str, &SynonymGroup)> = self
            .groups
            .iter()
            .flat_map(|group| group.all_terms().into_iter().map(move |t| (t, group)))
            .collect();
        candidates.sort_by(|a, b| {
            b.0.len()
                .cmp(&a.0.len())
                .then_with(|| a.0.cmp(b.0))
                .then_with(|| a.1.canonical.cmp(&b.1.canonical))
        });

        let mut used_ranges: Vec<(usize, usize)> = Vec::new();
        // One accepted (term, group) per group, in acceptance order.
        let mut matched: Vec<(&str, &SynonymGroup)> = Vec::new();

        for (term, group) in candidates {
            if term.is_empty() {
                continue;
            }
            let Some(pos) = query.find(term) else {
                continue;
            };
            let end = pos + term.len();

            let overlaps = used_ranges
                .iter()
                .any(|&(start, stop)| !(end <= start || pos >= stop));
            if overlaps {
                continue;
            }
            used_ranges.push((pos, end));

            if !matched
                .iter()
                .any(|(_, g)| g.canonical == group.canonical)
            {
                matched.push((term, group));
            }
        }

        for (matched_term, group) in matched {
            for variant in group.all_terms() {
                if variant == matched_term {
                    continue;
                }
                let variant_query = query.replace(matched_term, variant);
                if !expanded.contains(&variant_query) {
                    expanded.push(variant_query);
                }
            }
        }

        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn water_dict() -> SynonymDictionary {
        SynonymDictionary::from_groups(vec![SynonymGroup::new(
            "純水",
            vec!["精製水".to_string(), "蒸留水".to_string()],
        )])
    }

    #[test]
    fn test_expand_query_includes_original_first() {
        let dict = water_dict();
        let expanded = dict.expand_query("純水を使う");

        assert_eq!(expanded[0], "純水を使う");
        assert!(expanded.contains(&"精製水を使う".to_string()));
        assert!(expanded.contains(&"蒸留水を使う".to_string()));
        assert_eq!(expanded.len(), 3);
    }

    #[test]
    fn test_expand_query_no_match_returns_original_only() {
        let dict = water_dict();
        assert_eq!(dict.expand_query("塩酸を使う"), vec!["塩酸を使う"]);
    }

    #[test]
    fn test_expand_query_matches_variant() {
        let dict = water_dict();
        let expanded = dict.expand_query("蒸留水で洗浄");

        assert!(expanded.contains(&"純水で洗浄".to_string()));
        assert!(expanded.contains(&"精製水で洗浄".to_string()));
    }

    #[test]
    fn test_longest_match_wins_over_embedded_term() {
        // "超純水" must not be expanded at the embedded "純水" span.
        let dict = SynonymDictionary::from_groups(vec![
            SynonymGroup::new("純水", vec!["精製水".to_string()]),
            SynonymGroup::new("超純水", vec!["ミリQ水".to_string()]),
        ]);
        let expanded = dict.expand_query("超純水で透析");

        assert!(expanded.contains(&"ミリQ水で透析".to_string()));
        assert!(!expanded.contains(&"超精製水で透析".to_string()));
    }

    #[test]
    fn test_equal_length_tie_break_is_deterministic() {
        let forward = SynonymDictionary::from_groups(vec![
            SynonymGroup::new("AA", vec!["XX".to_string()]),
            SynonymGroup::new("AB", vec!["YY".to_string()]),
        ]);
        let reversed = SynonymDictionary::from_groups(vec![
            SynonymGroup::new("AB", vec!["YY".to_string()]),
            SynonymGroup::new("AA", vec!["XX".to_string()]),
        ]);

        assert_eq!(forward.expand_query("AA AB"), reversed.expand_query("AA AB"));
    }

    #[test]
    fn test_term_belongs_to_first_registered_group() {
        let dict = SynonymDictionary::from_groups(vec![
            SynonymGroup::new("純水", vec!["水".to_string()]),
            SynonymGroup::new("飲料水", vec!["水".to_string()]),
        ]);
        assert_eq!(dict.find_group_for_term("水").unwrap().canonical, "純水");
    }

    #[test]
    fn test_management_operations() {
        let mut dict = water_dict();

        dict.add_variant("純水", "超純水").unwrap();
        assert_eq!(dict.find_group_for_term("超純水").unwrap().canonical, "純水");

        dict.remove_variant("純水", "蒸留水").unwrap();
        assert!(dict.find_group_for_term("蒸留水").is_none());

        assert!(dict.add_group("純水", vec![]).is_err());
        dict.add_group("抗体1", vec!["抗体A".to_string()]).unwrap();
        assert_eq!(dict.get_canonical("抗体A"), "抗体1");

        dict.delete_group("抗体1").unwrap();
        assert!(dict.find_group_for_term("抗体A").is_none());
    }

    #[test]
    fn test_yaml_roundtrip() {
        let dict = water_dict();
        let yaml = dict.to_yaml().unwrap();
        let reloaded = SynonymDictionary::from_yaml(&yaml).unwrap();

        assert_eq!(reloaded.groups().len(), 1);
        assert_eq!(reloaded.get_canonical("精製水"), "純水");
    }

    #[test]
    fn test_expand_term() {
        let dict = water_dict();
        let terms = dict.expand_term("精製水");
        assert_eq!(terms, vec!["純水", "精製水", "蒸留水"]);
        assert_eq!(dict.expand_term("塩酸"), vec!["塩酸"]);
    }
}
