//! Core types shared across the retrieval pipeline.

mod document;

pub use document::{NoteDocument, ScoredDocument, SectionType};

use serde::{Deserialize, Serialize};

/// One of the three retrieval perspectives used in multi-axis mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Material,
    Method,
    Combined,
}

impl Axis {
    /// Canonical axis iteration order. Fusion merge-insertion order and
    /// therefore tie-break order depends on this.
    pub const ALL: [Axis; 3] = [Axis::Material, Axis::Method, Axis::Combined];

    /// Stable string form, matching the configuration keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Material => "material",
            Axis::Method => "method",
            Axis::Combined => "combined",
        }
    }
}

/// The per-axis queries produced by the query planner.
///
/// In single-query mode only `combined` is populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AxisQueries {
    pub material: String,
    pub method: String,
    pub combined: String,
}

impl AxisQueries {
    /// Get the query for an axis.
    pub fn get(&self, axis: Axis) -> &str {
        match axis {
            Axis::Material => &self.material,
            Axis::Method => &self.method,
            Axis::Combined => &self.combined,
        }
    }
}

/// Focus classification of the user's emphasis instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Focus {
    Materials,
    Methods,
    Both,
    #[default]
    None,
}

impl Focus {
    /// Whether the focus instruction applies to the material axis.
    pub fn applies_to_materials(&self) -> bool {
        matches!(self, Focus::Materials | Focus::Both)
    }

    /// Whether the focus instruction applies to the method axis.
    pub fn applies_to_methods(&self) -> bool {
        matches!(self, Focus::Methods | Focus::Both)
    }
}

/// A search request as received from the caller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchInput {
    /// Stated purpose of the new experiment.
    #[serde(default)]
    pub purpose: String,
    /// Raw materials section, one material per line.
    #[serde(default)]
    pub materials: String,
    /// Raw methods section.
    #[serde(default)]
    pub methods: String,
    /// Optional user emphasis instruction.
    #[serde(default)]
    pub instruction: String,
    /// Evaluation mode: skip the comparison step, return a larger cut.
    #[serde(default)]
    pub evaluation_mode: bool,
}

/// The final result of a pipeline run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchOutcome {
    /// Presentation strings, one per retrieved note:
    /// `【実験ノートID: <id>】\n<content>`.
    pub documents: Vec<String>,
    /// Normalized materials text (diagnostics).
    pub normalized_materials: String,
    /// The search query used in single-query mode, or the combined-axis
    /// query in multi-axis mode (diagnostics).
    pub search_query: String,
    /// Per-axis queries when multi-axis search ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub axis_queries: Option<AxisQueries>,
    /// Focus classification when multi-axis search ran.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus_classification: Option<Focus>,
    /// Generated comparison message. Absent in evaluation mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comparison: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_order() {
        assert_eq!(Axis::ALL[0], Axis::Material);
        assert_eq!(Axis::ALL[2], Axis::Combined);
        assert_eq!(Axis::Method.as_str(), "method");
    }

    #[test]
    fn test_focus_applicability() {
        assert!(Focus::Both.applies_to_materials());
        assert!(Focus::Both.applies_to_methods());
        assert!(Focus::Materials.applies_to_materials());
        assert!(!Focus::Materials.applies_to_methods());
        assert!(!Focus::None.applies_to_materials());
    }
}
