//! Retrievable document types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Section a document was ingested from.
///
/// `Materials` and `Methods` exist for collections ingested under the older
/// three-section layout; current ingestion produces `MaterialsMethods` and
/// `Combined`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    MaterialsMethods,
    Combined,
    Materials,
    Methods,
}

/// An immutable retrievable unit: one experiment note (or note section).
///
/// The retrieval core never mutates documents; every stage wraps them with
/// a stage-local score instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteDocument {
    /// Full text content.
    pub content: String,
    /// Metadata payload. Carries at least `note_id` and `section_type` for
    /// documents produced by current ingestion.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl NoteDocument {
    /// Create a new document.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            metadata: HashMap::new(),
        }
    }

    /// Set a metadata string field.
    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata
            .insert(key.to_string(), serde_json::Value::String(value.into()));
        self
    }

    /// Get a metadata value as a string.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(|v| v.as_str())
    }

    /// Stable external note identifier, if present.
    pub fn note_id(&self) -> Option<&str> {
        self.get_string("note_id")
    }

    /// Section this document was ingested from, if recorded.
    pub fn section_type(&self) -> Option<SectionType> {
        self.metadata
            .get("section_type")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Identity key used for dedup and cross-axis merging:
    /// `note_id`, else `source`, else a content-prefix fingerprint.
    pub fn identity_key(&self) -> String {
        if let Some(id) = self.note_id() {
            return id.to_string();
        }
        if let Some(source) = self.get_string("source") {
            return source.to_string();
        }
        self.content.chars().take(50).collect()
    }
}

/// A document paired with a stage-local score.
///
/// Score scales differ per stage (BM25, relevance, RRF, rerank) and are
/// never comparable across stages without explicit normalization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub doc: NoteDocument,
    pub score: f32,
}

impl ScoredDocument {
    /// Create a new scored document.
    pub fn new(doc: NoteDocument, score: f32) -> Self {
        Self { doc, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_key_prefers_note_id() {
        let doc = NoteDocument::new("content")
            .with_meta("note_id", "N-001")
            .with_meta("source", "file.md");
        assert_eq!(doc.identity_key(), "N-001");
    }

    #[test]
    fn test_identity_key_falls_back_to_source() {
        let doc = NoteDocument::new("content").with_meta("source", "file.md");
        assert_eq!(doc.identity_key(), "file.md");
    }

    #[test]
    fn test_identity_key_content_fingerprint() {
        let doc = NoteDocument::new("abc".repeat(40));
        assert_eq!(doc.identity_key().chars().count(), 50);
    }

    #[test]
    fn test_section_type_roundtrip() {
        let doc = NoteDocument::new("x").with_meta("section_type", "materials_methods");
        assert_eq!(doc.section_type(), Some(SectionType::MaterialsMethods));
    }
}
