//! Text normalization against the master terminology dictionary.
//!
//! Materials text arrives with spelling variation (NaOH vs 水酸化ナトリウム,
//! full-width vs half-width characters, glued number/unit pairs). The
//! master dictionary maps every known variant to its canonical form so
//! query generation and keyword scoring see one spelling.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{BenchError, BenchResult};

static NUMBER_UNIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)([a-zA-Z%℃°μΩ])").unwrap());
static BULLET_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-・\s]*[①-⑨0-9.]*\s*").unwrap());
// `(\S+)\s*[（(]\1[）)]` needs a backreference the regex crate does not
// support; the token/content equality check happens in the replacement
// callback instead.
static PAREN_CANDIDATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([^\s（(）)]+)\s*[（(]([^\s（(）)]+)[）)]").unwrap());

/// One master-dictionary entry: canonical form plus variant spellings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub canonical: String,
    #[serde(default)]
    pub variants: Vec<String>,
}

/// Master terminology dictionary.
///
/// Replacement keys are applied longest-first so a short variant embedded
/// in a longer registered term never fires early.
#[derive(Debug, Clone, Default)]
pub struct MasterDictionary {
    replacements: Vec<(String, String)>,
    known_terms: HashSet<String>,
}

impl MasterDictionary {
    /// Create an empty dictionary. Normalization then only folds widths,
    /// separates units, and removes duplicate parentheses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from entries.
    pub fn from_entries(entries: Vec<DictionaryEntry>) -> Self {
        let mut replacements = Vec::new();
        let mut known_terms = HashSet::new();

        for entry in entries {
            known_terms.insert(entry.canonical.clone());
            replacements.push((entry.canonical.clone(), entry.canonical.clone()));
            for variant in entry.variants {
                known_terms.insert(variant.clone());
                replacements.push((variant, entry.canonical.clone()));
            }
        }

        // Longest key first; lexicographic among equal lengths keeps the
        // pass deterministic.
        replacements.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));

        Self {
            replacements,
            known_terms,
        }
    }

    /// Parse the YAML master dictionary (a top-level list of entries).
    pub fn from_yaml(content: &str) -> BenchResult<Self> {
        let entries: Vec<DictionaryEntry> = serde_yaml::from_str(content)
            .map_err(|e| BenchError::parse(format!("invalid master dictionary: {e}")))?;
        Ok(Self::from_entries(entries))
    }

    /// Terms known to the dictionary (canonicals and variants).
    pub fn known_terms(&self) -> &HashSet<String> {
        &self.known_terms
    }

    /// Normalize free text: width folding, number/unit separation,
    /// longest-first canonical replacement, duplicate-parenthesis removal.
    pub fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut text = fold_width(text);
        text = separate_number_and_unit(&text);

        for (key, canonical) in &self.replacements {
            if text.contains(key.as_str()) {
                text = text.replace(key.as_str(), canonical);
            }
        }

        remove_redundant_parentheses(&text)
    }

    /// Normalize a materials block, one material per line.
    ///
    /// Lines of the form `name: amount` (ASCII or full-width colon) keep
    /// the amount untouched and normalize only the name; bullet and
    /// numbering prefixes are stripped. A block that yields no parsed
    /// lines is returned as-is.
    pub fn normalize_materials(&self, raw: &str) -> String {
        let mut parts = Vec::new();

        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            match split_name_amount(line) {
                Some((name_part, amount_part)) => {
                    let raw_name = BULLET_PREFIX.replace(name_part, "");
                    let norm_name = self.normalize(raw_name.trim());
                    parts.push(format!("- {}: {}", norm_name, amount_part.trim()));
                }
                None => {
                    let clean = BULLET_PREFIX.replace(line, "");
                    parts.push(self.normalize(clean.trim()));
                }
            }
        }

        if parts.is_empty() {
            raw.to_string()
        } else {
            parts.join("\n")
        }
    }
}

/// Split a materials line on the first ASCII or full-width colon.
fn split_name_amount(line: &str) -> Option<(&str, &str)> {
    let idx = line.find([':', '：'])?;
    let sep_len = line[idx..].chars().next().map(char::len_utf8)?;
    Some((&line[..idx], &line[idx + sep_len..]))
}

/// Fold full-width ASCII and ideographic space to their half-width forms.
pub fn fold_width(text: &str) -> String {
    text.chars()
        .map(|ch| match ch {
            '\u{FF01}'..='\u{FF5E}' => {
                char::from_u32(ch as u32 - 0xFEE0).unwrap_or(ch)
            }
            '\u{3000}' => ' ',
            _ => ch,
        })
        .collect()
}

/// `100rpm` -> `100 rpm`, `50mL` -> `50 mL`.
pub fn separate_number_and_unit(text: &str) -> String {
    NUMBER_UNIT.replace_all(text, "$1 $2").into_owned()
}

/// `TMP(TMP)` -> `TMP`: drop a parenthesized repeat of the token it
/// follows.
pub fn remove_redundant_parentheses(text: &str) -> String {
    PAREN_CANDIDATE
        .replace_all(text, |caps: &regex::Captures| {
            let token = &caps[1];
            let inner = &caps[2];
            if token.ends_with(inner) {
                token.to_string()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}
