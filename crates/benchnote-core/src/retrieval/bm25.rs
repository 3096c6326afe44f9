//! BM25 keyword scoring over a document corpus.
//!
//! The tokenizer handles mixed Latin/CJK lab-note text: ASCII alphanumeric
//! runs become word tokens, and the non-Latin residue is emitted as
//! overlapping character 2-grams plus 1-grams so that scripts without
//! whitespace word boundaries still get partial-match scoring. The n-gram
//! count grows quadratically with CJK run length, so callers bound document
//! and query length.

use std::collections::HashMap;

/// BM25 scorer with tunable term-saturation and length-normalization
/// parameters.
#[derive(Debug, Clone)]
pub struct Bm25 {
    /// Term-frequency saturation.
    pub k1: f32,
    /// Document-length normalization strength.
    pub b: f32,
}

impl Default for Bm25 {
    fn default() -> Self {
        Self { k1: 1.5, b: 0.75 }
    }
}

impl Bm25 {
    /// Score every corpus document against the query.
    ///
    /// Returns one `(doc_index, score)` per corpus document, in corpus
    /// order; callers sort descending and take their top-k. Documents with
    /// no matching token score 0.
    pub fn score(&self, corpus: &[String], query: &str) -> Vec<(usize, f32)> {
        if corpus.is_empty() {
            return Vec::new();
        }

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() {
            return corpus.iter().enumerate().map(|(i, _)| (i, 0.0)).collect();
        }

        let doc_tokens: Vec<Vec<String>> = corpus.iter().map(|doc| tokenize(doc)).collect();
        let total_len: usize = doc_tokens.iter().map(Vec::len).sum();
        // Guarded so token-less corpora cannot divide by zero.
        let avgdl = if total_len == 0 {
            1.0
        } else {
            total_len as f32 / corpus.len() as f32
        };

        // Document frequency by case-insensitive substring containment, not
        // token-boundary matching. Short tokens embedded in longer words do
        // count; CJK partial matching relies on exactly this.
        let lowered: Vec<String> = corpus.iter().map(|doc| doc.to_lowercase()).collect();
        let n = corpus.len() as f32;
        let mut idf: HashMap<&str, f32> = HashMap::new();
        for token in &query_tokens {
            if idf.contains_key(token.as_str()) {
                continue;
            }
            let df = lowered
                .iter()
                .filter(|doc| doc.contains(token.as_str()))
                .count() as f32;
            idf.insert(token.as_str(), ((n - df + 0.5) / (df + 0.5) + 1.0).ln());
        }

        doc_tokens
            .iter()
            .enumerate()
            .map(|(i, tokens)| {
                let doc_len = tokens.len() as f32;
                let mut term_freq: HashMap<&str, f32> = HashMap::new();
                for token in tokens {
                    *term_freq.entry(token.as_str()).or_insert(0.0) += 1.0;
                }

                let mut score = 0.0;
                for token in &query_tokens {
                    if let Some(&tf) = term_freq.get(token.as_str()) {
                        let numerator = tf * (self.k1 + 1.0);
                        let denominator =
                            tf + self.k1 * (1.0 - self.b + self.b * doc_len / avgdl);
                        score += idf.get(token.as_str()).copied().unwrap_or(0.0) * numerator
                            / denominator;
                    }
                }
                (i, score)
            })
            .collect()
    }
}

/// Tokenize mixed Latin/CJK text.
///
/// Lowercases, extracts ASCII alphanumeric runs as word tokens, then strips
/// ASCII letters, digits, whitespace, and common punctuation to isolate the
/// non-Latin residue, which is emitted as all overlapping 2-grams plus all
/// single characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let text = text.to_lowercase();
    let mut tokens = Vec::new();

    let mut word = String::new();
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            word.push(ch);
        } else if !word.is_empty() {
            tokens.push(std::mem::take(&mut word));
        }
    }
    if !word.is_empty() {
        tokens.push(word);
    }

    let residual: Vec<char> = text
        .chars()
        .filter(|ch| {
            !ch.is_ascii_alphanumeric()
                && !ch.is_whitespace()
                && !".,!?:;()[]{}-_".contains(*ch)
        })
        .collect();

    for window in residual.windows(2) {
        tokens.push(window.iter().collect());
    }
    for ch in &residual {
        tokens.push(ch.to_string());
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_ascii_words() {
        let tokens = tokenize("NaOH 10g titration");
        assert!(tokens.contains(&"naoh".to_string()));
        assert!(tokens.contains(&"10g".to_string()));
        assert!(tokens.contains(&"titration".to_string()));
    }

    #[test]
    fn test_tokenize_cjk_bigrams_and_unigrams() {
        let tokens = tokenize("純水を使用");
        assert!(tokens.contains(&"純水".to_string()));
        assert!(tokens.contains(&"水を".to_string()));
        assert!(tokens.contains(&"純".to_string()));
        assert!(tokens.contains(&"用".to_string()));
    }

    #[test]
    fn test_tokenize_mixed_text() {
        let tokens = tokenize("pH7.4の緩衝液");
        assert!(tokens.contains(&"ph7".to_string()));
        assert!(tokens.contains(&"4".to_string()));
        assert!(tokens.contains(&"緩衝".to_string()));
    }

    #[test]
    fn test_single_doc_containing_term_scores_positive() {
        let bm25 = Bm25::default();
        let corpus = vec!["the titration endpoint was sharp".to_string()];
        let scores = bm25.score(&corpus, "titration");

        assert_eq!(scores.len(), 1);
        assert!(scores[0].1.is_finite());
        assert!(scores[0].1 > 0.0);
    }

    #[test]
    fn test_absent_term_scores_all_zero() {
        let bm25 = Bm25::default();
        let corpus = vec![
            "sodium hydroxide solution".to_string(),
            "buffer preparation".to_string(),
        ];
        let scores = bm25.score(&corpus, "zzz");

        assert!(scores.iter().all(|&(_, s)| s == 0.0));
    }

    #[test]
    fn test_empty_corpus() {
        let bm25 = Bm25::default();
        assert!(bm25.score(&[], "anything").is_empty());
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let bm25 = Bm25::default();
        let corpus = vec!["content".to_string()];
        let scores = bm25.score(&corpus, "   ");
        assert_eq!(scores, vec![(0, 0.0)]);
    }

    #[test]
    fn test_matching_doc_ranks_above_non_matching() {
        let bm25 = Bm25::default();
        let corpus = vec![
            "水酸化ナトリウムを10g秤量した".to_string(),
            "塩酸を希釈した".to_string(),
            "緩衝液を調製した".to_string(),
        ];
        let mut scores = bm25.score(&corpus, "水酸化ナトリウム");
        scores.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());

        assert_eq!(scores[0].0, 0);
        assert!(scores[0].1 > scores[1].1);
    }

    #[test]
    fn test_repeated_term_saturates() {
        let bm25 = Bm25::default();
        let corpus = vec![
            "acid acid acid acid".to_string(),
            "acid base".to_string(),
        ];
        let scores = bm25.score(&corpus, "acid");

        // More occurrences score higher, but bounded by saturation.
        assert!(scores[0].1 > scores[1].1);
        assert!(scores[0].1 < scores[1].1 * (bm25.k1 + 1.0) * 2.0);
    }
}
