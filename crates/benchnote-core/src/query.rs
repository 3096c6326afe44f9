//! Query planning: LLM-backed query generation and focus classification.
//!
//! Every LLM response goes through defensive JSON extraction, and every
//! parse has an explicit fallback branch carried in [`ParseOutcome`] - a
//! malformed response degrades to a deterministic query, never to an
//! aborted request.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::prompts::{render, PromptKind, PromptRegistry};
use crate::traits::Llm;
use crate::types::{AxisQueries, Focus};

/// Instruction values treated as "no focus" without an LLM call.
const NONE_PHRASES: [&str; 2] = ["特になし", "なし"];

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap());
static BRACE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").unwrap());

/// Outcome of parsing one LLM response.
///
/// `Fallback` makes the degraded path a visible branch: the caller decides
/// the substitute value, and tests exercise the branch directly.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    Fallback(String),
}

/// Extract the JSON portion of an LLM response: the first fenced code
/// block if present, else the first `{...}` span, else the text as-is.
pub fn extract_json(text: &str) -> &str {
    if let Some(caps) = FENCED_BLOCK.captures(text) {
        return caps.get(1).map(|m| m.as_str().trim()).unwrap_or(text);
    }
    if let Some(m) = BRACE_SPAN.find(text) {
        return m.as_str();
    }
    text
}

#[derive(Deserialize)]
struct QueryListResponse {
    #[serde(default)]
    queries: Vec<String>,
}

#[derive(Deserialize)]
struct SingleQueryResponse {
    query: Option<String>,
}

#[derive(Deserialize)]
struct ClassificationResponse {
    classification: Option<String>,
    #[serde(default)]
    reason: String,
}

/// Parse a `{"queries": [...]}` response. An empty list is a fallback,
/// not a valid result.
pub fn parse_query_list(text: &str) -> ParseOutcome<Vec<String>> {
    match serde_json::from_str::<QueryListResponse>(extract_json(text)) {
        Ok(response) if !response.queries.is_empty() => ParseOutcome::Parsed(response.queries),
        Ok(_) => ParseOutcome::Fallback("empty queries list".to_string()),
        Err(e) => ParseOutcome::Fallback(format!("query list parse error: {e}")),
    }
}

/// Parse a `{"query": "..."}` response.
pub fn parse_single_query(text: &str) -> ParseOutcome<String> {
    match serde_json::from_str::<SingleQueryResponse>(extract_json(text)) {
        Ok(SingleQueryResponse { query: Some(query) }) if !query.trim().is_empty() => {
            ParseOutcome::Parsed(query)
        }
        Ok(_) => ParseOutcome::Fallback("missing query field".to_string()),
        Err(e) => ParseOutcome::Fallback(format!("query parse error: {e}")),
    }
}

/// Parse a `{"classification": ..., "reason": ...}` response. Values
/// outside the enum fall back; the caller substitutes `Focus::Both`.
pub fn parse_classification(text: &str) -> ParseOutcome<(Focus, String)> {
    match serde_json::from_str::<ClassificationResponse>(extract_json(text)) {
        Ok(response) => {
            let focus = match response.classification.as_deref() {
                Some("materials") => Focus::Materials,
                Some("methods") => Focus::Methods,
                Some("both") => Focus::Both,
                Some("none") => Focus::None,
                other => {
                    return ParseOutcome::Fallback(format!(
                        "unrecognized classification: {other:?}"
                    ))
                }
            };
            ParseOutcome::Parsed((focus, response.reason))
        }
        Err(e) => ParseOutcome::Fallback(format!("classification parse error: {e}")),
    }
}

/// Plans search queries from normalized input.
pub struct QueryPlanner {
    llm: Arc<dyn Llm>,
    prompts: PromptRegistry,
}

impl QueryPlanner {
    /// Create a planner over the search LLM.
    pub fn new(llm: Arc<dyn Llm>, prompts: PromptRegistry) -> Self {
        Self { llm, prompts }
    }

    /// Generate the combined search query (single-query mode and the
    /// combined axis share this prompt, so custom overrides apply to
    /// both). Falls back to the literal concatenation of the inputs.
    pub async fn combined_query(
        &self,
        purpose: &str,
        normalized_materials: &str,
        methods: &str,
        instruction: &str,
    ) -> String {
        let prompt = render(
            self.prompts.resolve(PromptKind::CombinedQueryGeneration),
            &[
                ("input_purpose", purpose),
                ("normalized_materials", normalized_materials),
                ("input_methods", methods),
                ("user_focus_instruction", instruction),
            ],
        );

        let outcome = match self.llm.invoke(&prompt).await {
            Ok(response) => parse_query_list(&response),
            Err(e) => ParseOutcome::Fallback(format!("llm error: {e}")),
        };

        match outcome {
            ParseOutcome::Parsed(queries) => {
                debug!(count = queries.len(), "combined query generated");
                queries.join(" ")
            }
            ParseOutcome::Fallback(reason) => {
                warn!(%reason, "combined query generation fell back to raw input");
                format!("{purpose} {normalized_materials} {instruction}")
            }
        }
    }

    /// Classify the focus instruction. Empty or recognized "none" phrases
    /// short-circuit without an LLM call; any failure is the permissive
    /// `Both` (over-applying focus beats under-applying it).
    pub async fn classify_focus(&self, instruction: &str) -> Focus {
        let trimmed = instruction.trim();
        if trimmed.is_empty() || NONE_PHRASES.contains(&trimmed) {
            debug!("empty focus instruction, classification skipped");
            return Focus::None;
        }

        let prompt = render(
            self.prompts.resolve(PromptKind::FocusClassification),
            &[("user_focus_instruction", instruction)],
        );

        let outcome = match self.llm.invoke(&prompt).await {
            Ok(response) => parse_classification(&response),
            Err(e) => ParseOutcome::Fallback(format!("llm error: {e}")),
        };

        match outcome {
            ParseOutcome::Parsed((focus, reason)) => {
                debug!(?focus, %reason, "focus classified");
                focus
            }
            ParseOutcome::Fallback(reason) => {
                warn!(%reason, "focus classification fell back to both");
                Focus::Both
            }
        }
    }

    /// Generate the three axis queries. Each axis is independently
    /// fault-isolated: a failure on one falls back to that axis's raw
    /// input and does not disturb the others.
    pub async fn axis_queries(
        &self,
        purpose: &str,
        normalized_materials: &str,
        methods: &str,
        instruction: &str,
        focus: Focus,
    ) -> AxisQueries {
        let material_instruction = if focus.applies_to_materials() {
            instruction
        } else {
            ""
        };
        let method_instruction = if focus.applies_to_methods() {
            instruction
        } else {
            ""
        };

        let material = self
            .material_query(normalized_materials, material_instruction)
            .await;
        let method = self
            .method_query(normalized_materials, methods, method_instruction)
            .await;
        let combined = self
            .combined_query(purpose, normalized_materials, methods, instruction)
            .await;

        AxisQueries {
            material,
            method,
            combined,
        }
    }

    async fn material_query(&self, normalized_materials: &str, instruction: &str) -> String {
        let prompt = render(
            self.prompts.resolve(PromptKind::MaterialQueryGeneration),
            &[
                ("normalized_materials", normalized_materials),
                ("user_focus_instruction", or_none(instruction)),
            ],
        );

        let outcome = match self.llm.invoke(&prompt).await {
            Ok(response) => parse_single_query(&response),
            Err(e) => ParseOutcome::Fallback(format!("llm error: {e}")),
        };

        match outcome {
            ParseOutcome::Parsed(query) => query,
            ParseOutcome::Fallback(reason) => {
                warn!(%reason, "material query generation fell back to raw materials");
                normalized_materials.to_string()
            }
        }
    }

    async fn method_query(
        &self,
        normalized_materials: &str,
        methods: &str,
        instruction: &str,
    ) -> String {
        let prompt = render(
            self.prompts.resolve(PromptKind::MethodQueryGeneration),
            &[
                ("normalized_materials", normalized_materials),
                ("input_methods", methods),
                ("user_focus_instruction", or_none(instruction)),
            ],
        );

        let outcome = match self.llm.invoke(&prompt).await {
            Ok(response) => parse_single_query(&response),
            Err(e) => ParseOutcome::Fallback(format!("llm error: {e}")),
        };

        match outcome {
            ParseOutcome::Parsed(query) => query,
            ParseOutcome::Fallback(reason) => {
                warn!(%reason, "method query generation fell back to raw methods");
                methods.to_string()
            }
        }
    }
}

fn or_none(instruction: &str) -> &str {
    if instruction.is_empty() {
        "特になし"
    } else {
        instruction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BenchError, BenchResult};
    use async_trait::async_trait;

    struct StubLlm {
        response: BenchResult<String>,
    }

    impl StubLlm {
        fn ok(response: &str) -> Arc<Self> {
            Arc::new(Self {
                response: Ok(response.to_string()),
            })
        }

        fn err() -> Arc<Self> {
            Arc::new(Self {
                response: Err(BenchError::llm("connection refused")),
            })
        }
    }

    #[async_trait]
    impl Llm for StubLlm {
        async fn invoke(&self, _prompt: &str) -> BenchResult<String> {
            match &self.response {
                Ok(text) => Ok(text.clone()),
                Err(_) => Err(BenchError::llm("connection refused")),
            }
        }

        fn model_name(&self) -> &str {
            "stub"
        }
    }

    #[test]
    fn test_extract_json_fenced_block() {
        let text = "Here you go:\n```json\n{\"queries\": [\"a\"]}\n```\nanything else";
        assert_eq!(extract_json(text), r#"{"queries": ["a"]}"#);
    }

    #[test]
    fn test_extract_json_bare_braces() {
        let text = "result: {\"query\": \"x\"} done";
        assert_eq!(extract_json(text), r#"{"query": "x"}"#);
    }

    #[test]
    fn test_parse_query_list_fallback_on_empty() {
        assert!(matches!(
            parse_query_list(r#"{"queries": []}"#),
            ParseOutcome::Fallback(_)
        ));
        assert!(matches!(
            parse_query_list("not json at all"),
            ParseOutcome::Fallback(_)
        ));
    }

    #[test]
    fn test_parse_classification_rejects_out_of_enum() {
        assert!(matches!(
            parse_classification(r#"{"classification": "everything"}"#),
            ParseOutcome::Fallback(_)
        ));
        assert_eq!(
            parse_classification(r#"{"classification": "methods", "reason": "r"}"#),
            ParseOutcome::Parsed((Focus::Methods, "r".to_string()))
        );
    }

    #[tokio::test]
    async fn test_combined_query_joins_list() {
        let planner = QueryPlanner::new(
            StubLlm::ok(r#"{"queries": ["水酸化ナトリウム 滴定", "pH測定"]}"#),
            PromptRegistry::new(),
        );
        let query = planner.combined_query("pH測定", "- NaOH: 10g", "滴定", "").await;
        assert_eq!(query, "水酸化ナトリウム 滴定 pH測定");
    }

    #[tokio::test]
    async fn test_combined_query_literal_fallback() {
        let planner = QueryPlanner::new(StubLlm::err(), PromptRegistry::new());
        let query = planner
            .combined_query("pH測定", "- 水酸化ナトリウム: 10g", "滴定", "指示")
            .await;
        assert_eq!(query, "pH測定 - 水酸化ナトリウム: 10g 指示");
    }

    #[tokio::test]
    async fn test_classify_focus_skips_llm_for_none_phrases() {
        // The stub would fail if invoked; the short-circuit must win.
        let planner = QueryPlanner::new(StubLlm::err(), PromptRegistry::new());
        assert_eq!(planner.classify_focus("").await, Focus::None);
        assert_eq!(planner.classify_focus("特になし").await, Focus::None);
        assert_eq!(planner.classify_focus("  なし  ").await, Focus::None);
    }

    #[tokio::test]
    async fn test_classify_focus_parse_failure_defaults_to_both() {
        let planner = QueryPlanner::new(StubLlm::ok("garbage, not json"), PromptRegistry::new());
        assert_eq!(planner.classify_focus("材料を重視して").await, Focus::Both);
    }

    #[tokio::test]
    async fn test_axis_queries_fault_isolated() {
        // Single-query responses parse for material/method; the combined
        // axis needs a list and falls back independently.
        let planner = QueryPlanner::new(
            StubLlm::ok(r#"{"query": "生成クエリ"}"#),
            PromptRegistry::new(),
        );
        let queries = planner
            .axis_queries("目的", "材料", "方法", "", Focus::None)
            .await;

        assert_eq!(queries.material, "生成クエリ");
        assert_eq!(queries.method, "生成クエリ");
        // combined fell back to the literal concatenation
        assert_eq!(queries.combined, "目的 材料 ");
    }
}
