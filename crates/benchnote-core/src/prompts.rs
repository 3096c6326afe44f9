//! Prompt templates and the custom-override registry.
//!
//! Every LLM call renders a named template with `{placeholder}` variables.
//! Teams can override any template; a non-empty custom value wins, else the
//! built-in default applies. Resolution happens once per prompt type per
//! request.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// The prompt types the pipeline renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    /// Combined-axis query generation (also used in single-query mode).
    CombinedQueryGeneration,
    /// Material-axis query generation.
    MaterialQueryGeneration,
    /// Method-axis query generation.
    MethodQueryGeneration,
    /// Focus-instruction classification.
    FocusClassification,
    /// Comparison summarization of the retrieved notes.
    Compare,
}

impl PromptKind {
    /// Stable key used for custom-prompt storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::CombinedQueryGeneration => "combined_query_generation",
            PromptKind::MaterialQueryGeneration => "material_query_generation",
            PromptKind::MethodQueryGeneration => "method_query_generation",
            PromptKind::FocusClassification => "focus_classification",
            PromptKind::Compare => "compare",
        }
    }
}

const COMBINED_QUERY_GENERATION: &str = r#"あなたは実験ノート検索の専門家です。
以下の新しい実験の情報から、類似する過去の実験ノートを探すための検索クエリを生成してください。

# 実験の目的:
{input_purpose}

# 使用材料（正規化済み）:
{normalized_materials}

# 実験方法:
{input_methods}

# 重点指示:
{user_focus_instruction}

# 出力形式:
必ず JSON オブジェクト `{"queries": ["クエリ1", "クエリ2", "クエリ3"]}` のみを出力してください。
各クエリは材料名・操作名を中心にした短い検索文にしてください。解説や Markdown タグは不要です。"#;

const MATERIAL_QUERY_GENERATION: &str = r#"あなたは実験ノート検索の専門家です。
以下の材料リストから、同じ材料を使った実験ノートを探すための検索クエリを1つ生成してください。

# 使用材料（正規化済み）:
{normalized_materials}

# 重点指示:
{user_focus_instruction}

# 出力形式:
必ず JSON オブジェクト `{"query": "検索クエリ"}` のみを出力してください。
化学物質名と容量を優先して含めてください。解説や Markdown タグは不要です。"#;

const METHOD_QUERY_GENERATION: &str = r#"あなたは実験ノート検索の専門家です。
以下の実験方法から、類似する手順の実験ノートを探すための検索クエリを1つ生成してください。

# 使用材料（参考）:
{normalized_materials}

# 実験方法:
{input_methods}

# 重点指示:
{user_focus_instruction}

# 出力形式:
必ず JSON オブジェクト `{"query": "検索クエリ"}` のみを出力してください。
操作・手順・条件を優先して含めてください。解説や Markdown タグは不要です。"#;

const FOCUS_CLASSIFICATION: &str = r#"ユーザーの重点指示が、実験の「材料」と「方法」のどちらを重視しているかを分類してください。

# 重点指示:
{user_focus_instruction}

# 分類基準:
- "materials": 材料・試薬・化学物質の類似を重視
- "methods": 手順・操作・条件の類似を重視
- "both": 両方を重視
- "none": どちらにも言及していない

# 出力形式:
必ず JSON オブジェクト `{"classification": "materials|methods|both|none", "reason": "理由"}` のみを出力してください。"#;

const COMPARE: &str = r#"あなたは実験計画のレビュアーです。
新しい実験と、検索された過去の実験ノートを比較し、参考になる点・相違点を簡潔にまとめてください。

# 新しい実験
## 目的:
{input_purpose}

## 使用材料（正規化済み）:
{normalized_materials}

## 実験方法:
{input_methods}

## 重点指示:
{user_focus_instruction}

# 検索された実験ノート:
{retrieved_docs}

各ノートについて、材料・方法の一致点と相違点、注意すべき条件を日本語でまとめてください。"#;

/// Built-in default template for a prompt type.
pub fn default_prompt(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::CombinedQueryGeneration => COMBINED_QUERY_GENERATION,
        PromptKind::MaterialQueryGeneration => MATERIAL_QUERY_GENERATION,
        PromptKind::MethodQueryGeneration => METHOD_QUERY_GENERATION,
        PromptKind::FocusClassification => FOCUS_CLASSIFICATION,
        PromptKind::Compare => COMPARE,
    }
}

/// Prompt template registry with custom overrides.
#[derive(Debug, Clone, Default)]
pub struct PromptRegistry {
    custom: HashMap<String, String>,
}

impl PromptRegistry {
    /// Registry with built-in defaults only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with custom overrides keyed by `PromptKind::as_str()`.
    pub fn with_custom(custom: HashMap<String, String>) -> Self {
        Self { custom }
    }

    /// Resolve the template for a prompt type: a non-empty custom value
    /// wins, else the built-in default.
    pub fn resolve(&self, kind: PromptKind) -> &str {
        match self.custom.get(kind.as_str()) {
            Some(custom) if !custom.trim().is_empty() => custom,
            _ => default_prompt(kind),
        }
    }
}

/// Render a template by substituting `{name}` placeholders.
///
/// Unknown placeholders are left untouched, so JSON braces in templates
/// survive rendering.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut rendered = template.to_string();
    for (name, value) in vars {
        rendered = rendered.replace(&format!("{{{name}}}"), value);
    }
    rendered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_resolution() {
        let registry = PromptRegistry::new();
        assert!(registry
            .resolve(PromptKind::FocusClassification)
            .contains("{user_focus_instruction}"));
    }

    #[test]
    fn test_non_empty_custom_wins() {
        let mut custom = HashMap::new();
        custom.insert(
            "compare".to_string(),
            "custom: {input_purpose}".to_string(),
        );
        let registry = PromptRegistry::with_custom(custom);
        assert_eq!(registry.resolve(PromptKind::Compare), "custom: {input_purpose}");
    }

    #[test]
    fn test_empty_custom_falls_back_to_default() {
        let mut custom = HashMap::new();
        custom.insert("compare".to_string(), "   ".to_string());
        let registry = PromptRegistry::with_custom(custom);
        assert_eq!(registry.resolve(PromptKind::Compare), default_prompt(PromptKind::Compare));
    }

    #[test]
    fn test_render_substitutes_placeholders() {
        let rendered = render(
            "purpose={input_purpose} focus={user_focus_instruction}",
            &[("input_purpose", "pH測定"), ("user_focus_instruction", "特になし")],
        );
        assert_eq!(rendered, "purpose=pH測定 focus=特になし");
    }

    #[test]
    fn test_render_leaves_json_braces_intact() {
        let rendered = render(r#"{"queries": []} {input_purpose}"#, &[("input_purpose", "x")]);
        assert_eq!(rendered, r#"{"queries": []} x"#);
    }
}
