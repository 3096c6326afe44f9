//! End-to-end pipeline scenarios with mocked collaborators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use benchnote_core::normalize::DictionaryEntry;
use benchnote_core::{
    BenchResult, CollectionTopology, Llm, MasterDictionary, NoteDocument, PromptRegistry,
    RerankedEntry, Reranker, Retriever, ScoredDocument, SearchAgent, SearchConfig, SearchInput,
    SearchMode, SynonymDictionary, VectorIndex,
};

/// LLM stub that returns one canned response and counts invocations.
struct CountingLlm {
    response: Option<String>,
    calls: AtomicUsize,
}

impl CountingLlm {
    fn returning(response: &str) -> Arc<Self> {
        Arc::new(Self {
            response: Some(response.to_string()),
            calls: AtomicUsize::new(0),
        })
    }

    /// Responds with prose that fails JSON extraction, driving every
    /// planner call down its fallback branch.
    fn unparseable() -> Arc<Self> {
        Arc::new(Self {
            response: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Llm for CountingLlm {
    async fn invoke(&self, _prompt: &str) -> BenchResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| "承知しました。検索クエリをご提案します。".to_string()))
    }

    fn model_name(&self) -> &str {
        "counting-stub"
    }
}

/// Index stub scoring by shared-substring relevance.
struct KeywordOverlapIndex {
    docs: Vec<NoteDocument>,
}

impl KeywordOverlapIndex {
    fn shared(docs: Vec<NoteDocument>) -> Arc<dyn VectorIndex> {
        Arc::new(Self { docs })
    }
}

/// True when the query contains any contiguous 4-character window of the
/// document content.
fn shares_window(query: &str, content: &str) -> bool {
    let chars: Vec<char> = content.chars().collect();
    chars
        .windows(4)
        .any(|w| query.contains(&w.iter().collect::<String>()))
}

#[async_trait]
impl VectorIndex for KeywordOverlapIndex {
    async fn similarity_search(&self, query: &str, k: usize) -> BenchResult<Vec<ScoredDocument>> {
        let mut results: Vec<ScoredDocument> = self
            .docs
            .iter()
            .enumerate()
            .map(|(i, doc)| {
                let score = if shares_window(query, &doc.content) {
                    0.95 - i as f32 * 0.001
                } else {
                    0.3 - i as f32 * 0.001
                };
                ScoredDocument::new(doc.clone(), score)
            })
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        results.truncate(k);
        Ok(results)
    }

    async fn count(&self) -> BenchResult<usize> {
        Ok(self.docs.len())
    }

    async fn get_all_documents(&self) -> BenchResult<Vec<NoteDocument>> {
        Ok(self.docs.clone())
    }

    fn collection_name(&self) -> &str {
        "test-collection"
    }
}

/// Reranker stub that preserves the incoming order.
struct PassthroughReranker;

#[async_trait]
impl Reranker for PassthroughReranker {
    async fn rerank(
        &self,
        _query: &str,
        documents: &[String],
        top_n: usize,
    ) -> BenchResult<Vec<RerankedEntry>> {
        Ok((0..documents.len().min(top_n))
            .map(|index| RerankedEntry {
                index,
                relevance_score: 1.0 - index as f32 * 0.01,
            })
            .collect())
    }

    fn model_name(&self) -> &str {
        "passthrough"
    }
}

fn note(id: &str, content: &str) -> NoteDocument {
    NoteDocument::new(content).with_meta("note_id", id)
}

#[tokio::test]
async fn single_query_semantic_flow_normalizes_before_retrieval() {
    // NaOH is normalized to 水酸化ナトリウム before query generation; the
    // (unparseable) LLM forces the literal fallback query, which therefore
    // carries the normalized name into retrieval.
    let master_dict = MasterDictionary::from_entries(vec![DictionaryEntry {
        canonical: "水酸化ナトリウム".to_string(),
        variants: vec!["NaOH".to_string()],
    }]);

    let corpus = vec![
        note("N-1", "水酸化ナトリウム水溶液で中和滴定を行った"),
        note("N-2", "エタノールで器具を洗浄した"),
        note("N-3", "遠心分離の条件検討を行った"),
    ];
    let retriever = Retriever::new(
        CollectionTopology::LegacySingle {
            combined: KeywordOverlapIndex::shared(corpus),
        },
        Arc::new(SynonymDictionary::new()),
    );

    let llm = CountingLlm::unparseable();
    let agent = SearchAgent::new(
        SearchConfig::default()
            .with_multi_axis(false)
            .with_search_mode(SearchMode::Semantic),
        llm.clone(),
        llm.clone(),
        retriever,
        master_dict,
        PromptRegistry::new(),
    )
    .with_reranker(Arc::new(PassthroughReranker));

    let outcome = agent
        .run(SearchInput {
            purpose: "pH measurement".to_string(),
            materials: "- NaOH: 10g".to_string(),
            methods: "titrate slowly".to_string(),
            ..Default::default()
        })
        .await;

    assert!(outcome.normalized_materials.contains("水酸化ナトリウム"));
    assert!(outcome.search_query.contains("水酸化ナトリウム"));

    // The matching note ranks first, and no identity appears twice.
    assert!(outcome.documents[0].starts_with("【実験ノートID: N-1】"));
    let n1_hits = outcome
        .documents
        .iter()
        .filter(|d| d.contains("N-1"))
        .count();
    assert_eq!(n1_hits, 1);
}

#[tokio::test]
async fn evaluation_mode_returns_ten_and_skips_summarization() {
    let corpus: Vec<NoteDocument> = (0..15)
        .map(|i| {
            note(
                &format!("N-{i:02}"),
                &format!("標準操作の記録 その{i}: 緩衝液を調製し撹拌した"),
            )
        })
        .collect();

    let retriever = Retriever::new(
        CollectionTopology::TwoSection {
            materials_methods: KeywordOverlapIndex::shared(corpus.clone()),
            combined: KeywordOverlapIndex::shared(corpus),
        },
        Arc::new(SynonymDictionary::new()),
    );

    let llm = CountingLlm::returning(
        r#"{"classification": "both", "reason": "両方", "queries": ["緩衝液 調製"], "query": "緩衝液 調製"}"#,
    );
    let agent = SearchAgent::new(
        SearchConfig::default(),
        llm.clone(),
        llm.clone(),
        retriever,
        MasterDictionary::new(),
        PromptRegistry::new(),
    )
    .with_reranker(Arc::new(PassthroughReranker));

    let outcome = agent
        .run(SearchInput {
            purpose: "緩衝液の調製".to_string(),
            materials: "- リン酸塩: 5g".to_string(),
            methods: "撹拌しながら溶解".to_string(),
            instruction: "方法と材料の両方を重視".to_string(),
            evaluation_mode: true,
            ..Default::default()
        })
        .await;

    // 15 distinct fused documents, cut to the evaluation limit.
    assert_eq!(outcome.documents.len(), 10);
    assert!(outcome.comparison.is_none());

    // classify + material + method + combined; no comparison call.
    assert_eq!(llm.call_count(), 4);
}

#[tokio::test]
async fn normal_mode_returns_three_with_comparison() {
    let corpus: Vec<NoteDocument> = (0..6)
        .map(|i| note(&format!("N-{i}"), &format!("緩衝液 調製の記録 {i}")))
        .collect();

    let retriever = Retriever::new(
        CollectionTopology::TwoSection {
            materials_methods: KeywordOverlapIndex::shared(corpus.clone()),
            combined: KeywordOverlapIndex::shared(corpus),
        },
        Arc::new(SynonymDictionary::new()),
    );

    let llm = CountingLlm::returning(
        r#"{"classification": "both", "queries": ["緩衝液 調製"], "query": "緩衝液 調製"}"#,
    );
    let agent = SearchAgent::new(
        SearchConfig::default(),
        llm.clone(),
        llm.clone(),
        retriever,
        MasterDictionary::new(),
        PromptRegistry::new(),
    )
    .with_reranker(Arc::new(PassthroughReranker));

    let outcome = agent
        .run(SearchInput {
            purpose: "緩衝液の調製".to_string(),
            materials: "- リン酸塩: 5g".to_string(),
            methods: "撹拌".to_string(),
            instruction: "材料を重視".to_string(),
            ..Default::default()
        })
        .await;

    assert_eq!(outcome.documents.len(), 3);
    assert!(outcome.comparison.is_some());
    // classify + 3 axis generations + comparison
    assert_eq!(llm.call_count(), 5);
}
