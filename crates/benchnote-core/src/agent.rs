//! The search agent: the state machine driving one retrieval request.
//!
//! Flow: normalize -> (multi-axis: classify focus -> generate axis queries
//! -> per-axis search -> score fusion | single-query: generate query ->
//! search) -> compare -> done. Evaluation mode terminates after the search
//! or fusion stage and returns the larger evaluation cut without invoking
//! the summarization LLM.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{RerankPosition, SearchConfig};
use crate::normalize::MasterDictionary;
use crate::prompts::{render, PromptKind, PromptRegistry};
use crate::query::QueryPlanner;
use crate::retrieval::{DedupPolicy, FusedDocument, FusionEngine, Retriever};
use crate::traits::{Llm, Reranker};
use crate::types::{Axis, AxisQueries, NoteDocument, ScoredDocument, SearchInput, SearchOutcome};

/// Focus instruction applied when the user supplies none.
pub const DEFAULT_FOCUS_INSTRUCTION: &str = "使用されている材料(化学物質、容量）と、方法（化学物質、容量、手順）の記述が類似している実験ノートを最優先して検索してください。";

const NO_MATCH_MESSAGE: &str = "該当するノートが見つかりませんでした。";

/// Orchestrates one retrieval request end to end.
///
/// All collaborators are injected; the agent itself holds no connection
/// state and is safe to share across concurrent requests.
pub struct SearchAgent {
    config: SearchConfig,
    planner: QueryPlanner,
    summary_llm: Arc<dyn Llm>,
    reranker: Option<Arc<dyn Reranker>>,
    retriever: Retriever,
    master_dict: MasterDictionary,
    prompts: PromptRegistry,
}

impl SearchAgent {
    /// Create an agent.
    pub fn new(
        config: SearchConfig,
        search_llm: Arc<dyn Llm>,
        summary_llm: Arc<dyn Llm>,
        retriever: Retriever,
        master_dict: MasterDictionary,
        prompts: PromptRegistry,
    ) -> Self {
        Self {
            config,
            planner: QueryPlanner::new(search_llm, prompts.clone()),
            summary_llm,
            reranker: None,
            retriever,
            master_dict,
            prompts,
        }
    }

    /// Attach a reranker.
    pub fn with_reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Run the pipeline for one request.
    pub async fn run(&self, input: SearchInput) -> SearchOutcome {
        // --- normalize ---
        let normalized_materials = self.master_dict.normalize_materials(&input.materials);
        let instruction = if input.instruction.trim().is_empty() {
            debug!("applying default focus instruction");
            DEFAULT_FOCUS_INSTRUCTION.to_string()
        } else {
            input.instruction.clone()
        };
        info!(
            evaluation_mode = input.evaluation_mode,
            multi_axis = self.config.multi_axis_enabled,
            "normalization complete"
        );

        let mut outcome = SearchOutcome {
            normalized_materials: normalized_materials.clone(),
            ..Default::default()
        };

        let selected = if self.config.multi_axis_enabled {
            self.run_multi_axis(&input, &normalized_materials, &instruction, &mut outcome)
                .await
        } else {
            self.run_single_query(&input, &normalized_materials, &instruction, &mut outcome)
                .await
        };

        outcome.documents = selected
            .iter()
            .map(|(doc, _, identity)| format!("【実験ノートID: {identity}】\n{}", doc.content))
            .collect();

        // --- compare ---
        if !input.evaluation_mode {
            outcome.comparison = Some(
                self.compare(&input, &normalized_materials, &instruction, &outcome.documents)
                    .await,
            );
        }

        outcome
    }

    /// Single-query path: generate query -> search -> rerank -> dedup.
    async fn run_single_query(
        &self,
        input: &SearchInput,
        normalized_materials: &str,
        instruction: &str,
        outcome: &mut SearchOutcome,
    ) -> Vec<(NoteDocument, f32, String)> {
        let query = self
            .planner
            .combined_query(&input.purpose, normalized_materials, &input.methods, instruction)
            .await;
        outcome.search_query = query.clone();

        let index = self.retriever.topology().primary().clone();
        if let Ok(count) = index.count().await {
            debug!(collection = index.collection_name(), documents = count, "collection ready");
        }
        let candidates = self
            .retriever
            .search_with_expansion(
                &index,
                &query,
                self.config.search_mode,
                self.config.hybrid_alpha,
                self.config.candidate_pool,
            )
            .await;
        info!(candidates = candidates.len(), "single-query retrieval complete");

        if candidates.is_empty() {
            return Vec::new();
        }

        // Single-query reranking is unconditional when a reranker is
        // configured; there is no axis positioning to choose.
        let ranked = match &self.reranker {
            Some(reranker) => {
                self.rerank_scored(reranker, &query, candidates, self.config.rerank_top_n)
                    .await
            }
            None => candidates,
        };

        self.dedup(input.evaluation_mode)
            .select(ranked.into_iter().map(|scored| {
                let identity = scored.doc.identity_key();
                (scored.doc, scored.score, identity)
            }))
    }

    /// Multi-axis path: classify -> generate -> search per axis -> fuse ->
    /// rerank -> dedup.
    async fn run_multi_axis(
        &self,
        input: &SearchInput,
        normalized_materials: &str,
        instruction: &str,
        outcome: &mut SearchOutcome,
    ) -> Vec<(NoteDocument, f32, String)> {
        let focus = self.planner.classify_focus(instruction).await;
        outcome.focus_classification = Some(focus);

        let queries = self
            .planner
            .axis_queries(
                &input.purpose,
                normalized_materials,
                &input.methods,
                instruction,
                focus,
            )
            .await;
        outcome.search_query = queries.combined.clone();
        outcome.axis_queries = Some(queries.clone());

        // Axes are data-independent; retrieve them concurrently.
        let (material, method, combined) = futures::join!(
            self.axis_search(Axis::Material, &queries),
            self.axis_search(Axis::Method, &queries),
            self.axis_search(Axis::Combined, &queries),
        );
        info!(
            material = material.len(),
            method = method.len(),
            combined = combined.len(),
            "multi-axis retrieval complete"
        );

        let engine = FusionEngine::new(
            self.config.fusion_method,
            self.config.axis_weights,
            self.config.rrf_k,
        );
        let mut fused = engine.fuse(&material, &method, &combined);
        debug!(fused = fused.len(), method = ?self.config.fusion_method, "fusion complete");

        if self.config.rerank_position == RerankPosition::AfterFusion
            && self.config.rerank_enabled
            && !fused.is_empty()
        {
            if let Some(reranker) = &self.reranker {
                fused = self
                    .rerank_fused(reranker, &queries.combined, fused)
                    .await;
            }
        }

        self.dedup(input.evaluation_mode)
            .select(fused.into_iter().map(|f| (f.doc, f.score, f.identity)))
    }

    /// Retrieve one axis with its configured mode, reranking per axis when
    /// so positioned.
    async fn axis_search(&self, axis: Axis, queries: &AxisQueries) -> Vec<ScoredDocument> {
        let query = queries.get(axis);
        if query.is_empty() {
            debug!(axis = axis.as_str(), "empty query, axis skipped");
            return Vec::new();
        }

        let index = self.retriever.topology().index_for_axis(axis).clone();
        let mode = self.config.axis_search_modes.get(axis);
        let results = self
            .retriever
            .search_with_expansion(
                &index,
                query,
                mode,
                self.config.hybrid_alpha,
                self.config.candidate_pool,
            )
            .await;

        if self.config.rerank_position == RerankPosition::PerAxis
            && self.config.rerank_enabled
            && !results.is_empty()
        {
            if let Some(reranker) = &self.reranker {
                let top_n = self.config.rerank_top_n.min(results.len());
                return self.rerank_scored(reranker, query, results, top_n).await;
            }
        }

        results
    }

    /// Rerank a candidate list. On failure the pre-rerank order is kept;
    /// a rerank problem never fails the request.
    async fn rerank_scored(
        &self,
        reranker: &Arc<dyn Reranker>,
        query: &str,
        candidates: Vec<ScoredDocument>,
        top_n: usize,
    ) -> Vec<ScoredDocument> {
        let contents: Vec<String> = candidates.iter().map(|c| c.doc.content.clone()).collect();
        match reranker.rerank(query, &contents, top_n).await {
            Ok(entries) => entries
                .into_iter()
                .filter_map(|entry| {
                    candidates
                        .get(entry.index)
                        .map(|c| ScoredDocument::new(c.doc.clone(), entry.relevance_score))
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "rerank failed, keeping pre-rerank order");
                candidates
            }
        }
    }

    /// Rerank the fused ranking using the combined-axis query. The pool is
    /// overfetched to `2 * rerank_top_n` so reordering cannot starve the
    /// final cut.
    async fn rerank_fused(
        &self,
        reranker: &Arc<dyn Reranker>,
        query: &str,
        fused: Vec<FusedDocument>,
    ) -> Vec<FusedDocument> {
        let pool: Vec<FusedDocument> = fused
            .iter()
            .take(self.config.rerank_top_n * 2)
            .cloned()
            .collect();
        let contents: Vec<String> = pool.iter().map(|f| f.doc.content.clone()).collect();
        let top_n = self.config.rerank_top_n.min(contents.len());

        match reranker.rerank(query, &contents, top_n).await {
            Ok(entries) => entries
                .into_iter()
                .filter_map(|entry| {
                    pool.get(entry.index).map(|f| FusedDocument {
                        doc: f.doc.clone(),
                        score: entry.relevance_score,
                        identity: f.identity.clone(),
                    })
                })
                .collect(),
            Err(e) => {
                warn!(error = %e, "post-fusion rerank failed, keeping fused order");
                fused
            }
        }
    }

    fn dedup(&self, evaluation_mode: bool) -> DedupPolicy {
        DedupPolicy::new(
            self.config.display_limit(evaluation_mode),
            self.config.rerank_top_n,
        )
    }

    /// Comparison summarization. Zero candidates produce the fixed
    /// no-match message without an LLM call; an LLM failure degrades to
    /// the same message rather than failing the request.
    async fn compare(
        &self,
        input: &SearchInput,
        normalized_materials: &str,
        instruction: &str,
        documents: &[String],
    ) -> String {
        if documents.is_empty() {
            return NO_MATCH_MESSAGE.to_string();
        }

        let docs_str = documents.join("\n\n");
        let prompt = render(
            self.prompts.resolve(PromptKind::Compare),
            &[
                ("input_purpose", input.purpose.as_str()),
                ("normalized_materials", normalized_materials),
                ("input_methods", input.methods.as_str()),
                ("user_focus_instruction", instruction),
                ("retrieved_docs", docs_str.as_str()),
            ],
        );

        match self.summary_llm.invoke(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!(error = %e, "comparison summarization failed");
                NO_MATCH_MESSAGE.to_string()
            }
        }
    }

    /// The effective configuration.
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }
}
