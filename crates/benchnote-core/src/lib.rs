//! benchnote-core - Core library for benchnote.
//!
//! Retrieval and ranking core for laboratory experiment notes: query
//! planning, multi-source retrieval (semantic / BM25 keyword / hybrid),
//! synonym expansion, cross-axis score fusion, reranking, and the
//! orchestrating search agent.
//!
//! # Example
//!
//! ```ignore
//! use benchnote_core::{
//!     MasterDictionary, PromptRegistry, Retriever, SearchAgent, SearchConfig, SearchInput,
//! };
//! use benchnote_core::retrieval::CollectionTopology;
//!
//! let retriever = Retriever::new(
//!     CollectionTopology::TwoSection { materials_methods, combined },
//!     synonyms,
//! );
//! let agent = SearchAgent::new(
//!     SearchConfig::default(),
//!     search_llm,
//!     summary_llm,
//!     retriever,
//!     MasterDictionary::new(),
//!     PromptRegistry::new(),
//! )
//! .with_reranker(reranker);
//!
//! let outcome = agent.run(SearchInput {
//!     purpose: "pH測定".into(),
//!     materials: "- NaOH: 10g".into(),
//!     methods: "滴定".into(),
//!     ..Default::default()
//! }).await;
//! ```

pub mod agent;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod normalize;
pub mod prompts;
pub mod query;
pub mod retrieval;
pub mod synonym;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use agent::{SearchAgent, DEFAULT_FOCUS_INSTRUCTION};
pub use config::{AxisSearchModes, RerankPosition, SearchConfig, SearchMode};
pub use error::{BenchError, BenchResult};
pub use evaluation::{EvaluationMetrics, Evaluator};
pub use normalize::MasterDictionary;
pub use prompts::{PromptKind, PromptRegistry};
pub use query::QueryPlanner;
pub use retrieval::{AxisWeights, Bm25, CollectionTopology, FusionEngine, FusionMethod, Retriever};
pub use synonym::{SynonymDictionary, SynonymGroup};
pub use traits::{
    Embedder, EmbedderConfig, Llm, LlmConfig, RerankedEntry, Reranker, RerankerConfig,
    VectorIndex, VectorIndexConfig,
};
pub use types::{
    Axis, AxisQueries, Focus, NoteDocument, ScoredDocument, SearchInput, SearchOutcome,
    SectionType,
};
