//! benchnote-rerankers - Reranker implementations for benchnote.
//!
//! Cross-encoder reranking of candidate lists, applied per axis before
//! fusion or once after fusion depending on configuration.

mod cohere;
mod factory;

pub use cohere::CohereReranker;
pub use factory::RerankerFactory;

// Re-export core types
pub use benchnote_core::traits::{RerankedEntry, Reranker, RerankerConfig, RerankerProvider};
