//! benchnote-llm - LLM provider implementations for benchnote.
//!
//! Query generation, focus classification, and comparison summarization
//! all consume the core [`Llm`] trait; this crate provides the HTTP
//! providers behind it.
//!
//! # Example
//!
//! ```ignore
//! use benchnote_llm::LlmFactory;
//!
//! // Search/planning LLM and a cheaper summarization LLM
//! let search_llm = LlmFactory::openai_with_model("gpt-4o-mini")?;
//! let summary_llm = LlmFactory::openai_with_model("gpt-3.5-turbo")?;
//! ```

mod factory;
mod openai;

pub use factory::LlmFactory;
pub use openai::OpenAiLlm;

// Re-export core types for convenience
pub use benchnote_core::traits::{Llm, LlmConfig, LlmProvider};
