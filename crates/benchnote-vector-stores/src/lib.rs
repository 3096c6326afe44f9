//! benchnote-vector-stores - Vector index implementations for benchnote.
//!
//! Provides the document collections behind the core [`VectorIndex`]
//! trait, plus topology helpers mapping retrieval axes to collections.

mod chroma;
mod factory;

pub use chroma::ChromaIndex;
pub use factory::VectorIndexFactory;

// Re-export core types
pub use benchnote_core::retrieval::CollectionTopology;
pub use benchnote_core::traits::{VectorIndex, VectorIndexConfig, VectorIndexProvider};
