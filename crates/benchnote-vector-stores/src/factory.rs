//! Factory for creating vector index providers.

use std::sync::Arc;

use benchnote_core::error::{BenchError, BenchResult};
use benchnote_core::retrieval::CollectionTopology;
use benchnote_core::traits::{Embedder, VectorIndex, VectorIndexConfig, VectorIndexProvider};

use crate::chroma::ChromaIndex;

/// Factory for creating vector index providers.
pub struct VectorIndexFactory;

impl VectorIndexFactory {
    /// Create a vector index from the given configuration.
    pub fn create(
        config: VectorIndexConfig,
        embedder: Arc<dyn Embedder>,
    ) -> BenchResult<Arc<dyn VectorIndex>> {
        match config.provider {
            VectorIndexProvider::Chroma => Ok(Arc::new(ChromaIndex::new(config, embedder))),
            #[allow(unreachable_patterns)]
            other => Err(BenchError::UnsupportedProvider {
                provider: format!("{other:?}"),
            }),
        }
    }

    /// Create the current two-section topology: a materials+methods
    /// collection shared by the material and method axes, plus a combined
    /// collection.
    pub fn two_section_topology(
        base: VectorIndexConfig,
        materials_methods_collection: &str,
        combined_collection: &str,
        embedder: Arc<dyn Embedder>,
    ) -> BenchResult<CollectionTopology> {
        let materials_methods = Self::create(
            VectorIndexConfig {
                collection_name: materials_methods_collection.to_string(),
                ..base.clone()
            },
            embedder.clone(),
        )?;
        let combined = Self::create(
            VectorIndexConfig {
                collection_name: combined_collection.to_string(),
                ..base
            },
            embedder,
        )?;

        Ok(CollectionTopology::TwoSection {
            materials_methods,
            combined,
        })
    }

    /// Create the legacy single-collection topology.
    pub fn legacy_topology(
        config: VectorIndexConfig,
        embedder: Arc<dyn Embedder>,
    ) -> BenchResult<CollectionTopology> {
        Ok(CollectionTopology::LegacySingle {
            combined: Self::create(config, embedder)?,
        })
    }
}
