//! Factory for creating reranker providers.

use std::sync::Arc;

use benchnote_core::error::{BenchError, BenchResult};
use benchnote_core::traits::{Reranker, RerankerConfig, RerankerProvider};

/// Factory for creating reranker providers.
pub struct RerankerFactory;

impl RerankerFactory {
    /// Create a reranker from the given configuration.
    pub fn create(
        provider: RerankerProvider,
        config: RerankerConfig,
    ) -> BenchResult<Arc<dyn Reranker>> {
        match provider {
            RerankerProvider::Cohere => {
                let reranker = crate::cohere::CohereReranker::new(config)?;
                Ok(Arc::new(reranker))
            }
            #[allow(unreachable_patterns)]
            _ => Err(BenchError::UnsupportedProvider {
                provider: format!("{provider:?}"),
            }),
        }
    }

    /// Create a Cohere reranker.
    pub fn cohere(api_key: &str) -> BenchResult<Arc<dyn Reranker>> {
        let config = RerankerConfig {
            api_key: Some(api_key.to_string()),
            ..Default::default()
        };
        let reranker = crate::cohere::CohereReranker::new(config)?;
        Ok(Arc::new(reranker))
    }
}
