//! Embedding providers
//!
//! One capability trait, two variants: a deterministic local model and a
//! managed OpenAI-compatible HTTP API. Callers depend only on
//! [`EmbeddingProvider`].

mod api;
mod local;
mod provider;

pub use api::{ApiConfig, ApiProvider};
pub use local::LocalProvider;
pub use provider::{
    cosine_similarity, normalize_embedding, EmbeddingError, EmbeddingProvider, EmbeddingResult,
};

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use std::sync::Arc;

/// Construct the embedding provider described by the configuration.
pub fn create_provider(config: &EmbeddingConfig) -> EmbeddingResult<Arc<dyn EmbeddingProvider>> {
    match config.backend {
        EmbeddingBackend::Local => Ok(Arc::new(LocalProvider::new(
            config.dimensions,
            config.num_threads,
        ))),
        EmbeddingBackend::Api => {
            let endpoint = config.endpoint.clone().ok_or_else(|| {
                EmbeddingError::Config("api embedding backend requires an endpoint".to_string())
            })?;
            let provider = ApiProvider::new(ApiConfig {
                endpoint,
                api_key: config.api_key.clone(),
                model: config
                    .model
                    .clone()
                    .unwrap_or_else(|| "text-embedding-3-small".to_string()),
                dimensions: config.dimensions,
                timeout_secs: config.timeout_secs,
                max_batch_size: config.max_batch_size,
                max_retries: config.max_retries,
                retry_backoff_ms: config.retry_backoff_ms,
            })?;
            Ok(Arc::new(provider))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_local_provider() {
        let config = EmbeddingConfig::default();
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.dimensions(), 384);
        assert_eq!(provider.model_id(), "hashed-bow-v1-384");
    }

    #[test]
    fn test_create_api_provider_requires_endpoint() {
        let config = EmbeddingConfig {
            backend: EmbeddingBackend::Api,
            ..Default::default()
        };
        let err = create_provider(&config).unwrap_err();
        assert!(matches!(err, EmbeddingError::Config(_)));
    }

    #[test]
    fn test_create_api_provider_with_endpoint() {
        let config = EmbeddingConfig {
            backend: EmbeddingBackend::Api,
            endpoint: Some("http://localhost:9999/v1/embeddings".to_string()),
            model: Some("bge-m3".to_string()),
            ..Default::default()
        };
        let provider = create_provider(&config).unwrap();
        assert_eq!(provider.model_id(), "bge-m3");
    }
}
