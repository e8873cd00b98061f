//! Configuration for HIndex

mod embedding;
mod index;
mod logging;

pub use embedding::{EmbeddingBackend, EmbeddingConfig};
pub use index::{ChunkingConfig, RetrievalConfig, StoreConfig};
pub use logging::{LogFormat, LogLevel, LoggingConfig};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration for the HIndex engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    /// Index bundle store configuration
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file and validate it.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config file '{}': {}", path.display(), e)
        })?;
        let config: Config = toml::from_str(&content).map_err(|e| {
            anyhow::anyhow!("Failed to parse config file '{}': {}", path.display(), e)
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Validate all configuration fields.
    ///
    /// Collects all validation errors and reports them together so the user
    /// can fix everything in one pass rather than playing whack-a-mole.
    pub fn validate(&self) -> Result<()> {
        let mut errors: Vec<String> = Vec::new();

        // Embedding validation
        if self.embedding.dimensions == 0 {
            errors.push("embedding dimensions must be positive".to_string());
        }
        if self.embedding.dimensions > 4096 {
            errors.push("embedding dimensions must be <= 4096".to_string());
        }
        if self.embedding.max_batch_size == 0 {
            errors.push("embedding max_batch_size must be positive".to_string());
        }
        if self.embedding.num_threads == 0 {
            errors.push("embedding num_threads must be positive".to_string());
        }
        if self.embedding.backend == EmbeddingBackend::Api && self.embedding.endpoint.is_none() {
            errors.push("api embedding backend requires an endpoint".to_string());
        }

        // Chunking validation
        if self.chunking.max_tokens == 0 {
            errors.push("max_tokens must be positive".to_string());
        }
        if self.chunking.max_tokens > 8192 {
            errors.push("max_tokens must be <= 8192".to_string());
        }
        if self.chunking.overlap_tokens >= self.chunking.max_tokens {
            errors.push("overlap_tokens must be less than max_tokens".to_string());
        }

        // Retrieval validation
        if self.retrieval.rrf_k == 0 {
            errors.push("rrf_k must be positive".to_string());
        }
        if self.retrieval.candidate_count == 0 {
            errors.push("candidate_count must be positive".to_string());
        }
        if self.retrieval.bm25_k1 <= 0.0 {
            errors.push("bm25_k1 must be positive".to_string());
        }
        if !(0.0..=1.0).contains(&self.retrieval.bm25_b) {
            errors.push("bm25_b must be between 0.0 and 1.0".to_string());
        }

        // Store validation
        if self.store.data_dir.as_os_str().is_empty() {
            errors.push("data_dir must not be empty".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn valid_config() -> Config {
        Config::default()
    }

    #[test]
    fn default_config_passes_validation() {
        assert!(valid_config().validate().is_ok(), "default config should be valid");
    }

    #[test]
    fn validate_rejects_zero_embedding_dimensions() {
        let mut cfg = valid_config();
        cfg.embedding.dimensions = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("embedding dimensions must be positive"));
    }

    #[test]
    fn validate_rejects_oversized_embedding_dimensions() {
        let mut cfg = valid_config();
        cfg.embedding.dimensions = 5000;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("embedding dimensions must be <= 4096"));
    }

    #[test]
    fn validate_rejects_api_backend_without_endpoint() {
        let mut cfg = valid_config();
        cfg.embedding.backend = EmbeddingBackend::Api;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("requires an endpoint"));
    }

    #[test]
    fn validate_accepts_api_backend_with_endpoint() {
        let mut cfg = valid_config();
        cfg.embedding.backend = EmbeddingBackend::Api;
        cfg.embedding.endpoint = Some("http://localhost:8080/v1/embeddings".to_string());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_max_tokens() {
        let mut cfg = valid_config();
        cfg.chunking.max_tokens = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("max_tokens must be positive"));
    }

    #[test]
    fn validate_rejects_overlap_not_below_max_tokens() {
        let mut cfg = valid_config();
        cfg.chunking.max_tokens = 50;
        cfg.chunking.overlap_tokens = 50;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("overlap_tokens must be less than max_tokens"));
    }

    #[test]
    fn validate_rejects_zero_rrf_k() {
        let mut cfg = valid_config();
        cfg.retrieval.rrf_k = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("rrf_k must be positive"));
    }

    #[test]
    fn validate_rejects_bm25_b_out_of_range() {
        let mut cfg = valid_config();
        cfg.retrieval.bm25_b = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("bm25_b must be between 0.0 and 1.0"));
    }

    #[test]
    fn validate_rejects_empty_data_dir() {
        let mut cfg = valid_config();
        cfg.store.data_dir = PathBuf::from("");
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("data_dir must not be empty"));
    }

    #[test]
    fn validate_collects_multiple_errors() {
        let mut cfg = valid_config();
        cfg.embedding.dimensions = 0;
        cfg.chunking.max_tokens = 0;
        cfg.retrieval.rrf_k = 0;
        let msg = cfg.validate().unwrap_err().to_string();
        assert!(msg.contains("embedding dimensions must be positive"));
        assert!(msg.contains("max_tokens must be positive"));
        assert!(msg.contains("rrf_k must be positive"));
    }

    #[test]
    fn default_retrieval_config_values() {
        let ret = RetrievalConfig::default();
        assert_eq!(ret.candidate_count, 20);
        assert_eq!(ret.rrf_k, 60);
        assert!((ret.bm25_k1 - 1.5).abs() < f32::EPSILON);
        assert!((ret.bm25_b - 0.75).abs() < f32::EPSILON);
        assert!(ret.enable_reranking);
        assert!(ret.min_score.is_none());
    }

    #[test]
    fn default_chunking_config_values() {
        let ch = ChunkingConfig::default();
        assert_eq!(ch.max_tokens, 512);
        assert_eq!(ch.overlap_tokens, 50);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let cfg = valid_config();
        let serialized = toml::to_string(&cfg).unwrap();
        let parsed: Config = toml::from_str(&serialized).unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.embedding.dimensions, cfg.embedding.dimensions);
        assert_eq!(parsed.chunking.max_tokens, cfg.chunking.max_tokens);
    }

    #[test]
    fn empty_toml_yields_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.embedding.dimensions, 384);
        assert_eq!(parsed.retrieval.rrf_k, 60);
    }
}
