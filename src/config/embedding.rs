//! Embedding provider configuration

use serde::{Deserialize, Serialize};

fn default_dimensions() -> usize {
    384
}

fn default_timeout() -> u64 {
    30
}

fn default_batch_size() -> usize {
    32
}

fn default_max_retries() -> usize {
    3
}

fn default_retry_backoff_ms() -> u64 {
    500
}

fn default_num_threads() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
        .min(8)
}

/// Which embedding backend to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmbeddingBackend {
    /// Deterministic in-process model, no external dependencies
    #[default]
    Local,
    /// OpenAI-compatible HTTP embeddings endpoint
    Api,
}

/// Embedding model configuration
///
/// ```toml
/// [embedding]
/// backend = "api"
/// endpoint = "https://api.openai.com/v1/embeddings"
/// model = "text-embedding-3-small"
/// dimensions = 1536
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    /// Api backend: endpoint URL (e.g. "https://api.openai.com/v1/embeddings")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Api backend: API key (optional, can also use EMBEDDING_API_KEY env var)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Api backend: model name for API requests (e.g. "text-embedding-3-small")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Api backend: request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Api backend: number of retries for transient failures
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// Api backend: base delay for exponential retry backoff
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Embedding dimensions; recorded index-wide in the bundle summary
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Maximum texts per embedding batch
    #[serde(default = "default_batch_size")]
    pub max_batch_size: usize,
    /// Local backend: worker threads for batch embedding
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::Local,
            endpoint: None,
            api_key: None,
            model: None,
            timeout_secs: default_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            dimensions: default_dimensions(),
            max_batch_size: default_batch_size(),
            num_threads: default_num_threads(),
        }
    }
}
