//! Embedding provider trait definitions

use crate::types::Embedding;
use std::fmt::Debug;

/// Errors that can occur during embedding operations
#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    /// Request exceeded its deadline
    #[error("Embedding request timed out: {0}")]
    Timeout(String),

    /// Rate limited by the API
    #[error("Rate limited, retry after {retry_after_ms:?}ms")]
    RateLimited {
        /// Suggested retry delay in milliseconds, if provided by the API
        retry_after_ms: Option<u64>,
    },

    /// The API returned an error response
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Embedding generation failed
    #[error("Embedding failed: {0}")]
    Failed(String),
}

impl EmbeddingError {
    /// Whether a retry with backoff is worthwhile. Client-side errors
    /// (4xx other than 429, bad configuration) are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::RateLimited { .. } | Self::Network(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::Config(_) | Self::Failed(_) => false,
        }
    }
}

/// Result type for embedding operations
pub type EmbeddingResult<T> = Result<T, EmbeddingError>;

/// Core trait for embedding providers.
///
/// Both variants (local model, managed HTTP API) produce deterministic
/// vectors for a fixed model version. The index bundle records the producing
/// `model_id` and dimension index-wide; mixing vectors from different
/// models within one bundle invalidates cosine comparisons and is rejected
/// at load time.
pub trait EmbeddingProvider: Send + Sync + Debug {
    /// Generate an embedding for a single text
    fn embed(&self, text: &str) -> EmbeddingResult<Embedding> {
        let embeddings = self.embed_batch(std::slice::from_ref(&text.to_string()))?;
        embeddings
            .into_iter()
            .next()
            .ok_or_else(|| EmbeddingError::Failed("No embedding returned".to_string()))
    }

    /// Generate embeddings for a batch of texts, in input order
    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>>;

    /// Embedding dimensions
    fn dimensions(&self) -> usize;

    /// Stable identifier of the producing model, recorded in the bundle
    fn model_id(&self) -> &str;
}

/// Normalize an embedding vector to unit length
pub fn normalize_embedding(embedding: &Embedding) -> Embedding {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        embedding.iter().map(|x| x / norm).collect()
    } else {
        embedding.clone()
    }
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "embeddings must have the same dimension");

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        dot / (norm_a * norm_b)
    } else {
        0.0
    }
}
