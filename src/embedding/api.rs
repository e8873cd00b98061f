//! Managed HTTP embedding provider
//!
//! Speaks the OpenAI-compatible `/v1/embeddings` wire format, which covers
//! OpenAI, Azure OpenAI and local servers exposing the same endpoint
//! (LM Studio, vLLM, Ollama, text-embeddings-inference).
//!
//! Transient failures (timeout, throttling, 5xx) are retried with bounded
//! exponential backoff, honouring `Retry-After` when the server provides
//! one. After the retry budget is exhausted the terminal error propagates;
//! a failed batch never degrades into zero-vectors.

use super::provider::{normalize_embedding, EmbeddingError, EmbeddingProvider, EmbeddingResult};
use crate::types::Embedding;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP embedding provider
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Endpoint URL (e.g. "https://api.openai.com/v1/embeddings")
    pub endpoint: String,
    /// API key; falls back to the EMBEDDING_API_KEY environment variable
    pub api_key: Option<String>,
    /// Model name sent with each request
    pub model: String,
    /// Embedding dimensions
    pub dimensions: usize,
    /// Per-request timeout
    pub timeout_secs: u64,
    /// Maximum texts per request
    pub max_batch_size: usize,
    /// Retries for transient failures before giving up
    pub max_retries: usize,
    /// Base delay for exponential backoff
    pub retry_backoff_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/embeddings".to_string(),
            api_key: None,
            model: "text-embedding-3-small".to_string(),
            dimensions: 1536,
            timeout_secs: 30,
            max_batch_size: 32,
            max_retries: 3,
            retry_backoff_ms: 500,
        }
    }
}

/// HTTP embedding provider
#[derive(Debug)]
pub struct ApiProvider {
    client: Client,
    config: ApiConfig,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

impl ApiProvider {
    pub fn new(config: ApiConfig) -> EmbeddingResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("EMBEDDING_API_KEY").ok());

        if let Some(key) = &api_key {
            let auth_value = format!("Bearer {}", key);
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&auth_value)
                    .map_err(|e| EmbeddingError::Config(format!("Invalid API key format: {}", e)))?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| EmbeddingError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, config })
    }

    /// One request attempt, no retries.
    fn request_embeddings(&self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: texts.to_vec(),
            encoding_format: "float",
        };

        debug!(
            "Embedding request to {} for {} texts",
            self.config.endpoint,
            texts.len()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout(format!(
                        "no response from {} within {}s",
                        self.config.endpoint, self.config.timeout_secs
                    ))
                } else {
                    EmbeddingError::Network(e)
                }
            })?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(|s| s * 1000);
            return Err(EmbeddingError::RateLimited {
                retry_after_ms: retry_after,
            });
        }

        if !status.is_success() {
            let error_text = response.text().unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error.message)
                .unwrap_or(error_text);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response
            .json()
            .map_err(|e| EmbeddingError::Failed(format!("Failed to parse response: {}", e)))?;

        if body.data.len() != texts.len() {
            return Err(EmbeddingError::Failed(format!(
                "requested {} embeddings, received {}",
                texts.len(),
                body.data.len()
            )));
        }

        let mut data = body.data;
        data.sort_by_key(|d| d.index);

        Ok(data
            .into_iter()
            .map(|d| normalize_embedding(&d.embedding))
            .collect())
    }

    /// Request with bounded retry and exponential backoff on transient
    /// failures. Terminal errors propagate immediately.
    fn request_with_retry(&self, texts: &[&str]) -> EmbeddingResult<Vec<Embedding>> {
        let mut attempt = 0;
        loop {
            match self.request_embeddings(texts) {
                Ok(embeddings) => return Ok(embeddings),
                Err(e) if e.is_transient() && attempt < self.config.max_retries => {
                    let backoff = self.config.retry_backoff_ms.saturating_mul(1 << attempt);
                    let delay = match &e {
                        EmbeddingError::RateLimited {
                            retry_after_ms: Some(ms),
                        } => *ms,
                        _ => backoff,
                    };
                    warn!(
                        "Transient embedding failure (attempt {}/{}), retrying in {}ms: {}",
                        attempt + 1,
                        self.config.max_retries,
                        delay,
                        e
                    );
                    std::thread::sleep(Duration::from_millis(delay));
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl EmbeddingProvider for ApiProvider {
    fn embed_batch(&self, texts: &[String]) -> EmbeddingResult<Vec<Embedding>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let text_refs: Vec<&str> = texts.iter().map(|s| s.as_str()).collect();
        let mut all_embeddings = Vec::with_capacity(texts.len());

        for batch in text_refs.chunks(self.config.max_batch_size.max(1)) {
            let embeddings = self.request_with_retry(batch)?;
            all_embeddings.extend(embeddings);
        }

        Ok(all_embeddings)
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }

    fn model_id(&self) -> &str {
        &self.config.model
    }
}
